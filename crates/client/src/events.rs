//! Events broadcast to the presentation layer

use crate::controller::ControllerState;
use crate::lipsync::LipsyncFrame;

#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    StateChanged {
        old: ControllerState,
        new: ControllerState,
    },
    /// Status line text
    Status(String),
    /// User message to show in the chat
    UserMessage(String),
    /// Assistant reply to show in the chat
    AssistantMessage(String),
    /// Typing indicator shown or hidden
    Typing(bool),
    LipsyncStarted,
    LipsyncFrame(LipsyncFrame),
    LipsyncStopped,
    Error(String),
}
