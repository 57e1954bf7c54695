//! Lipsync animation
//!
//! While speech plays the avatar face gets a slight random scale and brightness
//! jitter on a fixed interval. Stopping emits a rest frame.

use std::time::Duration;

use parking_lot::Mutex;
use rand::Rng;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::events::ControllerEvent;

const MAX_SCALE_JITTER: f32 = 0.03;
const MIN_BRIGHTNESS: f32 = 0.95;
const BRIGHTNESS_RANGE: f32 = 0.1;

/// One animation frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LipsyncFrame {
    pub scale: f32,
    pub brightness: f32,
}

impl LipsyncFrame {
    /// Neutral face
    pub fn rest() -> Self {
        Self {
            scale: 1.0,
            brightness: 1.0,
        }
    }

    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        Self {
            scale: 1.0 + rng.gen::<f32>() * MAX_SCALE_JITTER,
            brightness: MIN_BRIGHTNESS + rng.gen::<f32>() * BRIGHTNESS_RANGE,
        }
    }
}

/// Emits lipsync frames on the event channel while running
pub struct LipsyncAnimator {
    interval: Duration,
    event_tx: broadcast::Sender<ControllerEvent>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl LipsyncAnimator {
    pub fn new(interval: Duration, event_tx: broadcast::Sender<ControllerEvent>) -> Self {
        Self {
            interval,
            event_tx,
            task: Mutex::new(None),
        }
    }

    /// Start animating, restarting if already running
    pub fn start(&self) {
        let event_tx = self.event_tx.clone();
        let period = self.interval;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let _ = event_tx.send(ControllerEvent::LipsyncFrame(LipsyncFrame::random()));
            }
        });

        if let Some(previous) = self.task.lock().replace(handle) {
            previous.abort();
        }
        let _ = self.event_tx.send(ControllerEvent::LipsyncStarted);
    }

    /// Stop animating and reset the face
    pub fn stop(&self) {
        if let Some(handle) = self.task.lock().take() {
            handle.abort();
        }
        let _ = self.event_tx.send(ControllerEvent::LipsyncFrame(LipsyncFrame::rest()));
        let _ = self.event_tx.send(ControllerEvent::LipsyncStopped);
    }

    pub fn is_running(&self) -> bool {
        self.task.lock().is_some()
    }
}

impl Drop for LipsyncAnimator {
    fn drop(&mut self) {
        if let Some(handle) = self.task.get_mut().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_frame_bounds() {
        for _ in 0..1000 {
            let frame = LipsyncFrame::random();
            assert!((1.0..=1.03).contains(&frame.scale));
            assert!((0.95..=1.05).contains(&frame.brightness));
        }
    }

    #[tokio::test]
    async fn test_start_emits_frames_and_stop_resets() {
        let (tx, mut rx) = broadcast::channel(64);
        let animator = LipsyncAnimator::new(Duration::from_millis(5), tx);

        animator.start();
        assert!(animator.is_running());
        tokio::time::sleep(Duration::from_millis(30)).await;
        animator.stop();
        assert!(!animator.is_running());

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }

        assert!(events.contains(&ControllerEvent::LipsyncStarted));
        assert!(events
            .iter()
            .any(|e| matches!(e, ControllerEvent::LipsyncFrame(f) if *f != LipsyncFrame::rest())));
        let tail = &events[events.len() - 2..];
        assert_eq!(
            tail,
            &[ControllerEvent::LipsyncFrame(LipsyncFrame::rest()), ControllerEvent::LipsyncStopped]
        );
    }
}
