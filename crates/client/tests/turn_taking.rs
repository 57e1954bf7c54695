//! Integration tests for the turn-taking controller
//!
//! The server, recognizer and audio devices are test doubles so each scenario
//! runs deterministically.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{broadcast, Notify};
use tokio::time::timeout;

use voice_avatar_client::{
    AudioPlayer, ClientConfig, ClientError, ControllerEvent, ControllerState, DialogueApi,
    KeyValueStore, LocalSynthesizer, MemoryStore, RecognitionOutcome, SpeechRecognizer,
    TurnTakingController, VoiceReply,
};
use voice_avatar_core::{FallbackDirective, Turn};

const WAIT: Duration = Duration::from_secs(2);

/// Server double: echoes a fixed reply and answers voice with a directive
struct FakeServer {
    reply: Result<Option<String>, ClientError>,
    asked: Mutex<Vec<String>>,
    resets: Mutex<usize>,
    /// When set, `ask` holds the reply until `release` is called
    gated: bool,
    gate: Notify,
}

impl FakeServer {
    fn with_reply(reply: Result<Option<String>, ClientError>, gated: bool) -> Arc<Self> {
        Arc::new(Self {
            reply,
            asked: Mutex::new(Vec::new()),
            resets: Mutex::new(0),
            gated,
            gate: Notify::new(),
        })
    }

    fn replying(reply: &str) -> Arc<Self> {
        Self::with_reply(Ok(Some(reply.to_string())), false)
    }

    fn slow(reply: &str) -> Arc<Self> {
        Self::with_reply(Ok(Some(reply.to_string())), true)
    }

    fn failing() -> Arc<Self> {
        Self::with_reply(
            Err(ClientError::Server {
                status: 500,
                message: "Falha ao gerar resposta (Gemini)".to_string(),
            }),
            false,
        )
    }

    fn release(&self) {
        self.gate.notify_one();
    }
}

#[async_trait]
impl DialogueApi for FakeServer {
    async fn ask(&self, message: &str) -> Result<Option<String>, ClientError> {
        self.asked.lock().push(message.to_string());
        if self.gated {
            self.gate.notified().await;
        }
        self.reply.clone()
    }

    async fn synthesize(&self, text: &str) -> Result<VoiceReply, ClientError> {
        Ok(VoiceReply::Fallback(FallbackDirective::local(text)))
    }

    async fn reset(&self) -> Result<(), ClientError> {
        *self.resets.lock() += 1;
        Ok(())
    }
}

/// Recognizer double: pops scripted outcomes, then blocks until stopped
struct ScriptedRecognizer {
    script: Mutex<VecDeque<RecognitionOutcome>>,
    stopped: Notify,
    sessions: Mutex<usize>,
    supported: bool,
    /// Once the script runs out, end every session at once instead of blocking
    always_ends: bool,
}

impl ScriptedRecognizer {
    fn build(outcomes: Vec<RecognitionOutcome>, supported: bool, always_ends: bool) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(outcomes.into()),
            stopped: Notify::new(),
            sessions: Mutex::new(0),
            supported,
            always_ends,
        })
    }

    fn new(outcomes: Vec<RecognitionOutcome>) -> Arc<Self> {
        Self::build(outcomes, true, false)
    }

    fn unsupported() -> Arc<Self> {
        Self::build(Vec::new(), false, false)
    }

    fn always_ending() -> Arc<Self> {
        Self::build(Vec::new(), true, true)
    }
}

#[async_trait]
impl SpeechRecognizer for ScriptedRecognizer {
    async fn recognize(&self, language: &str) -> RecognitionOutcome {
        assert_eq!(language, "pt-BR");
        *self.sessions.lock() += 1;
        let next = self.script.lock().pop_front();
        match next {
            Some(outcome) => outcome,
            None if self.always_ends => RecognitionOutcome::Ended,
            None => {
                self.stopped.notified().await;
                RecognitionOutcome::Ended
            },
        }
    }

    fn stop(&self) {
        self.stopped.notify_one();
    }

    fn is_supported(&self) -> bool {
        self.supported
    }
}

/// Records every utterance spoken locally
#[derive(Default)]
struct Speaker {
    spoken: Mutex<Vec<String>>,
}

#[async_trait]
impl LocalSynthesizer for Speaker {
    async fn speak(&self, text: &str, _language: &str) -> Result<(), ClientError> {
        self.spoken.lock().push(text.to_string());
        Ok(())
    }
}

#[async_trait]
impl AudioPlayer for Speaker {
    async fn play(&self, _audio: &[u8], _mime: &str) -> Result<(), ClientError> {
        self.spoken.lock().push("<audio>".to_string());
        Ok(())
    }
}

struct Harness {
    controller: TurnTakingController,
    server: Arc<FakeServer>,
    recognizer: Arc<ScriptedRecognizer>,
    speaker: Arc<Speaker>,
    store: Arc<MemoryStore>,
    events: broadcast::Receiver<ControllerEvent>,
}

fn fast_config() -> ClientConfig {
    ClientConfig {
        resume_delay_ms: 1,
        no_speech_delay_ms: 1,
        ended_restart_delay_ms: 1,
        lipsync_interval_ms: 5,
        ..ClientConfig::default()
    }
}

fn harness(server: Arc<FakeServer>, recognizer: Arc<ScriptedRecognizer>) -> Harness {
    harness_with(fast_config(), server, recognizer)
}

fn harness_with(
    config: ClientConfig,
    server: Arc<FakeServer>,
    recognizer: Arc<ScriptedRecognizer>,
) -> Harness {
    let speaker = Arc::new(Speaker::default());
    let store = Arc::new(MemoryStore::new());
    let controller = TurnTakingController::new(
        config,
        server.clone(),
        recognizer.clone(),
        speaker.clone(),
        speaker.clone(),
        store.clone(),
    );
    let events = controller.subscribe();
    Harness {
        controller,
        server,
        recognizer,
        speaker,
        store,
        events,
    }
}

/// Receive events until `pred` matches, returning everything seen
async fn wait_for<F>(rx: &mut broadcast::Receiver<ControllerEvent>, pred: F) -> Vec<ControllerEvent>
where
    F: Fn(&ControllerEvent) -> bool,
{
    let mut seen = Vec::new();
    loop {
        match timeout(WAIT, rx.recv()).await {
            Ok(Ok(event)) => {
                let done = pred(&event);
                seen.push(event);
                if done {
                    return seen;
                }
            },
            Ok(Err(broadcast::error::RecvError::Lagged(_))) => continue,
            other => panic!("event not received: {:?}; seen {:?}", other, seen),
        }
    }
}

fn states(events: &[ControllerEvent]) -> Vec<ControllerState> {
    events
        .iter()
        .filter_map(|e| match e {
            ControllerEvent::StateChanged { new, .. } => Some(*new),
            _ => None,
        })
        .collect()
}

fn statuses(events: &[ControllerEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            ControllerEvent::Status(s) => Some(s.clone()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_greeting_then_listen_then_reply() {
    let mut h = harness(
        FakeServer::replying("Filho, estou contigo."),
        ScriptedRecognizer::new(vec![RecognitionOutcome::Utterance("Estou triste".to_string())]),
    );

    h.controller.activate().await.unwrap();
    assert!(h.controller.is_listening());

    let events = wait_for(&mut h.events, |e| {
        matches!(e, ControllerEvent::Status(s) if s == "Jesus está te ouvindo novamente...")
    })
    .await;

    assert_eq!(
        states(&events),
        vec![
            ControllerState::Greeting,
            ControllerState::Listening,
            ControllerState::Processing,
            ControllerState::Speaking,
            ControllerState::Listening,
        ]
    );
    assert_eq!(
        statuses(&events),
        vec![
            "Jesus está se conectando...",
            "Jesus está te ouvindo...",
            "Jesus está refletindo...",
            "Jesus está te ouvindo novamente...",
        ]
    );
    assert!(events.contains(&ControllerEvent::UserMessage("Estou triste".to_string())));
    assert!(events.contains(&ControllerEvent::AssistantMessage("Filho, estou contigo.".to_string())));

    // Greeting is spoken before the first recognition session
    assert_eq!(
        *h.speaker.spoken.lock(),
        vec!["Olá, filho ou filha. Como você está hoje?", "Filho, estou contigo."]
    );
    assert_eq!(*h.server.asked.lock(), vec!["Estou triste"]);
    assert_eq!(
        h.controller.local_context(),
        vec![Turn::user("Estou triste"), Turn::assistant("Filho, estou contigo.")]
    );
    assert!(h.store.load("jesusContext").unwrap().is_some());

    h.controller.deactivate().await.unwrap();
    h.controller.join_session().await;
}

#[tokio::test]
async fn test_no_speech_and_end_restart_listening() {
    let mut h = harness(
        FakeServer::replying("Paz."),
        ScriptedRecognizer::new(vec![
            RecognitionOutcome::NoSpeech,
            RecognitionOutcome::Ended,
            RecognitionOutcome::Utterance("Olá".to_string()),
        ]),
    );

    h.controller.activate().await.unwrap();
    let events = wait_for(&mut h.events, |e| {
        matches!(e, ControllerEvent::AssistantMessage(_))
    })
    .await;

    assert!(statuses(&events).contains(&"Não ouvi nada, fale novamente.".to_string()));
    assert!(*h.recognizer.sessions.lock() >= 3);
    assert_eq!(*h.server.asked.lock(), vec!["Olá"]);

    h.controller.deactivate().await.unwrap();
    h.controller.join_session().await;
}

#[tokio::test]
async fn test_deactivate_says_farewell_and_goes_idle() {
    let mut h = harness(FakeServer::replying("Paz."), ScriptedRecognizer::new(vec![]));

    h.controller.activate().await.unwrap();
    wait_for(&mut h.events, |e| {
        matches!(e, ControllerEvent::StateChanged { new: ControllerState::Listening, .. })
    })
    .await;

    h.controller.toggle_microphone().await.unwrap();
    h.controller.join_session().await;

    assert!(!h.controller.is_listening());
    assert_eq!(h.controller.state().await, ControllerState::Idle);
    assert_eq!(
        h.speaker.spoken.lock().last().map(String::as_str),
        Some("A paz esteja contigo, filho ou filha. Até breve.")
    );
    assert!(h.server.asked.lock().is_empty());
}

#[tokio::test]
async fn test_recognition_error_is_not_retried() {
    let mut h = harness(
        FakeServer::replying("Paz."),
        ScriptedRecognizer::new(vec![RecognitionOutcome::Error("not-allowed".to_string())]),
    );

    h.controller.activate().await.unwrap();
    wait_for(&mut h.events, |e| matches!(e, ControllerEvent::Error(m) if m == "not-allowed")).await;
    h.controller.join_session().await;

    assert_eq!(*h.recognizer.sessions.lock(), 1);
    assert!(h.controller.is_listening());
    assert_eq!(h.controller.state().await, ControllerState::Listening);
}

#[tokio::test]
async fn test_submit_text_one_shot() {
    let mut h = harness(FakeServer::replying("Confie."), ScriptedRecognizer::new(vec![]));

    assert_eq!(h.controller.submit_text("   ").await.unwrap(), None);
    assert!(h.server.asked.lock().is_empty());

    let reply = h.controller.submit_text("  Preciso de paz  ").await.unwrap();
    assert_eq!(reply.as_deref(), Some("Confie."));
    assert_eq!(*h.server.asked.lock(), vec!["Preciso de paz"]);
    assert_eq!(h.controller.state().await, ControllerState::Idle);

    let events = wait_for(&mut h.events, |e| {
        matches!(e, ControllerEvent::StateChanged { new: ControllerState::Idle, .. })
    })
    .await;
    assert_eq!(
        states(&events),
        vec![ControllerState::Processing, ControllerState::Speaking, ControllerState::Idle]
    );
    assert!(events.contains(&ControllerEvent::Typing(true)));
    assert!(events.contains(&ControllerEvent::Typing(false)));
}

#[tokio::test]
async fn test_failed_reply_uses_client_phrase() {
    let h = harness(FakeServer::failing(), ScriptedRecognizer::new(vec![]));

    let reply = h.controller.submit_text("Oi").await.unwrap();
    assert_eq!(reply.as_deref(), Some("Filho, confie no Senhor."));
    assert_eq!(h.controller.local_context().len(), 2);
    assert_eq!(
        h.speaker.spoken.lock().last().map(String::as_str),
        Some("Filho, confie no Senhor.")
    );
}

#[tokio::test]
async fn test_devotional_refused_while_listening() {
    let mut h = harness(FakeServer::replying("Palavra."), ScriptedRecognizer::new(vec![]));

    h.controller.activate().await.unwrap();
    assert!(matches!(h.controller.devotional().await, Err(ClientError::Busy(_))));

    h.controller.deactivate().await.unwrap();
    h.controller.join_session().await;

    let reply = h.controller.devotional().await.unwrap();
    assert_eq!(reply, "Palavra.");
    assert_eq!(
        h.server.asked.lock().last().map(String::as_str),
        Some("Traga uma palavra devocional curta e inspiradora.")
    );

    let events = wait_for(&mut h.events, |e| {
        matches!(e, ControllerEvent::Status(s) if s == "Devocional concluído.")
    })
    .await;
    assert!(statuses(&events).contains(&"Preparando devocional...".to_string()));
}

#[tokio::test]
async fn test_unsupported_recognizer() {
    let mut h = harness(FakeServer::replying("Paz."), ScriptedRecognizer::unsupported());

    let err = h.controller.activate().await.unwrap_err();
    assert!(matches!(err, ClientError::RecognitionUnavailable(_)));
    assert!(!h.controller.is_listening());

    let events = wait_for(&mut h.events, |e| matches!(e, ControllerEvent::Status(_))).await;
    assert_eq!(statuses(&events), vec!["Seu navegador não suporta voz."]);
}

#[tokio::test]
async fn test_reset_conversation_clears_both_copies() {
    let h = harness(FakeServer::replying("Paz."), ScriptedRecognizer::new(vec![]));

    h.controller.submit_text("Oi").await.unwrap();
    assert_eq!(h.controller.local_context().len(), 2);

    h.controller.reset_conversation().await.unwrap();
    assert!(h.controller.local_context().is_empty());
    assert_eq!(*h.server.resets.lock(), 1);
    assert_eq!(h.store.load("jesusContext").unwrap(), None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_recognizer_that_keeps_ending_is_restarted_at_a_bounded_rate() {
    let config = ClientConfig {
        ended_restart_delay_ms: 50,
        ..fast_config()
    };
    let mut h = harness_with(config, FakeServer::replying("Paz."), ScriptedRecognizer::always_ending());

    h.controller.activate().await.unwrap();
    wait_for(&mut h.events, |e| {
        matches!(e, ControllerEvent::StateChanged { new: ControllerState::Listening, .. })
    })
    .await;

    tokio::time::sleep(Duration::from_millis(300)).await;
    let sessions = *h.recognizer.sessions.lock();

    h.controller.deactivate().await.unwrap();
    timeout(WAIT, h.controller.join_session()).await.unwrap();

    // 300ms at one restart per 50ms, with slack for scheduling
    assert!(sessions >= 2, "recognizer was not restarted: {}", sessions);
    assert!(sessions <= 10, "recognizer restarted too often: {}", sessions);
}

#[tokio::test]
async fn test_deactivate_while_processing() {
    let mut h = harness(
        FakeServer::slow("Estou contigo."),
        ScriptedRecognizer::new(vec![RecognitionOutcome::Utterance("Estou triste".to_string())]),
    );

    h.controller.activate().await.unwrap();
    wait_for(&mut h.events, |e| {
        matches!(e, ControllerEvent::StateChanged { new: ControllerState::Processing, .. })
    })
    .await;

    h.controller.deactivate().await.unwrap();
    assert_eq!(h.controller.state().await, ControllerState::Idle);

    h.server.release();
    timeout(WAIT, h.controller.join_session()).await.unwrap();

    assert!(!h.controller.is_listening());
    assert_eq!(h.controller.state().await, ControllerState::Idle);
    // The farewell is queued first; the pending reply follows it
    assert_eq!(
        *h.speaker.spoken.lock(),
        vec![
            "Olá, filho ou filha. Como você está hoje?",
            "A paz esteja contigo, filho ou filha. Até breve.",
            "Estou contigo.",
        ]
    );
    assert_eq!(*h.recognizer.sessions.lock(), 1);
    assert_eq!(
        h.controller.local_context(),
        vec![Turn::user("Estou triste"), Turn::assistant("Estou contigo.")]
    );
}

#[tokio::test]
async fn test_cancelled_devotional_releases_the_flag() {
    let mut h = harness(FakeServer::slow("Palavra."), ScriptedRecognizer::new(vec![]));

    let controller = h.controller.clone();
    let task = tokio::spawn(async move { controller.devotional().await });
    wait_for(&mut h.events, |e| {
        matches!(e, ControllerEvent::Status(s) if s == "Preparando devocional...")
    })
    .await;

    task.abort();
    assert!(task.await.unwrap_err().is_cancelled());

    h.controller.activate().await.unwrap();
    assert!(h.controller.is_listening());

    h.controller.deactivate().await.unwrap();
    timeout(WAIT, h.controller.join_session()).await.unwrap();
}
