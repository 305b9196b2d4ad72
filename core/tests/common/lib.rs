use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use simple_translate_core::BackendError;
use simple_translate_core::DispatchError;
use simple_translate_core::EventBus;
use simple_translate_core::EventChannel;
use simple_translate_core::EventChannelError;
use simple_translate_core::EventHandler;
use simple_translate_core::EventSource;
use simple_translate_core::ListenerId;
use simple_translate_core::RequestDispatcher;
use simple_translate_core::StreamingTranslator;
use simple_translate_core::TranslationBackend;
use simple_translate_protocol::SessionId;
use simple_translate_protocol::Settings;
use simple_translate_protocol::TranslationRequest;
use simple_translate_protocol::TranslationResponse;
use simple_translate_protocol::wire::EventMessage;
use tokio::sync::Notify;
use tokio::sync::Semaphore;

/// Settings that pass the dispatcher's API key check.
pub fn settings_with_key() -> Settings {
    Settings {
        api_key: "sk-test".to_string(),
        ..Default::default()
    }
}

pub fn response(text: &str) -> TranslationResponse {
    TranslationResponse {
        translated_text: text.to_string(),
        source_language: "en".to_string(),
        target_language: "es".to_string(),
    }
}

/// A job the scripted backend accepted (or rejected).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedJob {
    pub session: SessionId,
    pub request: TranslationRequest,
}

/// In-process backend. Records every job, optionally rejects them, and emits
/// events on demand through its [`EventBus`].
pub struct ScriptedBackend {
    bus: Arc<EventBus>,
    jobs: Mutex<Vec<RecordedJob>>,
    reject_with: Mutex<Option<DispatchError>>,
    hold: AtomicBool,
    settings: Mutex<Result<Settings, BackendError>>,
    saved: Mutex<Vec<Settings>>,
}

impl ScriptedBackend {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self {
            bus,
            jobs: Mutex::new(Vec::new()),
            reject_with: Mutex::new(None),
            hold: AtomicBool::new(false),
            settings: Mutex::new(Ok(Settings::default())),
            saved: Mutex::new(Vec::new()),
        }
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn jobs(&self) -> Vec<RecordedJob> {
        self.jobs.lock().expect("jobs lock").clone()
    }

    /// Reject every following `translate` with `err`.
    pub fn reject_with(&self, err: DispatchError) {
        *self.reject_with.lock().expect("reject lock") = Some(err);
    }

    /// Never answer following `translate` calls.
    pub fn hold_submissions(&self) {
        self.hold.store(true, Ordering::SeqCst);
    }

    /// What `load_settings` and `save_settings` report from now on.
    pub fn set_settings_result(&self, result: Result<Settings, BackendError>) {
        *self.settings.lock().expect("settings lock") = result;
    }

    pub fn saved(&self) -> Vec<Settings> {
        self.saved.lock().expect("saved lock").clone()
    }

    pub fn token(&self, session: Option<SessionId>, token: &str) {
        self.bus.emit_message(EventMessage::token(session, token));
    }

    pub fn complete(&self, session: Option<SessionId>, text: &str) {
        self.bus
            .emit_message(EventMessage::complete(session, &response(text)));
    }

    pub fn error(&self, session: Option<SessionId>, message: &str) {
        self.bus.emit_message(EventMessage::error(session, message));
    }
}

#[async_trait]
impl TranslationBackend for ScriptedBackend {
    async fn translate(
        &self,
        session: SessionId,
        request: &TranslationRequest,
        _settings: &Settings,
    ) -> Result<(), DispatchError> {
        self.jobs.lock().expect("jobs lock").push(RecordedJob {
            session,
            request: request.clone(),
        });
        if self.hold.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        match self.reject_with.lock().expect("reject lock").clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn load_settings(&self) -> Result<Settings, BackendError> {
        self.settings.lock().expect("settings lock").clone()
    }

    async fn save_settings(&self, settings: &Settings) -> Result<(), BackendError> {
        let current = self.settings.lock().expect("settings lock").clone();
        current.map(|_| {
            self.saved
                .lock()
                .expect("saved lock")
                .push(settings.clone());
        })
    }
}

/// Event source whose registrations block until released, so a test can
/// tear the owning scope down while a subscription is mid-setup.
pub struct GatedEventSource {
    inner: Arc<EventBus>,
    gate: Semaphore,
    entered: Notify,
}

impl GatedEventSource {
    pub fn new(inner: Arc<EventBus>) -> Self {
        Self {
            inner,
            gate: Semaphore::new(0),
            entered: Notify::new(),
        }
    }

    /// Wait until a `listen` call is blocked on the gate.
    pub async fn wait_for_listen(&self) {
        self.entered.notified().await;
    }

    /// Let `n` pending or future `listen` calls through.
    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }
}

#[async_trait]
impl EventSource for GatedEventSource {
    async fn listen(
        &self,
        event: &str,
        handler: EventHandler,
    ) -> Result<ListenerId, EventChannelError> {
        self.entered.notify_one();
        self.gate
            .acquire()
            .await
            .map_err(|err| EventChannelError::Source(err.to_string()))?
            .forget();
        self.inner.listen(event, handler).await
    }

    fn unlisten(&self, id: ListenerId) {
        self.inner.unlisten(id);
    }
}

/// A translator subscribed to a scripted backend.
pub struct Harness {
    pub bus: Arc<EventBus>,
    pub backend: Arc<ScriptedBackend>,
    pub channel: EventChannel,
    pub translator: StreamingTranslator,
}

pub async fn harness() -> Harness {
    let bus = Arc::new(EventBus::new());
    let backend = Arc::new(ScriptedBackend::new(Arc::clone(&bus)));
    let translator = StreamingTranslator::new(RequestDispatcher::new(backend.clone()));
    let mut channel = EventChannel::new(bus.clone(), translator.event_sender());
    channel.subscribe().await.expect("subscribe");
    Harness {
        bus,
        backend,
        channel,
        translator,
    }
}
