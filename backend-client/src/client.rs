//! Stdio backend client.
//!
//! Commands are written to the backend as JSON lines. A reader task parses
//! every line the backend writes back: replies complete the call with the
//! same id, events are emitted on the client's [`EventBus`].

use std::collections::HashMap;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use serde_json::Value;
use simple_translate_core::BackendError;
use simple_translate_core::ClientConfig;
use simple_translate_core::DispatchError;
use simple_translate_core::EventBus;
use simple_translate_core::TranslationBackend;
use simple_translate_protocol::SessionId;
use simple_translate_protocol::Settings;
use simple_translate_protocol::TranslationRequest;
use simple_translate_protocol::wire::BackendCommand;
use simple_translate_protocol::wire::BackendMessage;
use simple_translate_protocol::wire::CommandEnvelope;
use simple_translate_protocol::wire::EventMessage;
use tokio::io::AsyncBufReadExt;
use tokio::io::AsyncRead;
use tokio::io::AsyncWrite;
use tokio::io::AsyncWriteExt;
use tokio::io::BufReader;
use tokio::process::Child;
use tokio::process::Command;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::error::ClientError;

type ReplySender = oneshot::Sender<Result<Value, ClientError>>;

#[derive(Default)]
struct PendingCalls {
    closed: bool,
    waiting: HashMap<u64, ReplySender>,
}

type SharedPending = Arc<Mutex<PendingCalls>>;

fn lock(pending: &SharedPending) -> std::sync::MutexGuard<'_, PendingCalls> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Client side of the JSON-lines backend protocol.
pub struct StdioBackend {
    writer: tokio::sync::Mutex<Box<dyn AsyncWrite + Send + Unpin>>,
    pending: SharedPending,
    next_id: AtomicU64,
    events: Arc<EventBus>,
    reader: JoinHandle<()>,
    _child: Option<Child>,
}

impl StdioBackend {
    /// Spawn `command` and talk to it over its stdin/stdout.
    ///
    /// Must be called within a tokio runtime. The child is killed when the
    /// client is dropped.
    pub fn spawn(command: &str, args: &[String]) -> Result<Self, ClientError> {
        tracing::info!(command, ?args, "spawning translation backend");

        let spawn_error = |message: String| ClientError::Spawn {
            command: command.to_string(),
            message,
        };

        let mut child = Command::new(command)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| spawn_error(e.to_string()))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| spawn_error("stdin is unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| spawn_error("stdout is unavailable".to_string()))?;

        Ok(Self::connect(stdout, stdin, Some(child)))
    }

    /// Spawn the backend named in `config`.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        Self::spawn(&config.backend_command, &config.backend_args)
    }

    /// Speak the protocol over an arbitrary pair of streams.
    pub fn from_streams<R, W>(reader: R, writer: W) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self::connect(reader, writer, None)
    }

    fn connect<R, W>(reader: R, writer: W, child: Option<Child>) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let pending: SharedPending = Arc::default();
        let events = Arc::new(EventBus::new());
        let reader = tokio::spawn(read_loop(reader, Arc::clone(&pending), Arc::clone(&events)));

        Self {
            writer: tokio::sync::Mutex::new(Box::new(writer)),
            pending,
            next_id: AtomicU64::new(0),
            events,
            reader,
            _child: child,
        }
    }

    /// Bus the backend's events are emitted on.
    pub fn events(&self) -> Arc<EventBus> {
        Arc::clone(&self.events)
    }

    /// Send `command` and wait for its reply.
    pub async fn call(&self, command: BackendCommand) -> Result<Value, ClientError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        {
            let mut pending = lock(&self.pending);
            if pending.closed {
                return Err(ClientError::Closed);
            }
            pending.waiting.insert(id, tx);
        }

        let envelope = CommandEnvelope { id, command };
        if let Err(err) = self.write_line(&envelope).await {
            lock(&self.pending).waiting.remove(&id);
            return Err(err);
        }

        rx.await.unwrap_or(Err(ClientError::Closed))
    }

    async fn write_line(&self, envelope: &CommandEnvelope) -> Result<(), ClientError> {
        let mut line =
            serde_json::to_string(envelope).map_err(|e| ClientError::Parse(e.to_string()))?;
        line.push('\n');

        let mut writer = self.writer.lock().await;
        writer
            .write_all(line.as_bytes())
            .await
            .map_err(|e| ClientError::Io(e.to_string()))?;
        writer
            .flush()
            .await
            .map_err(|e| ClientError::Io(e.to_string()))
    }
}

impl Drop for StdioBackend {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

async fn read_loop<R>(reader: R, pending: SharedPending, events: Arc<EventBus>)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => match std::str::from_utf8(&buf) {
                Ok(line) => handle_line(line.trim(), &pending, &events),
                Err(e) => tracing::warn!("Ignoring non-UTF-8 backend line: {e}"),
            },
            Err(e) => {
                tracing::error!("Error reading from backend stdout: {e}");
                break;
            }
        }
    }

    // Fail every outstanding call; later calls see `closed`.
    let waiting = {
        let mut pending = lock(&pending);
        pending.closed = true;
        std::mem::take(&mut pending.waiting)
    };
    for (_, tx) in waiting {
        let _ = tx.send(Err(ClientError::Closed));
    }
    // A job in flight will never hear from the backend again.
    events.emit_message(EventMessage::error(None, ClientError::Closed.to_string()));
    tracing::info!("backend stdout reader terminated");
}

fn handle_line(line: &str, pending: &SharedPending, events: &EventBus) {
    if line.is_empty() {
        return;
    }
    match serde_json::from_str::<BackendMessage>(line) {
        Ok(BackendMessage::Event(message)) => {
            tracing::trace!(event = %message.event, session = ?message.session, "backend event");
            events.emit_message(message);
        }
        Ok(BackendMessage::Reply(reply)) => {
            let id = reply.id;
            let Some(tx) = lock(pending).waiting.remove(&id) else {
                tracing::warn!(id, "reply for unknown request");
                return;
            };
            let _ = tx.send(reply.into_result().map_err(ClientError::Rejected));
        }
        Err(e) => {
            tracing::warn!("Ignoring malformed backend line: {e}");
        }
    }
}

#[async_trait]
impl TranslationBackend for StdioBackend {
    async fn translate(
        &self,
        session: SessionId,
        request: &TranslationRequest,
        settings: &Settings,
    ) -> Result<(), DispatchError> {
        self.call(BackendCommand::Translate {
            session: Some(session),
            request: request.clone(),
            settings: settings.clone(),
        })
        .await?;
        Ok(())
    }

    async fn load_settings(&self) -> Result<Settings, BackendError> {
        let value = self.call(BackendCommand::LoadSettings).await?;
        serde_json::from_value(value).map_err(|e| BackendError::Parse(e.to_string()))
    }

    async fn save_settings(&self, settings: &Settings) -> Result<(), BackendError> {
        self.call(BackendCommand::SaveSettings {
            settings: settings.clone(),
        })
        .await?;
        Ok(())
    }
}
