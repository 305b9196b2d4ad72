//! Request submission.

use std::sync::Arc;

use async_trait::async_trait;
use simple_translate_protocol::SessionId;
use simple_translate_protocol::Settings;
use simple_translate_protocol::TranslationRequest;

use crate::error::BackendError;
use crate::error::DispatchError;

/// The out-of-process backend, seen from the client.
///
/// `translate` returns once the job is accepted. The job's tokens and its
/// single terminal event arrive later through an [`crate::EventSource`].
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    async fn translate(
        &self,
        session: SessionId,
        request: &TranslationRequest,
        settings: &Settings,
    ) -> Result<(), DispatchError>;

    async fn load_settings(&self) -> Result<Settings, BackendError>;

    async fn save_settings(&self, settings: &Settings) -> Result<(), BackendError>;
}

/// Submits translation jobs to a [`TranslationBackend`].
#[derive(Clone)]
pub struct RequestDispatcher {
    backend: Arc<dyn TranslationBackend>,
}

impl RequestDispatcher {
    pub fn new(backend: Arc<dyn TranslationBackend>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &Arc<dyn TranslationBackend> {
        &self.backend
    }

    /// Hand a job to the backend. `Ok` only means the job was accepted.
    ///
    /// The request text must already be validated by the caller.
    pub async fn submit(
        &self,
        session: SessionId,
        request: &TranslationRequest,
        settings: &Settings,
    ) -> Result<(), DispatchError> {
        if !settings.is_valid() {
            tracing::debug!(%session, provider = %settings.effective_provider(), "missing api key");
            return Err(DispatchError::MissingApiKey);
        }

        tracing::debug!(
            %session,
            source = %request.source_language,
            target = %request.target_language,
            model = settings.effective_model(),
            "submitting translation"
        );
        self.backend.translate(session, request, settings).await
    }
}
