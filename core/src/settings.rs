//! Settings view state.

use std::sync::Arc;

use simple_translate_protocol::Settings;

use crate::dispatcher::TranslationBackend;
use crate::error::BackendError;

/// Settings as the settings view sees them: the current value, whether the
/// initial load is still outstanding, and the last failure message.
pub struct SettingsState {
    backend: Arc<dyn TranslationBackend>,
    settings: Settings,
    loading: bool,
    error: Option<String>,
}

impl SettingsState {
    /// Starts with defaults and `loading` set until the first [`Self::load`].
    pub fn new(backend: Arc<dyn TranslationBackend>) -> Self {
        Self {
            backend,
            settings: Settings::default(),
            loading: true,
            error: None,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Fetch settings from the backend. On failure the previous value stays.
    pub async fn load(&mut self) -> Result<&Settings, BackendError> {
        self.loading = true;
        let result = self.backend.load_settings().await;
        self.loading = false;
        match result {
            Ok(settings) => {
                self.settings = settings;
                self.error = None;
                Ok(&self.settings)
            }
            Err(err) => {
                tracing::warn!("failed to load settings: {err}");
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Persist `settings` through the backend and adopt them on success.
    pub async fn save(&mut self, settings: Settings) -> Result<(), BackendError> {
        match self.backend.save_settings(&settings).await {
            Ok(()) => {
                self.settings = settings;
                self.error = None;
                Ok(())
            }
            Err(err) => {
                tracing::warn!("failed to save settings: {err}");
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }
}
