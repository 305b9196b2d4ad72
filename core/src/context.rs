//! Shared translation context.
//!
//! One store per translate view, handed explicitly to whoever needs it.
//! Clones share the same state; observers get a `watch` receiver.

use std::sync::Arc;

use simple_translate_protocol::Settings;
use simple_translate_protocol::TranslationRequest;
use tokio::sync::watch;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TranslationState {
    pub source_text: String,
    pub source_language: String,
    pub target_language: String,
    pub translated_text: String,
}

impl TranslationState {
    /// Empty texts, languages taken from the settings defaults.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            source_text: String::new(),
            source_language: settings.default_source_language.clone(),
            target_language: settings.default_target_language.clone(),
            translated_text: String::new(),
        }
    }

    pub fn request(&self) -> TranslationRequest {
        TranslationRequest::new(
            self.source_text.clone(),
            self.source_language.clone(),
            self.target_language.clone(),
        )
    }
}

#[derive(Debug, Clone)]
pub struct TranslationContext {
    state: Arc<watch::Sender<TranslationState>>,
}

impl TranslationContext {
    pub fn new(initial: TranslationState) -> Self {
        let (state, _) = watch::channel(initial);
        Self {
            state: Arc::new(state),
        }
    }

    /// Seed a new context from the settings' default languages.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(TranslationState::from_settings(settings))
    }

    pub fn snapshot(&self) -> TranslationState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TranslationState> {
        self.state.subscribe()
    }

    /// Request for the current source text and languages.
    pub fn request(&self) -> TranslationRequest {
        self.state.borrow().request()
    }

    pub fn set_source_text(&self, text: impl Into<String>) {
        let text = text.into();
        self.update(|s| replace(&mut s.source_text, text));
    }

    pub fn set_source_language(&self, code: impl Into<String>) {
        let code = code.into();
        self.update(|s| replace(&mut s.source_language, code));
    }

    pub fn set_target_language(&self, code: impl Into<String>) {
        let code = code.into();
        self.update(|s| replace(&mut s.target_language, code));
    }

    pub fn set_translated_text(&self, text: impl Into<String>) {
        let text = text.into();
        self.update(|s| replace(&mut s.translated_text, text));
    }

    /// Exchange the languages, move the translated text into the source field
    /// and clear the translated field.
    pub fn swap_languages(&self) {
        self.state.send_modify(|s| {
            std::mem::swap(&mut s.source_language, &mut s.target_language);
            s.source_text = std::mem::take(&mut s.translated_text);
        });
    }

    fn update(&self, modify: impl FnOnce(&mut TranslationState) -> bool) {
        self.state.send_if_modified(modify);
    }
}

fn replace(field: &mut String, value: String) -> bool {
    if *field == value {
        return false;
    }
    *field = value;
    true
}
