//! Translate view glue.
//!
//! Connects the [`StreamingTranslator`] to the [`TranslationContext`]: builds
//! requests from the context, and copies streamed text back into it as
//! updates are applied.

use simple_translate_protocol::Settings;

use crate::context::TranslationContext;
use crate::error::TranslationError;
use crate::error::ValidationError;
use crate::session::PendingTranslation;
use crate::session::SessionUpdate;
use crate::translator::StreamingTranslator;

pub struct TranslationController {
    translator: StreamingTranslator,
    context: TranslationContext,
}

impl TranslationController {
    pub fn new(translator: StreamingTranslator, context: TranslationContext) -> Self {
        Self {
            translator,
            context,
        }
    }

    pub fn translator(&self) -> &StreamingTranslator {
        &self.translator
    }

    pub fn translator_mut(&mut self) -> &mut StreamingTranslator {
        &mut self.translator
    }

    pub fn context(&self) -> &TranslationContext {
        &self.context
    }

    /// Translate the context's source text.
    ///
    /// Whitespace-only text is rejected before anything is cleared or sent.
    pub async fn translate(
        &mut self,
        settings: &Settings,
    ) -> Result<PendingTranslation, TranslationError> {
        let request = self.context.request();
        if !request.has_text() {
            return Err(ValidationError::EmptyText.into());
        }

        self.translator.clear_text();
        self.context.set_translated_text(String::new());
        self.translator.translate(request, settings).await
    }

    /// Swap languages; the streamed text is discarded.
    pub fn swap(&mut self) {
        self.context.swap_languages();
        self.translator.clear_text();
    }

    pub async fn process_next(&mut self) -> Option<SessionUpdate> {
        let update = self.translator.process_next().await?;
        self.sync_translated_text();
        Some(update)
    }

    pub fn drain_events(&mut self) -> Vec<SessionUpdate> {
        let updates = self.translator.drain_events();
        if !updates.is_empty() {
            self.sync_translated_text();
        }
        updates
    }

    /// The streamed buffer while translating, otherwise the committed text.
    pub fn display_text(&self) -> String {
        if self.translator.translating() {
            self.translator.streaming_text().to_string()
        } else {
            self.context.snapshot().translated_text
        }
    }

    fn sync_translated_text(&self) {
        let text = self.translator.streaming_text();
        if !text.is_empty() {
            self.context.set_translated_text(text);
        }
    }
}
