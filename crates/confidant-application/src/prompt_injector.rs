//! Merges a stored portrait into a session's leading instruction.

use confidant_core::portrait::PortraitRepository;
use confidant_core::session::{LeadingInstruction, SessionStore};
use confidant_core::{ConfidantError, Result};
use std::sync::Arc;

pub struct PromptInjector {
    store: Arc<SessionStore>,
    portraits: Arc<dyn PortraitRepository>,
}

impl PromptInjector {
    pub fn new(store: Arc<SessionStore>, portraits: Arc<dyn PortraitRepository>) -> Self {
        Self { store, portraits }
    }

    /// Replaces any previously injected portrait in `user_id`'s leading
    /// instruction with the content of `portrait_file`.
    ///
    /// Mutates the live history only; no file is written. Injecting twice
    /// leaves exactly one portrait block.
    pub async fn inject(&self, user_id: &str, portrait_file: &str) -> Result<()> {
        if user_id.is_empty() {
            return Err(ConfidantError::invalid_argument("no user specified"));
        }
        if portrait_file.is_empty() {
            return Err(ConfidantError::invalid_argument("no portrait file selected"));
        }

        let portrait = self.portraits.load(user_id, portrait_file).await?;
        let history = self.store.get_or_create(user_id).await;

        history
            .update_leading_instruction(|current| {
                LeadingInstruction::parse(current)
                    .with_portrait(&portrait)
                    .render()
            })
            .await;

        tracing::info!(user_id, file = portrait_file, "Portrait injected");
        Ok(())
    }
}
