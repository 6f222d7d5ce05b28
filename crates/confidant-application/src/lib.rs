//! Application layer for Confidant.
//!
//! Use cases that coordinate the in-memory session store, the file-backed
//! repositories, and the generation collaborators.

pub mod conversation_service;
pub mod portrait_service;
pub mod prompt_injector;
pub mod session_usecase;

#[cfg(test)]
pub(crate) mod testing;

pub use conversation_service::ConversationService;
pub use portrait_service::PortraitService;
pub use prompt_injector::PromptInjector;
pub use session_usecase::{SessionUseCase, TurnOutcome};
