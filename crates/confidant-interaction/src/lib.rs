//! Generation agents implementing the core collaborator traits.

pub mod openai_api_agent;
pub mod sse;

pub use openai_api_agent::OpenAIApiAgent;
