//! Option resolution for LLM agents and vector-store clients.
//!
//! The crate provides:
//! - Per-kind agent defaults layered with [`agents::CreationOption`]s, plus
//!   the MRKL and conversational agents and the [`agents::Executor`] that
//!   consumes the resolved options.
//! - Chroma and Azure AI Search store options with environment fallback and
//!   validation, and small REST helpers for both services.
//! - A TOML [`settings`] layer and a `tracing` subscriber helper.

pub mod agents;
pub mod callbacks;
pub mod env;
mod error;
pub mod llm;
pub mod memory;
mod message;
pub mod prompts;
pub mod settings;
pub mod telemetry;
pub mod tool;
pub mod vectorstores;

pub use callbacks::{CallbackHandler, LogHandler};
pub use env::{Environment, MapEnv, ProcessEnv};
pub use error::{ChainError, Result};
pub use llm::{LanguageModel, StubModel};
pub use memory::{ConversationBuffer, Memory, SimpleMemory};
pub use message::{Message, Role};
pub use prompts::{ChatPromptTemplate, PromptTemplate, PromptValues};
pub use settings::Settings;
pub use tool::Tool;
pub use vectorstores::{Embedder, HashingEmbedder};
