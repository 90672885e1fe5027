//! Vector-store clients and the option resolvers that configure them.

pub mod azureaisearch;
pub mod chroma;
mod embedder;
mod http;

pub use embedder::{Embedder, HashingEmbedder};
