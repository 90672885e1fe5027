//! Language model abstraction consumed by the agents.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{ChainError, Result};

/// Text-completion model. `stop` lists sequences at which generation should end.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn call(&self, prompt: &str, stop: &[String]) -> Result<String>;
}

/// A deterministic model used for tests and demos. Replies are returned in
/// the order given and every prompt is recorded.
#[derive(Debug, Default)]
pub struct StubModel {
    responses: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl StubModel {
    pub fn new(responses: Vec<String>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|prompts| prompts.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LanguageModel for StubModel {
    async fn call(&self, prompt: &str, _stop: &[String]) -> Result<String> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        let mut locked = self
            .responses
            .lock()
            .map_err(|_| ChainError::LanguageModel("StubModel poisoned".into()))?;
        locked.pop_front().ok_or_else(|| {
            ChainError::LanguageModel("StubModel ran out of scripted responses".into())
        })
    }
}
