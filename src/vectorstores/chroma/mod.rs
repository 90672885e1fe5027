//! Chroma vector store client.

mod options;

use serde_json::{Map, Value};

use crate::env::{Environment, ProcessEnv};
use crate::error::Result;
use crate::vectorstores::http::send_json;

pub use options::{
    with_chroma_url, with_distance_function, with_embedder, with_includes, with_namespace,
    with_openai_api_key, ChromaConfig, ChromaOption, DistanceFunction, EmbeddingSource,
    QueryInclude, CHROMA_URL_ENV_VAR, DEFAULT_DISTANCE_FUNCTION, DEFAULT_NAMESPACE,
    DEFAULT_NAMESPACE_KEY, OPENAI_API_KEY_ENV_VAR,
};

#[derive(Debug, Clone)]
pub struct ChromaStore {
    config: ChromaConfig,
    http: reqwest::Client,
}

impl ChromaStore {
    /// Resolves `options` against the process environment.
    pub fn new<I>(options: I) -> Result<Self>
    where
        I: IntoIterator<Item = ChromaOption>,
    {
        Self::with_env(options, &ProcessEnv)
    }

    pub fn with_env<I>(options: I, env: &dyn Environment) -> Result<Self>
    where
        I: IntoIterator<Item = ChromaOption>,
    {
        Ok(Self::from_config(ChromaConfig::resolve(options, env)?))
    }

    pub fn from_config(config: ChromaConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Replaces the default HTTP client.
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn config(&self) -> &ChromaConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/v1/{path}", self.config.url().trim_end_matches('/'))
    }

    pub async fn heartbeat(&self) -> Result<Map<String, Value>> {
        let request = self.http.get(self.endpoint("heartbeat"));
        send_json(request, "chroma heartbeat").await
    }

    pub async fn list_collections(&self) -> Result<Vec<Value>> {
        let request = self.http.get(self.endpoint("collections"));
        send_json(request, "list chroma collections").await
    }
}
