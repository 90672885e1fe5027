//! Azure AI Search client.
//!
//! Only index inspection is exposed. Each call is a single request; failures
//! are returned as they happen.

mod options;

use reqwest::header::CONTENT_TYPE;
use reqwest::RequestBuilder;
use serde_json::{Map, Value};

use crate::env::{Environment, ProcessEnv};
use crate::error::Result;
use crate::vectorstores::http::send_json;

pub use options::{
    with_api_key, with_embedder, with_endpoint, with_http_client, AzureConfig, AzureOption,
    API_KEY_ENV_VAR, ENDPOINT_ENV_VAR,
};

/// REST API version sent with every request.
pub const API_VERSION: &str = "2023-11-01";

const SERVICE: &str = "search documents on azure ai search";

#[derive(Debug, Clone)]
pub struct AzureAISearchStore {
    config: AzureConfig,
    http: reqwest::Client,
}

impl AzureAISearchStore {
    /// Resolves `options` against the process environment.
    pub fn new<I>(options: I) -> Result<Self>
    where
        I: IntoIterator<Item = AzureOption>,
    {
        Self::with_env(options, &ProcessEnv)
    }

    pub fn with_env<I>(options: I, env: &dyn Environment) -> Result<Self>
    where
        I: IntoIterator<Item = AzureOption>,
    {
        Ok(Self::from_config(AzureConfig::resolve(options, env)?))
    }

    pub fn from_config(config: AzureConfig) -> Self {
        let http = config.http_client();
        Self { config, http }
    }

    pub fn config(&self) -> &AzureConfig {
        &self.config
    }

    fn get(&self, url: String) -> RequestBuilder {
        let request = self
            .http
            .get(url)
            .query(&[("api-version", API_VERSION)])
            .header(CONTENT_TYPE, "application/json");
        match self.config.api_key() {
            "" => request,
            key => request.header("api-key", key),
        }
    }

    /// `GET /indexes`: every index definition on the service.
    pub async fn list_indexes(&self) -> Result<Map<String, Value>> {
        let url = format!("{}/indexes", self.config.endpoint());
        send_json(self.get(url), SERVICE).await
    }

    /// `GET /indexes/{name}`: a single index definition.
    pub async fn retrieve_index(&self, name: &str) -> Result<Map<String, Value>> {
        let url = format!(
            "{}/indexes/{}",
            self.config.endpoint(),
            urlencoding::encode(name)
        );
        send_json(self.get(url), SERVICE).await
    }
}
