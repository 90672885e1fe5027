use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::env::Environment;
use crate::error::{ChainError, Result};
use crate::vectorstores::Embedder;

pub const ENDPOINT_ENV_VAR: &str = "AZURE_AI_SEARCH_ENDPOINT";
pub const API_KEY_ENV_VAR: &str = "AZURE_AI_SEARCH_API_KEY";

/// Resolved Azure AI Search client settings.
#[derive(Clone)]
pub struct AzureConfig {
    endpoint: String,
    api_key: String,
    embedder: Option<Arc<dyn Embedder>>,
    http: Option<reqwest::Client>,
}

impl fmt::Debug for AzureConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &(!self.api_key.is_empty()))
            .field("embedder", &self.embedder.is_some())
            .finish()
    }
}

impl AzureConfig {
    /// Defaults before options: the API key from the environment.
    fn baseline(env: &dyn Environment) -> Self {
        Self {
            endpoint: String::new(),
            api_key: env.get(API_KEY_ENV_VAR).unwrap_or_default(),
            embedder: None,
            http: None,
        }
    }

    /// Applies `options` over the baseline, then fills the endpoint from
    /// `AZURE_AI_SEARCH_ENDPOINT` if no option set it. Fails when the endpoint
    /// is still missing or no embedder was given.
    pub fn resolve<I>(options: I, env: &dyn Environment) -> Result<Self>
    where
        I: IntoIterator<Item = AzureOption>,
    {
        let mut config = Self::baseline(env);
        for option in options {
            option.apply(&mut config);
        }

        if config.endpoint.is_empty() {
            config.endpoint = env.get(ENDPOINT_ENV_VAR).unwrap_or_default();
        }
        config.endpoint = config.endpoint.trim_end_matches('/').to_string();
        if config.endpoint.is_empty() {
            warn!("azure ai search options rejected: no endpoint");
            return Err(ChainError::InvalidOptions(format!(
                "missing azure ai search endpoint. Pass it as an option or set the {ENDPOINT_ENV_VAR} environment variable"
            )));
        }

        if config.embedder.is_none() {
            warn!("azure ai search options rejected: no embedder");
            return Err(ChainError::InvalidOptions("missing embedder".into()));
        }

        debug!(
            endpoint = %config.endpoint,
            api_key = !config.api_key.is_empty(),
            "resolved azure ai search options"
        );
        Ok(config)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn embedder(&self) -> Option<&Arc<dyn Embedder>> {
        self.embedder.as_ref()
    }

    /// The injected client, or a default one.
    pub fn http_client(&self) -> reqwest::Client {
        self.http.clone().unwrap_or_default()
    }
}

/// One deferred change to [`AzureConfig`].
#[derive(Clone)]
pub enum AzureOption {
    Endpoint(String),
    ApiKey(String),
    Embedder(Arc<dyn Embedder>),
    HttpClient(reqwest::Client),
}

impl fmt::Debug for AzureOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Endpoint(endpoint) => f.debug_tuple("Endpoint").field(endpoint).finish(),
            Self::ApiKey(_) => f.write_str("ApiKey(..)"),
            Self::Embedder(_) => f.write_str("Embedder(..)"),
            Self::HttpClient(_) => f.write_str("HttpClient(..)"),
        }
    }
}

impl AzureOption {
    pub(crate) fn apply(self, config: &mut AzureConfig) {
        match self {
            Self::Endpoint(endpoint) => config.endpoint = endpoint,
            Self::ApiKey(key) => config.api_key = key,
            Self::Embedder(embedder) => config.embedder = Some(embedder),
            Self::HttpClient(client) => config.http = Some(client),
        }
    }
}

/// Search service URL. Falls back to `AZURE_AI_SEARCH_ENDPOINT`.
pub fn with_endpoint(endpoint: impl Into<String>) -> AzureOption {
    AzureOption::Endpoint(endpoint.into())
}

/// Admin or query key sent as `api-key`. Overrides `AZURE_AI_SEARCH_API_KEY`.
pub fn with_api_key(key: impl Into<String>) -> AzureOption {
    AzureOption::ApiKey(key.into())
}

pub fn with_embedder(embedder: Arc<dyn Embedder>) -> AzureOption {
    AzureOption::Embedder(embedder)
}

/// Client used for every request, e.g. one built with a timeout.
pub fn with_http_client(client: reqwest::Client) -> AzureOption {
    AzureOption::HttpClient(client)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MapEnv;
    use crate::vectorstores::HashingEmbedder;

    fn embedder() -> AzureOption {
        with_embedder(Arc::new(HashingEmbedder::default()))
    }

    #[test]
    fn endpoint_comes_from_environment_without_trailing_slash() {
        let env = MapEnv::new().with_var(ENDPOINT_ENV_VAR, "https://search.example.net/");
        let config = AzureConfig::resolve([embedder()], &env).unwrap();
        assert_eq!(config.endpoint(), "https://search.example.net");
        assert_eq!(config.api_key(), "");
    }

    #[test]
    fn explicit_endpoint_is_trimmed() {
        let config = AzureConfig::resolve(
            [with_endpoint("https://search.example.net//"), embedder()],
            &MapEnv::new(),
        )
        .unwrap();
        assert_eq!(config.endpoint(), "https://search.example.net");
    }

    #[test]
    fn slash_only_endpoint_is_rejected() {
        let err = AzureConfig::resolve([with_endpoint("/"), embedder()], &MapEnv::new()).unwrap_err();
        assert!(err.is_invalid_options());
    }

    #[test]
    fn missing_endpoint_is_rejected() {
        let err = AzureConfig::resolve([embedder()], &MapEnv::new()).unwrap_err();
        assert!(err.is_invalid_options());
        assert!(err.to_string().contains(ENDPOINT_ENV_VAR));
    }

    #[test]
    fn missing_embedder_is_rejected() {
        let err = AzureConfig::resolve([with_endpoint("https://s")], &MapEnv::new()).unwrap_err();
        assert!(err.is_invalid_options());
        assert!(err.to_string().contains("missing embedder"));
    }

    #[test]
    fn api_key_option_overrides_environment() {
        let env = MapEnv::new().with_var(API_KEY_ENV_VAR, "env-key");
        let from_env = AzureConfig::resolve([with_endpoint("https://s"), embedder()], &env).unwrap();
        assert_eq!(from_env.api_key(), "env-key");

        let explicit = AzureConfig::resolve(
            [with_endpoint("https://s"), embedder(), with_api_key("opt-key")],
            &env,
        )
        .unwrap();
        assert_eq!(explicit.api_key(), "opt-key");
    }
}
