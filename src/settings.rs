//! File-backed defaults for agents and vector stores.
//!
//! Each table turns into an ordered option list. Callers put their own
//! options after it, so explicit options win over the file and the file wins
//! over environment fallbacks.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::agents::{self, CreationOption, OpenAIOption};
use crate::error::{ChainError, Result};
use crate::prompts::PromptTemplate;
use crate::vectorstores::azureaisearch::{self, AzureOption};
use crate::vectorstores::chroma::{self, ChromaOption, DistanceFunction};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub agent: AgentSettings,
    #[serde(default)]
    pub chroma: ChromaSettings,
    #[serde(default)]
    pub azure: AzureSettings,
}

impl Settings {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        let settings = Self::from_toml(&raw)?;
        debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw)
            .map_err(|err| ChainError::Config(format!("failed to parse settings: {err}")))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AgentSettings {
    #[serde(default)]
    pub max_iterations: Option<usize>,
    #[serde(default)]
    pub output_key: Option<String>,
    #[serde(default)]
    pub prompt_prefix: Option<String>,
    #[serde(default)]
    pub format_instructions: Option<String>,
    #[serde(default)]
    pub prompt_suffix: Option<String>,
    /// Full prompt template; replaces the prefix/suffix sections when set.
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub return_intermediate_steps: bool,
    #[serde(default)]
    pub system_message: Option<String>,
}

impl AgentSettings {
    pub fn options(&self) -> Vec<CreationOption> {
        let mut options = Vec::new();
        if let Some(iterations) = self.max_iterations {
            options.push(agents::with_max_iterations(iterations));
        }
        if let Some(key) = &self.output_key {
            options.push(agents::with_output_key(key.clone()));
        }
        if let Some(prefix) = &self.prompt_prefix {
            options.push(agents::with_prompt_prefix(prefix.clone()));
        }
        if let Some(instructions) = &self.format_instructions {
            options.push(agents::with_prompt_format_instructions(instructions.clone()));
        }
        if let Some(suffix) = &self.prompt_suffix {
            options.push(agents::with_prompt_suffix(suffix.clone()));
        }
        if let Some(template) = &self.prompt {
            options.push(agents::with_prompt(PromptTemplate::from_template(
                template.clone(),
            )));
        }
        if self.return_intermediate_steps {
            options.push(agents::with_return_intermediate_steps());
        }
        if let Some(message) = &self.system_message {
            options.push(OpenAIOption::new().with_system_message(message.clone()));
        }
        options
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChromaSettings {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub distance_function: Option<DistanceFunction>,
    #[serde(default)]
    pub openai_api_key: Option<String>,
}

impl ChromaSettings {
    pub fn options(&self) -> Vec<ChromaOption> {
        let mut options = Vec::new();
        if let Some(url) = &self.url {
            options.push(chroma::with_chroma_url(url.clone()));
        }
        if let Some(namespace) = &self.namespace {
            options.push(chroma::with_namespace(namespace.clone()));
        }
        if let Some(distance) = self.distance_function {
            options.push(chroma::with_distance_function(distance));
        }
        if let Some(key) = &self.openai_api_key {
            options.push(chroma::with_openai_api_key(key.clone()));
        }
        options
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AzureSettings {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl AzureSettings {
    pub fn options(&self) -> Vec<AzureOption> {
        let mut options = Vec::new();
        if let Some(endpoint) = &self.endpoint {
            options.push(azureaisearch::with_endpoint(endpoint.clone()));
        }
        if let Some(key) = &self.api_key {
            options.push(azureaisearch::with_api_key(key.clone()));
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{AgentKind, CreationOptions};
    use crate::env::MapEnv;
    use crate::vectorstores::azureaisearch::{AzureConfig, API_KEY_ENV_VAR, ENDPOINT_ENV_VAR};
    use crate::vectorstores::chroma::{ChromaConfig, CHROMA_URL_ENV_VAR, OPENAI_API_KEY_ENV_VAR};
    use crate::vectorstores::HashingEmbedder;
    use std::sync::Arc;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn loads_tables_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[agent]\nmax_iterations = 8\noutput_key = 'answer'\n[chroma]\nurl = 'http://chroma:8000'\ndistance_function = 'cosine'\n[azure]\nendpoint = 'https://search.example.net'"
        )
        .unwrap();

        let settings = Settings::from_file(file.path()).unwrap();
        assert_eq!(settings.agent.max_iterations, Some(8));
        assert_eq!(settings.chroma.distance_function, Some(DistanceFunction::Cosine));
        assert_eq!(
            settings.azure.endpoint.as_deref(),
            Some("https://search.example.net")
        );
    }

    #[test]
    fn empty_file_yields_defaults() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings, Settings::default());
        assert!(settings.agent.options().is_empty());
        assert!(settings.chroma.options().is_empty());
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let err = Settings::from_toml("[agent]\nmax_iterations = 'many'").unwrap_err();
        assert!(matches!(err, ChainError::Config(_)));
    }

    #[test]
    fn explicit_options_override_file_layer() {
        let settings = Settings::from_toml("[agent]\nmax_iterations = 8\noutput_key = 'answer'").unwrap();
        let mut options = settings.agent.options();
        options.push(agents::with_max_iterations(2));

        let resolved = CreationOptions::resolve(AgentKind::Mrkl, options);
        assert_eq!(resolved.max_iterations(), 2);
        assert_eq!(resolved.output_key(), "answer");
    }

    #[test]
    fn file_layer_sits_above_environment_fallback() {
        let settings = Settings::from_toml("[chroma]\nurl = 'http://from-file:8000'").unwrap();
        let env = MapEnv::new()
            .with_var(CHROMA_URL_ENV_VAR, "http://from-env:8000")
            .with_var(OPENAI_API_KEY_ENV_VAR, "sk-env");

        let config = ChromaConfig::resolve(settings.chroma.options(), &env).unwrap();
        assert_eq!(config.url(), "http://from-file:8000");
    }

    #[test]
    fn azure_table_becomes_options_that_explicit_ones_override() {
        let settings = Settings::from_toml(
            "[azure]\nendpoint = 'https://file.example.net/'\napi_key = 'file-key'",
        )
        .unwrap();
        let env = MapEnv::new()
            .with_var(ENDPOINT_ENV_VAR, "https://env.example.net")
            .with_var(API_KEY_ENV_VAR, "env-key");
        let embedder = azureaisearch::with_embedder(Arc::new(HashingEmbedder::default()));

        let mut options = settings.azure.options();
        assert_eq!(options.len(), 2);
        options.push(embedder.clone());
        let from_file = AzureConfig::resolve(options.clone(), &env).unwrap();
        assert_eq!(from_file.endpoint(), "https://file.example.net");
        assert_eq!(from_file.api_key(), "file-key");

        options.push(azureaisearch::with_endpoint("https://explicit.example.net/"));
        options.push(azureaisearch::with_api_key("explicit-key"));
        let explicit = AzureConfig::resolve(options, &env).unwrap();
        assert_eq!(explicit.endpoint(), "https://explicit.example.net");
        assert_eq!(explicit.api_key(), "explicit-key");
    }

    #[test]
    fn empty_azure_table_yields_no_options() {
        assert!(AzureSettings::default().options().is_empty());
    }
}
