use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::env::Environment;
use crate::error::{ChainError, Result};
use crate::vectorstores::Embedder;

pub const OPENAI_API_KEY_ENV_VAR: &str = "OPENAI_API_KEY";
pub const CHROMA_URL_ENV_VAR: &str = "CHROMA_URL";
pub const DEFAULT_NAMESPACE: &str = "langchain";
pub const DEFAULT_NAMESPACE_KEY: &str = "nameSpace";
pub const DEFAULT_DISTANCE_FUNCTION: DistanceFunction = DistanceFunction::L2;

/// Similarity metric of a Chroma collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceFunction {
    L2,
    Cosine,
    Ip,
}

impl DistanceFunction {
    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceFunction::L2 => "l2",
            DistanceFunction::Cosine => "cosine",
            DistanceFunction::Ip => "ip",
        }
    }
}

impl fmt::Display for DistanceFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields a Chroma query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryInclude {
    Documents,
    Embeddings,
    Metadatas,
    Distances,
}

/// Resolved Chroma client settings.
#[derive(Clone)]
pub struct ChromaConfig {
    url: String,
    openai_api_key: String,
    namespace: String,
    namespace_key: String,
    distance_function: DistanceFunction,
    includes: Vec<QueryInclude>,
    embedder: Option<Arc<dyn Embedder>>,
}

impl fmt::Debug for ChromaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChromaConfig")
            .field("url", &self.url)
            .field("openai_api_key", &(!self.openai_api_key.is_empty()))
            .field("namespace", &self.namespace)
            .field("namespace_key", &self.namespace_key)
            .field("distance_function", &self.distance_function)
            .field("includes", &self.includes)
            .field("embedder", &self.embedder.is_some())
            .finish()
    }
}

/// Where the store gets its vectors from.
#[derive(Clone)]
pub enum EmbeddingSource {
    Embedder(Arc<dyn Embedder>),
    OpenAi { api_key: String },
}

impl fmt::Debug for EmbeddingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmbeddingSource::Embedder(_) => f.write_str("Embedder(..)"),
            EmbeddingSource::OpenAi { .. } => f.write_str("OpenAi { .. }"),
        }
    }
}

impl ChromaConfig {
    /// Defaults before options: namespace, distance function and the OpenAI
    /// key from the environment.
    fn baseline(env: &dyn Environment) -> Self {
        Self {
            url: String::new(),
            openai_api_key: env.get(OPENAI_API_KEY_ENV_VAR).unwrap_or_default(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            namespace_key: DEFAULT_NAMESPACE_KEY.to_string(),
            distance_function: DEFAULT_DISTANCE_FUNCTION,
            includes: Vec::new(),
            embedder: None,
        }
    }

    /// Applies `options` over the baseline, then fills the URL from
    /// `CHROMA_URL` if no option set it. Fails when the URL is still missing
    /// or when neither an embedder nor an OpenAI key is available.
    pub fn resolve<I>(options: I, env: &dyn Environment) -> Result<Self>
    where
        I: IntoIterator<Item = ChromaOption>,
    {
        let mut config = Self::baseline(env);
        for option in options {
            option.apply(&mut config);
        }

        if config.url.is_empty() {
            config.url = env.get(CHROMA_URL_ENV_VAR).unwrap_or_default();
            if config.url.is_empty() {
                warn!("chroma options rejected: no url");
                return Err(ChainError::InvalidOptions(format!(
                    "missing chroma URL. Pass it as an option or set the {CHROMA_URL_ENV_VAR} environment variable"
                )));
            }
        }

        if config.openai_api_key.is_empty() && config.embedder.is_none() {
            warn!("chroma options rejected: no embedder or api key");
            return Err(ChainError::InvalidOptions(
                "missing embedder or openai api key".into(),
            ));
        }

        debug!(
            url = %config.url,
            namespace = %config.namespace,
            distance = %config.distance_function,
            "resolved chroma options"
        );
        Ok(config)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn openai_api_key(&self) -> &str {
        &self.openai_api_key
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn namespace_key(&self) -> &str {
        &self.namespace_key
    }

    pub fn distance_function(&self) -> DistanceFunction {
        self.distance_function
    }

    pub fn includes(&self) -> &[QueryInclude] {
        &self.includes
    }

    pub fn embedder(&self) -> Option<&Arc<dyn Embedder>> {
        self.embedder.as_ref()
    }

    /// The embedder when one was given, otherwise the OpenAI key.
    pub fn embedding_source(&self) -> EmbeddingSource {
        match &self.embedder {
            Some(embedder) => EmbeddingSource::Embedder(embedder.clone()),
            None => EmbeddingSource::OpenAi {
                api_key: self.openai_api_key.clone(),
            },
        }
    }
}

/// One deferred change to [`ChromaConfig`].
#[derive(Clone)]
pub enum ChromaOption {
    NameSpace(String),
    Url(String),
    Embedder(Arc<dyn Embedder>),
    DistanceFunction(DistanceFunction),
    Includes(Vec<QueryInclude>),
    OpenAiApiKey(String),
}

impl fmt::Debug for ChromaOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NameSpace(ns) => f.debug_tuple("NameSpace").field(ns).finish(),
            Self::Url(url) => f.debug_tuple("Url").field(url).finish(),
            Self::Embedder(_) => f.write_str("Embedder(..)"),
            Self::DistanceFunction(d) => f.debug_tuple("DistanceFunction").field(d).finish(),
            Self::Includes(i) => f.debug_tuple("Includes").field(i).finish(),
            Self::OpenAiApiKey(_) => f.write_str("OpenAiApiKey(..)"),
        }
    }
}

impl ChromaOption {
    pub(crate) fn apply(self, config: &mut ChromaConfig) {
        match self {
            Self::NameSpace(namespace) => config.namespace = namespace,
            Self::Url(url) => config.url = url,
            Self::Embedder(embedder) => config.embedder = Some(embedder),
            Self::DistanceFunction(distance) => config.distance_function = distance,
            Self::Includes(includes) => config.includes = includes,
            Self::OpenAiApiKey(key) => config.openai_api_key = key,
        }
    }
}

/// Namespace vectors are upserted into and queried from.
pub fn with_namespace(namespace: impl Into<String>) -> ChromaOption {
    ChromaOption::NameSpace(namespace.into())
}

/// Chroma server URL. Falls back to `CHROMA_URL` when not given.
pub fn with_chroma_url(url: impl Into<String>) -> ChromaOption {
    ChromaOption::Url(url.into())
}

pub fn with_embedder(embedder: Arc<dyn Embedder>) -> ChromaOption {
    ChromaOption::Embedder(embedder)
}

pub fn with_distance_function(distance: DistanceFunction) -> ChromaOption {
    ChromaOption::DistanceFunction(distance)
}

pub fn with_includes(includes: Vec<QueryInclude>) -> ChromaOption {
    ChromaOption::Includes(includes)
}

/// OpenAI key used to embed when no embedder is set. Overrides
/// `OPENAI_API_KEY`.
pub fn with_openai_api_key(key: impl Into<String>) -> ChromaOption {
    ChromaOption::OpenAiApiKey(key.into())
}
