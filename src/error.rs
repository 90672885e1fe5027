use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChainError>;

#[derive(Debug, Error)]
pub enum ChainError {
    /// Required configuration is still missing after defaults, options and
    /// environment fallback were applied.
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    #[error("err sending request for {operation}: {source}")]
    Http {
        operation: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("error returned from {service} | Status: {status} | Body: {body}")]
    Status {
        service: String,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("err decoding response for {operation}: {source}")]
    Decode {
        operation: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("prompt error: {0}")]
    Prompt(String),

    #[error("language model error: {0}")]
    LanguageModel(String),

    #[error("tool `{name}` invocation failed: {source}")]
    ToolInvocation {
        name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("unable to parse agent output: {0}")]
    Parse(String),

    #[error("agent did not finish within {0} iterations")]
    MaxIterations(usize),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ChainError {
    pub fn is_invalid_options(&self) -> bool {
        matches!(self, ChainError::InvalidOptions(_))
    }
}
