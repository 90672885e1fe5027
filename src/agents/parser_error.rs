use std::fmt;
use std::sync::Arc;

type Formatter = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Turns an unparseable model reply into an observation so the executor can
/// keep going instead of failing the run.
#[derive(Clone, Default)]
pub struct ParserErrorHandler {
    formatter: Option<Formatter>,
}

impl fmt::Debug for ParserErrorHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserErrorHandler")
            .field("formatter", &self.formatter.is_some())
            .finish()
    }
}

impl ParserErrorHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_formatter(formatter: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        Self {
            formatter: Some(Arc::new(formatter)),
        }
    }

    /// The observation fed back to the agent. Without a formatter this is the
    /// error text itself.
    pub fn format(&self, error: &str) -> String {
        match &self.formatter {
            Some(formatter) => formatter(error),
            None => error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_and_without_formatter() {
        assert_eq!(ParserErrorHandler::new().format("bad"), "bad");
        let handler = ParserErrorHandler::with_formatter(|e| format!("Invalid format: {e}"));
        assert_eq!(handler.format("bad"), "Invalid format: bad");
    }
}
