use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::agents::{AgentAction, AgentFinish};

/// Observer notified as an executor runs. Every hook defaults to a no-op.
#[async_trait]
pub trait CallbackHandler: Send + Sync {
    async fn on_agent_action(&self, _action: &AgentAction) {}

    async fn on_agent_finish(&self, _finish: &AgentFinish) {}

    async fn on_tool_start(&self, _tool: &str, _input: &str) {}

    async fn on_tool_end(&self, _tool: &str, _output: &str) {}

    async fn on_parse_error(&self, _error: &str) {}
}

/// Forwards every callback to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogHandler;

#[async_trait]
impl CallbackHandler for LogHandler {
    async fn on_agent_action(&self, action: &AgentAction) {
        debug!(tool = %action.tool, input = %action.tool_input, "agent action");
    }

    async fn on_agent_finish(&self, finish: &AgentFinish) {
        info!(keys = ?finish.return_values.keys().collect::<Vec<_>>(), "agent finished");
    }

    async fn on_tool_start(&self, tool: &str, input: &str) {
        debug!(tool, input, "tool start");
    }

    async fn on_tool_end(&self, tool: &str, output: &str) {
        debug!(tool, output, "tool end");
    }

    async fn on_parse_error(&self, error: &str) {
        warn!(error, "agent output could not be parsed");
    }
}
