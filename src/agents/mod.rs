//! Agents, their creation options and the executor that drives them.
//!
//! Every agent kind starts from its own default [`CreationOptions`] baseline;
//! callers layer [`CreationOption`]s on top in call order.

mod conversational;
mod executor;
mod mrkl;
mod options;
mod parser_error;
mod templates;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::tool::Tool;

pub use conversational::ConversationalAgent;
pub use executor::{Executor, ExecutorOutput};
pub use mrkl::OneShotAgent;
pub use options::{
    with_callbacks_handler, with_max_iterations, with_memory, with_output_key,
    with_parser_error_handler, with_prompt, with_prompt_format_instructions, with_prompt_prefix,
    with_prompt_suffix, with_return_intermediate_steps, AgentKind, CreationOption,
    CreationOptions, OpenAIOption,
};
pub use parser_error::ParserErrorHandler;
pub use templates::{
    create_conversational_prompt, create_mrkl_prompt, DEFAULT_CONVERSATIONAL_FORMAT_INSTRUCTIONS,
    DEFAULT_CONVERSATIONAL_PREFIX, DEFAULT_CONVERSATIONAL_SUFFIX, DEFAULT_MAX_ITERATIONS,
    DEFAULT_MRKL_FORMAT_INSTRUCTIONS, DEFAULT_MRKL_PREFIX, DEFAULT_MRKL_SUFFIX,
    DEFAULT_OUTPUT_KEY, DEFAULT_SYSTEM_MESSAGE,
};

/// A tool invocation the agent asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentAction {
    pub tool: String,
    pub tool_input: String,
    pub log: String,
}

/// The agent's final answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentFinish {
    pub return_values: HashMap<String, String>,
    pub log: String,
}

/// An action paired with what came back from it. A step produced by a parse
/// failure has no action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentStep {
    pub action: Option<AgentAction>,
    pub observation: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentDecision {
    Act(Vec<AgentAction>),
    Finish(AgentFinish),
}

#[async_trait]
pub trait Agent: Send + Sync {
    /// Decides the next move given what has happened so far.
    async fn plan(
        &self,
        intermediate_steps: &[AgentStep],
        inputs: &HashMap<String, String>,
    ) -> Result<AgentDecision>;

    fn tools(&self) -> Vec<Arc<dyn Tool>>;

    fn input_keys(&self) -> Vec<String>;
}

/// `log` followed by its observation, then an open `Thought:` for the model
/// to continue from.
fn scratchpad(steps: &[AgentStep], thought_prefix: &str) -> String {
    let mut pad = String::new();
    for step in steps {
        match &step.action {
            Some(action) => pad.push_str(&action.log),
            None => pad.push_str("Invalid or incomplete response"),
        }
        pad.push_str("\nObservation: ");
        pad.push_str(&step.observation);
        pad.push('\n');
        pad.push_str(thought_prefix);
    }
    pad
}

fn observation_stops() -> Vec<String> {
    vec!["\nObservation:".to_string(), "\n\tObservation:".to_string()]
}
