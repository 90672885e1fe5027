use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use regex::Regex;

use crate::agents::options::{AgentKind, CreationOption, CreationOptions};
use crate::agents::{
    observation_stops, scratchpad, Agent, AgentAction, AgentDecision, AgentFinish, AgentStep,
};
use crate::error::{ChainError, Result};
use crate::llm::LanguageModel;
use crate::prompts::PromptTemplate;
use crate::tool::Tool;

const AI_PREFIX: &str = "AI:";

fn action_pattern() -> &'static Regex {
    static ACTION: OnceLock<Regex> = OnceLock::new();
    ACTION.get_or_init(|| {
        Regex::new(r"Action:\s*(.*?)[\n]*Action Input:\s*(.*)").expect("action regex is valid")
    })
}

/// Chat-style agent that answers with `AI:` and keeps a conversation
/// history in its prompt.
pub struct ConversationalAgent {
    llm: Arc<dyn LanguageModel>,
    tools: Vec<Arc<dyn Tool>>,
    prompt: PromptTemplate,
    output_key: String,
}

impl ConversationalAgent {
    pub fn new<I>(llm: Arc<dyn LanguageModel>, tools: Vec<Arc<dyn Tool>>, options: I) -> Self
    where
        I: IntoIterator<Item = CreationOption>,
    {
        let resolved = CreationOptions::resolve(AgentKind::Conversational, options);
        Self {
            prompt: resolved.conversational_prompt(&tools),
            output_key: resolved.output_key().to_string(),
            llm,
            tools,
        }
    }

    pub fn prompt(&self) -> &PromptTemplate {
        &self.prompt
    }

    fn parse_output(&self, output: &str) -> Result<AgentDecision> {
        if let Some((_, reply)) = output.rsplit_once(AI_PREFIX) {
            let mut return_values = HashMap::new();
            return_values.insert(self.output_key.clone(), reply.trim().to_string());
            return Ok(AgentDecision::Finish(AgentFinish {
                return_values,
                log: output.to_string(),
            }));
        }

        let caps = action_pattern()
            .captures(output)
            .ok_or_else(|| ChainError::Parse(output.to_string()))?;
        let tool = caps.get(1).map_or("", |m| m.as_str()).trim();
        let input = caps.get(2).map_or("", |m| m.as_str()).trim();
        if tool.is_empty() {
            return Err(ChainError::Parse(output.to_string()));
        }
        Ok(AgentDecision::Act(vec![AgentAction {
            tool: tool.to_string(),
            tool_input: input.to_string(),
            log: output.to_string(),
        }]))
    }
}

#[async_trait]
impl Agent for ConversationalAgent {
    async fn plan(
        &self,
        intermediate_steps: &[AgentStep],
        inputs: &HashMap<String, String>,
    ) -> Result<AgentDecision> {
        let mut values = inputs.clone();
        // Without a memory there is no history yet.
        values.entry("history".to_string()).or_default();
        values.insert(
            "agent_scratchpad".to_string(),
            scratchpad(intermediate_steps, "Thought:"),
        );
        let prompt = self.prompt.format(&values)?;
        let output = self.llm.call(&prompt, &observation_stops()).await?;
        self.parse_output(&output)
    }

    fn tools(&self) -> Vec<Arc<dyn Tool>> {
        self.tools.clone()
    }

    fn input_keys(&self) -> Vec<String> {
        self.prompt
            .input_variables
            .iter()
            .filter(|name| !matches!(name.as_str(), "agent_scratchpad" | "history"))
            .cloned()
            .collect()
    }
}
