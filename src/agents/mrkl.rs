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

const FINAL_ANSWER: &str = "Final Answer:";

fn action_pattern() -> &'static Regex {
    static ACTION: OnceLock<Regex> = OnceLock::new();
    ACTION.get_or_init(|| {
        Regex::new(r"(?s)Action:\s*(.*?)\s*Action Input:\s*(.*)").expect("action regex is valid")
    })
}

/// Zero-shot ReAct agent: reasons in `Thought`/`Action` steps until it emits
/// a `Final Answer`.
pub struct OneShotAgent {
    llm: Arc<dyn LanguageModel>,
    tools: Vec<Arc<dyn Tool>>,
    prompt: PromptTemplate,
    output_key: String,
}

impl OneShotAgent {
    pub fn new<I>(llm: Arc<dyn LanguageModel>, tools: Vec<Arc<dyn Tool>>, options: I) -> Self
    where
        I: IntoIterator<Item = CreationOption>,
    {
        let resolved = CreationOptions::resolve(AgentKind::Mrkl, options);
        Self {
            prompt: resolved.mrkl_prompt(&tools),
            output_key: resolved.output_key().to_string(),
            llm,
            tools,
        }
    }

    pub fn prompt(&self) -> &PromptTemplate {
        &self.prompt
    }

    fn parse_output(&self, output: &str) -> Result<AgentDecision> {
        if let Some((_, answer)) = output.rsplit_once(FINAL_ANSWER) {
            let mut return_values = HashMap::new();
            return_values.insert(self.output_key.clone(), answer.trim().to_string());
            return Ok(AgentDecision::Finish(AgentFinish {
                return_values,
                log: output.to_string(),
            }));
        }

        let caps = action_pattern()
            .captures(output)
            .ok_or_else(|| ChainError::Parse(output.to_string()))?;
        let tool = caps.get(1).map_or("", |m| m.as_str()).trim();
        let input = caps.get(2).map_or("", |m| m.as_str()).trim().trim_matches('"');
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
impl Agent for OneShotAgent {
    async fn plan(
        &self,
        intermediate_steps: &[AgentStep],
        inputs: &HashMap<String, String>,
    ) -> Result<AgentDecision> {
        let mut values = inputs.clone();
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
            .filter(|name| name.as_str() != "agent_scratchpad")
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::with_output_key;
    use crate::llm::StubModel;

    fn agent(options: Vec<CreationOption>) -> OneShotAgent {
        OneShotAgent::new(StubModel::new(Vec::new()), Vec::new(), options)
    }

    #[test]
    fn parses_final_answer_under_output_key() {
        let agent = agent(vec![with_output_key("answer")]);
        let decision = agent
            .parse_output("Thought: I now know the final answer\nFinal Answer: 42")
            .unwrap();
        match decision {
            AgentDecision::Finish(finish) => assert_eq!(finish.return_values["answer"], "42"),
            other => panic!("expected finish, got {other:?}"),
        }
    }

    #[test]
    fn parses_action_and_input() {
        let agent = agent(Vec::new());
        let decision = agent
            .parse_output("Thought: look it up\nAction: search\nAction Input: \"rust traits\"")
            .unwrap();
        assert_eq!(
            decision,
            AgentDecision::Act(vec![AgentAction {
                tool: "search".into(),
                tool_input: "rust traits".into(),
                log: "Thought: look it up\nAction: search\nAction Input: \"rust traits\"".into(),
            }])
        );
    }

    #[test]
    fn rejects_unstructured_output() {
        let agent = agent(Vec::new());
        assert!(matches!(
            agent.parse_output("I am not sure"),
            Err(ChainError::Parse(_))
        ));
    }

    #[test]
    fn input_keys_exclude_scratchpad() {
        assert_eq!(agent(Vec::new()).input_keys(), vec!["input".to_string()]);
    }
}
