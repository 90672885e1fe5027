use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::agents::options::{AgentKind, CreationOption, CreationOptions};
use crate::agents::{Agent, AgentAction, AgentDecision, AgentFinish, AgentStep};
use crate::error::{ChainError, Result};
use crate::tool::Tool;

const NOT_FINISHED: &str = "agent not finished before max iterations";

/// What an executor run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutorOutput {
    pub values: HashMap<String, String>,
    /// Empty unless the executor was built with
    /// [`with_return_intermediate_steps`](crate::agents::with_return_intermediate_steps).
    pub intermediate_steps: Vec<AgentStep>,
}

impl ExecutorOutput {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

/// Drives an [`Agent`] through plan/act rounds using resolved executor options.
pub struct Executor<A: Agent> {
    agent: A,
    options: CreationOptions,
}

impl<A: Agent> Executor<A> {
    pub fn new<I>(agent: A, options: I) -> Self
    where
        I: IntoIterator<Item = CreationOption>,
    {
        Self {
            agent,
            options: CreationOptions::resolve(AgentKind::Executor, options),
        }
    }

    pub fn agent(&self) -> &A {
        &self.agent
    }

    pub fn options(&self) -> &CreationOptions {
        &self.options
    }

    /// Runs with a single `input` and returns the value under the output key.
    pub async fn run(&self, input: impl Into<String>) -> Result<String> {
        let mut inputs = HashMap::new();
        inputs.insert("input".to_string(), input.into());
        let output = self.call(inputs).await?;
        let key = self.options.output_key();
        output
            .get(key)
            .map(str::to_string)
            .ok_or_else(|| ChainError::Parse(format!("agent output has no `{key}` value")))
    }

    pub async fn call(&self, inputs: HashMap<String, String>) -> Result<ExecutorOutput> {
        let mut prompt_inputs = inputs.clone();
        if let Some(memory) = self.options.memory() {
            prompt_inputs.extend(memory.load_memory_variables(&inputs).await?);
        }

        let tools: HashMap<String, Arc<dyn Tool>> = self
            .agent
            .tools()
            .into_iter()
            .map(|tool| (tool.name().to_lowercase(), tool))
            .collect();
        let max_iterations = self.options.max_iterations();
        let mut steps: Vec<AgentStep> = Vec::new();

        for iteration in 0..max_iterations {
            debug!(iteration, steps = steps.len(), "executor iteration");
            let decision = match self.agent.plan(&steps, &prompt_inputs).await {
                Ok(decision) => decision,
                Err(ChainError::Parse(raw)) => {
                    let err = ChainError::Parse(raw);
                    let Some(handler) = self.options.error_handler() else {
                        return Err(err);
                    };
                    let text = err.to_string();
                    if let Some(callbacks) = self.options.callbacks_handler() {
                        callbacks.on_parse_error(&text).await;
                    }
                    steps.push(AgentStep {
                        action: None,
                        observation: handler.format(&text),
                    });
                    continue;
                }
                Err(err) => return Err(err),
            };

            match decision {
                AgentDecision::Finish(finish) => {
                    if let Some(callbacks) = self.options.callbacks_handler() {
                        callbacks.on_agent_finish(&finish).await;
                    }
                    if let Some(memory) = self.options.memory() {
                        memory.save_context(&inputs, &finish.return_values).await?;
                    }
                    return Ok(self.output(finish.return_values, steps));
                }
                AgentDecision::Act(actions) => {
                    if actions.is_empty() {
                        return Err(ChainError::Parse(
                            "agent returned neither actions nor a final answer".into(),
                        ));
                    }
                    for action in actions {
                        let step = self.take_action(&tools, action).await?;
                        steps.push(step);
                    }
                }
            }
        }

        warn!(max_iterations, "agent did not finish");
        if let Some(callbacks) = self.options.callbacks_handler() {
            let mut return_values = HashMap::new();
            return_values.insert(self.options.output_key().to_string(), NOT_FINISHED.into());
            callbacks
                .on_agent_finish(&AgentFinish {
                    return_values,
                    log: String::new(),
                })
                .await;
        }
        Err(ChainError::MaxIterations(max_iterations))
    }

    async fn take_action(
        &self,
        tools: &HashMap<String, Arc<dyn Tool>>,
        action: AgentAction,
    ) -> Result<AgentStep> {
        let callbacks = self.options.callbacks_handler();
        if let Some(callbacks) = callbacks {
            callbacks.on_agent_action(&action).await;
        }

        let Some(tool) = tools.get(&action.tool.to_lowercase()) else {
            let observation = format!("{} is not a valid tool, try another one", action.tool);
            return Ok(AgentStep {
                action: Some(action),
                observation,
            });
        };

        if let Some(callbacks) = callbacks {
            callbacks.on_tool_start(tool.name(), &action.tool_input).await;
        }
        let observation = tool
            .call(&action.tool_input)
            .await
            .map_err(|err| ChainError::ToolInvocation {
                name: tool.name().to_string(),
                source: Box::new(err),
            })?;
        if let Some(callbacks) = callbacks {
            callbacks.on_tool_end(tool.name(), &observation).await;
        }

        Ok(AgentStep {
            action: Some(action),
            observation,
        })
    }

    fn output(&self, values: HashMap<String, String>, steps: Vec<AgentStep>) -> ExecutorOutput {
        ExecutorOutput {
            values,
            intermediate_steps: if self.options.return_intermediate_steps() {
                steps
            } else {
                Vec::new()
            },
        }
    }
}
