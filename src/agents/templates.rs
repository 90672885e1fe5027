use std::sync::Arc;

use crate::prompts::PromptTemplate;
use crate::tool::{tool_descriptions, tool_names, Tool};

pub const DEFAULT_MAX_ITERATIONS: usize = 5;
pub const DEFAULT_OUTPUT_KEY: &str = "output";
pub const DEFAULT_SYSTEM_MESSAGE: &str = "You are a helpful AI assistant.";

pub const DEFAULT_MRKL_PREFIX: &str = "Answer the following questions as best you can. \
You have access to the following tools:

{tool_descriptions}";

pub const DEFAULT_MRKL_FORMAT_INSTRUCTIONS: &str = "Use the following format:

Question: the input question you must answer
Thought: you should always think about what to do
Action: the action to take, should be one of [ {tool_names} ]
Action Input: the input to the action
Observation: the result of the action
... (this Thought/Action/Action Input/Observation can repeat N times)
Thought: I now know the final answer
Final Answer: the final answer to the original input question";

pub const DEFAULT_MRKL_SUFFIX: &str = "Begin!

Question: {input}
Thought:{agent_scratchpad}";

pub const DEFAULT_CONVERSATIONAL_PREFIX: &str = "Assistant is a large language model.

Assistant is designed to be able to assist with a wide range of tasks, from answering simple \
questions to providing in-depth explanations and discussions on a wide range of topics. As a \
language model, Assistant is able to generate human-like text based on the input it receives, \
allowing it to engage in natural-sounding conversations and provide responses that are coherent \
and relevant to the topic at hand.

Assistant is constantly learning and improving, and its capabilities are constantly evolving. It \
is able to process and understand large amounts of text, and can use this knowledge to provide \
accurate and informative responses to a wide range of questions.

TOOLS:
------

Assistant has access to the following tools:

{tool_descriptions}";

pub const DEFAULT_CONVERSATIONAL_FORMAT_INSTRUCTIONS: &str = "To use a tool, please use the following format:

Thought: Do I need to use a tool? Yes
Action: the action to take, should be one of [{tool_names}]
Action Input: the input to the action
Observation: the result of the action

When you have a response to say to the Human, or if you do not need to use a tool, you MUST use the format:

Thought: Do I need to use a tool? No
AI: [your response here]";

pub const DEFAULT_CONVERSATIONAL_SUFFIX: &str = "Begin!

Previous conversation history:
{history}

New input: {input}

Thought:{agent_scratchpad}";

fn join_sections(prefix: &str, instructions: &str, suffix: &str) -> String {
    [prefix, instructions, suffix]
        .iter()
        .filter(|section| !section.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn with_tool_partials(template: String, tools: &[Arc<dyn Tool>]) -> PromptTemplate {
    PromptTemplate::from_template(template)
        .with_partial("tool_names", tool_names(tools))
        .with_partial("tool_descriptions", tool_descriptions(tools))
}

/// Prompt for the MRKL reasoning agent built from its three sections.
pub fn create_mrkl_prompt(
    tools: &[Arc<dyn Tool>],
    prefix: &str,
    instructions: &str,
    suffix: &str,
) -> PromptTemplate {
    with_tool_partials(join_sections(prefix, instructions, suffix), tools)
}

/// Prompt for the conversational agent built from its three sections.
pub fn create_conversational_prompt(
    tools: &[Arc<dyn Tool>],
    prefix: &str,
    instructions: &str,
    suffix: &str,
) -> PromptTemplate {
    with_tool_partials(join_sections(prefix, instructions, suffix), tools)
}
