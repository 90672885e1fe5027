use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::agents::parser_error::ParserErrorHandler;
use crate::agents::templates::{
    create_conversational_prompt, create_mrkl_prompt, DEFAULT_CONVERSATIONAL_FORMAT_INSTRUCTIONS,
    DEFAULT_CONVERSATIONAL_PREFIX, DEFAULT_CONVERSATIONAL_SUFFIX, DEFAULT_MAX_ITERATIONS,
    DEFAULT_MRKL_FORMAT_INSTRUCTIONS, DEFAULT_MRKL_PREFIX, DEFAULT_MRKL_SUFFIX,
    DEFAULT_OUTPUT_KEY, DEFAULT_SYSTEM_MESSAGE,
};
use crate::callbacks::CallbackHandler;
use crate::memory::{Memory, SimpleMemory};
use crate::prompts::{
    ChatPromptTemplate, MessageFormatter, MessageTemplate, MessagesPlaceholder, PromptTemplate,
};
use crate::tool::Tool;

/// Selects which default baseline options are layered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentKind {
    Executor,
    Mrkl,
    Conversational,
    OpenAIFunctions,
}

/// Fully resolved settings for building an agent or executor.
#[derive(Clone)]
pub struct CreationOptions {
    kind: AgentKind,
    prompt: PromptTemplate,
    memory: Option<Arc<dyn Memory>>,
    callbacks_handler: Option<Arc<dyn CallbackHandler>>,
    error_handler: Option<ParserErrorHandler>,
    max_iterations: usize,
    return_intermediate_steps: bool,
    output_key: String,
    prompt_prefix: String,
    format_instructions: String,
    prompt_suffix: String,
    system_message: String,
    extra_messages: Vec<Arc<dyn MessageFormatter>>,
}

impl fmt::Debug for CreationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreationOptions")
            .field("kind", &self.kind)
            .field("prompt", &self.prompt)
            .field("memory", &self.memory.is_some())
            .field("callbacks_handler", &self.callbacks_handler.is_some())
            .field("error_handler", &self.error_handler)
            .field("max_iterations", &self.max_iterations)
            .field("return_intermediate_steps", &self.return_intermediate_steps)
            .field("output_key", &self.output_key)
            .field("prompt_prefix", &self.prompt_prefix)
            .field("format_instructions", &self.format_instructions)
            .field("prompt_suffix", &self.prompt_suffix)
            .field("system_message", &self.system_message)
            .field("extra_messages", &self.extra_messages.len())
            .finish()
    }
}

impl CreationOptions {
    fn empty(kind: AgentKind) -> Self {
        Self {
            kind,
            prompt: PromptTemplate::default(),
            memory: None,
            callbacks_handler: None,
            error_handler: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            return_intermediate_steps: false,
            output_key: DEFAULT_OUTPUT_KEY.to_string(),
            prompt_prefix: String::new(),
            format_instructions: String::new(),
            prompt_suffix: String::new(),
            system_message: String::new(),
            extra_messages: Vec::new(),
        }
    }

    /// The defaults for `kind` before any option is applied.
    pub fn baseline(kind: AgentKind) -> Self {
        let mut options = Self::empty(kind);
        match kind {
            AgentKind::Executor => {
                options.memory = Some(Arc::new(SimpleMemory));
            }
            AgentKind::Mrkl => {
                options.prompt_prefix = DEFAULT_MRKL_PREFIX.to_string();
                options.format_instructions = DEFAULT_MRKL_FORMAT_INSTRUCTIONS.to_string();
                options.prompt_suffix = DEFAULT_MRKL_SUFFIX.to_string();
            }
            AgentKind::Conversational => {
                options.prompt_prefix = DEFAULT_CONVERSATIONAL_PREFIX.to_string();
                options.format_instructions =
                    DEFAULT_CONVERSATIONAL_FORMAT_INSTRUCTIONS.to_string();
                options.prompt_suffix = DEFAULT_CONVERSATIONAL_SUFFIX.to_string();
            }
            AgentKind::OpenAIFunctions => {
                options.system_message = DEFAULT_SYSTEM_MESSAGE.to_string();
            }
        }
        options
    }

    /// Applies `options` in order over the baseline for `kind`. Later options
    /// overwrite the fields earlier ones set; untouched fields keep their
    /// defaults.
    pub fn resolve<I>(kind: AgentKind, options: I) -> Self
    where
        I: IntoIterator<Item = CreationOption>,
    {
        let mut resolved = Self::baseline(kind);
        let mut applied = 0usize;
        for option in options {
            option.apply(&mut resolved);
            applied += 1;
        }
        debug!(
            ?kind,
            applied,
            max_iterations = resolved.max_iterations,
            output_key = %resolved.output_key,
            explicit_prompt = !resolved.prompt.is_empty(),
            "resolved agent options"
        );
        resolved
    }

    pub fn kind(&self) -> AgentKind {
        self.kind
    }

    pub fn prompt(&self) -> &PromptTemplate {
        &self.prompt
    }

    pub fn memory(&self) -> Option<&Arc<dyn Memory>> {
        self.memory.as_ref()
    }

    pub fn callbacks_handler(&self) -> Option<&Arc<dyn CallbackHandler>> {
        self.callbacks_handler.as_ref()
    }

    pub fn error_handler(&self) -> Option<&ParserErrorHandler> {
        self.error_handler.as_ref()
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn return_intermediate_steps(&self) -> bool {
        self.return_intermediate_steps
    }

    pub fn output_key(&self) -> &str {
        &self.output_key
    }

    pub fn prompt_prefix(&self) -> &str {
        &self.prompt_prefix
    }

    pub fn format_instructions(&self) -> &str {
        &self.format_instructions
    }

    pub fn prompt_suffix(&self) -> &str {
        &self.prompt_suffix
    }

    pub fn system_message(&self) -> &str {
        &self.system_message
    }

    pub fn extra_messages(&self) -> &[Arc<dyn MessageFormatter>] {
        &self.extra_messages
    }

    /// The explicit prompt if one was given, otherwise the MRKL prompt built
    /// from prefix, format instructions and suffix.
    pub fn mrkl_prompt(&self, tools: &[Arc<dyn Tool>]) -> PromptTemplate {
        if !self.prompt.is_empty() {
            return self.prompt.clone();
        }
        create_mrkl_prompt(
            tools,
            &self.prompt_prefix,
            &self.format_instructions,
            &self.prompt_suffix,
        )
    }

    /// The explicit prompt if one was given, otherwise the conversational
    /// prompt built from prefix, format instructions and suffix.
    pub fn conversational_prompt(&self, tools: &[Arc<dyn Tool>]) -> PromptTemplate {
        if !self.prompt.is_empty() {
            return self.prompt.clone();
        }
        create_conversational_prompt(
            tools,
            &self.prompt_prefix,
            &self.format_instructions,
            &self.prompt_suffix,
        )
    }

    /// System message, extra messages, the `{input}` turn and the
    /// `agent_scratchpad` placeholder, for function-calling models.
    pub fn functions_prompt(&self) -> ChatPromptTemplate {
        let mut messages: Vec<Arc<dyn MessageFormatter>> = Vec::new();
        if !self.system_message.is_empty() {
            messages.push(Arc::new(MessageTemplate::system(self.system_message.clone())));
        }
        messages.extend(self.extra_messages.iter().cloned());
        messages.push(Arc::new(MessageTemplate::human("{input}")));
        messages.push(Arc::new(MessagesPlaceholder::new("agent_scratchpad")));
        ChatPromptTemplate::new(messages)
    }
}

/// One deferred change to [`CreationOptions`]. Each variant writes exactly
/// one field.
#[derive(Clone)]
pub enum CreationOption {
    MaxIterations(usize),
    OutputKey(String),
    PromptPrefix(String),
    FormatInstructions(String),
    PromptSuffix(String),
    Prompt(PromptTemplate),
    ReturnIntermediateSteps,
    Memory(Arc<dyn Memory>),
    CallbacksHandler(Arc<dyn CallbackHandler>),
    ParserErrorHandler(ParserErrorHandler),
    SystemMessage(String),
    ExtraMessages(Vec<Arc<dyn MessageFormatter>>),
}

impl fmt::Debug for CreationOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MaxIterations(n) => f.debug_tuple("MaxIterations").field(n).finish(),
            Self::OutputKey(key) => f.debug_tuple("OutputKey").field(key).finish(),
            Self::PromptPrefix(s) => f.debug_tuple("PromptPrefix").field(s).finish(),
            Self::FormatInstructions(s) => f.debug_tuple("FormatInstructions").field(s).finish(),
            Self::PromptSuffix(s) => f.debug_tuple("PromptSuffix").field(s).finish(),
            Self::Prompt(p) => f.debug_tuple("Prompt").field(p).finish(),
            Self::ReturnIntermediateSteps => f.write_str("ReturnIntermediateSteps"),
            Self::Memory(_) => f.write_str("Memory(..)"),
            Self::CallbacksHandler(_) => f.write_str("CallbacksHandler(..)"),
            Self::ParserErrorHandler(h) => f.debug_tuple("ParserErrorHandler").field(h).finish(),
            Self::SystemMessage(s) => f.debug_tuple("SystemMessage").field(s).finish(),
            Self::ExtraMessages(m) => f.debug_tuple("ExtraMessages").field(&m.len()).finish(),
        }
    }
}

impl CreationOption {
    pub fn apply(self, options: &mut CreationOptions) {
        match self {
            // An executor always gets at least one round.
            Self::MaxIterations(n) => options.max_iterations = n.max(1),
            Self::OutputKey(key) => options.output_key = key,
            Self::PromptPrefix(prefix) => options.prompt_prefix = prefix,
            Self::FormatInstructions(instructions) => options.format_instructions = instructions,
            Self::PromptSuffix(suffix) => options.prompt_suffix = suffix,
            Self::Prompt(prompt) => options.prompt = prompt,
            Self::ReturnIntermediateSteps => options.return_intermediate_steps = true,
            Self::Memory(memory) => options.memory = Some(memory),
            Self::CallbacksHandler(handler) => options.callbacks_handler = Some(handler),
            Self::ParserErrorHandler(handler) => options.error_handler = Some(handler),
            Self::SystemMessage(message) => options.system_message = message,
            Self::ExtraMessages(messages) => options.extra_messages = messages,
        }
    }
}

/// Maximum number of plan/act rounds the executor runs.
pub fn with_max_iterations(iterations: usize) -> CreationOption {
    CreationOption::MaxIterations(iterations)
}

pub fn with_output_key(output_key: impl Into<String>) -> CreationOption {
    CreationOption::OutputKey(output_key.into())
}

pub fn with_prompt_prefix(prefix: impl Into<String>) -> CreationOption {
    CreationOption::PromptPrefix(prefix.into())
}

pub fn with_prompt_format_instructions(instructions: impl Into<String>) -> CreationOption {
    CreationOption::FormatInstructions(instructions.into())
}

pub fn with_prompt_suffix(suffix: impl Into<String>) -> CreationOption {
    CreationOption::PromptSuffix(suffix.into())
}

/// A complete prompt. When non-empty it replaces the prefix/instructions/suffix
/// prompt entirely.
pub fn with_prompt(prompt: PromptTemplate) -> CreationOption {
    CreationOption::Prompt(prompt)
}

/// Makes the executor report every intermediate step.
pub fn with_return_intermediate_steps() -> CreationOption {
    CreationOption::ReturnIntermediateSteps
}

pub fn with_memory(memory: Arc<dyn Memory>) -> CreationOption {
    CreationOption::Memory(memory)
}

pub fn with_callbacks_handler(handler: Arc<dyn CallbackHandler>) -> CreationOption {
    CreationOption::CallbacksHandler(handler)
}

pub fn with_parser_error_handler(handler: ParserErrorHandler) -> CreationOption {
    CreationOption::ParserErrorHandler(handler)
}

/// Options only the function-calling agent reads.
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenAIOption;

impl OpenAIOption {
    pub fn new() -> Self {
        Self
    }

    pub fn with_system_message(&self, message: impl Into<String>) -> CreationOption {
        CreationOption::SystemMessage(message.into())
    }

    pub fn with_extra_messages(&self, messages: Vec<Arc<dyn MessageFormatter>>) -> CreationOption {
        CreationOption::ExtraMessages(messages)
    }
}
