//! Prompt templates with `{name}` placeholders.
//!
//! `{{` and `}}` render as literal braces. Partial variables are merged under
//! the caller's values, so a caller can always override a partial.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use regex::Regex;

use crate::error::{ChainError, Result};
use crate::message::{Message, Role};

fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\{\{|\}\}|\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder regex is valid")
    })
}

fn render(template: &str, values: &HashMap<String, String>) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;
    for caps in placeholder().captures_iter(template) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        out.push_str(&template[last..whole.start()]);
        match caps.get(1) {
            Some(name) => {
                let value = values.get(name.as_str()).ok_or_else(|| {
                    ChainError::Prompt(format!("missing value for variable `{}`", name.as_str()))
                })?;
                out.push_str(value);
            }
            None => out.push_str(&whole.as_str()[..1]),
        }
        last = whole.end();
    }
    out.push_str(&template[last..]);
    Ok(out)
}

/// Names of every `{name}` placeholder in `template`, in first-seen order.
pub fn template_variables(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in placeholder().captures_iter(template) {
        if let Some(name) = caps.get(1) {
            if !names.iter().any(|n| n == name.as_str()) {
                names.push(name.as_str().to_string());
            }
        }
    }
    names
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptTemplate {
    pub template: String,
    pub input_variables: Vec<String>,
    pub partial_variables: HashMap<String, String>,
}

impl PromptTemplate {
    pub fn new<I, S>(template: impl Into<String>, input_variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            template: template.into(),
            input_variables: input_variables.into_iter().map(Into::into).collect(),
            partial_variables: HashMap::new(),
        }
    }

    /// Builds a template whose input variables are every placeholder it contains.
    pub fn from_template(template: impl Into<String>) -> Self {
        let template = template.into();
        let input_variables = template_variables(&template);
        Self {
            template,
            input_variables,
            partial_variables: HashMap::new(),
        }
    }

    pub fn with_partial(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.input_variables.retain(|v| *v != name);
        self.partial_variables.insert(name, value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.template.is_empty()
    }

    pub fn format(&self, values: &HashMap<String, String>) -> Result<String> {
        let mut merged = self.partial_variables.clone();
        merged.extend(values.iter().map(|(k, v)| (k.clone(), v.clone())));
        render(&self.template, &merged)
    }
}

/// Values handed to message formatters: plain text variables plus named
/// message lists for placeholders.
#[derive(Debug, Clone, Default)]
pub struct PromptValues {
    text: HashMap<String, String>,
    messages: HashMap<String, Vec<Message>>,
}

impl PromptValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.text.insert(name.into(), value.into());
        self
    }

    pub fn with_messages(mut self, name: impl Into<String>, messages: Vec<Message>) -> Self {
        self.messages.insert(name.into(), messages);
        self
    }

    pub fn text(&self) -> &HashMap<String, String> {
        &self.text
    }

    pub fn messages(&self, name: &str) -> Option<&[Message]> {
        self.messages.get(name).map(Vec::as_slice)
    }
}

/// Anything that renders into zero or more chat messages.
pub trait MessageFormatter: Send + Sync {
    fn format_messages(&self, values: &PromptValues) -> Result<Vec<Message>>;
    fn input_variables(&self) -> Vec<String>;
}

impl fmt::Debug for dyn MessageFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageFormatter")
            .field("input_variables", &self.input_variables())
            .finish()
    }
}

/// One message rendered from a template.
#[derive(Debug, Clone)]
pub struct MessageTemplate {
    role: Role,
    prompt: PromptTemplate,
}

impl MessageTemplate {
    pub fn new(role: Role, template: impl Into<String>) -> Self {
        Self {
            role,
            prompt: PromptTemplate::from_template(template),
        }
    }

    pub fn system(template: impl Into<String>) -> Self {
        Self::new(Role::System, template)
    }

    pub fn human(template: impl Into<String>) -> Self {
        Self::new(Role::Human, template)
    }

    pub fn ai(template: impl Into<String>) -> Self {
        Self::new(Role::Ai, template)
    }
}

impl MessageFormatter for MessageTemplate {
    fn format_messages(&self, values: &PromptValues) -> Result<Vec<Message>> {
        let content = self.prompt.format(values.text())?;
        Ok(vec![Message::new(self.role, content)])
    }

    fn input_variables(&self) -> Vec<String> {
        self.prompt.input_variables.clone()
    }
}

/// Splices a named list of messages in place. A missing list renders nothing.
#[derive(Debug, Clone)]
pub struct MessagesPlaceholder {
    variable_name: String,
}

impl MessagesPlaceholder {
    pub fn new(variable_name: impl Into<String>) -> Self {
        Self {
            variable_name: variable_name.into(),
        }
    }
}

impl MessageFormatter for MessagesPlaceholder {
    fn format_messages(&self, values: &PromptValues) -> Result<Vec<Message>> {
        Ok(values
            .messages(&self.variable_name)
            .map(<[Message]>::to_vec)
            .unwrap_or_default())
    }

    fn input_variables(&self) -> Vec<String> {
        vec![self.variable_name.clone()]
    }
}

/// An ordered list of formatters rendered into one conversation.
#[derive(Clone, Default)]
pub struct ChatPromptTemplate {
    messages: Vec<Arc<dyn MessageFormatter>>,
}

impl fmt::Debug for ChatPromptTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatPromptTemplate")
            .field("messages", &self.messages.len())
            .finish()
    }
}

impl ChatPromptTemplate {
    pub fn new(messages: Vec<Arc<dyn MessageFormatter>>) -> Self {
        Self { messages }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl MessageFormatter for ChatPromptTemplate {
    fn format_messages(&self, values: &PromptValues) -> Result<Vec<Message>> {
        let mut out = Vec::new();
        for formatter in &self.messages {
            out.extend(formatter.format_messages(values)?);
        }
        Ok(out)
    }

    fn input_variables(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for formatter in &self.messages {
            for name in formatter.input_variables() {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn renders_placeholders_and_escapes() {
        let prompt = PromptTemplate::from_template("Hi {name}, use {{json}} like {{\"a\": 1}}");
        let out = prompt.format(&values(&[("name", "Ada")])).unwrap();
        assert_eq!(out, "Hi Ada, use {json} like {\"a\": 1}");
        assert_eq!(prompt.input_variables, vec!["name".to_string()]);
    }

    #[test]
    fn partials_fill_in_and_can_be_overridden() {
        let prompt = PromptTemplate::from_template("{greeting}, {name}").with_partial("greeting", "Hello");
        assert_eq!(prompt.input_variables, vec!["name".to_string()]);
        assert_eq!(prompt.format(&values(&[("name", "Bo")])).unwrap(), "Hello, Bo");
        assert_eq!(
            prompt
                .format(&values(&[("name", "Bo"), ("greeting", "Hey")]))
                .unwrap(),
            "Hey, Bo"
        );
    }

    #[test]
    fn missing_variable_is_an_error() {
        let prompt = PromptTemplate::from_template("{a} and {b}");
        let err = prompt.format(&values(&[("a", "x")])).unwrap_err();
        assert!(matches!(err, ChainError::Prompt(ref msg) if msg.contains("`b`")));
    }

    #[test]
    fn chat_prompt_concatenates_formatters() {
        let chat = ChatPromptTemplate::new(vec![
            Arc::new(MessageTemplate::system("be brief")),
            Arc::new(MessagesPlaceholder::new("history")),
            Arc::new(MessageTemplate::human("{input}")),
        ]);
        let vals = PromptValues::new()
            .with_text("input", "what now?")
            .with_messages("history", vec![Message::human("hi"), Message::ai("hello")]);

        let messages = chat.format_messages(&vals).unwrap();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0], Message::system("be brief"));
        assert_eq!(messages[3], Message::human("what now?"));
        assert_eq!(
            chat.input_variables(),
            vec!["history".to_string(), "input".to_string()]
        );
    }
}
