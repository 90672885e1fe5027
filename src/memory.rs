use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{ChainError, Result};
use crate::message::{Message, Role};

/// State carried between executor runs.
#[async_trait]
pub trait Memory: Send + Sync {
    /// Keys this memory contributes to prompt inputs.
    fn memory_variables(&self) -> Vec<String>;

    async fn load_memory_variables(
        &self,
        inputs: &HashMap<String, String>,
    ) -> Result<HashMap<String, String>>;

    async fn save_context(
        &self,
        inputs: &HashMap<String, String>,
        outputs: &HashMap<String, String>,
    ) -> Result<()>;

    async fn clear(&self) -> Result<()>;
}

/// Remembers nothing. The executor baseline uses it.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimpleMemory;

#[async_trait]
impl Memory for SimpleMemory {
    fn memory_variables(&self) -> Vec<String> {
        Vec::new()
    }

    async fn load_memory_variables(
        &self,
        _inputs: &HashMap<String, String>,
    ) -> Result<HashMap<String, String>> {
        Ok(HashMap::new())
    }

    async fn save_context(
        &self,
        _inputs: &HashMap<String, String>,
        _outputs: &HashMap<String, String>,
    ) -> Result<()> {
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        Ok(())
    }
}

/// In-memory transcript exposed to prompts as a single text variable.
#[derive(Debug)]
pub struct ConversationBuffer {
    messages: RwLock<Vec<Message>>,
    memory_key: String,
    input_key: Option<String>,
    output_key: Option<String>,
    human_prefix: String,
    ai_prefix: String,
}

impl Default for ConversationBuffer {
    fn default() -> Self {
        Self {
            messages: RwLock::new(Vec::new()),
            memory_key: "history".into(),
            input_key: None,
            output_key: None,
            human_prefix: "Human".into(),
            ai_prefix: "AI".into(),
        }
    }
}

impl ConversationBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_memory_key(mut self, key: impl Into<String>) -> Self {
        self.memory_key = key.into();
        self
    }

    pub fn with_input_key(mut self, key: impl Into<String>) -> Self {
        self.input_key = Some(key.into());
        self
    }

    pub fn with_output_key(mut self, key: impl Into<String>) -> Self {
        self.output_key = Some(key.into());
        self
    }

    pub async fn messages(&self) -> Vec<Message> {
        self.messages.read().await.clone()
    }

    fn buffer_string(&self, messages: &[Message]) -> String {
        messages
            .iter()
            .map(|message| {
                let prefix = match message.role {
                    Role::Human => self.human_prefix.as_str(),
                    Role::Ai => self.ai_prefix.as_str(),
                    Role::System => "System",
                    Role::Function => "Function",
                };
                format!("{prefix}: {}", message.content)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn single_value<'a>(
    values: &'a HashMap<String, String>,
    key: Option<&str>,
    what: &str,
) -> Result<&'a str> {
    if let Some(key) = key {
        return values
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| ChainError::Config(format!("{what} key `{key}` not found")));
    }
    let mut iter = values.values();
    match (iter.next(), iter.next()) {
        (Some(value), None) => Ok(value),
        _ => Err(ChainError::Config(format!(
            "expected exactly one {what} value, got {}; set an explicit {what} key",
            values.len()
        ))),
    }
}

#[async_trait]
impl Memory for ConversationBuffer {
    fn memory_variables(&self) -> Vec<String> {
        vec![self.memory_key.clone()]
    }

    async fn load_memory_variables(
        &self,
        _inputs: &HashMap<String, String>,
    ) -> Result<HashMap<String, String>> {
        let messages = self.messages.read().await;
        let mut vars = HashMap::new();
        vars.insert(self.memory_key.clone(), self.buffer_string(&messages));
        Ok(vars)
    }

    async fn save_context(
        &self,
        inputs: &HashMap<String, String>,
        outputs: &HashMap<String, String>,
    ) -> Result<()> {
        let input = single_value(inputs, self.input_key.as_deref(), "input")?;
        let output = single_value(outputs, self.output_key.as_deref(), "output")?;
        let mut messages = self.messages.write().await;
        messages.push(Message::human(input));
        messages.push(Message::ai(output));
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.messages.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn buffer_renders_history() {
        let memory = ConversationBuffer::new();
        memory
            .save_context(&map(&[("input", "hi")]), &map(&[("output", "hello")]))
            .await
            .unwrap();

        let vars = memory.load_memory_variables(&HashMap::new()).await.unwrap();
        assert_eq!(vars["history"], "Human: hi\nAI: hello");

        memory.clear().await.unwrap();
        assert!(memory.messages().await.is_empty());
    }

    #[tokio::test]
    async fn ambiguous_inputs_need_an_explicit_key() {
        let memory = ConversationBuffer::new();
        let inputs = map(&[("input", "hi"), ("history", "")]);
        let outputs = map(&[("output", "ok")]);
        assert!(memory.save_context(&inputs, &outputs).await.is_err());

        let memory = ConversationBuffer::new().with_input_key("input");
        memory.save_context(&inputs, &outputs).await.unwrap();
        assert_eq!(memory.messages().await.len(), 2);
    }

    #[tokio::test]
    async fn simple_memory_is_inert() {
        let memory = SimpleMemory;
        memory
            .save_context(&map(&[("input", "x")]), &map(&[("output", "y")]))
            .await
            .unwrap();
        assert!(memory.memory_variables().is_empty());
        assert!(memory
            .load_memory_variables(&HashMap::new())
            .await
            .unwrap()
            .is_empty());
    }
}
