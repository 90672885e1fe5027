use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

/// A capability an agent can invoke with a plain-text input.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    async fn call(&self, input: &str) -> Result<String>;
}

/// `name, other` as rendered into `Action:` instructions.
pub fn tool_names(tools: &[Arc<dyn Tool>]) -> String {
    tools
        .iter()
        .map(|tool| tool.name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// One `- name: description` line per tool.
pub fn tool_descriptions(tools: &[Arc<dyn Tool>]) -> String {
    tools
        .iter()
        .map(|tool| format!("- {}: {}", tool.name(), tool.description()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Upper;

    #[async_trait]
    impl Tool for Upper {
        fn name(&self) -> &str {
            "upper"
        }

        fn description(&self) -> &str {
            "Uppercases its input"
        }

        async fn call(&self, input: &str) -> Result<String> {
            Ok(input.to_uppercase())
        }
    }

    struct Lower;

    #[async_trait]
    impl Tool for Lower {
        fn name(&self) -> &str {
            "lower"
        }

        fn description(&self) -> &str {
            "Lowercases its input"
        }

        async fn call(&self, input: &str) -> Result<String> {
            Ok(input.to_lowercase())
        }
    }

    #[test]
    fn renders_names_and_descriptions_in_order() {
        let tools: Vec<Arc<dyn Tool>> = vec![Arc::new(Upper), Arc::new(Lower)];
        assert_eq!(tool_names(&tools), "upper, lower");
        assert_eq!(
            tool_descriptions(&tools),
            "- upper: Uppercases its input\n- lower: Lowercases its input"
        );
    }

    #[tokio::test]
    async fn tools_are_callable_through_trait_objects() {
        let tool: Arc<dyn Tool> = Arc::new(Upper);
        assert_eq!(tool.call("abc").await.unwrap(), "ABC");
    }
}
