use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::NamedTempFile;

use chainkit::agents::{self, CreationOption, Executor, OneShotAgent};
use chainkit::{Result, Settings, StubModel, Tool};

struct Echo;

#[async_trait]
impl Tool for Echo {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Repeats its input"
    }

    async fn call(&self, input: &str) -> Result<String> {
        Ok(input.to_string())
    }
}

#[tokio::test]
async fn settings_file_drives_executor() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[agent]\nmax_iterations = 4\noutput_key = 'answer'").unwrap();
    let settings = Settings::from_file(file.path()).unwrap();

    let model = StubModel::new(vec![
        "I will echo.\nAction: echo\nAction Input: ping".to_string(),
        "Final Answer: ping".to_string(),
    ]);
    let tools: Vec<Arc<dyn Tool>> = vec![Arc::new(Echo)];
    let agent = OneShotAgent::new(model.clone(), tools, settings.agent.options());
    let executor = Executor::new(agent, settings.agent.options());

    assert_eq!(executor.options().max_iterations(), 4);
    assert_eq!(executor.run("say ping").await.unwrap(), "ping");

    let prompts = model.prompts();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[0].contains("echo: Repeats its input"));
    assert!(prompts[1].contains("Observation: ping"));
}

#[tokio::test]
async fn iteration_limit_from_explicit_option() {
    let model = StubModel::new(vec![
        "Action: echo\nAction Input: a".to_string(),
        "Action: echo\nAction Input: b".to_string(),
    ]);
    let tools: Vec<Arc<dyn Tool>> = vec![Arc::new(Echo)];
    let agent = OneShotAgent::new(model, tools, Vec::<CreationOption>::new());
    let executor = Executor::new(agent, [agents::with_max_iterations(1)]);

    let err = executor.run("loop").await.unwrap_err();
    assert!(matches!(err, chainkit::ChainError::MaxIterations(1)));
}
