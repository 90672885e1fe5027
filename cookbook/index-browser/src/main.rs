//! Lists the indexes of an Azure AI Search service, or prints one of them.
//!
//! The endpoint and key come from `--endpoint`/`--api-key`, the `[azure]`
//! table of a settings file, or `AZURE_AI_SEARCH_ENDPOINT` and
//! `AZURE_AI_SEARCH_API_KEY`, in that order.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use chainkit::vectorstores::azureaisearch::{self, AzureAISearchStore};
use chainkit::{HashingEmbedder, Settings};

#[derive(Parser)]
#[command(name = "index-browser", about = "Browse Azure AI Search indexes", version)]
struct Cli {
    /// Index to print instead of listing all of them
    index: Option<String>,

    /// TOML settings file with an [azure] table
    #[arg(short, long)]
    settings: Option<PathBuf>,

    #[arg(long)]
    endpoint: Option<String>,

    #[arg(long)]
    api_key: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    chainkit::telemetry::init_tracing(if cli.verbose { "debug" } else { "info" })?;

    let settings = match &cli.settings {
        Some(path) => Settings::from_file(path)?,
        None => Settings::default(),
    };

    let mut options = settings.azure.options();
    options.push(azureaisearch::with_embedder(Arc::new(HashingEmbedder::default())));
    if let Some(endpoint) = cli.endpoint {
        options.push(azureaisearch::with_endpoint(endpoint));
    }
    if let Some(key) = cli.api_key {
        options.push(azureaisearch::with_api_key(key));
    }
    let store = AzureAISearchStore::new(options)?;
    info!(endpoint = store.config().endpoint(), "connected");

    let body = match &cli.index {
        Some(name) => store.retrieve_index(name).await?,
        None => store.list_indexes().await?,
    };
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}
