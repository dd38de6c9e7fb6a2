//! dpsearch command-line entry point.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use dpsearch_cli::commands::{
    build_engine, cmd_query, cmd_search, cmd_spell, load_documents, load_model,
};
use dpsearch_cli::config_handlers::handle_config_command;
use dpsearch_cli::{Cli, Command};
use dpsearch_client::MockBackend;
use dpsearch_core::SearchConfig;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,dpsearch=debug".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Command::Config { action } => handle_config_command(config_path, action)?,
        Command::Query(args) => {
            let config = SearchConfig::load(config_path)?;
            let model = load_model(&config, None)?;
            let engine = build_engine(&config, Arc::new(MockBackend::new()), model);
            let request = cmd_query(&engine, &args)?;
            tracing::info!(id = %request.id(), term = %args.term, "Composed content request");
            println!("{}", serde_json::to_string_pretty(&request.to_json())?);
        }
        Command::Search { query, documents } => {
            let config = SearchConfig::load(config_path)?;
            let model = load_model(&config, None)?;
            let backend = MockBackend::with_documents(load_documents(Path::new(&documents))?);
            let engine = build_engine(&config, Arc::new(backend), model);
            println!("{}", cmd_search(&engine, &query).await?);
        }
        Command::Spell { terms, vectors } => {
            let config = SearchConfig::load(config_path)?;
            let Some(model) = load_model(&config, vectors.as_deref())? else {
                anyhow::bail!(
                    "No word vectors configured: pass --vectors or set model.vectors_path"
                );
            };
            let engine = build_engine(&config, Arc::new(MockBackend::new()), Some(model));
            println!("{}", cmd_spell(&engine, &terms)?);
        }
    }

    Ok(())
}
