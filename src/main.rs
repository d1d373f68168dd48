use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use db::open;
use types::OutputFmt;

mod catalog;
mod cli;
mod commands;
mod completion;
mod db;
mod generator;
mod models;
mod progression;
mod store;
mod strength;
mod types;

fn default_db_path() -> Result<String> {
    let dir = dirs::data_dir()
        .context("could not determine the data directory")?
        .join("tonus");

    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;

    Ok(dir.join("tonus.db").display().to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let fmt = if cli.json { OutputFmt::Json } else { OutputFmt::Text };

    let db_path = match &cli.db {
        Some(path) => path.clone(),
        None => default_db_path()?,
    };

    let pool = open(&db_path).await?;

    match cli.cmd {
        Commands::Workout(cmd) => commands::workout::handle(cmd, &pool, fmt).await?,
        Commands::History(cmd) => commands::history::handle(cmd, &pool, fmt).await?,
        Commands::Profile(cmd) => commands::profile::handle(cmd, &pool, fmt).await?,
        Commands::Exercise(cmd) => commands::exercise::handle(cmd, fmt)?,
    }

    Ok(())
}
