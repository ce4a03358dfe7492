//! Jotter command-line shell
//!
//! Line-oriented front end over `jotter-app`: log in, list, add, edit and
//! delete notes against the configured network.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod effects;
mod handlers;

use commands::shell::ShellArgs;

#[derive(Parser)]
#[command(name = "jotter")]
#[command(about = "Jotter - notes on a remote store", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path
    #[arg(short, long, global = true, default_value = ".jotter/config.toml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive shell
    Shell(ShellArgs),

    /// Print the effective network configuration
    Config,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .init();

    let config = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Shell(args) => {
            let effects = effects::build(&args)?;
            handlers::shell::run(config, effects).await?;
        }
        Commands::Config => {
            print!("{}", config.to_toml()?);
            println!("# store endpoint: {}", config.store_endpoint().endpoint);
            println!("# identity provider: {}", config.authorize_url());
        }
    }

    Ok(())
}
