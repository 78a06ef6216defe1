//! oaiconf - resolve OpenAI / Azure OpenAI credentials into llm_config JSON.
//!
//! Main entry point for the oaiconf CLI.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{auth, autogen, mode, show};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// oaiconf - resolve OpenAI / Azure OpenAI credentials into llm_config JSON
#[derive(Parser)]
#[command(name = "oaiconf")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Load this .env file instead of searching for one (cannot itself be set from .env)
    #[arg(long, global = true, env = "OAICONF_ENV_FILE")]
    pub env_file: Option<PathBuf>,

    /// TOML config file (default: <config dir>/oaiconf/config.toml if present)
    #[arg(long, global = true, env = commands::CONFIG_ENV)]
    pub config: Option<PathBuf>,

    /// Azure OpenAI API key override
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// API version override
    #[arg(long, global = true)]
    pub api_version: Option<String>,

    /// Azure OpenAI endpoint override
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Azure OpenAI deployment override
    #[arg(long, global = true)]
    pub model: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the provider-agnostic config
    Show(show::ShowArgs),

    /// Print the AutoGen llm_config
    Autogen(autogen::AutogenArgs),

    /// Print the AutoGen llm_config with hyperparameters
    Custom(autogen::CustomArgs),

    /// Show the active auth mode and where it came from
    Mode,

    /// Interactive login management for managed-identity mode
    Auth(auth::AuthArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "oaiconf=debug,oaiconf_config=debug,oaiconf_identity=debug,info"
    } else {
        "oaiconf=info,oaiconf_identity=info,warn"
    };

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();

    let env_file = match &cli.env_file {
        Some(path) => Some(oaiconf_config::load_dotenv_from(path)?),
        None => oaiconf_config::load_dotenv()?,
    };
    match &env_file {
        Some(path) => tracing::debug!(path = %path.display(), "Environment seeded from .env"),
        None => tracing::debug!("No .env file found"),
    }

    let ctx = commands::Context::from_cli(&cli);

    match cli.command {
        Commands::Show(args) => show::run(args, &ctx),
        Commands::Autogen(args) => autogen::run(args, &ctx),
        Commands::Custom(args) => autogen::run_custom(args, &ctx),
        Commands::Mode => mode::run(&ctx),
        Commands::Auth(args) => auth::run(args, &ctx).await,
    }
}
