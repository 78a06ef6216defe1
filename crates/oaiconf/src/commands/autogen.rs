//! AutoGen commands - default and custom llm_config.

use anyhow::Result;
use clap::Args;
use oaiconf_config::OrchestratorParams;

use super::{Context, print_json};

/// Arguments for the autogen command.
#[derive(Args, Debug)]
pub struct AutogenArgs {
    /// Print secrets unmasked
    #[arg(long)]
    pub reveal: bool,
}

/// Arguments for the custom command.
#[derive(Args, Debug)]
pub struct CustomArgs {
    /// Sampling seed
    #[arg(long, default_value_t = 47, allow_negative_numbers = true)]
    pub seed: i64,

    /// Sampling temperature
    #[arg(long, default_value_t = 0.5)]
    pub temperature: f64,

    /// Maximum completion tokens (-1 for no limit)
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    pub max_tokens: i64,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 6000)]
    pub timeout: u64,

    /// Print secrets unmasked
    #[arg(long)]
    pub reveal: bool,
}

/// Run the autogen command.
pub fn run(args: AutogenArgs, ctx: &Context) -> Result<()> {
    let config = ctx.resolve()?;
    print_json(&config.get_default_orchestrator_config(), args.reveal)
}

/// Run the custom command.
pub fn run_custom(args: CustomArgs, ctx: &Context) -> Result<()> {
    let config = ctx.resolve()?;
    let params = OrchestratorParams::default()
        .with_seed(Some(args.seed))
        .with_temperature(Some(args.temperature))
        .with_max_tokens(Some(args.max_tokens))
        .with_timeout(Some(args.timeout));
    let custom = config.get_custom_orchestrator_config(params)?;
    print_json(&custom, args.reveal)
}
