//! Show command - provider-agnostic config.

use anyhow::Result;
use clap::Args;

use super::{Context, print_json};

/// Arguments for the show command.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Print secrets unmasked
    #[arg(long)]
    pub reveal: bool,

    /// Fail if a value required by the active mode is missing
    #[arg(long)]
    pub strict: bool,
}

/// Run the show command.
pub fn run(args: ShowArgs, ctx: &Context) -> Result<()> {
    let config = ctx.resolve()?;
    if args.strict {
        config.validate()?;
    }
    print_json(&config.get_config(), args.reveal)
}
