//! Mode command - active auth mode.

use anyhow::Result;

use super::Context;

/// Run the mode command.
pub fn run(ctx: &Context) -> Result<()> {
    let config = ctx.resolve()?;
    println!("{} (from {})", config.auth_mode(), config.mode_source());
    if let Some(provider) = config.token_provider() {
        println!("Token provider: {}", provider.descriptor());
    }
    if ctx.verbose
        && let Some(path) = &ctx.overrides.config_file
    {
        println!("Config file: {}", path.display());
    }
    Ok(())
}
