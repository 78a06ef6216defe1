//! Auth command - interactive login management.

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use oaiconf_config::{FileConfig, ProcessEnv, interactive_credential, load_config_file};
use oaiconf_identity::{InteractiveBrowserCredential, TokenCache, TokenProvider};

use super::{Context, mask};

/// Arguments for the auth command.
#[derive(Args, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthCommand {
    /// Log in through the browser and cache tokens
    Login,

    /// Show cached token status
    Status,

    /// Clear cached tokens
    Logout,

    /// Print a bearer token, logging in if needed
    Token {
        /// Print the full token instead of a masked preview
        #[arg(long)]
        reveal: bool,
    },
}

/// Run the auth command.
pub async fn run(args: AuthArgs, ctx: &Context) -> Result<()> {
    let credential = credential(ctx)?;
    match args.command {
        AuthCommand::Login => cmd_login(&credential).await,
        AuthCommand::Status => cmd_status(&credential).await,
        AuthCommand::Logout => cmd_logout(&credential).await,
        AuthCommand::Token { reveal } => cmd_token(&credential, reveal).await,
    }
}

fn credential(ctx: &Context) -> Result<InteractiveBrowserCredential> {
    let file = match &ctx.overrides.config_file {
        Some(path) => load_config_file(path)?,
        None => FileConfig::default(),
    };
    Ok(interactive_credential(&ProcessEnv, &file))
}

async fn cmd_login(credential: &InteractiveBrowserCredential) -> Result<()> {
    if let Ok(Some(info)) = credential.cache().token_info().await
        && !info.is_expired
    {
        println!(
            "Already authenticated (expires in {})",
            info.expires_in_display()
        );
        println!("Run 'oaiconf auth logout' first to re-authenticate.");
        return Ok(());
    }

    println!("Azure OpenAI Interactive Login");
    println!("==============================");
    println!();
    println!("Tenant: {}", credential.config().tenant_id);
    println!("A browser window will open; finish signing in there.");
    println!("If it does not, open the sign-in URL logged below.");
    println!();

    let tokens = credential.login().await.context("Interactive login failed")?;

    println!("Authentication successful!");
    println!("Token expires in: {} seconds", tokens.expires_in);
    println!("Scope: {}", tokens.scope);
    Ok(())
}

async fn cmd_status(credential: &InteractiveBrowserCredential) -> Result<()> {
    println!("Authentication Status");
    println!("---------------------");
    println!("Tenant: {}", credential.config().tenant_id);

    match credential.cache().token_info().await {
        Ok(Some(info)) => {
            println!("Login: authenticated");
            println!("  Expires: {}", info.expires_in_display());
            println!("  Scope: {}", info.scope);
            if !info.created_at.is_empty() {
                println!("  Created: {}", info.created_at);
            }
        }
        Ok(None) => {
            println!("Login: not authenticated");
            println!("  Run 'oaiconf auth login' to sign in");
        }
        Err(e) => {
            println!("Login: error reading tokens: {}", e);
        }
    }
    Ok(())
}

async fn cmd_logout(credential: &InteractiveBrowserCredential) -> Result<()> {
    if credential.cache().has_tokens() {
        credential
            .logout()
            .await
            .context("Failed to delete tokens")?;
        println!("Cached tokens removed.");
    } else {
        println!("No cached tokens found.");
    }
    Ok(())
}

async fn cmd_token(credential: &InteractiveBrowserCredential, reveal: bool) -> Result<()> {
    let token = credential
        .get_token()
        .await
        .context("Failed to acquire token")?;
    if reveal {
        println!("{}", token.token);
    } else {
        println!("{}", mask(&token.token));
    }
    Ok(())
}
