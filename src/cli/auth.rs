//
//  vika
//  cli/auth.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Authentication commands.
//!
//! Tokens are kept in the system keyring, keyed by host, so one machine can
//! hold tokens for several Vika deployments.

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};

use crate::api::VikaClient;
use crate::auth::{
    read_token_from_stdin, validate_token, verify_token, Credential, KeyringStore,
};
use crate::config::{host_key, ClientConfig, Config};
use crate::interactive::{is_interactive, prompt_confirm_with_default, prompt_password};
use crate::output::{OutputFormat, OutputWriter};

use super::GlobalOptions;

/// Authenticate with Vika.
#[derive(Args, Debug)]
pub struct AuthCommand {
    #[command(subcommand)]
    pub command: AuthSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthSubcommand {
    /// Store an API token for a host
    Login(LoginArgs),

    /// Remove the stored token for a host
    Logout,

    /// View authentication status
    Status(StatusArgs),
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Read token from standard input
    #[arg(long)]
    pub with_token: bool,

    /// Store the token without checking it against the API
    #[arg(long)]
    pub skip_verify: bool,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Show the authentication token (masked)
    #[arg(long, short = 't')]
    pub show_token: bool,
}

impl AuthCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            AuthSubcommand::Login(args) => login(args, global).await,
            AuthSubcommand::Logout => logout(global).await,
            AuthSubcommand::Status(args) => status(args, global).await,
        }
    }
}

async fn login(args: &LoginArgs, global: &GlobalOptions) -> Result<()> {
    let config = Config::load()?;
    let host = global.resolve_host(&config);
    let key = host_key(&host);
    let keyring = KeyringStore::new();
    let writer = OutputWriter::new(OutputFormat::Table);

    if keyring.get(&key)?.is_some() && !args.with_token && is_interactive() && !global.no_prompt {
        println!("A token is already stored for {}", key);
        if !prompt_confirm_with_default("Replace it?", false)? {
            return Ok(());
        }
    }

    let token = if args.with_token {
        read_token_from_stdin()?
    } else if is_interactive() && !global.no_prompt {
        println!("Create a token under your Vika account's developer settings.");
        prompt_password("API token")?
    } else {
        bail!("No terminal available. Pipe the token in with 'vika auth login --with-token'.");
    };

    if !validate_token(&token) {
        bail!("Invalid token format");
    }

    if !args.skip_verify {
        let client = VikaClient::new(ClientConfig {
            credential: Credential::new(token.as_str()),
            ..global.client_config(&config, Some(token.clone()))?
        })?;

        println!("Validating token...");
        let spaces = verify_token(&client)
            .await
            .context("Token was rejected")?;
        writer.write_success(&format!("Token can see {} space(s)", spaces));
    }

    keyring.store(&key, &token)?;
    writer.write_success(&format!("Logged in to {}", key));

    Ok(())
}

async fn logout(global: &GlobalOptions) -> Result<()> {
    let config = Config::load()?;
    let key = host_key(&global.resolve_host(&config));
    let keyring = KeyringStore::new();

    if keyring.get(&key)?.is_none() {
        println!("Not logged in to {}", key);
        return Ok(());
    }

    keyring.delete(&key)?;
    OutputWriter::new(OutputFormat::Table).write_success(&format!("Logged out of {}", key));

    Ok(())
}

async fn status(args: &StatusArgs, global: &GlobalOptions) -> Result<()> {
    let config = Config::load()?;
    let host = global.resolve_host(&config);
    let key = host_key(&host);

    let (token, source) = match global.token.clone().filter(|t| !t.is_empty()) {
        Some(token) => (Some(token), "VIKA_TOKEN"),
        None => (KeyringStore::new().get(&key)?, "keyring"),
    };

    let Some(token) = token else {
        println!("Not logged in to {}", key);
        println!();
        println!("Run 'vika auth login' to authenticate");
        return Ok(());
    };

    let client = VikaClient::new(global.client_config(&config, Some(token.clone()))?)?;
    let spaces = verify_token(&client).await;

    println!("{}", host);
    println!("  Token source: {}", source);
    match spaces {
        Ok(count) => println!("  Status: Active ({} space(s))", count),
        Err(e) => println!("  Status: Invalid ({})", e),
    }
    if args.show_token {
        println!("  Token: {}", mask_token(&token));
    }

    Ok(())
}

/// Masks a token for display (shows first and last 4 characters).
fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 8 {
        "*".repeat(chars.len())
    } else {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("short"), "*****");
        assert_eq!(mask_token("uskABCDEFGHIJ1234"), "uskA...1234");
    }
}
