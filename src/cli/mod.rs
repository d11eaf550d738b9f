//
//  vika
//  cli/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! CLI command definitions using clap derive macros

mod auth;
mod completion;
mod config;
mod field;
mod record;
mod space;
mod upload;

pub use auth::AuthCommand;
pub use completion::CompletionCommand;
pub use config::ConfigCommand;
pub use field::FieldCommand;
pub use record::RecordCommand;
pub use space::SpaceCommand;
pub use upload::UploadCommand;

use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use crate::api::datasheet::FieldKey;
use crate::api::VikaClient;
use crate::auth::KeyringStore;
use crate::config::{host_key, normalize_host, ClientConfig, Config, DEFAULT_HOST, DEFAULT_TIMEOUT};

/// Vika CLI - Work with Vika datasheets from the command line
#[derive(Parser, Debug)]
#[command(
    name = "vika",
    version,
    about = "Work with Vika datasheets from the command line",
    long_about = "vika reads and writes records, inspects fields, uploads attachments \
                  and browses spaces through the Vika Fusion API.",
    propagate_version = true,
    after_help = "Use 'vika <command> --help' for more information about a command."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOptions,
}

/// Global options available to all commands
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOptions {
    /// API token (overrides the token stored by `vika auth login`)
    #[arg(long, global = true, env = "VIKA_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// API host
    #[arg(long, global = true, env = "VIKA_HOST")]
    pub host: Option<String>,

    /// Address fields by name or by id
    #[arg(long, global = true, env = "VIKA_FIELD_KEY", value_parser = ["name", "id"])]
    pub field_key: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, env = "VIKA_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Output format as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable interactive prompts
    #[arg(long, global = true, env = "VIKA_NO_PROMPT")]
    pub no_prompt: bool,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Authenticate with Vika
    #[command(visible_alias = "login")]
    Auth(AuthCommand),

    /// Read and write datasheet records
    #[command(visible_alias = "rec")]
    Record(RecordCommand),

    /// Inspect datasheet fields
    Field(FieldCommand),

    /// Upload an attachment to a datasheet
    Upload(UploadCommand),

    /// Browse spaces and their nodes
    Space(SpaceCommand),

    /// Manage CLI configuration
    Config(ConfigCommand),

    /// Generate shell completion scripts
    Completion(CompletionCommand),

    /// Print version information
    Version,
}

impl GlobalOptions {
    /// Host from flag or environment, then config file, then the default.
    pub fn resolve_host(&self, config: &Config) -> String {
        self.host
            .as_deref()
            .or(config.core.host.as_deref())
            .map(normalize_host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string())
    }

    /// Builds the client settings from these options, the config file and a
    /// token previously stored for the host.
    pub fn client_config(&self, config: &Config, stored_token: Option<String>) -> Result<ClientConfig> {
        let host = self.resolve_host(config);

        let token = match self.token.clone().filter(|t| !t.is_empty()).or(stored_token) {
            Some(token) => token,
            None => bail!(
                "Not authenticated with {}. Run 'vika auth login' or set VIKA_TOKEN.",
                host
            ),
        };

        let field_key = match self.field_key.as_deref() {
            Some(key) => key.parse::<FieldKey>()?,
            None => config.core.field_key.unwrap_or_default(),
        };

        // Zero seconds means unset at every layer.
        let timeout = self
            .timeout
            .filter(|&secs| secs > 0)
            .or(config.core.timeout_secs.filter(|&secs| secs > 0))
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);

        Ok(ClientConfig {
            host,
            field_key,
            timeout,
            debug: config.core.debug.unwrap_or(false),
            ..ClientConfig::new(token)
        })
    }

    /// Field key given on the command line, if any.
    pub fn field_key_override(&self) -> Result<Option<FieldKey>> {
        self.field_key
            .as_deref()
            .map(|key| key.parse::<FieldKey>().map_err(anyhow::Error::from))
            .transpose()
    }
}

/// Creates an API client for a command.
///
/// The stored token is only looked up when no token was given explicitly.
pub fn build_client(global: &GlobalOptions) -> Result<VikaClient> {
    let config = Config::load()?;

    let stored_token = if global.token.as_deref().is_some_and(|t| !t.is_empty()) {
        None
    } else {
        let host = global.resolve_host(&config);
        KeyringStore::new().get(&host_key(&host))?
    };

    let client_config = global.client_config(&config, stored_token)?;
    let client = VikaClient::new(client_config).context("Failed to create API client")?;
    Ok(client)
}

/// Picks the datasheet given on the command line or the configured default.
pub fn resolve_datasheet(datasheet: Option<&str>, config: &Config) -> Result<String> {
    datasheet
        .or(config.core.default_datasheet.as_deref())
        .map(str::to_string)
        .context("No datasheet given. Pass a datasheet id or run 'vika config set default_datasheet <ID>'.")
}
