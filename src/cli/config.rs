//
//  vika
//  cli/config.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! CLI configuration commands
//!
//! Reads and writes the keys of the `[core]` table in `config.toml`.

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use console::style;

use crate::config::{Config, CONFIG_KEYS};

use super::GlobalOptions;

/// Manage CLI configuration
#[derive(Args, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigSubcommand {
    /// Get a configuration value
    Get(GetArgs),

    /// Set a configuration value
    Set(SetArgs),

    /// Unset a configuration value
    Unset(GetArgs),

    /// List all configuration values
    #[command(visible_alias = "ls")]
    List,

    /// Show configuration file path
    Path,
}

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Configuration key
    pub key: String,
}

#[derive(Args, Debug)]
pub struct SetArgs {
    /// Configuration key
    pub key: String,

    /// Configuration value
    pub value: String,
}

impl ConfigCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            ConfigSubcommand::Get(args) => self.get(args, global).await,
            ConfigSubcommand::Set(args) => self.set(args, global).await,
            ConfigSubcommand::Unset(args) => self.unset(args, global).await,
            ConfigSubcommand::List => self.list(global).await,
            ConfigSubcommand::Path => self.path(global).await,
        }
    }

    async fn get(&self, args: &GetArgs, global: &GlobalOptions) -> Result<()> {
        ensure_known_key(&args.key)?;
        let value = Config::load()?.get(&args.key);

        if global.json {
            let result = serde_json::json!({
                "key": args.key,
                "value": value,
            });
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else if let Some(v) = value {
            println!("{}", v);
        }

        Ok(())
    }

    async fn set(&self, args: &SetArgs, global: &GlobalOptions) -> Result<()> {
        ensure_known_key(&args.key)?;
        let mut config = Config::load()?;
        config.set(&args.key, args.value.clone())?;
        config.save()?;

        let stored = config.get(&args.key).unwrap_or_default();
        if global.json {
            let result = serde_json::json!({
                "success": true,
                "key": args.key,
                "value": stored,
            });
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            println!(
                "{} Set {} = {}",
                style("✓").green(),
                style(&args.key).cyan(),
                stored
            );
        }

        Ok(())
    }

    async fn unset(&self, args: &GetArgs, global: &GlobalOptions) -> Result<()> {
        ensure_known_key(&args.key)?;
        let mut config = Config::load()?;
        config.unset(&args.key);
        config.save()?;

        if global.json {
            let result = serde_json::json!({
                "success": true,
                "key": args.key,
            });
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            println!("{} Unset {}", style("✓").green(), style(&args.key).cyan());
        }

        Ok(())
    }

    async fn list(&self, global: &GlobalOptions) -> Result<()> {
        let config = Config::load()?;

        if global.json {
            let values: serde_json::Map<String, serde_json::Value> = CONFIG_KEYS
                .iter()
                .map(|key| (key.to_string(), serde_json::json!(config.get(key))))
                .collect();
            println!("{}", serde_json::to_string_pretty(&values)?);
            return Ok(());
        }

        println!();
        println!("{}", style("Configuration").bold());
        println!("{}", "-".repeat(50));
        for key in CONFIG_KEYS {
            match config.get(key) {
                Some(value) => println!("  {:<20} {}", style(key).cyan(), value),
                None => println!("  {:<20} {}", style(key).cyan(), style("(not set)").dim()),
            }
        }
        println!();

        Ok(())
    }

    async fn path(&self, global: &GlobalOptions) -> Result<()> {
        let path = Config::config_path()?;

        if global.json {
            let result = serde_json::json!({
                "path": path,
                "exists": path.exists(),
            });
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            println!("{}", path.display());
        }

        Ok(())
    }
}

fn ensure_known_key(key: &str) -> Result<()> {
    if !CONFIG_KEYS.contains(&key) {
        bail!(
            "Unknown configuration key '{}'. Valid keys: {}",
            key,
            CONFIG_KEYS.join(", ")
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_key_lists_valid_keys() {
        let err = ensure_known_key("editor").unwrap_err().to_string();
        assert!(err.contains("default_datasheet"));
        assert!(ensure_known_key("field_key").is_ok());
    }
}
