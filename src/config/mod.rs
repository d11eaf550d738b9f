//
//  vika
//  config/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Configuration Module
//!
//! Two layers of configuration live here:
//!
//! - [`ClientConfig`]: the immutable settings a [`VikaClient`](crate::api::VikaClient)
//!   is built from (token, host, field key, timeout)
//! - [`Config`]: the command-line tool's TOML file, which supplies defaults
//!   for `ClientConfig` when no flag or environment variable does
//!
//! ## Configuration File Location
//!
//! - **Linux**: `~/.config/vika/config.toml`
//! - **macOS**: `~/Library/Application Support/vika/config.toml`
//! - **Windows**: `C:\Users\<User>\AppData\Roaming\vika\config\config.toml`
//!
//! Set `VIKA_CONFIG_DIR` to use a different directory.
//!
//! ## Example Configuration File
//!
//! ```toml
//! [core]
//! host = "https://api.vika.cn"
//! field_key = "name"
//! timeout_secs = 60
//! default_datasheet = "dstWUHwzTHd2YQaXEE"
//! debug = false
//! ```
//!
//! ## Precedence
//!
//! | Source | Priority |
//! |--------|----------|
//! | Command-line flag | 1 |
//! | Environment variable (`VIKA_HOST`, `VIKA_FIELD_KEY`, ...) | 1 |
//! | Config file | 2 |
//! | Built-in default | 3 |
//!
//! The API token is never stored in this file; see
//! [`KeyringStore`](crate::auth::KeyringStore).

mod client;
mod file;
mod hosts;

pub use client::*;
pub use file::*;
pub use hosts::*;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::api::datasheet::FieldKey;

/// Environment variable overriding the config directory.
pub const CONFIG_DIR_ENV: &str = "VIKA_CONFIG_DIR";

/// The keys accepted by [`Config::get`] and [`Config::set`].
pub const CONFIG_KEYS: &[&str] = &[
    "host",
    "field_key",
    "timeout",
    "default_datasheet",
    "debug",
];

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub core: CoreConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CoreConfig {
    /// API host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    /// Default field key convention (`name` or `id`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_key: Option<FieldKey>,

    /// Request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Datasheet used when a command is given none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_datasheet: Option<String>,

    /// Trace request and response bodies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<bool>,
}

impl Config {
    /// Loads the configuration from the default location.
    ///
    /// A missing file yields the default configuration.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !config_exists(path) {
            return Ok(Self::default());
        }
        let content = read_config_file(path)?;
        toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        write_config_file(path, &content)
    }

    /// Returns the config file path, honoring `VIKA_CONFIG_DIR`.
    pub fn config_path() -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|d| !d.is_empty()) {
            return Ok(PathBuf::from(dir).join("config.toml"));
        }
        let dirs = ProjectDirs::from("", "", "vika")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "host" => self.core.host.clone(),
            "field_key" => self.core.field_key.map(|k| k.to_string()),
            "timeout" => self.core.timeout_secs.map(|t| t.to_string()),
            "default_datasheet" => self.core.default_datasheet.clone(),
            "debug" => self.core.debug.map(|d| d.to_string()),
            _ => None,
        }
    }

    /// Sets a key from its string form.
    ///
    /// Returns `Ok(false)` for unknown keys and an error for invalid values.
    pub fn set(&mut self, key: &str, value: String) -> Result<bool> {
        match key {
            "host" => {
                parse_base_url(&value)?;
                self.core.host = Some(normalize_host(&value));
            }
            "field_key" => {
                self.core.field_key = Some(value.parse()?);
            }
            "timeout" => {
                let secs: u64 = value
                    .parse()
                    .with_context(|| format!("Invalid timeout '{}': expected seconds", value))?;
                if secs == 0 {
                    anyhow::bail!("Timeout must be at least 1 second");
                }
                self.core.timeout_secs = Some(secs);
            }
            "default_datasheet" => {
                self.core.default_datasheet = Some(value);
            }
            "debug" => {
                let debug: bool = value
                    .parse()
                    .with_context(|| format!("Invalid debug value '{}': expected true or false", value))?;
                self.core.debug = Some(debug);
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// Clears a key. Returns `false` for unknown keys.
    pub fn unset(&mut self, key: &str) -> bool {
        match key {
            "host" => self.core.host = None,
            "field_key" => self.core.field_key = None,
            "timeout" => self.core.timeout_secs = None,
            "default_datasheet" => self.core.default_datasheet = None,
            "debug" => self.core.debug = None,
            _ => return false,
        }
        true
    }
}
