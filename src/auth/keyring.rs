//
//  vika
//  auth/keyring.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Secure Token Storage
//!
//! Stores API tokens in the system's native keyring so the command-line tool
//! never writes them to the config file.
//!
//! ## Storage Model
//!
//! - **Service**: `vika-cli`
//! - **Username/Key**: The API host (see [`host_key`](crate::config::host_key))
//! - **Password/Value**: The raw API token
//!
//! ## Platform Support
//!
//! - **macOS**: Keychain Services
//! - **Linux**: Secret Service API (GNOME Keyring, KWallet)
//! - **Windows**: Windows Credential Manager

use anyhow::{Context, Result};
use keyring::Entry;

const SERVICE_NAME: &str = "vika-cli";

/// Token store backed by the system keyring.
pub struct KeyringStore {
    service: String,
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyringStore {
    pub fn new() -> Self {
        Self {
            service: SERVICE_NAME.to_string(),
        }
    }

    /// Saves the token for `host`, replacing any previous one.
    pub fn store(&self, host: &str, token: &str) -> Result<()> {
        let entry = Entry::new(&self.service, host).context("Failed to open keyring entry")?;
        entry
            .set_password(token)
            .context("Failed to store token in keyring")?;
        Ok(())
    }

    /// Returns the token stored for `host`, if any.
    pub fn get(&self, host: &str) -> Result<Option<String>> {
        let entry = Entry::new(&self.service, host).context("Failed to open keyring entry")?;
        match entry.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to read token from keyring"),
        }
    }

    /// Removes the token stored for `host`. Missing entries are not an error.
    pub fn delete(&self, host: &str) -> Result<()> {
        let entry = Entry::new(&self.service, host).context("Failed to open keyring entry")?;
        match entry.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to remove token from keyring"),
        }
    }
}
