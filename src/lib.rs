//
//  vika
//  lib.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Vika Client Library
//!
//! A client for the Vika datasheet service, plus the `vika` command-line tool
//! built on it.
//!
//! ## Overview
//!
//! Vika stores tabular data in datasheets grouped into spaces. This crate
//! wraps its Fusion REST API so records can be listed, found, created,
//! updated and deleted, field metadata inspected, and files uploaded as
//! attachments, all with typed requests and responses.
//!
//! ## Module Structure
//!
//! - [`api`]: HTTP client, request trait, envelope codec and resource facades
//! - [`auth`]: Bearer credential and token storage in the system keychain
//! - [`config`]: Client settings and the CLI's configuration file
//! - [`cli`]: Command-line interface definitions using clap
//! - [`output`]: Output formatting (Table, JSON)
//! - [`interactive`]: Interactive prompts
//! - [`util`]: Utility functions
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use vika::api::datasheet::{NewRecord, RecordQuery, Sort};
//! use vika::api::VikaClient;
//! use vika::config::ClientConfig;
//!
//! # async fn example() -> vika::api::Result<()> {
//! let client = VikaClient::new(ClientConfig::new("usk_your_token"))?;
//! let sheet = client.datasheet("dstWUHwzTHd2YQaXEE");
//!
//! let open = sheet
//!     .all_records(
//!         RecordQuery::new()
//!             .filter(r#"{Status}="Open""#)
//!             .sort(Sort::desc("Priority")),
//!     )
//!     .await?;
//!
//! sheet
//!     .create(vec![NewRecord::new().field("Title", "Follow up")], None)
//!     .await?;
//! # Ok(())
//! # }
//! ```

/// Command-line interface definitions.
///
/// Contains all CLI commands, arguments, and subcommands defined using the clap derive API.
pub mod cli;

/// Client for the Vika Fusion API.
pub mod api;

/// Authentication and credential management.
///
/// - Bearer token attached to every request
/// - Secure token storage via system keychain, one entry per host
pub mod auth;

/// Configuration.
///
/// Holds the immutable [`ClientConfig`](config::ClientConfig) and the CLI's
/// `config.toml`.
pub mod config;

/// Output formatting for table and JSON modes.
pub mod output;

/// Interactive terminal prompts.
pub mod interactive;

/// Utility functions and helpers.
pub mod util;

pub use api::{VikaClient, VikaError};
pub use cli::Cli;
pub use config::{ClientConfig, Config};

/// Application name constant.
///
/// The name of the CLI binary, used for display purposes and configuration paths.
pub const APP_NAME: &str = "vika";

/// Application version constant, derived from Cargo.toml.
///
/// ```rust
/// use vika::VERSION;
///
/// println!("vika version {}", VERSION);
/// ```
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit codes for the CLI.
///
/// Standardized exit codes following Unix conventions, allowing scripts
/// to programmatically detect the outcome of CLI operations.
///
/// # Exit Code Ranges
///
/// - `0`: Success
/// - `1-3`: General errors and usage issues
/// - `4-7`: Authentication-related issues
/// - `8-15`: Resource-related issues
/// - `16-31`: Operation-related issues
/// - `32+`: External service issues
pub mod exit_codes {
    /// Successful execution.
    pub const SUCCESS: i32 = 0;

    /// General error. Check stderr for details.
    pub const ERROR: i32 = 1;

    /// Invalid usage or arguments, including requests rejected before sending.
    pub const USAGE: i32 = 2;

    /// The token is missing, invalid or lacks permission.
    ///
    /// Run `vika auth login` to authenticate.
    pub const AUTH_ERROR: i32 = 4;

    /// The datasheet, record or node does not exist.
    pub const NOT_FOUND: i32 = 8;

    /// The user declined a confirmation prompt.
    pub const CANCELLED: i32 = 16;

    /// The API rate limit has been exceeded. Wait before retrying.
    pub const RATE_LIMIT: i32 = 32;
}

/// Maps a command failure to its exit code.
///
/// Service errors are classified by their status or envelope code.
pub fn exit_code_for(error: &anyhow::Error) -> i32 {
    if error.downcast_ref::<interactive::Cancelled>().is_some() {
        return exit_codes::CANCELLED;
    }

    let Some(api_error) = error.chain().find_map(|e| e.downcast_ref::<VikaError>()) else {
        return exit_codes::ERROR;
    };

    match api_error {
        VikaError::LocalValidation(_) => exit_codes::USAGE,
        VikaError::Transport(_) | VikaError::LocalIo { .. } => exit_codes::ERROR,
        _ => match api_error.code() {
            401 | 403 => exit_codes::AUTH_ERROR,
            404 => exit_codes::NOT_FOUND,
            429 => exit_codes::RATE_LIMIT,
            _ => exit_codes::ERROR,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    fn api(code: i64) -> anyhow::Error {
        anyhow::Error::new(VikaError::Api {
            code,
            message: "failed".into(),
            request_id: None,
        })
    }

    #[test]
    fn test_exit_code_for_service_errors() {
        assert_eq!(exit_code_for(&api(401)), exit_codes::AUTH_ERROR);
        assert_eq!(exit_code_for(&api(404)), exit_codes::NOT_FOUND);
        assert_eq!(exit_code_for(&api(429)), exit_codes::RATE_LIMIT);
        assert_eq!(exit_code_for(&api(301)), exit_codes::ERROR);

        let status = anyhow::Error::new(VikaError::HttpStatus {
            code: 429,
            message: "Too Many Requests".into(),
        });
        assert_eq!(exit_code_for(&status), exit_codes::RATE_LIMIT);
    }

    #[test]
    fn test_exit_code_looks_through_context() {
        let err = Err::<(), _>(VikaError::invalid("bad page size"))
            .context("Listing records")
            .unwrap_err();
        assert_eq!(exit_code_for(&err), exit_codes::USAGE);

        let err = Err::<(), _>(api(401)).context("Deleted 0 of 3").unwrap_err();
        assert_eq!(exit_code_for(&err), exit_codes::AUTH_ERROR);
    }

    #[test]
    fn test_exit_code_for_other_errors() {
        assert_eq!(exit_code_for(&anyhow::anyhow!("boom")), exit_codes::ERROR);
        assert_eq!(
            exit_code_for(&anyhow::Error::new(interactive::Cancelled)),
            exit_codes::CANCELLED
        );
    }
}
