//
//  vika
//  api/common/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Common API Types for the Vika datasheet service
//!
//! Every endpoint of the Vika Fusion API answers with the same JSON envelope:
//!
//! ```json
//! {"code": 200, "success": true, "message": "SUCCESS", "data": { ... }}
//! ```
//!
//! This module owns that envelope, the rule that decides whether its `data`
//! may be trusted, and the [`VikaError`] taxonomy every operation returns.
//!
//! # Overview
//!
//! - [`VikaError`] - Unified error type for all API operations
//! - [`Envelope`] - The uniform response wrapper
//! - [`decode_envelope`] / [`decode_ack`] - The envelope codec
//! - Pagination types and the page aggregator (re-exported from [`pagination`])
//!
//! # Decoding Order
//!
//! | Step | Condition | Result |
//! |------|-----------|--------|
//! | 1 | HTTP status not 200/201 | [`VikaError::HttpStatus`] |
//! | 2 | Body is not an envelope | [`VikaError::Parse`] |
//! | 3 | `success == false` or `code != 200` | [`VikaError::Api`] |
//! | 4 | `data` missing or wrong shape | [`VikaError::Parse`] |
//!
//! # Example
//!
//! ```rust
//! use vika::api::common::{decode_envelope, VikaError};
//! use reqwest::StatusCode;
//!
//! let body = br#"{"code": 403, "success": false, "message": "no permission"}"#;
//! let result: Result<serde_json::Value, VikaError> = decode_envelope(StatusCode::OK, body);
//!
//! match result {
//!     Err(VikaError::Api { code, message, .. }) => {
//!         assert_eq!(code, 403);
//!         assert_eq!(message, "no permission");
//!     }
//!     other => panic!("unexpected: {other:?}"),
//! }
//! ```

use std::path::PathBuf;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod pagination;

pub use pagination::*;

/// Code reported for failures that happen on the client side of the wire.
///
/// The service itself never produces this code for a successful envelope, so
/// it doubles as the code of parse and transport failures.
pub const CLIENT_ERROR_CODE: i64 = 500;

/// Code reported for requests rejected before they were sent.
pub const VALIDATION_ERROR_CODE: i64 = 400;

/// Unified error type for all Vika API operations.
///
/// `VikaError` separates failures by where they happened: before sending
/// (`LocalValidation`, `LocalIo`), on the wire (`Transport`), at the HTTP layer
/// (`HttpStatus`), while decoding (`Parse`), or inside the service (`Api`).
///
/// # Variants
///
/// | Variant | Raised when | `code()` |
/// |---------|-------------|----------|
/// | `Transport` | Connection failure or timeout, no response | 500 |
/// | `HttpStatus` | Response status outside 200/201 | HTTP status |
/// | `Parse` | Body is not the expected envelope or payload | 500 |
/// | `Api` | Envelope says `success: false` | server code |
/// | `LocalValidation` | Request shape rejected before sending | 400 |
/// | `LocalIo` | A file to upload could not be read | 500 |
///
/// # Notes
///
/// - No variant ever carries the bearer token
/// - Nothing is retried; every error reaches the caller unchanged
#[derive(Error, Debug)]
pub enum VikaError {
    /// A network-level error occurred before any response was received.
    ///
    /// Covers connection failures, DNS resolution errors and timeouts.
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with an HTTP status other than 200 or 201.
    #[error("HTTP {code}: {message}")]
    HttpStatus {
        /// The HTTP status code.
        code: u16,
        /// Status text followed by the raw response body.
        message: String,
    },

    /// The response body could not be decoded.
    #[error("Parse error: {message}")]
    Parse {
        /// Always [`CLIENT_ERROR_CODE`].
        code: i64,
        /// Decoder diagnostic.
        message: String,
    },

    /// The envelope was decoded but reports a failure.
    #[error("API error {code}: {message}")]
    Api {
        /// Server-supplied error code.
        code: i64,
        /// Server-supplied error message.
        message: String,
        /// Request identifier, when the server returned one.
        request_id: Option<String>,
    },

    /// The request was rejected locally before it was sent.
    #[error("Invalid request: {0}")]
    LocalValidation(String),

    /// A local file could not be read.
    #[error("Could not read {}: {source}", path.display())]
    LocalIo {
        /// The file that failed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl VikaError {
    /// Builds a [`VikaError::Parse`] from any displayable diagnostic.
    pub fn parse(message: impl std::fmt::Display) -> Self {
        Self::Parse {
            code: CLIENT_ERROR_CODE,
            message: message.to_string(),
        }
    }

    /// Builds a [`VikaError::LocalValidation`].
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::LocalValidation(message.into())
    }

    /// Returns the numeric code carried by this error.
    ///
    /// API errors carry the server code, HTTP errors the status code, and
    /// local failures a fixed client code.
    pub fn code(&self) -> i64 {
        match self {
            Self::Transport(_) | Self::LocalIo { .. } => CLIENT_ERROR_CODE,
            Self::HttpStatus { code, .. } => i64::from(*code),
            Self::Parse { code, .. } | Self::Api { code, .. } => *code,
            Self::LocalValidation(_) => VALIDATION_ERROR_CODE,
        }
    }

    /// Returns the human-readable message without the variant prefix.
    pub fn message(&self) -> String {
        match self {
            Self::Transport(e) => e.to_string(),
            Self::HttpStatus { message, .. }
            | Self::Parse { message, .. }
            | Self::Api { message, .. } => message.clone(),
            Self::LocalValidation(message) => message.clone(),
            Self::LocalIo { path, source } => format!("{}: {}", path.display(), source),
        }
    }

    /// Returns the server request id, or an empty string when there is none.
    pub fn request_id(&self) -> &str {
        match self {
            Self::Api {
                request_id: Some(id),
                ..
            } => id,
            _ => "",
        }
    }

    /// Returns `true` when the transport gave up waiting for a response.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }
}

/// Result alias used across the library.
pub type Result<T> = std::result::Result<T, VikaError>;

/// The uniform response wrapper returned by every endpoint.
///
/// # Type Parameters
///
/// - `T` - The operation-specific payload type
///
/// # Notes
///
/// - `data` is only meaningful when [`is_ok`](Self::is_ok) returns `true`
/// - `data` is absent on failures and on endpoints without a payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    /// Business status code; `200` on success.
    pub code: i64,

    /// Whether the operation succeeded.
    pub success: bool,

    /// Human-readable status message.
    #[serde(default)]
    pub message: String,

    /// Unique request identifier, used when reporting problems to the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,

    /// Operation payload.
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Checks the success gate: `success` must be set and `code` must be 200.
    pub fn is_ok(&self) -> bool {
        self.success && self.code == 200
    }

    /// Converts a failed envelope into a [`VikaError::Api`].
    ///
    /// Returns `Ok(self)` untouched when the envelope passes the gate.
    pub fn check(self) -> Result<Self> {
        if self.is_ok() {
            Ok(self)
        } else {
            Err(VikaError::Api {
                code: self.code,
                message: self.message,
                request_id: self.request_id,
            })
        }
    }
}

fn check_status(status: StatusCode, body: &[u8]) -> Result<()> {
    if status == StatusCode::OK || status == StatusCode::CREATED {
        return Ok(());
    }

    Err(VikaError::HttpStatus {
        code: status.as_u16(),
        message: format!(
            "Request failed with HTTP status {}, with body: {}",
            status,
            String::from_utf8_lossy(body)
        ),
    })
}

fn decode_checked(status: StatusCode, body: &[u8]) -> Result<Envelope<serde_json::Value>> {
    check_status(status, body)?;

    let envelope: Envelope<serde_json::Value> = serde_json::from_slice(body).map_err(|e| {
        VikaError::parse(format!(
            "Fail to parse json content: {}, because: {}",
            String::from_utf8_lossy(body),
            e
        ))
    })?;

    envelope.check()
}

/// Decodes a response body into the operation payload.
///
/// The envelope header is parsed first and gated; only then is `data`
/// decoded into `T`, so a failed envelope never leaks its payload.
///
/// # Errors
///
/// See the decoding order table in the module documentation.
pub fn decode_envelope<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> Result<T> {
    let envelope = decode_checked(status, body)?;

    let data = envelope
        .data
        .ok_or_else(|| VikaError::parse("Response envelope has no data"))?;

    serde_json::from_value(data)
        .map_err(|e| VikaError::parse(format!("Fail to decode response data, because: {}", e)))
}

/// Decodes a response that carries no payload, such as a delete.
///
/// Performs the status check and the success gate; `data` is ignored.
pub fn decode_ack(status: StatusCode, body: &[u8]) -> Result<()> {
    decode_checked(status, body).map(|_| ())
}
