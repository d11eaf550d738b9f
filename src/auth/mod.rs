//
//  vika
//  auth/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Authentication Module
//!
//! The Vika API authenticates every request with a single API token sent as a
//! bearer credential:
//!
//! ```text
//! Authorization: Bearer <token>
//! ```
//!
//! ## Module Structure
//!
//! - [`Credential`]: The token, redacted from all debug output
//! - [`keyring`]: Secure token storage for the command-line tool
//! - [`token`]: Token entry and verification helpers
//!
//! ## Example
//!
//! ```rust
//! use vika::auth::Credential;
//!
//! let credential = Credential::new("usk_secret");
//! assert_eq!(format!("{:?}", credential), "Credential { token: \"<redacted>\" }");
//! ```

mod keyring;
mod token;

pub use keyring::*;
pub use token::*;

use std::fmt;

use reqwest::RequestBuilder;

/// A Vika API token.
///
/// The token is immutable once created and is shared read-only by every
/// client that holds the same configuration.
///
/// # Notes
///
/// - `Debug` never prints the token
/// - There is intentionally no `Display` implementation
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
}

impl Credential {
    /// Wraps an API token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Returns the raw token.
    ///
    /// Only the transport and the keyring need this.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Returns `true` when no token has been supplied.
    pub fn is_empty(&self) -> bool {
        self.token.trim().is_empty()
    }

    /// Adds the `Authorization: Bearer` header to a request.
    pub fn apply_to_request(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(&self.token)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_token() {
        let credential = Credential::new("usk_very_secret");
        let debug = format!("{:?}", credential);
        assert!(!debug.contains("usk_very_secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_bearer_header_applied() {
        let credential = Credential::new("abc123");
        let request = credential
            .apply_to_request(reqwest::Client::new().get("https://api.vika.cn/fusion/v1/spaces"))
            .build()
            .unwrap();

        assert_eq!(
            request.headers().get(reqwest::header::AUTHORIZATION).unwrap(),
            "Bearer abc123"
        );
    }

    #[test]
    fn test_is_empty() {
        assert!(Credential::new("  ").is_empty());
        assert!(!Credential::new("t").is_empty());
    }
}
