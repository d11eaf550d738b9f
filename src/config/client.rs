//
//  vika
//  config/client.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Client configuration shared by every request.

use std::time::Duration;

use url::Url;

use super::hosts::{parse_base_url, DEFAULT_HOST};
use crate::api::datasheet::FieldKey;
use crate::api::Result;
use crate::auth::Credential;

/// Per-request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Immutable settings for a [`VikaClient`](crate::api::VikaClient).
///
/// A `ClientConfig` is built once and then shared behind an `Arc` by the
/// client and every facade derived from it. Override individual defaults with
/// struct update syntax:
///
/// ```rust
/// use std::time::Duration;
/// use vika::api::datasheet::FieldKey;
/// use vika::config::ClientConfig;
///
/// let config = ClientConfig {
///     field_key: FieldKey::Id,
///     timeout: Duration::from_secs(10),
///     ..ClientConfig::new("usk_token")
/// };
///
/// assert_eq!(config.host, "https://api.vika.cn");
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API token sent as a bearer credential.
    pub credential: Credential,

    /// Base URL of the API, scheme included.
    pub host: String,

    /// Field key convention applied when a request does not choose one.
    pub field_key: FieldKey,

    /// Timeout covering the whole of each request.
    pub timeout: Duration,

    /// Trace request and response bodies at `trace` level.
    pub debug: bool,
}

impl ClientConfig {
    /// Creates a configuration with the default host, field key and timeout.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            credential: Credential::new(token),
            host: DEFAULT_HOST.to_string(),
            field_key: FieldKey::default(),
            timeout: DEFAULT_TIMEOUT,
            debug: false,
        }
    }

    /// Parses [`host`](Self::host) into a URL.
    pub fn base_url(&self) -> Result<Url> {
        parse_base_url(&self.host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::new("token");
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.field_key, FieldKey::Name);
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert!(!config.debug);
        assert_eq!(config.credential.token(), "token");
    }

    #[test]
    fn test_debug_output_hides_token() {
        let config = ClientConfig::new("usk_secret_value");
        assert!(!format!("{:?}", config).contains("usk_secret_value"));
    }

    #[test]
    fn test_base_url() {
        let config = ClientConfig {
            host: "localhost:9000".into(),
            ..ClientConfig::new("t")
        };
        assert_eq!(config.base_url().unwrap().as_str(), "https://localhost:9000/");
    }
}
