//
//  vika
//  config/hosts.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Host Handling
//!
//! The API host may be written many ways (`api.vika.cn`,
//! `https://API.vika.cn/`, `http://localhost:8080`). This module turns any of
//! them into a base URL for requests and a stable key for the keyring.
//!
//! ## Usage
//!
//! ```rust
//! use vika::config::{host_key, normalize_host, DEFAULT_HOST};
//!
//! assert_eq!(normalize_host("API.vika.cn/"), "https://api.vika.cn");
//! assert_eq!(host_key(DEFAULT_HOST), "api.vika.cn");
//! ```

use url::Url;

use crate::api::{Result, VikaError};

/// Host used when none is configured.
pub const DEFAULT_HOST: &str = "https://api.vika.cn";

/// Parses a host into a base URL.
///
/// A missing scheme defaults to `https`. Query strings and fragments are
/// rejected; a path prefix is kept.
///
/// # Errors
///
/// [`VikaError::LocalValidation`] when the host is empty or not a valid
/// `http`/`https` URL.
pub fn parse_base_url(host: &str) -> Result<Url> {
    let host = host.trim();
    if host.is_empty() {
        return Err(VikaError::invalid("host must not be empty"));
    }

    let candidate = if host.contains("://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    };

    let url = Url::parse(&candidate)
        .map_err(|e| VikaError::invalid(format!("invalid host '{}': {}", host, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(VikaError::invalid(format!(
            "invalid host '{}': unsupported scheme {}",
            host,
            url.scheme()
        )));
    }
    if url.host_str().is_none() {
        return Err(VikaError::invalid(format!("invalid host '{}': no host name", host)));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(VikaError::invalid(format!(
            "invalid host '{}': query strings are not allowed",
            host
        )));
    }

    Ok(url)
}

/// Normalizes a host to `scheme://host[:port][/prefix]` without a trailing slash.
///
/// Unparseable input is returned trimmed so the caller's error surfaces later.
pub fn normalize_host(host: &str) -> String {
    match parse_base_url(host) {
        Ok(url) => url.as_str().trim_end_matches('/').to_string(),
        Err(_) => host.trim().to_string(),
    }
}

/// Returns the keyring key for a host: its lower-case `host[:port]`.
pub fn host_key(host: &str) -> String {
    match parse_base_url(host) {
        Ok(url) => match (url.host_str(), url.port()) {
            (Some(name), Some(port)) => format!("{}:{}", name, port),
            (Some(name), None) => name.to_string(),
            _ => host.trim().to_lowercase(),
        },
        Err(_) => host.trim().to_lowercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_adds_https() {
        let url = parse_base_url("api.vika.cn").unwrap();
        assert_eq!(url.as_str(), "https://api.vika.cn/");
    }

    #[test]
    fn test_parse_keeps_http_and_port() {
        let url = parse_base_url("http://127.0.0.1:8080").unwrap();
        assert_eq!(url.scheme(), "http");
        assert_eq!(url.port(), Some(8080));
    }

    #[test]
    fn test_parse_rejects_bad_hosts() {
        assert!(parse_base_url("").is_err());
        assert!(parse_base_url("ftp://api.vika.cn").is_err());
        assert!(parse_base_url("https://api.vika.cn/?x=1").is_err());
    }

    #[test]
    fn test_normalize_host() {
        assert_eq!(normalize_host("https://API.VIKA.CN/"), "https://api.vika.cn");
        assert_eq!(normalize_host("vika.example.com/api/"), "https://vika.example.com/api");
    }

    #[test]
    fn test_host_key() {
        assert_eq!(host_key("https://api.vika.cn"), "api.vika.cn");
        assert_eq!(host_key("http://localhost:3000"), "localhost:3000");
        assert_eq!(host_key("API.vika.cn"), "api.vika.cn");
    }
}
