//
//  vika
//  auth/token.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # API Token Helpers
//!
//! Vika API tokens are created from the user centre of the Vika web app
//! ("Developer configuration"). This module reads them from stdin, checks
//! their shape, and verifies them against the service.

use anyhow::Result;

use crate::api::VikaClient;

/// Reads a single line from stdin and trims it.
///
/// Used by `vika auth login --with-token`.
pub fn read_token_from_stdin() -> Result<String> {
    use std::io::{self, BufRead};

    let stdin = io::stdin();
    let mut line = String::new();
    stdin.lock().read_line(&mut line)?;

    Ok(line.trim().to_string())
}

/// Performs a basic shape check: non-empty and without whitespace.
pub fn validate_token(token: &str) -> bool {
    !token.is_empty() && !token.chars().any(char::is_whitespace)
}

/// Checks that the client's token is accepted by the service.
///
/// Lists spaces, the cheapest call that requires authentication.
///
/// # Returns
///
/// The number of spaces visible to the token.
pub async fn verify_token(client: &VikaClient) -> crate::api::Result<usize> {
    let spaces = client.spaces().await?;
    Ok(spaces.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_token() {
        assert!(validate_token("uskABCdef123"));
        assert!(!validate_token(""));
        assert!(!validate_token("usk abc"));
        assert!(!validate_token("usk\tabc"));
    }
}
