//
//  vika
//  interactive/prompt.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Interactive prompts built on `dialoguer`.
//!
//! Commands only prompt when stdin is a terminal; see [`is_interactive`].

use anyhow::Result;
use dialoguer::{Confirm, Password};

/// The user declined a confirmation prompt.
#[derive(Debug, thiserror::Error)]
#[error("Operation cancelled")]
pub struct Cancelled;

/// Prompts for a secret without echoing it.
///
/// Used by `vika auth login` when `--with-token` is not given.
pub fn prompt_password(message: &str) -> Result<String> {
    let password = Password::new().with_prompt(message).interact()?;
    Ok(password)
}

/// Prompts for a yes/no answer; Enter accepts `default`.
pub fn prompt_confirm_with_default(message: &str, default: bool) -> Result<bool> {
    let confirmed = Confirm::new()
        .with_prompt(message)
        .default(default)
        .interact()?;
    Ok(confirmed)
}

/// Whether both stdin and stderr are attached to a terminal.
pub fn is_interactive() -> bool {
    console::user_attended_stderr() && std::io::IsTerminal::is_terminal(&std::io::stdin())
}
