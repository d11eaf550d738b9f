//
//  vika
//  util/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Utility Module
//!
//! Small helpers shared by the command implementations.
//!
//! - **Time**: [`format_time_millis`]
//! - **Size**: [`format_size`]
//! - **Cell input**: [`parse_field_assignment`], [`parse_fields`]

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local};
use serde_json::Value;

use crate::api::datasheet::Fields;

/// Formats epoch milliseconds as a local `YYYY-MM-DD HH:MM:SS` string.
///
/// Unrepresentable timestamps give `"Unknown"`.
pub fn format_time_millis(millis: i64) -> String {
    match DateTime::from_timestamp_millis(millis) {
        Some(dt) => {
            let local: DateTime<Local> = dt.into();
            local.format("%Y-%m-%d %H:%M:%S").to_string()
        }
        None => "Unknown".to_string(),
    }
}

/// Formats a byte count with binary units, e.g. `1.5 KB`.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Parses a `NAME=VALUE` cell assignment.
///
/// The value is read as JSON when it parses as JSON (`3`, `true`,
/// `["a","b"]`), otherwise it is kept as a plain string.
pub fn parse_field_assignment(input: &str) -> Result<(String, Value)> {
    let Some((name, raw)) = input.split_once('=') else {
        bail!("Invalid field '{}': expected NAME=VALUE", input);
    };
    let name = name.trim();
    if name.is_empty() {
        bail!("Invalid field '{}': name is empty", input);
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((name.to_string(), value))
}

/// Builds a cell map from `--field` assignments and an optional JSON object.
///
/// Assignments win over keys of the same name in `json`.
pub fn parse_fields(assignments: &[String], json: Option<&str>) -> Result<Fields> {
    let mut fields = match json {
        Some(raw) => {
            let value: Value = serde_json::from_str(raw).context("Invalid --json-fields value")?;
            match value {
                Value::Object(map) => map,
                _ => bail!("--json-fields must be a JSON object"),
            }
        }
        None => Fields::new(),
    };

    for assignment in assignments {
        let (name, value) = parse_field_assignment(assignment)?;
        fields.insert(name, value);
    }

    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(1_048_576), "1.0 MB");
    }

    #[test]
    fn test_format_time_millis_out_of_range() {
        assert_eq!(format_time_millis(i64::MAX), "Unknown");
        assert_ne!(format_time_millis(1_700_000_000_000), "Unknown");
    }

    #[test]
    fn test_parse_field_assignment() {
        assert_eq!(
            parse_field_assignment("Title=Launch plan").unwrap(),
            ("Title".to_string(), json!("Launch plan"))
        );
        assert_eq!(
            parse_field_assignment("Count=3").unwrap(),
            ("Count".to_string(), json!(3))
        );
        assert_eq!(
            parse_field_assignment("Tags=[\"a\",\"b\"]").unwrap().1,
            json!(["a", "b"])
        );
        assert_eq!(
            parse_field_assignment("Formula=a=b").unwrap().1,
            json!("a=b")
        );
        assert!(parse_field_assignment("NoEquals").is_err());
        assert!(parse_field_assignment("=value").is_err());
    }

    #[test]
    fn test_parse_fields_merges() {
        let fields = parse_fields(
            &["Title=New".to_string()],
            Some(r#"{"Title": "Old", "Done": true}"#),
        )
        .unwrap();
        assert_eq!(fields["Title"], json!("New"));
        assert_eq!(fields["Done"], json!(true));

        assert!(parse_fields(&[], Some("[1, 2]")).is_err());
        assert!(parse_fields(&[], None).unwrap().is_empty());
    }
}
