//
//  vika
//  output/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Output Module
//!
//! Formats command results for the terminal:
//!
//! - **Table format**: Human-readable output for interactive use
//! - **JSON format**: Machine-readable output for scripting (`--json`)
//!
//! ## Core Components
//!
//! - [`OutputFormat`]: The available output formats
//! - [`OutputWriter`]: Main entry point for writing formatted output
//! - [`TableOutput`]: Trait for values that know how to print themselves as a table
//!
//! ## Example
//!
//! ```rust,ignore
//! use vika::output::{OutputWriter, OutputFormat};
//!
//! let writer = OutputWriter::new(OutputFormat::Json);
//! writer.write(&spaces)?;
//! writer.write_success("Deleted 3 records");
//! ```

mod json;
mod table;

pub use json::*;
pub use table::*;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl OutputFormat {
    /// Picks JSON when `--json` was given.
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            Self::Json
        } else {
            Self::Table
        }
    }
}

pub struct OutputWriter {
    format: OutputFormat,
    color: bool,
}

impl OutputWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            color: console::colors_enabled(),
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Writes a value as pretty JSON or as its table.
    pub fn write<T: Serialize + TableOutput + ?Sized>(&self, value: &T) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => write_json(value)?,
            OutputFormat::Table => value.print_table(self.color),
        }
        Ok(())
    }

    pub fn write_warning(&self, msg: &str) {
        use console::style;
        if self.color {
            eprintln!("{} {}", style("warning:").yellow().bold(), msg);
        } else {
            eprintln!("warning: {}", msg);
        }
    }

    /// Writes a status line; suppressed in JSON mode so stdout stays parseable.
    pub fn write_success(&self, msg: &str) {
        use console::style;
        if self.is_json() {
            return;
        }
        if self.color {
            println!("{} {}", style("✓").green().bold(), msg);
        } else {
            println!("✓ {}", msg);
        }
    }
}

pub trait TableOutput {
    fn print_table(&self, color: bool);
}

pub fn print_field(key: &str, value: &str, color: bool) {
    use console::style;
    if color {
        println!("{:<12} {}", style(format!("{}:", key)).dim(), value);
    } else {
        println!("{:<12} {}", format!("{}:", key), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_flag() {
        assert_eq!(OutputFormat::from_json_flag(true), OutputFormat::Json);
        assert_eq!(OutputFormat::from_json_flag(false), OutputFormat::Table);
        assert_eq!(OutputFormat::default(), OutputFormat::Table);
    }

    #[test]
    fn test_writer_reports_format() {
        let writer = OutputWriter::new(OutputFormat::Json);
        assert!(writer.is_json());
        assert_eq!(writer.format(), OutputFormat::Json);
    }
}
