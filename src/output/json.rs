//
//  vika
//  output/json.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # JSON Output Formatting
//!
//! | Function | Description | Use Case |
//! |----------|-------------|----------|
//! | [`write_json`] | Pretty-printed JSON | `--json` output |
//! | [`write_json_lines`] | One JSON object per line | `record list --all --json-lines` |

use std::io::{self, Write};

use serde::Serialize;

pub fn write_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_json_to(&mut handle, value)
}

pub fn write_json_to<W: Write, T: Serialize + ?Sized>(writer: &mut W, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, value)?;
    writeln!(writer)?;
    Ok(())
}

pub fn write_json_lines<T: Serialize>(values: &[T]) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_json_lines_to(&mut handle, values)
}

pub fn write_json_lines_to<W: Write, T: Serialize>(writer: &mut W, values: &[T]) -> anyhow::Result<()> {
    for value in values {
        serde_json::to_writer(&mut *writer, value)?;
        writeln!(writer)?;
    }
    Ok(())
}
