//
//  vika
//  cli/field.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Field commands

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use console::style;
use serde::Serialize;

use crate::api::datasheet::FieldDescriptor;
use crate::config::Config;
use crate::output::{
    format_bool, print_field, truncate, OutputFormat, OutputWriter, TableBuilder, TableOutput,
};

use super::{build_client, resolve_datasheet, GlobalOptions};

/// Inspect datasheet fields
#[derive(Args, Debug)]
pub struct FieldCommand {
    #[command(subcommand)]
    pub command: FieldSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum FieldSubcommand {
    /// List the fields of a datasheet
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// View one field and its property
    View(ViewArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Datasheet id (defaults to `default_datasheet`)
    pub datasheet: Option<String>,

    /// Return fields in this view's order and visibility
    #[arg(long, short = 'v')]
    pub view: Option<String>,
}

#[derive(Args, Debug)]
pub struct ViewArgs {
    /// Field name or id
    pub field: String,

    /// Datasheet id (defaults to `default_datasheet`)
    #[arg(long, short = 'd')]
    pub datasheet: Option<String>,
}

// Display Types

#[derive(Debug, Serialize)]
#[serde(transparent)]
struct FieldTable(Vec<FieldDescriptor>);

impl TableOutput for FieldTable {
    fn print_table(&self, color: bool) {
        if self.0.is_empty() {
            println!("No fields found");
            return;
        }
        TableBuilder::new()
            .color(color)
            .headers(["ID", "NAME", "TYPE", "PRIMARY", "EDITABLE", "DESCRIPTION"])
            .rows(self.0.iter().map(|field| {
                vec![
                    field.id.clone(),
                    field.name.clone(),
                    field.field_type.to_string(),
                    format_bool(field.is_primary.unwrap_or(false), color),
                    format_bool(field.editable.unwrap_or(true), color),
                    truncate(field.desc.as_deref().unwrap_or(""), 40),
                ]
            }))
            .print();
    }
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
struct FieldView(FieldDescriptor);

impl TableOutput for FieldView {
    fn print_table(&self, color: bool) {
        let field = &self.0;
        let title = if color {
            style(&field.name).bold().to_string()
        } else {
            field.name.clone()
        };

        println!("{}", title);
        println!();
        print_field("ID", &field.id, color);
        print_field("Type", field.field_type.as_str(), color);
        print_field("Primary", &format_bool(field.is_primary.unwrap_or(false), color), color);
        print_field("Editable", &format_bool(field.editable.unwrap_or(true), color), color);
        if let Some(desc) = &field.desc {
            print_field("Description", desc, color);
        }

        if let Some(property) = field.property.to_value() {
            println!();
            println!("Property:");
            match serde_json::to_string_pretty(&property) {
                Ok(text) => println!("{}", text),
                Err(_) => println!("{}", property),
            }
        }
    }
}

impl FieldCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let config = Config::load()?;
        let client = build_client(global)?;
        let writer = OutputWriter::new(OutputFormat::from_json_flag(global.json));

        match &self.command {
            FieldSubcommand::List(args) => {
                let datasheet = resolve_datasheet(args.datasheet.as_deref(), &config)?;
                let fields = client
                    .datasheet(datasheet)
                    .fields(args.view.as_deref())
                    .await?;
                writer.write(&FieldTable(fields))
            }
            FieldSubcommand::View(args) => {
                let datasheet = resolve_datasheet(args.datasheet.as_deref(), &config)?;
                let fields = client.datasheet(datasheet.as_str()).fields(None).await?;
                let field = find_field(fields, &args.field)
                    .with_context(|| format!("No field '{}' in {}", args.field, datasheet))?;
                writer.write(&FieldView(field))
            }
        }
    }
}

/// Matches by id first, then by exact name.
fn find_field(fields: Vec<FieldDescriptor>, key: &str) -> Option<FieldDescriptor> {
    let by_id = fields.iter().position(|f| f.id == key);
    let index = by_id.or_else(|| fields.iter().position(|f| f.name == key))?;
    fields.into_iter().nth(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields() -> Vec<FieldDescriptor> {
        serde_json::from_value(json!([
            {"id": "fld1", "name": "Title", "type": "SingleText", "isPrimary": true},
            {"id": "fld2", "name": "fld1", "type": "Checkbox"}
        ]))
        .unwrap()
    }

    #[test]
    fn test_find_field_prefers_id() {
        assert_eq!(find_field(fields(), "fld1").unwrap().name, "Title");
        assert_eq!(find_field(fields(), "Title").unwrap().id, "fld1");
        assert!(find_field(fields(), "Missing").is_none());
    }
}
