//
//  vika
//  cli/record.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Record commands
//!
//! Lists, finds, creates, updates and deletes the records of a datasheet.
//! Cell values are given as `--field NAME=VALUE` pairs, where a value that
//! parses as JSON is sent as JSON, or as a whole object with `--json-fields`.
//!
//! Writes are sent in batches because the service caps how many records one
//! request may carry.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use serde_json::Value;

use crate::api::common::Page;
use crate::api::datasheet::{
    CellFormat, Datasheet, NewRecord, Record, RecordQuery, RecordUpdate, Sort,
};
use crate::config::Config;
use crate::interactive::{is_interactive, prompt_confirm_with_default, Cancelled};
use crate::output::{
    cell_text, truncate, write_json_lines, OutputFormat, OutputWriter, TableBuilder, TableOutput,
};
use crate::util::{format_time_millis, parse_fields};

use super::{build_client, resolve_datasheet, GlobalOptions};

/// Records per write request unless `--batch-size` says otherwise.
const DEFAULT_BATCH_SIZE: usize = 10;

/// Widest a cell is drawn in a table.
const CELL_WIDTH: usize = 40;

/// Read and write datasheet records
#[derive(Args, Debug)]
pub struct RecordCommand {
    #[command(subcommand)]
    pub command: RecordSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum RecordSubcommand {
    /// List records
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Fetch records by id
    Find(FindArgs),

    /// Create records
    #[command(visible_alias = "create")]
    Add(AddArgs),

    /// Update cells of a record
    Update(UpdateArgs),

    /// Delete records
    #[command(visible_alias = "rm")]
    Delete(DeleteArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Datasheet id (defaults to `default_datasheet`)
    pub datasheet: Option<String>,

    /// Only records visible in this view, in its order
    #[arg(long, short = 'v')]
    pub view: Option<String>,

    /// Only return these fields
    #[arg(long, short = 'f', value_delimiter = ',')]
    pub fields: Vec<String>,

    /// Filter formula, e.g. `{Status}="Done"`
    #[arg(long)]
    pub filter: Option<String>,

    /// Sort key as FIELD or FIELD:asc / FIELD:desc (repeatable)
    #[arg(long, short = 's')]
    pub sort: Vec<String>,

    /// Page number (1-indexed)
    #[arg(long, short = 'p')]
    pub page: Option<u32>,

    /// Records per page (1-1000)
    #[arg(long, short = 'l')]
    pub page_size: Option<u32>,

    /// Stop after this many records in total
    #[arg(long)]
    pub max_records: Option<u32>,

    /// Cell value representation
    #[arg(long, value_parser = ["json", "string"])]
    pub cell_format: Option<String>,

    /// Fetch every page
    #[arg(long, short = 'a', conflicts_with_all = ["page", "page_size", "first"])]
    pub all: bool,

    /// Fetch only the first matching record
    #[arg(long)]
    pub first: bool,

    /// Print one JSON record per line (implies JSON output)
    #[arg(long)]
    pub json_lines: bool,
}

#[derive(Args, Debug)]
pub struct FindArgs {
    /// Record ids
    #[arg(required = true)]
    pub records: Vec<String>,

    /// Datasheet id (defaults to `default_datasheet`)
    #[arg(long, short = 'd')]
    pub datasheet: Option<String>,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Datasheet id (defaults to `default_datasheet`)
    #[arg(long, short = 'd')]
    pub datasheet: Option<String>,

    /// Cell value as NAME=VALUE (repeatable)
    #[arg(long = "field", short = 'F')]
    pub fields: Vec<String>,

    /// Cell values as a JSON object
    #[arg(long)]
    pub json_fields: Option<String>,

    /// JSON file holding an array of records to create
    #[arg(long, short = 'i', conflicts_with_all = ["fields", "json_fields"])]
    pub input: Option<PathBuf>,

    /// Records per request
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Record id
    pub record: String,

    /// Datasheet id (defaults to `default_datasheet`)
    #[arg(long, short = 'd')]
    pub datasheet: Option<String>,

    /// Cell value as NAME=VALUE (repeatable)
    #[arg(long = "field", short = 'F')]
    pub fields: Vec<String>,

    /// Cell values as a JSON object
    #[arg(long)]
    pub json_fields: Option<String>,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Record ids
    #[arg(required = true)]
    pub records: Vec<String>,

    /// Datasheet id (defaults to `default_datasheet`)
    #[arg(long, short = 'd')]
    pub datasheet: Option<String>,

    /// Records per request
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

// Display Types

/// Records drawn as one row each, with a column per field.
#[derive(Debug, Serialize)]
#[serde(transparent)]
struct RecordTable(Vec<Record>);

impl RecordTable {
    /// Field names in first-seen order across all records.
    fn columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = Vec::new();
        for record in &self.0 {
            for name in record.fields.keys() {
                if !columns.contains(name) {
                    columns.push(name.clone());
                }
            }
        }
        columns
    }
}

impl TableOutput for RecordTable {
    fn print_table(&self, color: bool) {
        if self.0.is_empty() {
            println!("No records found");
            return;
        }

        let columns = self.columns();
        let headers = std::iter::once("ID".to_string())
            .chain(columns.iter().cloned())
            .chain(std::iter::once("CREATED".to_string()));

        TableBuilder::new()
            .color(color)
            .headers(headers)
            .rows(self.0.iter().map(|record| {
                let mut row = vec![record.record_id.clone()];
                row.extend(columns.iter().map(|name| {
                    record
                        .get(name)
                        .map(|value| truncate(&cell_text(value), CELL_WIDTH))
                        .unwrap_or_default()
                }));
                row.push(record.created_at.map(format_time_millis).unwrap_or_default());
                row
            }))
            .print();
    }
}

/// One page of records plus its position in the full listing.
#[derive(Debug, Serialize)]
#[serde(transparent)]
struct RecordPage(Page<Record>);

impl TableOutput for RecordPage {
    fn print_table(&self, color: bool) {
        let page = &self.0;
        RecordTable(page.records.clone()).print_table(color);
        if !page.records.is_empty() {
            let hint = if page.has_next() {
                format!(" (next: --page {})", page.page_num + 1)
            } else {
                String::new()
            };
            println!(
                "Page {} showing {} of {} record(s){}",
                page.page_num,
                page.records.len(),
                page.total,
                hint
            );
        }
    }
}

impl RecordCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let config = Config::load()?;

        match &self.command {
            RecordSubcommand::List(args) => {
                let datasheet = resolve_datasheet(args.datasheet.as_deref(), &config)?;
                self.list(args, &datasheet, global).await
            }
            RecordSubcommand::Find(args) => {
                let datasheet = resolve_datasheet(args.datasheet.as_deref(), &config)?;
                self.find(args, &datasheet, global).await
            }
            RecordSubcommand::Add(args) => {
                let datasheet = resolve_datasheet(args.datasheet.as_deref(), &config)?;
                self.add(args, &datasheet, global).await
            }
            RecordSubcommand::Update(args) => {
                let datasheet = resolve_datasheet(args.datasheet.as_deref(), &config)?;
                self.update(args, &datasheet, global).await
            }
            RecordSubcommand::Delete(args) => {
                let datasheet = resolve_datasheet(args.datasheet.as_deref(), &config)?;
                self.delete(args, &datasheet, global).await
            }
        }
    }

    async fn list(&self, args: &ListArgs, datasheet: &str, global: &GlobalOptions) -> Result<()> {
        let sheet = build_client(global)?.datasheet(datasheet);
        let writer = OutputWriter::new(OutputFormat::from_json_flag(global.json || args.json_lines));
        let query = build_query(args, global)?;

        if args.first {
            let records: Vec<Record> = sheet.first_record(query).await?.into_iter().collect();
            return emit_records(&writer, records, args.json_lines);
        }

        if args.all {
            let spinner = spinner(&writer, format!("Fetching records from {}...", datasheet));
            let result = sheet.all_records(query).await;
            spinner.finish_and_clear();
            return emit_records(&writer, result?, args.json_lines);
        }

        let page = sheet.records(query).await?;
        if args.json_lines {
            return write_json_lines(&page.records);
        }
        writer.write(&RecordPage(page))
    }

    async fn find(&self, args: &FindArgs, datasheet: &str, global: &GlobalOptions) -> Result<()> {
        let sheet = build_client(global)?.datasheet(datasheet);
        let writer = OutputWriter::new(OutputFormat::from_json_flag(global.json));

        let records = sheet
            .find(args.records.iter().cloned(), global.field_key_override()?)
            .await?;

        let missing: Vec<&str> = args
            .records
            .iter()
            .filter(|id| !records.iter().any(|r| &r.record_id == *id))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            writer.write_warning(&format!("Not found: {}", missing.join(", ")));
        }

        writer.write(&RecordTable(records))
    }

    async fn add(&self, args: &AddArgs, datasheet: &str, global: &GlobalOptions) -> Result<()> {
        let batch_size = check_batch_size(args.batch_size)?;
        let sheet = build_client(global)?.datasheet(datasheet);
        let writer = OutputWriter::new(OutputFormat::from_json_flag(global.json));
        let field_key = global.field_key_override()?;

        let records = match &args.input {
            Some(path) => read_records_file(path).await?,
            None => {
                let fields = parse_fields(&args.fields, args.json_fields.as_deref())?;
                if fields.is_empty() {
                    bail!("Nothing to create. Pass --field NAME=VALUE, --json-fields or --input.");
                }
                vec![NewRecord::from(fields)]
            }
        };

        let mut created = Vec::with_capacity(records.len());
        for batch in records.chunks(batch_size) {
            let stored = sheet
                .create(batch.to_vec(), field_key)
                .await
                .with_context(|| format!("Created {} of {} record(s) before failing", created.len(), records.len()))?;
            created.extend(stored);
        }

        writer.write(&RecordTable(created.clone()))?;
        writer.write_success(&format!("Created {} record(s) in {}", created.len(), datasheet));
        Ok(())
    }

    async fn update(&self, args: &UpdateArgs, datasheet: &str, global: &GlobalOptions) -> Result<()> {
        let fields = parse_fields(&args.fields, args.json_fields.as_deref())?;
        if fields.is_empty() {
            bail!("Nothing to update. Pass --field NAME=VALUE or --json-fields.");
        }

        let sheet = build_client(global)?.datasheet(datasheet);
        let writer = OutputWriter::new(OutputFormat::from_json_flag(global.json));

        let updated = sheet
            .update(
                vec![RecordUpdate::with_fields(args.record.as_str(), fields)],
                global.field_key_override()?,
            )
            .await?;

        writer.write(&RecordTable(updated))?;
        writer.write_success(&format!("Updated {}", args.record));
        Ok(())
    }

    async fn delete(&self, args: &DeleteArgs, datasheet: &str, global: &GlobalOptions) -> Result<()> {
        let batch_size = check_batch_size(args.batch_size)?;
        let writer = OutputWriter::new(OutputFormat::from_json_flag(global.json));

        if !args.yes {
            if global.no_prompt || !is_interactive() {
                bail!("Refusing to delete without confirmation. Pass --yes.");
            }
            let question = format!("Delete {} record(s) from {}?", args.records.len(), datasheet);
            if !prompt_confirm_with_default(&question, false)? {
                return Err(anyhow::Error::new(Cancelled));
            }
        }

        let sheet = build_client(global)?.datasheet(datasheet);
        let deleted = delete_in_batches(&sheet, &args.records, batch_size).await?;

        if writer.is_json() {
            let result = serde_json::json!({
                "success": true,
                "deleted": deleted,
            });
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        writer.write_success(&format!("Deleted {} record(s) from {}", deleted.len(), datasheet));
        Ok(())
    }
}

fn build_query(args: &ListArgs, global: &GlobalOptions) -> Result<RecordQuery> {
    let mut query = RecordQuery::new().fields(args.fields.iter().cloned());

    if let Some(view) = &args.view {
        query = query.view(view.as_str());
    }
    if let Some(filter) = &args.filter {
        query = query.filter(filter.as_str());
    }
    for sort in &args.sort {
        query = query.sort(sort.parse::<Sort>()?);
    }
    if let Some(page) = args.page {
        query = query.page(page);
    }
    if let Some(page_size) = args.page_size {
        query = query.page_size(page_size);
    }
    if let Some(max_records) = args.max_records {
        query = query.max_records(max_records);
    }
    if let Some(cell_format) = &args.cell_format {
        query = query.cell_format(cell_format.parse::<CellFormat>()?);
    }
    if let Some(field_key) = global.field_key_override()? {
        query = query.field_key(field_key);
    }

    query.validate()?;
    Ok(query)
}

fn check_batch_size(batch_size: usize) -> Result<usize> {
    if batch_size == 0 {
        bail!("--batch-size must be at least 1");
    }
    Ok(batch_size)
}

/// Deletes `ids` one batch per request and returns the ids deleted.
///
/// Stops at the first failed batch; earlier batches stay deleted.
async fn delete_in_batches(
    sheet: &Datasheet,
    ids: &[String],
    batch_size: usize,
) -> Result<Vec<String>> {
    let mut deleted = Vec::with_capacity(ids.len());
    for batch in ids.chunks(batch_size) {
        sheet
            .delete(batch.iter().cloned())
            .await
            .with_context(|| {
                format!("Deleted {} of {} record(s) before failing", deleted.len(), ids.len())
            })?;
        deleted.extend_from_slice(batch);
    }
    Ok(deleted)
}

/// Reads a JSON array of records.
///
/// Each element is either `{"fields": {...}}` or a bare object of cells.
async fn read_records_file(path: &Path) -> Result<Vec<NewRecord>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_records(&content).with_context(|| format!("Invalid records file {}", path.display()))
}

fn parse_records(content: &str) -> Result<Vec<NewRecord>> {
    let value: Value = serde_json::from_str(content)?;
    let Value::Array(items) = value else {
        bail!("expected a JSON array of records");
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(mut map) => match map.remove("fields") {
                Some(Value::Object(fields)) if map.is_empty() => Ok(NewRecord::from(fields)),
                Some(other) => {
                    map.insert("fields".to_string(), other);
                    Ok(NewRecord::from(map))
                }
                None => Ok(NewRecord::from(map)),
            },
            _ => bail!("record {} is not an object", index),
        })
        .collect()
}

fn emit_records(writer: &OutputWriter, records: Vec<Record>, json_lines: bool) -> Result<()> {
    if json_lines {
        write_json_lines(&records)
    } else {
        writer.write(&RecordTable(records))
    }
}

fn spinner(writer: &OutputWriter, message: String) -> ProgressBar {
    if writer.is_json() {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    spinner
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::test_client;
    use mockito::Matcher;
    use serde_json::json;

    fn list_args() -> ListArgs {
        ListArgs {
            datasheet: None,
            view: None,
            fields: Vec::new(),
            filter: None,
            sort: Vec::new(),
            page: None,
            page_size: None,
            max_records: None,
            cell_format: None,
            all: false,
            first: false,
            json_lines: false,
        }
    }

    #[test]
    fn test_build_query_from_flags() {
        let args = ListArgs {
            view: Some("viw1".into()),
            fields: vec!["Title".into(), "Status".into()],
            sort: vec!["Priority:desc".into(), "Title".into()],
            cell_format: Some("string".into()),
            page_size: Some(50),
            ..list_args()
        };
        let global = GlobalOptions {
            field_key: Some("id".into()),
            ..Default::default()
        };

        let query = build_query(&args, &global).unwrap();
        assert_eq!(query.view_id.as_deref(), Some("viw1"));
        assert_eq!(query.fields, vec!["Title", "Status"]);
        assert_eq!(query.sort, vec![Sort::desc("Priority"), Sort::asc("Title")]);
        assert_eq!(query.cell_format, Some(CellFormat::String));
        assert_eq!(query.page_size, Some(50));
        assert_eq!(query.field_key, Some(crate::api::datasheet::FieldKey::Id));
    }

    #[test]
    fn test_build_query_rejects_oversized_page() {
        let args = ListArgs {
            page_size: Some(5000),
            ..list_args()
        };
        assert!(build_query(&args, &GlobalOptions::default()).is_err());
    }

    #[test]
    fn test_parse_records_file_shapes() {
        let records = parse_records(
            r#"[{"fields": {"Title": "a"}}, {"Title": "b", "Done": true}, {"fields": "x", "Title": "c"}]"#,
        )
        .unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].fields["Title"], json!("a"));
        assert_eq!(records[1].fields["Done"], json!(true));
        assert_eq!(records[2].fields["fields"], json!("x"));

        assert!(parse_records(r#"{"Title": "a"}"#).is_err());
        assert!(parse_records(r#"[1]"#).is_err());
    }

    #[test]
    fn test_record_table_columns_in_first_seen_order() {
        let records: Vec<Record> = serde_json::from_value(json!([
            {"recordId": "rec1", "fields": {"Title": "a", "Status": "Open"}},
            {"recordId": "rec2", "fields": {"Owner": "kim", "Title": "b"}}
        ]))
        .unwrap();
        assert_eq!(RecordTable(records).columns(), vec!["Title", "Status", "Owner"]);
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        assert!(check_batch_size(0).is_err());
        assert_eq!(check_batch_size(10).unwrap(), 10);
    }

    #[tokio::test]
    async fn test_delete_in_batches_splits_ids() {
        let mut server = mockito::Server::new_async().await;
        let ack = r#"{"code": 200, "success": true, "message": "SUCCESS"}"#;
        let first = server
            .mock("DELETE", "/fusion/v1/datasheets/dst1/records")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("recordIds".into(), "rec1".into()),
                Matcher::UrlEncoded("recordIds".into(), "rec2".into()),
            ]))
            .with_body(ack)
            .expect(1)
            .create_async()
            .await;
        let second = server
            .mock("DELETE", "/fusion/v1/datasheets/dst1/records")
            .match_query(Matcher::UrlEncoded("recordIds".into(), "rec3".into()))
            .with_body(ack)
            .expect(1)
            .create_async()
            .await;

        let sheet = test_client(&server.url()).datasheet("dst1");
        let ids = vec!["rec1".to_string(), "rec2".to_string(), "rec3".to_string()];
        let deleted = delete_in_batches(&sheet, &ids, 2).await.unwrap();

        assert_eq!(deleted, ids);
        first.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn test_delete_in_batches_reports_progress_on_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("DELETE", "/fusion/v1/datasheets/dst1/records")
            .match_query(Matcher::Any)
            .with_body(r#"{"code": 301, "success": false, "message": "record not found"}"#)
            .create_async()
            .await;

        let sheet = test_client(&server.url()).datasheet("dst1");
        let err = delete_in_batches(&sheet, &["rec1".to_string()], 10)
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("Deleted 0 of 1"));
        assert!(format!("{:#}", err).contains("record not found"));
    }
}
