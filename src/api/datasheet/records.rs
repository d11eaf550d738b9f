//
//  vika
//  api/datasheet/records.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Record types, query parameters and record request descriptions.
//!
//! # Overview
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`Record`] | A row as returned by the service |
//! | [`NewRecord`] | Payload for creating a row |
//! | [`RecordUpdate`] | Payload for modifying a row |
//! | [`RecordQuery`] | Optional parameters for listing rows |
//! | [`DescribeRecords`] / [`CreateRecords`] / [`ModifyRecords`] / [`DeleteRecords`] | Request descriptions |
//!
//! Cell values are kept as raw [`serde_json::Value`]s. Their shape depends on
//! the column type and on the [`CellFormat`] requested.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::common::{decode_ack, Page, Result, VikaError, DEFAULT_PAGE_NUM, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::api::request::{require_id, ApiRequest, HttpMethod, QueryParams, RequestBody};

/// Cell values of a record, keyed by field name or field id.
pub type Fields = serde_json::Map<String, Value>;

/// How cell keys are expressed: by field name or by field id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKey {
    #[default]
    Name,
    Id,
}

impl FieldKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Id => "id",
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldKey {
    type Err = VikaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "id" => Ok(Self::Id),
            other => Err(VikaError::invalid(format!(
                "unknown field key '{}': expected name or id",
                other
            ))),
        }
    }
}

/// Representation of cell values in responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellFormat {
    /// Native JSON values per column type.
    Json,
    /// Every value rendered as the string shown in the UI.
    String,
}

impl CellFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::String => "string",
        }
    }
}

impl fmt::Display for CellFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CellFormat {
    type Err = VikaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "string" => Ok(Self::String),
            other => Err(VikaError::invalid(format!(
                "unknown cell format '{}': expected json or string",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// One sort key of a listing.
///
/// Parses from `field` or `field:asc` / `field:desc`.
///
/// ```rust
/// use vika::api::datasheet::{Sort, SortOrder};
///
/// let sort: Sort = "Priority:desc".parse().unwrap();
/// assert_eq!(sort.field, "Priority");
/// assert_eq!(sort.order, SortOrder::Desc);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub field: String,
    pub order: SortOrder,
}

impl Sort {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Desc,
        }
    }
}

impl FromStr for Sort {
    type Err = VikaError;

    fn from_str(s: &str) -> Result<Self> {
        let (field, order) = match s.rsplit_once(':') {
            Some((field, "asc")) => (field, SortOrder::Asc),
            Some((field, "desc")) => (field, SortOrder::Desc),
            _ => (s, SortOrder::Asc),
        };

        if field.trim().is_empty() {
            return Err(VikaError::invalid(format!("invalid sort '{}': missing field", s)));
        }

        Ok(Self {
            field: field.to_string(),
            order,
        })
    }
}

/// A record returned by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Record identifier, such as `recXXXXXXXX`.
    pub record_id: String,

    /// Cell values; empty cells are absent.
    #[serde(default)]
    pub fields: Fields,

    /// Creation time in epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,

    /// Last modification time in epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

impl Record {
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        self.created_at.and_then(DateTime::from_timestamp_millis)
    }

    pub fn updated_at_utc(&self) -> Option<DateTime<Utc>> {
        self.updated_at.and_then(DateTime::from_timestamp_millis)
    }

    /// Returns the value of one cell.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }
}

/// Payload for a record to create.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewRecord {
    pub fields: Fields,
}

impl NewRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets one cell, consuming and returning the record.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }
}

impl From<Fields> for NewRecord {
    fn from(fields: Fields) -> Self {
        Self { fields }
    }
}

/// Payload for a record to modify. Cells not listed are left unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordUpdate {
    pub record_id: String,
    pub fields: Fields,
}

impl RecordUpdate {
    pub fn new(record_id: impl Into<String>) -> Self {
        Self {
            record_id: record_id.into(),
            fields: Fields::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn with_fields(record_id: impl Into<String>, fields: Fields) -> Self {
        Self {
            record_id: record_id.into(),
            fields,
        }
    }
}

/// Optional parameters for listing records.
///
/// Every parameter is optional; unset ones are left out of the request and the
/// service applies its own defaults, except `pageNum`, `pageSize` and
/// `fieldKey`, which are always sent.
///
/// # Example
///
/// ```rust
/// use vika::api::datasheet::{RecordQuery, Sort};
///
/// let query = RecordQuery::new()
///     .view("viwMTJxnBEAIy")
///     .filter("{Status}=\"Done\"")
///     .sort(Sort::desc("Priority"))
///     .page_size(50);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordQuery {
    pub view_id: Option<String>,
    pub record_ids: Vec<String>,
    pub fields: Vec<String>,
    pub filter_by_formula: Option<String>,
    pub sort: Vec<Sort>,
    pub page_num: Option<u32>,
    pub page_size: Option<u32>,
    pub max_records: Option<u32>,
    pub cell_format: Option<CellFormat>,
    pub field_key: Option<FieldKey>,
}

impl RecordQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts results to the rows of a view, in the view's order.
    pub fn view(mut self, view_id: impl Into<String>) -> Self {
        self.view_id = Some(view_id.into());
        self
    }

    pub fn record_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.record_ids.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Limits the returned cells to these fields.
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Filters rows with a formula that evaluates to true or false.
    pub fn filter(mut self, formula: impl Into<String>) -> Self {
        self.filter_by_formula = Some(formula.into());
        self
    }

    pub fn sort(mut self, sort: Sort) -> Self {
        self.sort.push(sort);
        self
    }

    pub fn page(mut self, page_num: u32) -> Self {
        self.page_num = Some(page_num);
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Caps the total number of rows across all pages.
    pub fn max_records(mut self, max_records: u32) -> Self {
        self.max_records = Some(max_records);
        self
    }

    pub fn cell_format(mut self, cell_format: CellFormat) -> Self {
        self.cell_format = Some(cell_format);
        self
    }

    pub fn field_key(mut self, field_key: FieldKey) -> Self {
        self.field_key = Some(field_key);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(size) = self.page_size {
            if !(1..=MAX_PAGE_SIZE).contains(&size) {
                return Err(VikaError::invalid(format!(
                    "pageSize must be between 1 and {}, got {}",
                    MAX_PAGE_SIZE, size
                )));
            }
        }
        if self.page_num == Some(0) {
            return Err(VikaError::invalid("pageNum must be at least 1"));
        }
        if self.max_records == Some(0) {
            return Err(VikaError::invalid("maxRecords must be at least 1"));
        }
        if self.record_ids.iter().any(|id| id.trim().is_empty()) {
            return Err(VikaError::invalid("record id must not be empty"));
        }
        Ok(())
    }

    /// Encodes the query, filling in page and field key defaults.
    pub fn to_query_params(&self, default_field_key: FieldKey) -> QueryParams {
        let mut query = QueryParams::new();

        query.push_opt("viewId", self.view_id.as_deref());
        query.extend_repeated("recordIds", &self.record_ids);
        query.extend_repeated("fields", &self.fields);
        query.push_opt("filterByFormula", self.filter_by_formula.as_deref());
        for sort in &self.sort {
            query.push("sort", json!({"field": sort.field, "order": sort.order}));
        }
        query.push("pageNum", self.page_num.unwrap_or(DEFAULT_PAGE_NUM));
        query.push("pageSize", self.page_size.unwrap_or(DEFAULT_PAGE_SIZE));
        query.push_opt("maxRecords", self.max_records);
        query.push_opt("cellFormat", self.cell_format);
        query.push("fieldKey", self.field_key.unwrap_or(default_field_key));

        query
    }
}

/// A list of records, as returned by create and update.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordList {
    #[serde(default)]
    pub records: Vec<Record>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecordsBody<T> {
    records: T,
    field_key: FieldKey,
}

fn records_body<T: Serialize>(records: T, field_key: FieldKey) -> Result<RequestBody> {
    let body = serde_json::to_value(RecordsBody { records, field_key })
        .map_err(|e| VikaError::invalid(format!("records cannot be encoded: {}", e)))?;
    Ok(RequestBody::Json(body))
}

fn records_path(datasheet_id: &str) -> String {
    format!("/fusion/v1/datasheets/{}/records", datasheet_id)
}

/// `GET /fusion/v1/datasheets/{id}/records`
#[derive(Debug, Clone)]
pub struct DescribeRecords {
    pub datasheet_id: String,
    pub query: RecordQuery,
    pub default_field_key: FieldKey,
}

impl ApiRequest for DescribeRecords {
    type Response = Page<Record>;

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn path(&self) -> String {
        records_path(&self.datasheet_id)
    }

    fn query(&self) -> QueryParams {
        self.query.to_query_params(self.default_field_key)
    }

    fn validate(&self) -> Result<()> {
        require_id("datasheet", &self.datasheet_id)?;
        self.query.validate()
    }
}

/// `POST /fusion/v1/datasheets/{id}/records`
#[derive(Debug, Clone)]
pub struct CreateRecords {
    pub datasheet_id: String,
    pub records: Vec<NewRecord>,
    pub field_key: FieldKey,
}

impl ApiRequest for CreateRecords {
    type Response = RecordList;

    fn method(&self) -> HttpMethod {
        HttpMethod::Post
    }

    fn path(&self) -> String {
        records_path(&self.datasheet_id)
    }

    fn into_body(self) -> Result<RequestBody> {
        records_body(self.records, self.field_key)
    }

    fn validate(&self) -> Result<()> {
        require_id("datasheet", &self.datasheet_id)?;
        if self.records.is_empty() {
            return Err(VikaError::invalid("at least one record is required"));
        }
        Ok(())
    }
}

/// `PATCH /fusion/v1/datasheets/{id}/records`
#[derive(Debug, Clone)]
pub struct ModifyRecords {
    pub datasheet_id: String,
    pub records: Vec<RecordUpdate>,
    pub field_key: FieldKey,
}

impl ApiRequest for ModifyRecords {
    type Response = RecordList;

    fn method(&self) -> HttpMethod {
        HttpMethod::Patch
    }

    fn path(&self) -> String {
        records_path(&self.datasheet_id)
    }

    fn into_body(self) -> Result<RequestBody> {
        records_body(self.records, self.field_key)
    }

    fn validate(&self) -> Result<()> {
        require_id("datasheet", &self.datasheet_id)?;
        if self.records.is_empty() {
            return Err(VikaError::invalid("at least one record is required"));
        }
        for record in &self.records {
            require_id("record", &record.record_id)?;
        }
        Ok(())
    }
}

/// `DELETE /fusion/v1/datasheets/{id}/records?recordIds=...`
#[derive(Debug, Clone)]
pub struct DeleteRecords {
    pub datasheet_id: String,
    pub record_ids: Vec<String>,
}

impl ApiRequest for DeleteRecords {
    type Response = ();

    fn method(&self) -> HttpMethod {
        HttpMethod::Delete
    }

    fn path(&self) -> String {
        records_path(&self.datasheet_id)
    }

    fn query(&self) -> QueryParams {
        let mut query = QueryParams::new();
        query.extend_repeated("recordIds", &self.record_ids);
        query
    }

    fn validate(&self) -> Result<()> {
        require_id("datasheet", &self.datasheet_id)?;
        if self.record_ids.is_empty() {
            return Err(VikaError::invalid("at least one record id is required"));
        }
        for id in &self.record_ids {
            require_id("record", id)?;
        }
        Ok(())
    }

    fn decode(status: StatusCode, body: &[u8]) -> Result<()> {
        decode_ack(status, body)
    }
}
