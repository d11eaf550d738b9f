//
//  vika
//  api/datasheet/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Datasheet Operations
//!
//! A datasheet is a table of records. [`Datasheet`] is a handle bound to one
//! datasheet id and exposes every record, field and attachment operation.
//!
//! ## Operations
//!
//! | Method | HTTP | Path |
//! |--------|------|------|
//! | [`records`](Datasheet::records) | `GET` | `/fusion/v1/datasheets/{id}/records` |
//! | [`all_records`](Datasheet::all_records) | `GET` (repeated) | `/fusion/v1/datasheets/{id}/records` |
//! | [`first_record`](Datasheet::first_record) | `GET` | `/fusion/v1/datasheets/{id}/records` |
//! | [`find`](Datasheet::find) | `GET` | `/fusion/v1/datasheets/{id}/records` |
//! | [`create`](Datasheet::create) | `POST` | `/fusion/v1/datasheets/{id}/records` |
//! | [`update`](Datasheet::update) | `PATCH` | `/fusion/v1/datasheets/{id}/records` |
//! | [`delete`](Datasheet::delete) | `DELETE` | `/fusion/v1/datasheets/{id}/records` |
//! | [`upload_file`](Datasheet::upload_file) | `POST` | `/fusion/v1/datasheets/{id}/attachments` |
//! | [`fields`](Datasheet::fields) | `GET` | `/fusion/v1/datasheets/{id}/fields` |
//!
//! ## Example
//!
//! ```rust,no_run
//! use vika::api::datasheet::{NewRecord, RecordQuery, Sort};
//! use vika::api::VikaClient;
//! use vika::config::ClientConfig;
//!
//! # async fn example() -> vika::api::Result<()> {
//! let client = VikaClient::new(ClientConfig::new("usk_your_token"))?;
//! let sheet = client.datasheet("dstWUHwzTHd2YQaXEE");
//!
//! let created = sheet
//!     .create(vec![NewRecord::new().field("Title", "Write docs")], None)
//!     .await?;
//!
//! let open = sheet
//!     .all_records(RecordQuery::new().filter("{Done}=FALSE()").sort(Sort::asc("Title")))
//!     .await?;
//!
//! println!("created {}, {} still open", created.len(), open.len());
//! # Ok(())
//! # }
//! ```

mod attachments;
mod fields;
mod records;

pub use attachments::*;
pub use fields::*;
pub use records::*;

use std::path::Path;

use super::client::VikaClient;
use super::common::{collect_all_pages, Page, Result, VikaError, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Handle for the operations of one datasheet.
#[derive(Debug, Clone)]
pub struct Datasheet {
    client: VikaClient,
    datasheet_id: String,
}

impl Datasheet {
    pub(crate) fn new(client: VikaClient, datasheet_id: String) -> Self {
        Self {
            client,
            datasheet_id,
        }
    }

    pub fn id(&self) -> &str {
        &self.datasheet_id
    }

    fn field_key(&self, field_key: Option<FieldKey>) -> FieldKey {
        field_key.unwrap_or(self.client.config().field_key)
    }

    /// Fetches one page of records.
    ///
    /// Unset `pageNum`, `pageSize` and `fieldKey` default to 1, 100 and the
    /// client's field key.
    pub async fn records(&self, query: RecordQuery) -> Result<Page<Record>> {
        self.client
            .send(DescribeRecords {
                datasheet_id: self.datasheet_id.clone(),
                query,
                default_field_key: self.client.config().field_key,
            })
            .await
    }

    /// Fetches every record matching the query.
    ///
    /// Pages of [`MAX_PAGE_SIZE`] are requested one after another; the query's
    /// own `pageNum` and `pageSize` are ignored. If any page fails, that error
    /// is returned and the records already fetched are dropped.
    pub async fn all_records(&self, query: RecordQuery) -> Result<Vec<Record>> {
        query.validate()?;

        collect_all_pages(MAX_PAGE_SIZE, |page_num| {
            let page_query = RecordQuery {
                page_num: Some(page_num),
                page_size: Some(MAX_PAGE_SIZE),
                ..query.clone()
            };
            self.records(page_query)
        })
        .await
    }

    /// Fetches the first record matching the query, if any.
    pub async fn first_record(&self, query: RecordQuery) -> Result<Option<Record>> {
        let query = RecordQuery {
            page_num: Some(1),
            page_size: Some(1),
            ..query
        };
        let page = self.records(query).await?;
        Ok(page.records.into_iter().next())
    }

    /// Fetches records by id in a single request.
    ///
    /// The page size is widened to cover the id list. More than
    /// [`MAX_PAGE_SIZE`] ids fail with [`VikaError::LocalValidation`] since
    /// one page could not hold every match. Unknown ids are simply absent from
    /// the result.
    pub async fn find<I, S>(&self, record_ids: I, field_key: Option<FieldKey>) -> Result<Vec<Record>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let record_ids: Vec<String> = record_ids.into_iter().map(Into::into).collect();
        if record_ids.is_empty() {
            return Err(VikaError::invalid("at least one record id is required"));
        }
        if record_ids.len() > MAX_PAGE_SIZE as usize {
            return Err(VikaError::invalid(format!(
                "at most {} record ids can be fetched at once, got {}",
                MAX_PAGE_SIZE,
                record_ids.len()
            )));
        }

        let page_size = (record_ids.len() as u32).clamp(DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);
        let query = RecordQuery {
            record_ids,
            page_size: Some(page_size),
            field_key: Some(self.field_key(field_key)),
            ..RecordQuery::default()
        };

        Ok(self.records(query).await?.records)
    }

    /// Creates records and returns them as stored.
    pub async fn create(
        &self,
        records: Vec<NewRecord>,
        field_key: Option<FieldKey>,
    ) -> Result<Vec<Record>> {
        let response = self
            .client
            .send(CreateRecords {
                datasheet_id: self.datasheet_id.clone(),
                records,
                field_key: self.field_key(field_key),
            })
            .await?;
        Ok(response.records)
    }

    /// Updates the listed cells of existing records.
    pub async fn update(
        &self,
        records: Vec<RecordUpdate>,
        field_key: Option<FieldKey>,
    ) -> Result<Vec<Record>> {
        let response = self
            .client
            .send(ModifyRecords {
                datasheet_id: self.datasheet_id.clone(),
                records,
                field_key: self.field_key(field_key),
            })
            .await?;
        Ok(response.records)
    }

    /// Deletes records by id in a single request.
    ///
    /// The service limits how many ids one call may carry; splitting a large
    /// list into batches is left to the caller.
    pub async fn delete<I, S>(&self, record_ids: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.client
            .send(DeleteRecords {
                datasheet_id: self.datasheet_id.clone(),
                record_ids: record_ids.into_iter().map(Into::into).collect(),
            })
            .await
    }

    /// Uploads a local file as an attachment.
    ///
    /// The whole file is read into memory first. The returned [`Attachment`]
    /// can be written into an attachment cell.
    pub async fn upload_file(&self, path: impl AsRef<Path>) -> Result<Attachment> {
        let upload = UploadAttachment::from_path(self.datasheet_id.clone(), path.as_ref()).await?;
        self.client.send(upload).await
    }

    /// Lists the datasheet's fields, optionally in a view's order and visibility.
    pub async fn fields(&self, view_id: Option<&str>) -> Result<Vec<FieldDescriptor>> {
        let response = self
            .client
            .send(DescribeFields {
                datasheet_id: self.datasheet_id.clone(),
                view_id: view_id.map(str::to_string),
            })
            .await?;
        Ok(response.fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::test_client;
    use mockito::Matcher;
    use serde_json::{json, Value};

    const RECORDS_PATH: &str = "/fusion/v1/datasheets/dst1/records";

    fn ok(data: Value) -> String {
        json!({"code": 200, "success": true, "message": "SUCCESS", "data": data}).to_string()
    }

    fn page_body(page_num: u64, page_size: u64, total: u64) -> String {
        let start = (page_num - 1) * page_size;
        let end = (start + page_size).min(total);
        let records: Vec<Value> = (start..end)
            .map(|i| json!({"recordId": format!("rec{}", i), "fields": {"Index": i}}))
            .collect();
        ok(json!({"pageNum": page_num, "pageSize": page_size, "total": total, "records": records}))
    }

    fn query(pairs: &[(&str, &str)]) -> Matcher {
        Matcher::AllOf(
            pairs
                .iter()
                .map(|(k, v)| Matcher::UrlEncoded(k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_records_fills_in_defaults() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", RECORDS_PATH)
            .match_query(query(&[("pageNum", "1"), ("pageSize", "100"), ("fieldKey", "name")]))
            .with_body(page_body(1, 100, 2))
            .create_async()
            .await;

        let page = test_client(&server.url())
            .datasheet("dst1")
            .records(RecordQuery::new())
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(page.total, 2);
        assert_eq!(page.records[1].record_id, "rec1");
    }

    #[tokio::test]
    async fn test_all_records_walks_every_page() {
        let mut server = mockito::Server::new_async().await;
        let mut mocks = Vec::new();
        for page_num in 1..=3u64 {
            let num = page_num.to_string();
            let mock = server
                .mock("GET", RECORDS_PATH)
                .match_query(query(&[
                    ("pageNum", num.as_str()),
                    ("pageSize", "1000"),
                    ("viewId", "viw1"),
                ]))
                .with_body(page_body(page_num, 1000, 2500))
                .expect(1)
                .create_async()
                .await;
            mocks.push(mock);
        }

        let records = test_client(&server.url())
            .datasheet("dst1")
            .all_records(RecordQuery::new().view("viw1").page_size(10).page(7))
            .await
            .unwrap();

        for mock in &mocks {
            mock.assert_async().await;
        }
        assert_eq!(records.len(), 2500);
        assert_eq!(records[0].record_id, "rec0");
        assert_eq!(records[2499].record_id, "rec2499");
    }

    #[tokio::test]
    async fn test_all_records_single_page() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", RECORDS_PATH)
            .match_query(Matcher::Any)
            .with_body(page_body(1, 1000, 50))
            .expect(1)
            .create_async()
            .await;

        let records = test_client(&server.url())
            .datasheet("dst1")
            .all_records(RecordQuery::new())
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(records.len(), 50);
    }

    #[tokio::test]
    async fn test_all_records_fails_as_a_whole() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", RECORDS_PATH)
            .match_query(query(&[("pageNum", "1")]))
            .with_body(page_body(1, 1000, 2500))
            .create_async()
            .await;
        server
            .mock("GET", RECORDS_PATH)
            .match_query(query(&[("pageNum", "2")]))
            .with_body(r#"{"code": 429, "success": false, "message": "rate limited"}"#)
            .create_async()
            .await;
        let third = server
            .mock("GET", RECORDS_PATH)
            .match_query(query(&[("pageNum", "3")]))
            .with_body(page_body(3, 1000, 2500))
            .expect(0)
            .create_async()
            .await;

        let err = test_client(&server.url())
            .datasheet("dst1")
            .all_records(RecordQuery::new())
            .await
            .unwrap_err();

        third.assert_async().await;
        assert!(matches!(err, VikaError::Api { code: 429, .. }));
    }

    #[tokio::test]
    async fn test_first_record_on_empty_sheet() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", RECORDS_PATH)
            .match_query(query(&[("pageSize", "1"), ("pageNum", "1")]))
            .with_body(page_body(1, 1, 0))
            .create_async()
            .await;

        let first = test_client(&server.url())
            .datasheet("dst1")
            .first_record(RecordQuery::new())
            .await
            .unwrap();
        assert!(first.is_none());
    }

    #[tokio::test]
    async fn test_find_sends_ids_once() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", RECORDS_PATH)
            .match_query(Matcher::Regex(
                "recordIds=recA&recordIds=recB.*pageSize=100.*fieldKey=id".into(),
            ))
            .with_body(ok(json!({
                "pageNum": 1, "pageSize": 100, "total": 1,
                "records": [{"recordId": "recA", "fields": {}}]
            })))
            .expect(1)
            .create_async()
            .await;

        let records = test_client(&server.url())
            .datasheet("dst1")
            .find(["recA", "recB"], Some(FieldKey::Id))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn test_find_rejects_more_ids_than_a_page() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", RECORDS_PATH)
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let ids: Vec<String> = (0..=MAX_PAGE_SIZE).map(|i| format!("rec{i}")).collect();
        let err = test_client(&server.url())
            .datasheet("dst1")
            .find(ids, None)
            .await
            .unwrap_err();

        assert!(matches!(err, VikaError::LocalValidation(_)));
        assert!(err.to_string().contains("at most 1000"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_round_trips_values() {
        let fields = json!({
            "Title": "Ship it",
            "Estimate": 3.5,
            "Blocked by": ["rec9", "rec10"]
        });
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", RECORDS_PATH)
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({
                "records": [{"fields": fields}],
                "fieldKey": "name"
            })))
            .with_status(201)
            .with_body(ok(json!({
                "records": [{"recordId": "recNew", "createdAt": 1700000000000_i64, "fields": fields}]
            })))
            .create_async()
            .await;

        let input = NewRecord::from(fields.as_object().unwrap().clone());
        let created = test_client(&server.url())
            .datasheet("dst1")
            .create(vec![input.clone()], None)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(created[0].record_id, "recNew");
        assert_eq!(created[0].fields, input.fields);
    }

    #[tokio::test]
    async fn test_update_uses_patch() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PATCH", RECORDS_PATH)
            .match_body(Matcher::Json(json!({
                "records": [{"recordId": "rec1", "fields": {"fldDone": true}}],
                "fieldKey": "id"
            })))
            .with_body(ok(json!({
                "records": [{"recordId": "rec1", "fields": {"fldDone": true}}]
            })))
            .create_async()
            .await;

        let updated = test_client(&server.url())
            .datasheet("dst1")
            .update(vec![RecordUpdate::new("rec1").field("fldDone", true)], Some(FieldKey::Id))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(updated.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_sends_repeated_ids() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("DELETE", RECORDS_PATH)
            .match_query(Matcher::Regex("^recordIds=rec1&recordIds=rec2$".into()))
            .with_body(r#"{"code": 200, "success": true, "message": "SUCCESS"}"#)
            .create_async()
            .await;

        test_client(&server.url())
            .datasheet("dst1")
            .delete(["rec1", "rec2"])
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_invalid_requests_are_not_sent() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("DELETE", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let err = client
            .datasheet("dst1")
            .delete(Vec::<String>::new())
            .await
            .unwrap_err();
        assert!(matches!(err, VikaError::LocalValidation(_)));

        let err = client.datasheet("").delete(["rec1"]).await.unwrap_err();
        assert!(matches!(err, VikaError::LocalValidation(_)));

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_upload_sends_single_file_part() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "meeting notes").unwrap();

        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/fusion/v1/datasheets/dst1/attachments")
            .match_header("authorization", "Bearer test-token")
            .match_header(
                "content-type",
                Matcher::Regex("^multipart/form-data; boundary=.+$".into()),
            )
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#"name="file"; filename="notes.txt""#.into()),
                Matcher::Regex("application/octet-stream".into()),
                Matcher::Regex("meeting notes".into()),
            ]))
            .with_body(ok(json!({
                "token": "space/2024/notes.txt",
                "name": "notes.txt",
                "size": 13,
                "mimeType": "text/plain",
                "url": "https://s1.vika.cn/space/2024/notes.txt"
            })))
            .create_async()
            .await;

        let attachment = test_client(&server.url())
            .datasheet("dst1")
            .upload_file(&path)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(attachment.name, "notes.txt");
        assert_eq!(attachment.size, 13);
    }

    #[tokio::test]
    async fn test_fields_with_view() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/fusion/v1/datasheets/dst1/fields")
            .match_query(query(&[("viewId", "viw1")]))
            .with_body(ok(json!({"fields": [
                {"id": "fld1", "name": "Title", "type": "SingleText", "isPrimary": true, "property": {"defaultValue": ""}},
                {"id": "fld2", "name": "Done", "type": "Checkbox", "property": {"icon": "white_check_mark"}}
            ]})))
            .create_async()
            .await;

        let fields = test_client(&server.url())
            .datasheet("dst1")
            .fields(Some("viw1"))
            .await
            .unwrap();

        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].is_primary, Some(true));
        assert!(matches!(fields[1].property, FieldProperty::Checkbox(_)));
    }
}
