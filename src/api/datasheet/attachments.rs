//
//  vika
//  api/datasheet/attachments.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Attachment upload.
//!
//! Files are sent as a `multipart/form-data` body with a single part named
//! `file`. The returned [`Attachment`] can be written into an attachment
//! cell of a record.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::api::common::{Result, VikaError};
use crate::api::request::{require_id, ApiRequest, FilePart, HttpMethod, RequestBody};

/// MIME type used when the content cannot be recognized.
pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// Form field name of the uploaded file.
pub const FILE_PART_NAME: &str = "file";

/// An uploaded file, as stored by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub token: String,
    pub name: String,
    #[serde(default)]
    pub size: u64,
    /// Image width in pixels; absent for non-images.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Guesses a MIME type from the file's leading bytes.
pub fn sniff_mime_type(bytes: &[u8]) -> &'static str {
    infer::get(bytes)
        .map(|kind| kind.mime_type())
        .unwrap_or(FALLBACK_MIME_TYPE)
}

/// `POST /fusion/v1/datasheets/{id}/attachments`
#[derive(Debug, Clone)]
pub struct UploadAttachment {
    pub datasheet_id: String,
    pub file: FilePart,
}

impl UploadAttachment {
    /// Builds an upload from in-memory contents.
    pub fn from_bytes(
        datasheet_id: impl Into<String>,
        file_name: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        let mime_type = sniff_mime_type(&bytes).to_string();
        Self {
            datasheet_id: datasheet_id.into(),
            file: FilePart {
                field_name: FILE_PART_NAME.to_string(),
                file_name: file_name.into(),
                mime_type,
                bytes,
            },
        }
    }

    /// Reads a whole file into memory and builds an upload from it.
    ///
    /// The part's file name is the path's base name.
    ///
    /// # Errors
    ///
    /// [`VikaError::LocalIo`] when the file cannot be read, and
    /// [`VikaError::LocalValidation`] when the path has no file name.
    pub async fn from_path(datasheet_id: impl Into<String>, path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                VikaError::invalid(format!("{} is not a file path", path.display()))
            })?;

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| VikaError::LocalIo {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self::from_bytes(datasheet_id, file_name, bytes))
    }
}

impl ApiRequest for UploadAttachment {
    type Response = Attachment;

    fn method(&self) -> HttpMethod {
        HttpMethod::Post
    }

    fn path(&self) -> String {
        format!("/fusion/v1/datasheets/{}/attachments", self.datasheet_id)
    }

    fn into_body(self) -> Result<RequestBody> {
        Ok(RequestBody::Multipart(self.file))
    }

    fn validate(&self) -> Result<()> {
        require_id("datasheet", &self.datasheet_id)
    }
}
