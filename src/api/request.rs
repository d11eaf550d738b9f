//
//  vika
//  api/request.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Request Description Layer
//!
//! Every API operation is a small value implementing [`ApiRequest`]. The value
//! knows its HTTP method, path, query parameters and body; the transport in
//! [`client`](super::client) turns it into exactly one HTTP call and hands the
//! response back to [`ApiRequest::decode`].
//!
//! # Body Kinds
//!
//! | Kind | Used by | `Content-Type` |
//! |------|---------|----------------|
//! | [`RequestBody::Empty`] | reads, delete | `application/json` |
//! | [`RequestBody::Json`] | create, update | `application/json` |
//! | [`RequestBody::Multipart`] | attachment upload | `multipart/form-data; boundary=...` |
//!
//! # Query Encoding
//!
//! [`QueryParams`] keeps insertion order and allows repeated keys, so list
//! parameters encode as `recordIds=a&recordIds=b`. Unset parameters are never
//! added.

use std::fmt;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use super::common::{decode_envelope, Result, VikaError};

/// HTTP methods used by the Vika API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
    Delete,
}

impl HttpMethod {
    /// Returns the upper-case method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Ordered query parameters with support for repeated keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parameter.
    pub fn push(&mut self, key: impl Into<String>, value: impl ToString) {
        self.pairs.push((key.into(), value.to_string()));
    }

    /// Appends a parameter only when a value is present.
    pub fn push_opt<V: ToString>(&mut self, key: &str, value: Option<V>) {
        if let Some(value) = value {
            self.push(key, value);
        }
    }

    /// Appends one `key=value` pair per item.
    pub fn extend_repeated<I, V>(&mut self, key: &str, values: I)
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        for value in values {
            self.push(key, value);
        }
    }

    /// Returns the first value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns every value for `key`, in insertion order.
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Encodes the parameters as an `application/x-www-form-urlencoded` string.
    pub fn encode(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }
}

/// A single file sent as one part of a multipart body.
#[derive(Debug, Clone)]
pub struct FilePart {
    /// Form field name of the part.
    pub field_name: String,
    /// File name reported to the server.
    pub file_name: String,
    /// MIME type of the part.
    pub mime_type: String,
    /// Full file contents.
    pub bytes: Vec<u8>,
}

/// The body of a request.
#[derive(Debug, Clone)]
pub enum RequestBody {
    /// No body.
    Empty,
    /// A JSON document.
    Json(serde_json::Value),
    /// A multipart form holding one file.
    Multipart(FilePart),
}

impl RequestBody {
    /// Returns the content type for non-multipart bodies.
    ///
    /// Multipart bodies return `None`: the boundary is only known once the
    /// form is built, so the transport lets `reqwest` set the header.
    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            Self::Empty | Self::Json(_) => Some("application/json"),
            Self::Multipart(_) => None,
        }
    }
}

/// A typed description of one API call.
///
/// Implementors describe *what* to send; [`VikaClient::send`] decides *how*.
/// Only `method`, `path` and `Response` are mandatory.
///
/// [`VikaClient::send`]: super::client::VikaClient::send
pub trait ApiRequest {
    /// Payload type decoded from the envelope's `data`.
    type Response: DeserializeOwned;

    fn method(&self) -> HttpMethod;

    /// Path relative to the base URL, starting with `/`.
    fn path(&self) -> String;

    fn query(&self) -> QueryParams {
        QueryParams::new()
    }

    /// Consumes the request's payload into a body.
    fn into_body(self) -> Result<RequestBody>
    where
        Self: Sized,
    {
        Ok(RequestBody::Empty)
    }

    /// Rejects malformed requests before anything is sent.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Decodes the response body.
    fn decode(status: StatusCode, body: &[u8]) -> Result<Self::Response> {
        decode_envelope(status, body)
    }
}

/// Characters that would split an identifier out of its path segment.
const PATH_BREAKING: &[char] = &['/', '\\', '?', '#', '%'];

/// Fails with [`VikaError::LocalValidation`] when an identifier is blank or
/// cannot stand as a single URL path segment.
pub fn require_id(kind: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(VikaError::invalid(format!("{} id must not be empty", kind)));
    }
    if value.contains(PATH_BREAKING) || value.chars().all(|c| c == '.') {
        return Err(VikaError::invalid(format!(
            "{} id {:?} contains characters not allowed in an id",
            kind, value
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_repeated_keys_keep_order() {
        let mut query = QueryParams::new();
        query.extend_repeated("recordIds", ["rec1", "rec2"]);
        query.push("pageSize", 100);

        assert_eq!(query.get_all("recordIds"), vec!["rec1", "rec2"]);
        assert_eq!(query.encode(), "recordIds=rec1&recordIds=rec2&pageSize=100");
    }

    #[test]
    fn test_query_push_opt_skips_none() {
        let mut query = QueryParams::new();
        query.push_opt::<u32>("maxRecords", None);
        query.push_opt("viewId", Some("viw1"));

        assert_eq!(query.get("maxRecords"), None);
        assert_eq!(query.get("viewId"), Some("viw1"));
        assert_eq!(query.pairs().len(), 1);
    }

    #[test]
    fn test_query_encoding_escapes_values() {
        let mut query = QueryParams::new();
        query.push("filterByFormula", "{Title}=\"a b\"");
        assert_eq!(query.encode(), "filterByFormula=%7BTitle%7D%3D%22a+b%22");
    }

    #[test]
    fn test_content_type_per_body() {
        assert_eq!(RequestBody::Empty.content_type(), Some("application/json"));
        assert_eq!(
            RequestBody::Json(serde_json::json!({})).content_type(),
            Some("application/json")
        );
        let part = FilePart {
            field_name: "file".into(),
            file_name: "a.png".into(),
            mime_type: "image/png".into(),
            bytes: vec![],
        };
        assert_eq!(RequestBody::Multipart(part).content_type(), None);
    }

    #[test]
    fn test_require_id() {
        assert!(require_id("datasheet", "dst123").is_ok());
        let err = require_id("datasheet", "  ").unwrap_err();
        assert!(err.to_string().contains("datasheet id must not be empty"));
    }

    #[test]
    fn test_require_id_rejects_path_breaking_ids() {
        for id in ["../../spaces", "dst1?x=1#", "dst1/records", "a%2Fb", "..", "."] {
            let err = require_id("datasheet", id).unwrap_err();
            assert!(matches!(err, VikaError::LocalValidation(_)), "{id} accepted");
        }
        assert!(require_id("node", "fod.v2-A_1").is_ok());
    }

    #[test]
    fn test_method_conversion() {
        assert_eq!(reqwest::Method::from(HttpMethod::Patch), reqwest::Method::PATCH);
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
    }
}
