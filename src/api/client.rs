//
//  vika
//  api/client.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # HTTP Client for the Vika API
//!
//! This module provides the client that performs every API call. It turns an
//! [`ApiRequest`] into exactly one HTTP request, attaches the bearer token, and
//! hands the response body to the request's decoder.
//!
//! ## Features
//!
//! - Bearer authentication on every request
//! - JSON and multipart bodies
//! - One timeout per client covering connect, send and read
//! - Request tracing through `tracing` (the token is never logged)
//!
//! Nothing is retried. A failed call returns its error to the caller
//! unchanged.

use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use url::Url;

use super::common::{Result, VikaError};
use super::datasheet::Datasheet;
use super::request::{ApiRequest, QueryParams, RequestBody};
use super::space::{DescribeSpaces, Space, SpaceInfo};
use crate::config::ClientConfig;

/// The client for the Vika API.
///
/// `VikaClient` is cheap to clone: clones share the connection pool and the
/// configuration. It can be used from many tasks at once.
///
/// # Creating a Client
///
/// ```rust,no_run
/// use vika::api::VikaClient;
/// use vika::config::ClientConfig;
///
/// # async fn example() -> vika::api::Result<()> {
/// let client = VikaClient::new(ClientConfig::new("usk_your_token"))?;
///
/// for space in client.spaces().await? {
///     println!("{} {}", space.id, space.name);
/// }
/// # Ok(())
/// # }
/// ```
///
/// # Resource Handles
///
/// - [`datasheet`](Self::datasheet) returns a [`Datasheet`] for record, field
///   and attachment operations
/// - [`space`](Self::space) returns a [`Space`] for node operations
#[derive(Debug, Clone)]
pub struct VikaClient {
    /// The underlying HTTP client
    http: Client,
    /// Shared, immutable settings
    config: Arc<ClientConfig>,
    /// Parsed from `config.host` once at construction
    base_url: Url,
}

impl VikaClient {
    /// Creates a client from a configuration.
    ///
    /// # Errors
    ///
    /// - [`VikaError::LocalValidation`] when the host cannot be parsed
    /// - [`VikaError::Transport`] when the HTTP client cannot be built
    pub fn new(config: ClientConfig) -> Result<Self> {
        let base_url = config.base_url()?;

        let http = Client::builder()
            .user_agent(format!("vika-rs/{}", crate::VERSION))
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            config: Arc::new(config),
            base_url,
        })
    }

    /// Returns the configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns a handle for one datasheet.
    ///
    /// No request is made; an empty id is reported by the first operation.
    pub fn datasheet(&self, datasheet_id: impl Into<String>) -> Datasheet {
        Datasheet::new(self.clone(), datasheet_id.into())
    }

    /// Returns a handle for one space.
    pub fn space(&self, space_id: impl Into<String>) -> Space {
        Space::new(self.clone(), space_id.into())
    }

    /// Lists the spaces the token can access.
    pub async fn spaces(&self) -> Result<Vec<SpaceInfo>> {
        Ok(self.send(DescribeSpaces).await?.spaces)
    }

    /// Builds the full URL for a path and query.
    ///
    /// Each `/`-separated part of `path` is appended to the base URL as one
    /// percent-encoded segment.
    pub fn url_for(&self, path: &str, query: &QueryParams) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| VikaError::invalid(format!("host {} cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .extend(path.split('/').filter(|segment| !segment.is_empty()));

        if !query.is_empty() {
            url.set_query(Some(&query.encode()));
        }

        Ok(url)
    }

    /// Sends one request and decodes its response.
    ///
    /// # Errors
    ///
    /// - [`VikaError::LocalValidation`] when the request fails its own checks
    ///   (nothing is sent)
    /// - [`VikaError::Transport`] on connection failure or timeout
    /// - any error produced by [`ApiRequest::decode`]
    pub async fn send<R: ApiRequest>(&self, request: R) -> Result<R::Response> {
        request.validate()?;

        let method = request.method();
        let path = request.path();
        let url = self.url_for(&path, &request.query())?;
        let body = request.into_body()?;

        tracing::debug!(method = %method, url = %url, "Sending request");

        let mut builder = self
            .config
            .credential
            .apply_to_request(self.http.request(method.into(), url));

        if let Some(content_type) = body.content_type() {
            builder = builder.header(CONTENT_TYPE, content_type);
        }

        builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => {
                if self.config.debug {
                    tracing::trace!(body = %value, "Request body");
                }
                builder.json(&value)
            }
            RequestBody::Multipart(file) => {
                tracing::debug!(
                    file = %file.file_name,
                    mime = %file.mime_type,
                    size = file.bytes.len(),
                    "Uploading file"
                );
                let part = Part::bytes(file.bytes)
                    .file_name(file.file_name)
                    .mime_str(&file.mime_type)
                    .map_err(|e| VikaError::invalid(format!("invalid MIME type: {}", e)))?;
                builder.multipart(Form::new().part(file.field_name, part))
            }
        };

        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        tracing::debug!(method = %method, path = %path, status = status.as_u16(), "Received response");
        if self.config.debug {
            tracing::trace!(body = %String::from_utf8_lossy(&bytes), "Response body");
        }

        R::decode(status, &bytes)
    }
}

/// Builds a client pointed at a mock server.
#[cfg(test)]
pub(crate) fn test_client(server_url: &str) -> VikaClient {
    VikaClient::new(ClientConfig {
        host: server_url.to_string(),
        ..ClientConfig::new("test-token")
    })
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use std::io::Write;

    const SPACES_OK: &str = r#"{"code": 200, "success": true, "message": "SUCCESS",
        "data": {"spaces": [{"id": "spc1", "name": "Team", "isAdmin": true}]}}"#;

    #[tokio::test]
    async fn test_sends_bearer_user_agent_and_content_type() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/fusion/v1/spaces")
            .match_header("authorization", "Bearer test-token")
            .match_header("content-type", "application/json")
            .match_header(
                "user-agent",
                Matcher::Regex(format!("^vika-rs/{}$", regex_escape(crate::VERSION))),
            )
            .with_status(200)
            .with_body(SPACES_OK)
            .create_async()
            .await;

        let spaces = test_client(&server.url()).spaces().await.unwrap();

        mock.assert_async().await;
        assert_eq!(spaces.len(), 1);
        assert_eq!(spaces[0].id, "spc1");
        assert!(spaces[0].is_admin);
    }

    #[tokio::test]
    async fn test_failed_envelope_is_api_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/fusion/v1/spaces")
            .with_status(200)
            .with_body(r#"{"code": 401, "success": false, "message": "api token invalid", "data": {"spaces": []}}"#)
            .create_async()
            .await;

        let err = test_client(&server.url()).spaces().await.unwrap_err();
        assert!(matches!(err, VikaError::Api { code: 401, .. }));
        assert_eq!(err.message(), "api token invalid");
    }

    #[tokio::test]
    async fn test_http_status_takes_precedence() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/fusion/v1/spaces")
            .with_status(500)
            .with_body("<html>bad gateway</html>")
            .create_async()
            .await;

        let err = test_client(&server.url()).spaces().await.unwrap_err();
        match &err {
            VikaError::HttpStatus { code, message } => {
                assert_eq!(*code, 500);
                assert!(message.contains("bad gateway"));
            }
            other => panic!("expected http status error, got {other:?}"),
        }
        assert!(!err.to_string().contains("test-token"));
    }

    #[tokio::test]
    async fn test_connection_failure_is_transport_error() {
        let client = test_client("http://127.0.0.1:1");
        let err = client.spaces().await.unwrap_err();
        assert!(matches!(err, VikaError::Transport(_)));
        assert_eq!(err.code(), 500);
        assert!(!format!("{err:?}").contains("test-token"));
    }

    #[tokio::test]
    async fn test_timeout_is_transport_error_and_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/fusion/v1/spaces")
            .with_status(200)
            .with_chunked_body(|w| {
                std::thread::sleep(std::time::Duration::from_millis(1500));
                w.write_all(SPACES_OK.as_bytes())
            })
            .expect(1)
            .create_async()
            .await;

        let client = VikaClient::new(ClientConfig {
            host: server.url(),
            timeout: std::time::Duration::from_millis(200),
            ..ClientConfig::new("test-token")
        })
        .unwrap();

        let err = client.spaces().await.unwrap_err();
        assert!(matches!(err, VikaError::Transport(_)));
        assert!(err.is_timeout());
        assert!(!format!("{err:?}").contains("test-token"));

        mock.assert_async().await;
    }

    #[test]
    fn test_url_for_keeps_base_prefix() {
        let client = test_client("https://vika.example.com/gateway/");
        let mut query = QueryParams::new();
        query.push("viewId", "viw1");

        let url = client.url_for("/fusion/v1/datasheets/dst1/fields", &query).unwrap();
        assert_eq!(
            url.as_str(),
            "https://vika.example.com/gateway/fusion/v1/datasheets/dst1/fields?viewId=viw1"
        );
    }

    #[test]
    fn test_url_for_encodes_segments() {
        let client = test_client("https://vika.example.com");
        let url = client
            .url_for("/fusion/v1/spaces/spc 1/nodes/fod\u{7ef4}", &QueryParams::new())
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://vika.example.com/fusion/v1/spaces/spc%201/nodes/fod%E7%BB%B4"
        );
    }

    #[tokio::test]
    async fn test_path_breaking_id_is_never_sent() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let client = test_client(&server.url());
        for id in ["../../spaces", "dst1?x=1#"] {
            let err = client.datasheet(id).fields(None).await.unwrap_err();
            assert!(matches!(err, VikaError::LocalValidation(_)));
        }
        let err = client.space("spc1").node("../nodes").await.unwrap_err();
        assert!(matches!(err, VikaError::LocalValidation(_)));

        mock.assert_async().await;
    }

    #[test]
    fn test_invalid_host_rejected() {
        let err = VikaClient::new(ClientConfig {
            host: "ftp://files.example.com".into(),
            ..ClientConfig::new("t")
        })
        .unwrap_err();
        assert!(matches!(err, VikaError::LocalValidation(_)));
    }

    #[test]
    fn test_client_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<VikaClient>();
    }

    fn regex_escape(text: &str) -> String {
        text.replace('.', r"\.")
    }
}
