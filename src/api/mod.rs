//
//  vika
//  api/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # API Client Layer
//!
//! This module implements the Vika Fusion API (`/fusion/v1`).
//!
//! ## Architecture
//!
//! Every call flows through the same pipeline:
//!
//! ```text
//! facade method -> ApiRequest -> VikaClient::send -> ApiRequest::decode -> value
//! ```
//!
//! - [`request`]: The [`ApiRequest`] trait, query parameters and body kinds
//! - [`client`]: The HTTP transport
//! - [`common`]: Envelope codec, error taxonomy and page aggregation
//! - [`datasheet`]: Records, fields and attachments of one datasheet
//! - [`space`]: Spaces and their nodes
//!
//! ## Usage
//!
//! ```rust,no_run
//! use vika::api::datasheet::RecordQuery;
//! use vika::api::VikaClient;
//! use vika::config::ClientConfig;
//!
//! # async fn example() -> vika::api::Result<()> {
//! let client = VikaClient::new(ClientConfig::new("usk_your_token"))?;
//! let page = client
//!     .datasheet("dstWUHwzTHd2YQaXEE")
//!     .records(RecordQuery::new().page_size(20))
//!     .await?;
//!
//! println!("{} of {} records", page.records.len(), page.total);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Every operation returns [`VikaError`]:
//!
//! - `Transport`: no response (connection failure, timeout)
//! - `HttpStatus`: status other than 200/201
//! - `Parse`: body is not the expected envelope
//! - `Api`: envelope reports a failure
//! - `LocalValidation` / `LocalIo`: rejected before sending

pub mod client;
pub mod common;
pub mod datasheet;
pub mod request;
pub mod space;

pub use client::VikaClient;
pub use common::{Result, VikaError};
pub use request::ApiRequest;
