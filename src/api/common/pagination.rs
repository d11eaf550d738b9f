//
//  vika
//  api/common/pagination.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Pagination Types for Vika API Responses
//!
//! List endpoints return one page at a time, using page-number pagination:
//!
//! | Parameter | Default | Bounds |
//! |-----------|---------|--------|
//! | `pageNum` | 1 | 1-indexed |
//! | `pageSize` | [`DEFAULT_PAGE_SIZE`] | `1..=`[`MAX_PAGE_SIZE`] |
//!
//! Each page reports the `total` number of matching items, which is the only
//! signal used to decide whether another page exists.
//!
//! # Aggregation
//!
//! [`collect_all_pages`] drives a page fetcher from page 1 until
//! `page_num * page_size >= total`. Pages are awaited strictly in order and
//! the first failure aborts the whole walk; partial results are discarded.
//!
//! # Example
//!
//! ```rust
//! use vika::api::common::{collect_all_pages, Page};
//!
//! # tokio_test::block_on(async {
//! let items = collect_all_pages(2, |page_num| async move {
//!     let start = (page_num - 1) * 2;
//!     Ok(Page {
//!         page_num,
//!         page_size: 2,
//!         total: 5,
//!         records: (start..(start + 2).min(5)).collect(),
//!     })
//! })
//! .await
//! .unwrap();
//!
//! assert_eq!(items, vec![0, 1, 2, 3, 4]);
//! # });
//! ```

use std::future::Future;

use serde::{Deserialize, Serialize};

use super::{Result, VikaError};

/// Page size used when the caller does not choose one.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Largest page size the service accepts.
pub const MAX_PAGE_SIZE: u32 = 1000;

/// First page number.
pub const DEFAULT_PAGE_NUM: u32 = 1;

/// A single page of results.
///
/// # Type Parameters
///
/// - `T` - The item type contained in `records`
///
/// # Notes
///
/// - `total` counts every match across all pages, not just this one
/// - `records` may be shorter than `page_size` on the final page
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Page number of this page (1-indexed).
    #[serde(default = "default_page_num")]
    pub page_num: u32,

    /// Requested page size.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Total number of items matching the query.
    #[serde(default)]
    pub total: u64,

    /// Items on this page.
    #[serde(default = "Vec::new")]
    pub records: Vec<T>,
}

fn default_page_num() -> u32 {
    DEFAULT_PAGE_NUM
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl<T> Page<T> {
    /// Checks if pages exist beyond this one.
    ///
    /// Uses the same completion rule as [`collect_all_pages`].
    pub fn has_next(&self) -> bool {
        self.page_size > 0 && u64::from(self.page_num) * u64::from(self.page_size) < self.total
    }
}

/// Fetches every page of a listing and concatenates the records in order.
///
/// `fetch_page` is called with page numbers `1, 2, 3, ...` and each call is
/// awaited before the next starts. The walk stops once
/// `page_num * page_size >= total`, where `total` comes from the most recent
/// page.
///
/// # Parameters
///
/// - `page_size` - Page size the fetcher requests; used for the completion rule
/// - `fetch_page` - Async closure returning the page for a given page number
///
/// # Returns
///
/// All records, in page order then in-page order.
///
/// # Errors
///
/// Returns the first error produced by `fetch_page`, with no partial results.
/// A zero `page_size` is rejected with [`VikaError::LocalValidation`] since it
/// could never complete.
pub async fn collect_all_pages<T, F, Fut>(page_size: u32, mut fetch_page: F) -> Result<Vec<T>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    if page_size == 0 {
        return Err(VikaError::invalid("page size must be at least 1"));
    }

    let mut records = Vec::new();
    let mut page_num = DEFAULT_PAGE_NUM;

    loop {
        let page = fetch_page(page_num).await?;
        let total = page.total;
        records.extend(page.records);

        tracing::debug!(
            page = page_num,
            collected = records.len(),
            total,
            "Fetched page"
        );

        if u64::from(page_num) * u64::from(page_size) >= total {
            return Ok(records);
        }

        page_num += 1;
    }
}
