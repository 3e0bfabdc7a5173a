//! Shared test utilities for the shelfwatch test suite.
//!
//! Provides a canned-response fetcher, page-fragment builders matching the
//! markup the default extractor understands, and record builders.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let fetcher = FakeFetcher::new()
//!     .page(&page_url(1), listing_page(&["42"], &[]))
//!     .page(&page_url(2), listing_page(&[], &[]));
//!
//! let extractor = MarkupExtractor::new(&store_config()).unwrap();
//! ```

use crate::config::{CrawlerConfig, StoreConfig};
use crate::fetch::Fetcher;
use crate::ident::EntryId;
use crate::types::{EntryRecord, Rating};
use std::collections::HashMap;
use std::sync::Mutex;

// =========================================================================
// Canned configuration
// =========================================================================

/// Store templates every helper below builds URLs against.
pub fn store_config() -> StoreConfig {
    StoreConfig {
        listing_url: "https://store.test/search/?page={page}".to_string(),
        entry_url: "https://store.test/entry/{id}".to_string(),
        image_url: "https://cdn.test/{id}/header.jpg".to_string(),
        group_url: "https://store.test/bundle/{id}".to_string(),
    }
}

/// A full config that passes validation, using [`store_config`] URLs.
pub fn crawler_config() -> CrawlerConfig {
    let mut config = CrawlerConfig::default();
    config.store = store_config();
    config.rank.tag_groups = vec![vec!["RPG".to_string()]];
    config
}

/// Listing URL for a page number, matching [`store_config`].
pub fn page_url(page: u32) -> String {
    store_config().listing_page_url(page)
}

/// Detail fetch URL for an id (natural form), matching [`store_config`].
pub fn entry_url(id: &str) -> String {
    store_config().entry_page_url(&parse_id(id))
}

/// Icon download URL for an id (natural form), matching [`store_config`].
pub fn image_url(id: &str) -> String {
    store_config().image_file_url(&parse_id(id))
}

// =========================================================================
// Page fragments
// =========================================================================

/// A listing page linking the given entry and group ids.
pub fn listing_page(entries: &[&str], groups: &[&str]) -> String {
    let mut html = String::from("<html><body>\n");
    for id in entries {
        html.push_str(&format!(
            "<a href=\"https://store.test/entry/{id}\">an entry</a>\n"
        ));
    }
    for id in groups {
        html.push_str(&format!(
            "<a href=\"https://store.test/bundle/{id}\">a bundle</a>\n"
        ));
    }
    html.push_str("</body></html>\n");
    html
}

/// A scored detail page with a name, positive-review percentage and tags.
pub fn detail_page(name: &str, percent: u32, tags: &[&str]) -> String {
    let tag_blob: Vec<String> = tags
        .iter()
        .enumerate()
        .map(|(index, tag)| format!("{{\"tagid\":{index},\"name\":\"{tag}\"}}"))
        .collect();
    format!(
        "<html><body>\n\
         <div class=\"entry_name\">{name}</div>\n\
         <span>{percent}% of the 1,234 user reviews for this item are positive</span>\n\
         <script>var tags = [{}];</script>\n\
         </body></html>\n",
        tag_blob.join(",")
    )
}

/// A detail page carrying a raw marker fragment instead of a score.
pub fn detail_page_with_marker(name: &str, marker: &str, tags: &[&str]) -> String {
    let tag_blob: Vec<String> = tags
        .iter()
        .enumerate()
        .map(|(index, tag)| format!("{{\"tagid\":{index},\"name\":\"{tag}\"}}"))
        .collect();
    format!(
        "<html><body>\n\
         <div class=\"entry_name\">{name}</div>\n\
         {marker}\n\
         <script>var tags = [{}];</script>\n\
         </body></html>\n",
        tag_blob.join(",")
    )
}

// =========================================================================
// Record builders
// =========================================================================

pub fn parse_id(s: &str) -> EntryId {
    EntryId::parse(s).unwrap_or_else(|| panic!("{s:?} is not a valid entry id"))
}

pub fn record(tag_rank: usize, rating: Rating, id: &str, tags: &[&str]) -> EntryRecord {
    EntryRecord {
        tag_rank,
        rating,
        id: parse_id(id),
        tags: tags.iter().map(|tag| tag.to_string()).collect(),
    }
}

// =========================================================================
// Fake fetcher
// =========================================================================

/// Canned-response fetcher. URLs without a canned response come back as
/// `None`, which is exactly the real fetcher's "unavailable this run".
/// Every request is recorded so tests can assert on fetch behavior.
#[derive(Default)]
pub struct FakeFetcher {
    pages: HashMap<String, String>,
    blobs: HashMap<String, Vec<u8>>,
    requests: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for text fetches of `url`.
    pub fn page(mut self, url: &str, body: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), body.into());
        self
    }

    /// Serve `data` for byte fetches of `url`.
    pub fn blob(mut self, url: &str, data: &[u8]) -> Self {
        self.blobs.insert(url.to_string(), data.to_vec());
        self
    }

    /// Every URL requested so far, in request order.
    pub fn requested(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl Fetcher for FakeFetcher {
    fn fetch_text(&self, url: &str) -> Option<String> {
        self.requests.lock().unwrap().push(url.to_string());
        self.pages.get(url).cloned()
    }

    fn fetch_bytes(&self, url: &str) -> Option<Vec<u8>> {
        self.requests.lock().unwrap().push(url.to_string());
        self.blobs.get(url).cloned()
    }
}
