//! Listing and detail page extraction.
//!
//! Everything the pipeline knows about page markup lives behind the
//! [`PageExtractor`] trait: pattern-match the listing for entry and group
//! links, pull name, rating signal and tags out of a detail page. The
//! pipeline itself never touches HTML, so the extraction strategy can be
//! swapped (or faked in tests) without touching crawl or enrichment logic.
//!
//! [`MarkupExtractor`] is the default strategy. Listing link patterns are
//! derived from the configured entry/group URL bases; the detail-page
//! patterns are fixed assumptions about the storefront's markup. Extraction
//! never fails: a pattern that matches nothing yields its documented default
//! (empty name, zero percent, empty tag list), because a missing fragment on
//! one page must not take down the run.

use crate::config::StoreConfig;
use crate::ident::EntryId;
use crate::types::RatingSignal;
use regex::Regex;
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("invalid link pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Metadata scraped from one detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailPage {
    /// Display name; empty when the page has none. Only used for progress
    /// output, never stored.
    pub name: String,
    /// Raw review markers, resolved into a rating by the enricher.
    pub signal: RatingSignal,
    /// Tags in page order, duplicates preserved.
    pub tags: Vec<String>,
}

/// Page markup reader used by discovery and enrichment.
pub trait PageExtractor: Sync {
    /// Distinct entry ids linked from a listing page, canonicalized.
    fn listing_entries(&self, page: &str) -> BTreeSet<EntryId>;
    /// Distinct group ids linked from a listing page. Groups are counted,
    /// never enriched.
    fn listing_groups(&self, page: &str) -> BTreeSet<String>;
    /// Metadata from one entry detail page.
    fn detail(&self, page: &str) -> DetailPage;
}

const NAME_PATTERN: &str = r#"<div class="entry_name">(.+?)</div>"#;
const PERCENT_PATTERN: &str =
    r"([0-9]+)% of the [0-9,]+ user reviews for this item are positive";
const TAG_PATTERN: &str = r#""tagid":[0-9]+,"name":"([^"]+?)""#;

const NO_REVIEWS_MARKER: &str = "No user reviews";
const NOT_SCORED_MARKER: &str = "Need more user reviews to generate a score";
const UNRELEASED_MARKER: &str = r#"<div class="coming_soon_area">"#;

/// Regex-backed extractor for the storefront's HTML.
pub struct MarkupExtractor {
    entry_link: Regex,
    group_link: Option<Regex>,
    name: Regex,
    percent: Regex,
    tags: Regex,
}

impl MarkupExtractor {
    pub fn new(store: &StoreConfig) -> Result<Self, ExtractError> {
        let group_link = if store.group_url.is_empty() {
            None
        } else {
            Some(link_pattern(&store.group_url)?)
        };
        Ok(Self {
            entry_link: link_pattern(&store.entry_url)?,
            group_link,
            name: Regex::new(NAME_PATTERN)?,
            percent: Regex::new(PERCENT_PATTERN)?,
            tags: Regex::new(TAG_PATTERN)?,
        })
    }
}

/// Anchor pattern for links built from a `{id}` URL template: the literal
/// prefix before the placeholder, followed by the captured digit run.
fn link_pattern(template: &str) -> Result<Regex, regex::Error> {
    let prefix = template
        .find("{id}")
        .map_or(template, |position| &template[..position]);
    Regex::new(&format!(r#"<a href="{}([0-9]+)"#, regex::escape(prefix)))
}

impl PageExtractor for MarkupExtractor {
    fn listing_entries(&self, page: &str) -> BTreeSet<EntryId> {
        self.entry_link
            .captures_iter(page)
            .filter_map(|caps| caps.get(1))
            .filter_map(|digits| EntryId::parse(digits.as_str()))
            .collect()
    }

    fn listing_groups(&self, page: &str) -> BTreeSet<String> {
        let Some(pattern) = &self.group_link else {
            return BTreeSet::new();
        };
        pattern
            .captures_iter(page)
            .filter_map(|caps| caps.get(1))
            .map(|digits| digits.as_str().to_string())
            .collect()
    }

    fn detail(&self, page: &str) -> DetailPage {
        let name = self
            .name
            .captures(page)
            .and_then(|caps| caps.get(1))
            .map(|matched| matched.as_str().to_string())
            .unwrap_or_default();
        let percent = self
            .percent
            .captures(page)
            .and_then(|caps| caps.get(1))
            .and_then(|matched| matched.as_str().parse().ok())
            .unwrap_or(0);
        let tags = self
            .tags
            .captures_iter(page)
            .filter_map(|caps| caps.get(1))
            .map(|matched| matched.as_str().to_string())
            .collect();
        DetailPage {
            name,
            signal: RatingSignal {
                percent,
                no_reviews: page.contains(NO_REVIEWS_MARKER),
                not_scored: page.contains(NOT_SCORED_MARKER),
                unreleased: page.contains(UNRELEASED_MARKER),
            },
            tags,
        }
    }
}
