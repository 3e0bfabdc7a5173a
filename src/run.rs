//! End-to-end crawl orchestration.
//!
//! One run strings the stages together over a single reports directory:
//!
//! ```text
//! load cache → discover → diff → enrich → rank → report → sync icons → save cache
//! ```
//!
//! Two ordering rules keep runs idempotent:
//!
//! - The identity cache is saved **last**, and only with the ids that were
//!   actually enriched. A run that dies after the report is written leaves
//!   the cache untouched, so the next run redoes the same work instead of
//!   silently losing entries. Skipped ids never enter the cache at all.
//! - A run that finds nothing new writes no report and touches no icons;
//!   it only refreshes `last_run.json`.
//!
//! The caller owns the HTTP client and extractor so tests can substitute
//! fakes for both.

use crate::assets::{AssetError, sync_icons};
use crate::cache::{CacheError, SeenCache};
use crate::config::CrawlerConfig;
use crate::crawl::discover;
use crate::enrich::enrich_new;
use crate::extract::PageExtractor;
use crate::fetch::Fetcher;
use crate::rank::sort_records;
use crate::report::render_report;
use crate::store::{RunSummary, Store, StoreError, now_stamp};
use crate::types::RunEvent;
use std::io;
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunError {
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("asset sync error: {0}")]
    Asset(#[from] AssetError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Run one full crawl against the given reports directory.
///
/// With `pause` set, waits for Enter between discovery and enrichment so
/// an operator can abort before the detail fetches start.
pub fn run(
    fetcher: &impl Fetcher,
    extractor: &impl PageExtractor,
    config: &CrawlerConfig,
    store: &Store,
    pause: bool,
    events: Option<Sender<RunEvent>>,
) -> Result<RunSummary, RunError> {
    let mut cache = SeenCache::load(&store.cache_path())?;
    let discovery = discover(
        fetcher,
        extractor,
        &config.store,
        config.crawl.page_ceiling,
        &cache,
        events.clone(),
    );
    let new_ids = cache.unseen(&discovery.entry_ids);

    let mut summary = RunSummary::begin(
        discovery.pages_visited,
        discovery.entries_seen,
        discovery.groups_seen,
        discovery.termination,
    );
    summary.new_entries = new_ids.len();

    if pause {
        eprintln!("{} new entries; press Enter to fetch details", new_ids.len());
        let mut line = String::new();
        io::stdin().read_line(&mut line)?;
    }

    let enrichment = enrich_new(
        fetcher,
        extractor,
        &config.store,
        &new_ids,
        &config.rank.tag_groups,
        events.clone(),
    );
    summary.enriched = enrichment.records.len();
    summary.skipped = enrichment.skipped.len();

    if !enrichment.records.is_empty() {
        let mut records = enrichment.records;
        sort_records(&mut records);

        store.ensure_stylesheet(&config.colors)?;
        let html = render_report(
            &records,
            &config.store,
            &config.colors.row,
            store.stylesheet_name(),
        );
        summary.report = Some(store.write_report(&html.into_string())?);

        let stats = sync_icons(fetcher, &config.store, store, events)?;
        summary.icons_downloaded = stats.downloaded;
        summary.icons_failed = stats.failed;
        summary.icons_pruned = stats.pruned;

        cache.merge(records.iter().map(|record| record.id.clone()));
        cache.save(&store.cache_path())?;
    }

    summary.finished_at = now_stamp()?;
    store.write_run_summary(&summary)?;

    Ok(summary)
}
