//! Detail-page enrichment for newly discovered entries.
//!
//! Stage 2 of the shelfwatch pipeline. Each unseen id gets its detail page
//! fetched once, and name, rating signal and tags extracted from it. Entries
//! whose page is unavailable this run are skipped, not recorded, and left
//! out of the cache merge so the next run retries them.
//!
//! ## Parallel fetching
//!
//! Detail pages are independent, so they are fetched in parallel using
//! [rayon](https://docs.rs/rayon). The result vector preserves input id
//! order regardless of completion order, and the orchestration re-sorts by
//! the contract key before rendering, so report output is deterministic.
//! Progress events carry a completion counter, not an input position.

use crate::config::StoreConfig;
use crate::extract::PageExtractor;
use crate::fetch::Fetcher;
use crate::ident::EntryId;
use crate::rank::tag_rank;
use crate::types::{EntryRecord, RunEvent};
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::Sender;

/// What enriching one batch of new ids produced.
#[derive(Debug)]
pub struct Enrichment {
    /// One record per successfully enriched id, in input id order.
    pub records: Vec<EntryRecord>,
    /// Ids whose detail page was unavailable; they stay out of the cache
    /// and are retried on the next run.
    pub skipped: Vec<EntryId>,
}

/// Fetch and classify every id in `new_ids`.
pub fn enrich_new(
    fetcher: &impl Fetcher,
    extractor: &impl PageExtractor,
    store: &StoreConfig,
    new_ids: &BTreeSet<EntryId>,
    tag_order: &[Vec<String>],
    events: Option<Sender<RunEvent>>,
) -> Enrichment {
    let total = new_ids.len();
    let completed = AtomicUsize::new(0);

    let outcomes: Vec<Result<EntryRecord, EntryId>> = new_ids
        .par_iter()
        .map_with(events, |tx, id| {
            let page = fetcher.fetch_text(&store.entry_page_url(id));
            let index = completed.fetch_add(1, Ordering::SeqCst) + 1;

            let Some(body) = page else {
                if let Some(tx) = tx {
                    tx.send(RunEvent::EntrySkipped {
                        index,
                        total,
                        id: id.clone(),
                    })
                    .ok();
                }
                return Err(id.clone());
            };

            let detail = extractor.detail(&body);
            let record = EntryRecord {
                tag_rank: tag_rank(&detail.tags, tag_order),
                rating: detail.signal.resolve(),
                id: id.clone(),
                tags: detail.tags,
            };
            if let Some(tx) = tx {
                tx.send(RunEvent::EntryEnriched {
                    index,
                    total,
                    id: id.clone(),
                    name: detail.name,
                })
                .ok();
            }
            Ok(record)
        })
        .collect();

    let mut records = Vec::new();
    let mut skipped = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(record) => records.push(record),
            Err(id) => skipped.push(id),
        }
    }
    Enrichment { records, skipped }
}
