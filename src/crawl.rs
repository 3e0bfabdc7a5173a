//! Listing discovery: walk the paginated catalog until it ends.
//!
//! Stage 1 of the shelfwatch pipeline. Pages are fetched strictly in order
//! starting at 1, because the stop condition is positional: the first page
//! with no entry and no group links is the catalog end. A page ceiling from
//! config bounds the walk for listings that never produce an empty page, and
//! an unfetchable listing page ends the walk too. The three stop reasons are
//! kept distinct for reporting even though all three just end the loop.
//!
//! Running totals count raw per-page occurrences, so an entry listed on
//! several pages counts once per page there; the returned id set is globally
//! de-duplicated. The seen cache is only consulted for the per-page
//! diagnostics ("how much of this is new"); the authoritative diff against
//! the cache happens in the run orchestration.

use crate::cache::SeenCache;
use crate::config::StoreConfig;
use crate::extract::PageExtractor;
use crate::fetch::Fetcher;
use crate::ident::EntryId;
use crate::types::{RunEvent, Termination};
use std::collections::BTreeSet;
use std::sync::mpsc::Sender;

/// What one listing walk found.
#[derive(Debug)]
pub struct Discovery {
    /// Every entry id linked from any visited page, canonical, de-duplicated.
    pub entry_ids: BTreeSet<EntryId>,
    /// Pages fetched or attempted, including the terminal page.
    pub pages_visited: u32,
    /// Per-page entry counts summed across pages (cross-page duplicates
    /// counted once per page).
    pub entries_seen: usize,
    /// Per-page group counts summed across pages.
    pub groups_seen: usize,
    pub termination: Termination,
}

/// Walk the listing from page 1 until it terminates.
pub fn discover(
    fetcher: &impl Fetcher,
    extractor: &impl PageExtractor,
    store: &StoreConfig,
    page_ceiling: u32,
    seen: &SeenCache,
    events: Option<Sender<RunEvent>>,
) -> Discovery {
    let mut entry_ids: BTreeSet<EntryId> = BTreeSet::new();
    let mut new_ids: BTreeSet<EntryId> = BTreeSet::new();
    let mut entries_seen = 0;
    let mut groups_seen = 0;
    let mut pages_visited = 0;

    let mut page = 0;
    let termination = loop {
        if page >= page_ceiling {
            break Termination::CeilingReached;
        }
        page += 1;
        pages_visited = page;

        let Some(body) = fetcher.fetch_text(&store.listing_page_url(page)) else {
            break Termination::ListingUnavailable;
        };

        let page_entries = extractor.listing_entries(&body);
        let page_groups = extractor.listing_groups(&body);
        if page_entries.is_empty() && page_groups.is_empty() {
            break Termination::EmptyPage;
        }

        let entry_count = page_entries.len();
        let group_count = page_groups.len();
        entries_seen += entry_count;
        groups_seen += group_count;
        for id in &page_entries {
            if !seen.contains(id) {
                new_ids.insert(id.clone());
            }
        }
        entry_ids.extend(page_entries);

        if let Some(tx) = &events {
            tx.send(RunEvent::PageCrawled {
                page,
                entries: entry_count,
                groups: group_count,
                total_entries: entries_seen,
                total_groups: groups_seen,
                new_entries: new_ids.len(),
            })
            .ok();
        }
    };

    Discovery {
        entry_ids,
        pages_visited,
        entries_seen,
        groups_seen,
        termination,
    }
}
