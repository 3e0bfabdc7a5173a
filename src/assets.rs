//! Icon synchronization against the report archive.
//!
//! The reports on disk are the source of truth: an icon belongs in
//! `icons/` exactly when some report references it. Each sync pass
//! re-derives that referenced set by scanning every report, then
//!
//! 1. downloads icons that are referenced but missing, and
//! 2. prunes icons that no report references anymore.
//!
//! Deleting an old report is therefore all it takes to reclaim its icons
//! on the next run. A failed download is skipped and counted; the report
//! keeps its reference, so the next sync retries it. Files in `icons/`
//! that do not follow the `<digits>.jpg` naming are never touched.
//!
//! Ids cross the wire in natural form (the image host rejects zero-padded
//! ids) while filenames and report references stay canonical. The scan
//! pattern below and [`crate::store::icon_reference`] are two halves of
//! the same contract.

use crate::config::StoreConfig;
use crate::fetch::Fetcher;
use crate::ident::EntryId;
use crate::store::{Store, StoreError};
use crate::types::RunEvent;
use regex::Regex;
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("icon reference pattern failed to compile: {0}")]
    Pattern(#[from] regex::Error),
}

/// What one sync pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub downloaded: usize,
    pub failed: usize,
    pub pruned: usize,
}

impl fmt::Display for SyncStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} downloaded, {} failed, {} pruned",
            self.downloaded, self.failed, self.pruned
        )
    }
}

/// Bring the icon directory in line with the reports.
pub fn sync_icons(
    fetcher: &impl Fetcher,
    store_cfg: &StoreConfig,
    store: &Store,
    events: Option<Sender<RunEvent>>,
) -> Result<SyncStats, AssetError> {
    let referenced = referenced_icons(store)?;
    let on_disk = store.list_icons()?;
    let mut stats = SyncStats::default();

    for (index, id) in referenced.difference(&on_disk).enumerate() {
        match fetcher.fetch_bytes(&store_cfg.image_file_url(id)) {
            Some(bytes) => {
                store.write_icon(id, &bytes)?;
                stats.downloaded += 1;
                if let Some(tx) = &events {
                    tx.send(RunEvent::IconDownloaded {
                        index: index + 1,
                        id: id.clone(),
                    })
                    .ok();
                }
            }
            None => {
                stats.failed += 1;
                if let Some(tx) = &events {
                    tx.send(RunEvent::IconFailed { id: id.clone() }).ok();
                }
            }
        }
    }

    for id in on_disk.difference(&referenced) {
        store.remove_icon(id)?;
        stats.pruned += 1;
    }

    Ok(stats)
}

/// Every icon id referenced by any report in the directory.
fn referenced_icons(store: &Store) -> Result<BTreeSet<EntryId>, AssetError> {
    let pattern = Regex::new(r"icons/([0-9]+)\.jpg")?;
    let mut referenced = BTreeSet::new();
    for report in store.list_reports()? {
        let html = fs::read_to_string(&report)?;
        for capture in pattern.captures_iter(&html) {
            if let Some(id) = EntryId::parse(&capture[1]) {
                referenced.insert(id);
            }
        }
    }
    Ok(referenced)
}
