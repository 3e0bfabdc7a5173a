//! Persistent cache of already-reported entry ids.
//!
//! The whole point of shelfwatch is "what appeared since last time", so the
//! crawl must remember every entry it has ever put in a report. This module
//! owns that memory: a flat set of canonical ids, loaded at the start of a
//! run and written back only after a report was actually produced.
//!
//! # Design
//!
//! The cache stores identity, nothing else: no timestamps, no per-entry
//! metadata. An id's presence means "this entry was enriched and reported
//! once; never process it again". Entries whose detail page could not be
//! fetched are deliberately *not* inserted, so they are retried on every
//! subsequent run.
//!
//! ## Storage
//!
//! Plain text, one canonical (zero-padded) id per line, sorted,
//! de-duplicated, newline-terminated, nothing else. The format is trivially
//! diffable and hand-editable, which is how operators reset a single entry
//! (delete its line) without touching the rest.
//!
//! Saving replaces the whole file via a sibling temp file and rename, so a
//! crash mid-write leaves the previous cache intact.
//!
//! ## Strict parsing
//!
//! A token that is not a digit string fails the load with
//! [`CacheError::Malformed`] rather than being dropped: a silently emptied
//! or truncated cache would re-report the entire catalog on the next run,
//! which is far more expensive than asking the operator to fix one line.

use crate::ident::EntryId;
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("seen cache contains a non-numeric token: {0:?}")]
    Malformed(String),
}

/// Set of entry ids that have already appeared in a report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeenCache {
    ids: BTreeSet<EntryId>,
}

impl SeenCache {
    /// Cache with no known ids (first run, or no persisted state).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load from `path`. A missing file is an empty cache; an unreadable or
    /// malformed file is an error.
    pub fn load(path: &Path) -> Result<Self, CacheError> {
        if !path.exists() {
            return Ok(Self::empty());
        }
        let content = fs::read_to_string(path)?;
        let mut ids = BTreeSet::new();
        for token in content.split_whitespace() {
            let id = EntryId::parse(token)
                .ok_or_else(|| CacheError::Malformed(token.to_string()))?;
            ids.insert(id);
        }
        Ok(Self { ids })
    }

    /// Write the canonical form: sorted, de-duplicated, one id per line,
    /// newline-terminated. The file is replaced whole (temp file + rename),
    /// never partially overwritten.
    pub fn save(&self, path: &Path) -> Result<(), CacheError> {
        let mut text = String::new();
        for id in &self.ids {
            text.push_str(id.canonical());
            text.push('\n');
        }
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, &text)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn contains(&self, id: &EntryId) -> bool {
        self.ids.contains(id)
    }

    pub fn insert(&mut self, id: EntryId) {
        self.ids.insert(id);
    }

    /// Merge a batch of ids (typically the successfully enriched ones).
    pub fn merge<I: IntoIterator<Item = EntryId>>(&mut self, ids: I) {
        self.ids.extend(ids);
    }

    /// The subset of `ids` this cache has not seen yet.
    pub fn unseen(&self, ids: &BTreeSet<EntryId>) -> BTreeSet<EntryId> {
        ids.iter()
            .filter(|id| !self.contains(id))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn id(s: &str) -> EntryId {
        EntryId::parse(s).unwrap()
    }

    // =========================================================================
    // Load
    // =========================================================================

    #[test]
    fn load_missing_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let cache = SeenCache::load(&tmp.path().join("seen.txt")).unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn load_parses_one_id_per_line() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("seen.txt");
        std::fs::write(&path, "0000042\n0001337\n").unwrap();

        let cache = SeenCache::load(&path).unwrap();
        assert_eq!(cache.len(), 2);
        assert!(cache.contains(&id("42")));
        assert!(cache.contains(&id("1337")));
    }

    #[test]
    fn load_tolerates_arbitrary_whitespace() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("seen.txt");
        std::fs::write(&path, "  0000042\t0001337\n\n0000007").unwrap();

        let cache = SeenCache::load(&path).unwrap();
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn load_canonicalizes_unpadded_tokens() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("seen.txt");
        std::fs::write(&path, "42\n").unwrap();

        let cache = SeenCache::load(&path).unwrap();
        assert!(cache.contains(&id("0000042")));
    }

    #[test]
    fn load_rejects_non_numeric_token() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("seen.txt");
        std::fs::write(&path, "0000042\nbogus\n").unwrap();

        match SeenCache::load(&path) {
            Err(CacheError::Malformed(token)) => assert_eq!(token, "bogus"),
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    // =========================================================================
    // Save / round trip
    // =========================================================================

    #[test]
    fn save_writes_sorted_newline_terminated_canonical_ids() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("seen.txt");

        let mut cache = SeenCache::empty();
        cache.merge([id("1337"), id("42"), id("7")]);
        cache.save(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "0000007\n0000042\n0001337\n");
    }

    #[test]
    fn save_load_round_trip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("seen.txt");

        let mut cache = SeenCache::empty();
        cache.merge([id("3"), id("99999"), id("42")]);
        cache.save(&path).unwrap();

        let loaded = SeenCache::load(&path).unwrap();
        assert_eq!(loaded, cache);
    }

    #[test]
    fn save_replaces_previous_contents() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("seen.txt");

        let mut first = SeenCache::empty();
        first.insert(id("1"));
        first.save(&path).unwrap();

        let mut second = SeenCache::empty();
        second.insert(id("2"));
        second.save(&path).unwrap();

        let loaded = SeenCache::load(&path).unwrap();
        assert!(!loaded.contains(&id("1")));
        assert!(loaded.contains(&id("2")));
    }

    #[test]
    fn save_leaves_no_temp_file_behind() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("seen.txt");
        SeenCache::empty().save(&path).unwrap();

        let names: Vec<String> = std::fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["seen.txt".to_string()]);
    }

    // =========================================================================
    // Set operations
    // =========================================================================

    #[test]
    fn merge_deduplicates() {
        let mut cache = SeenCache::empty();
        cache.merge([id("42"), id("0000042"), id("42")]);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn unseen_filters_known_ids() {
        let mut cache = SeenCache::empty();
        cache.insert(id("42"));

        let discovered: BTreeSet<EntryId> =
            [id("42"), id("1337")].into_iter().collect();
        let fresh = cache.unseen(&discovered);

        assert_eq!(fresh.len(), 1);
        assert!(fresh.contains(&id("1337")));
    }

    #[test]
    fn unseen_of_empty_cache_is_everything() {
        let cache = SeenCache::empty();
        let discovered: BTreeSet<EntryId> =
            [id("1"), id("2")].into_iter().collect();
        assert_eq!(cache.unseen(&discovered), discovered);
    }
}
