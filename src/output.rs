//! Console line formatting.
//!
//! Pipeline stages report progress as [`RunEvent`] values over a channel;
//! a printer thread turns them into lines with the functions here. Keeping
//! the formatting pure makes the console contract testable without
//! capturing stdout.
//!
//! Counters are zero-padded to fixed widths so a scrolling crawl log
//! stays column-aligned:
//!
//! ```text
//! 00001 25 02 00025 00002 00025
//! 00002 25 01 00050 00003 00014
//! 00001 of 00039 0000042 Dwarf Keep
//! 00002 of 00039 0000099 (detail unavailable)
//! Download image: 00001 0000042
//! ```

use crate::types::RunEvent;

const RULE_WIDTH: usize = 45;

/// Lines for one progress event.
pub fn format_run_event(event: &RunEvent) -> Vec<String> {
    match event {
        RunEvent::PageCrawled {
            page,
            entries,
            groups,
            total_entries,
            total_groups,
            new_entries,
        } => vec![format!(
            "{page:05} {entries:02} {groups:02} {total_entries:05} {total_groups:05} {new_entries:05}"
        )],
        RunEvent::EntryEnriched {
            index,
            total,
            id,
            name,
        } => vec![format!("{index:05} of {total:05} {id} {name}")],
        RunEvent::EntrySkipped { index, total, id } => {
            vec![format!("{index:05} of {total:05} {id} (detail unavailable)")]
        }
        RunEvent::IconDownloaded { index, id } => {
            vec![format!("Download image: {index:05} {id}")]
        }
        RunEvent::IconFailed { id } => vec![format!("Download failed: {id}")],
    }
}

/// Closing summary: cumulative entry and group counts between rules.
pub fn format_summary(entries_seen: usize, groups_seen: usize) -> Vec<String> {
    vec![
        "-".repeat(RULE_WIDTH),
        format!("{entries_seen:05} {groups_seen:05}"),
        "-".repeat(RULE_WIDTH),
    ]
}
