//! Shared types used across all pipeline stages.
//!
//! These types flow between discovery, enrichment, ranking and rendering and
//! must mean the same thing in all of them.

use crate::ident::EntryId;
use std::fmt;

/// Review standing of a catalog entry, read off its detail page.
///
/// Sorting is ascending by [`Rating::sort_value`], so the sentinel states
/// rank below every real percentage: least-established entries first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rating {
    /// Listed but not yet released; there is no review section at all.
    Unreleased,
    /// Released, but nobody has reviewed it yet.
    NoReviews,
    /// Reviewed, but with too few reviews for the store to score it.
    NotScored,
    /// Percentage of positive reviews.
    Percent(u32),
}

impl Rating {
    /// Numeric sort key: sentinels take the values below zero so they order
    /// before any real percentage, worst-established first.
    pub fn sort_value(self) -> i32 {
        match self {
            Rating::Unreleased => -3,
            Rating::NoReviews => -2,
            Rating::NotScored => -1,
            Rating::Percent(percent) => percent as i32,
        }
    }

    /// Fixed-width cell text for the report table.
    ///
    /// Percentages are zero-padded to two digits and clamp at "99%" so every
    /// cell stays three characters; each sentinel gets its own glyph run.
    pub fn label(self) -> String {
        match self {
            Rating::Unreleased => "---".to_string(),
            Rating::NoReviews => "○○○".to_string(),
            Rating::NotScored => "●●●".to_string(),
            Rating::Percent(percent) if percent >= 100 => "99%".to_string(),
            Rating::Percent(percent) => format!("{percent:02}%"),
        }
    }
}

/// Raw review markers from a detail page, before precedence is applied.
///
/// A page can carry several markers at once (an unreleased entry usually
/// also says it has no reviews), which is why extraction keeps them separate
/// and [`RatingSignal::resolve`] collapses them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RatingSignal {
    /// Parsed positive-review percentage; pages without the score text
    /// extract as 0.
    pub percent: u32,
    pub no_reviews: bool,
    pub not_scored: bool,
    pub unreleased: bool,
}

impl RatingSignal {
    /// Collapse the markers into a rating. The strongest marker wins:
    /// unreleased over no-reviews over not-scored over the percentage.
    pub fn resolve(self) -> Rating {
        if self.unreleased {
            Rating::Unreleased
        } else if self.no_reviews {
            Rating::NoReviews
        } else if self.not_scored {
            Rating::NotScored
        } else {
            Rating::Percent(self.percent)
        }
    }
}

/// One newly discovered entry, fully enriched and classified.
///
/// Field order mirrors sort-key precedence: tag rank, then rating, then id.
/// The display name is deliberately absent: it only feeds progress output,
/// and the report identifies entries by icon and link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRecord {
    /// Index of the first matching tag-priority group (see `rank::tag_rank`).
    pub tag_rank: usize,
    pub rating: Rating,
    /// Canonical id; names the icon file and the detail link target.
    pub id: EntryId,
    /// Tags exactly as extracted: page order, duplicates and padding kept.
    /// The renderer cleans them up for display.
    pub tags: Vec<String>,
}

/// Why the listing walk stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// A listing page contained no entries and no groups: the catalog end.
    EmptyPage,
    /// The configured page ceiling was reached first.
    CeilingReached,
    /// A listing page could not be fetched; treated as the end of the
    /// listing, but reported distinctly.
    ListingUnavailable,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Termination::EmptyPage => "empty page",
            Termination::CeilingReached => "page ceiling reached",
            Termination::ListingUnavailable => "listing page unavailable",
        };
        write!(f, "{text}")
    }
}

/// Progress event emitted while a run executes.
///
/// Stages send these over an mpsc channel and the binary drains them on a
/// printer thread, so parallel enrichment never interleaves its output.
/// `output::format_run_event` turns each into display lines.
#[derive(Debug, Clone)]
pub enum RunEvent {
    /// A listing page was fetched and scanned.
    PageCrawled {
        page: u32,
        /// Distinct entries on this page.
        entries: usize,
        /// Distinct groups on this page.
        groups: usize,
        /// Running entry total across pages (cross-page duplicates counted).
        total_entries: usize,
        /// Running group total across pages.
        total_groups: usize,
        /// Unseen entries discovered so far.
        new_entries: usize,
    },
    /// An entry's detail page was fetched and extracted.
    EntryEnriched {
        /// Completion counter (1-based), not an input position.
        index: usize,
        total: usize,
        id: EntryId,
        name: String,
    },
    /// An entry's detail page was unavailable; the entry stays uncached and
    /// will be retried next run.
    EntrySkipped {
        index: usize,
        total: usize,
        id: EntryId,
    },
    /// A referenced icon was missing locally and has been downloaded.
    IconDownloaded { index: usize, id: EntryId },
    /// A referenced icon could not be downloaded this run.
    IconFailed { id: EntryId },
}
