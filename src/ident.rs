//! Centralized handling of catalog entry identifiers.
//!
//! Every entry has a numeric id with two textual forms:
//!
//! - **Canonical**: zero-padded to a fixed width (`42` → `"0000042"`).
//!   Used for the seen-cache file, icon filenames, report rows, and
//!   sorting, so that lexicographic order matches numeric order.
//! - **Natural**: leading zeros stripped (`"0000042"` → `"42"`). Used when
//!   building store URLs, which reject padded path segments.
//!
//! The two forms are inverses: padding then stripping recovers any id that
//! has no leading zeros in its natural form. The all-zero id strips to
//! `"0"`, never to the empty string. Ids longer than the canonical width
//! pass through unpadded; their lexicographic order is no longer numeric,
//! which matches the storefront's own id space (seven digits as of today).

use std::fmt;

/// Fixed width of the canonical form.
pub const CANONICAL_WIDTH: usize = 7;

/// A catalog entry identifier, stored in canonical (zero-padded) form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryId(String);

impl EntryId {
    /// Parse an id from a digit string in either form.
    ///
    /// Accepts natural (`"42"`) and canonical (`"0000042"`) input; anything
    /// containing a non-digit, or the empty string, is rejected.
    pub fn parse(digits: &str) -> Option<EntryId> {
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if digits.len() >= CANONICAL_WIDTH {
            return Some(EntryId(digits.to_string()));
        }
        let mut padded = String::with_capacity(CANONICAL_WIDTH);
        for _ in 0..CANONICAL_WIDTH - digits.len() {
            padded.push('0');
        }
        padded.push_str(digits);
        Some(EntryId(padded))
    }

    /// Canonical zero-padded form.
    pub fn canonical(&self) -> &str {
        &self.0
    }

    /// Natural form with leading zeros stripped; `"0"` for the all-zero id.
    pub fn natural(&self) -> &str {
        let trimmed = self.0.trim_start_matches('0');
        if trimmed.is_empty() { "0" } else { trimmed }
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
