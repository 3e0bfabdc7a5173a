//! Static HTML report rendering.
//!
//! A report is one self-contained table: one row per newly discovered
//! entry, already ranked by the caller. Rendering never reorders rows and
//! never touches the filesystem; [`crate::store`] decides where the
//! document lands and what it is called.
//!
//! ## Row anatomy
//!
//! ```text
//! ┌────────────────────┬───────┬───────────┐
//! │ [icon, links to    │  87%  │ Action    │
//! │  the entry page]   │       │ Roguelike │
//! └────────────────────┴───────┴───────────┘
//! ```
//!
//! Entry links and icon references both use the canonical zero-padded id,
//! so a report keeps working against the icon directory regardless of how
//! the listing page spelled the id.
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating
//! with automatic escaping of storefront-supplied text.

use crate::config::StoreConfig;
use crate::store::icon_reference;
use crate::types::EntryRecord;
use maud::{DOCTYPE, Markup, html};
use std::collections::BTreeSet;

const TITLE: &str = "New catalog entries";

/// Renders the full report document. Rows keep the order of `records`,
/// which the ranking stage has already sorted.
pub fn render_report(
    records: &[EntryRecord],
    store: &StoreConfig,
    row_class: &str,
    stylesheet: &str,
) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                title { (TITLE) }
                link rel="stylesheet" href=(stylesheet);
            }
            body {
                table {
                    @for record in records {
                        (render_row(record, store, row_class))
                    }
                }
            }
        }
    }
}

/// Renders one entry row: linked icon, rating label, tag list.
fn render_row(record: &EntryRecord, store: &StoreConfig, row_class: &str) -> Markup {
    html! {
        tr class=(row_class) {
            td {
                a href=(store.entry_link_url(&record.id)) {
                    img src=(icon_reference(&record.id)) alt=(record.id.canonical()) loading="lazy";
                }
            }
            td { (record.rating.label()) }
            td {
                @for (index, tag) in display_tags(&record.tags).iter().enumerate() {
                    @if index > 0 { br; }
                    (tag)
                }
            }
        }
    }
}

/// Tags as shown in a report cell: trimmed, deduplicated, sorted.
fn display_tags(tags: &[String]) -> Vec<&str> {
    let cleaned: BTreeSet<&str> = tags.iter().map(|tag| tag.trim()).collect();
    cleaned.into_iter().collect()
}
