//! # Shelfwatch
//!
//! An incremental storefront catalog crawler. Shelfwatch walks a paginated
//! store listing, looks up every entry it has not reported before, and
//! renders the newcomers into a static HTML report ranked by tag priority
//! and review score. Run it daily and the reports directory reads as a
//! changelog of the catalog.
//!
//! # Architecture: Staged Pipeline
//!
//! One run moves through six stages over a single reports directory:
//!
//! ```text
//! 1. Discover   listing pages       →  id set           (walk until a page is empty)
//! 2. Diff       id set vs seen.txt  →  newcomers        (identity cache)
//! 3. Enrich     detail pages        →  records          (name, rating, tags; parallel)
//! 4. Rank       records             →  ordered rows     (tag priority, rating, id)
//! 5. Report     rows                →  <timestamp>.html (maud)
//! 6. Sync       report references   →  icons/           (download missing, prune orphans)
//! ```
//!
//! The staging buys three properties:
//!
//! - **Incremental by construction**: only newcomers cost detail fetches,
//!   so the daily run is cheap no matter how large the catalog grows.
//! - **Inspectable state**: everything a run leaves behind (`seen.txt`,
//!   `last_run.json`, the reports) is plain text you can read and edit.
//! - **Testable seams**: the [`fetch::Fetcher`] and
//!   [`extract::PageExtractor`] traits let every stage run against fakes,
//!   so pipeline tests never touch the network.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`crawl`] | Stage 1: walks the paginated listing until a page comes back empty |
//! | [`cache`] | Identity cache (`seen.txt`), the line between new and already reported |
//! | [`enrich`] | Stage 2: parallel detail-page fetches, rating and tag extraction |
//! | [`rank`] | Tag-priority and rating sort order for report rows |
//! | [`report`] | Maud rendering of the per-run HTML report |
//! | [`assets`] | Two-way icon sync between report references and `icons/` |
//! | [`store`] | Reports-directory layout: file naming, stylesheet, run summary |
//! | [`fetch`] | Retrying blocking HTTP client behind the [`fetch::Fetcher`] trait |
//! | [`extract`] | Pattern extraction of ids, names, ratings and tags from storefront markup |
//! | [`ident`] | Canonical zero-padded entry ids and their natural wire form |
//! | [`config`] | `config.toml` loading, validation, merging, and report CSS generation |
//! | [`types`] | Types shared across stages (`EntryRecord`, `Rating`, `RunEvent`) |
//! | [`run`] | End-to-end orchestration and its ordering guarantees |
//! | [`output`] | Console line formatting for progress events |
//!
//! # Design Decisions
//!
//! ## Blocking HTTP, Parallel Where It Counts
//!
//! The HTTP client is `reqwest`'s blocking mode rather than an async stack.
//! A crawl is one sequential pass over the listing, because each page
//! decides whether the walk continues. The only wide fan-out is the
//! detail-page stage, and a rayon `par_iter` covers that without dragging
//! in an executor. The thread count doubles as a politeness knob against
//! the storefront.
//!
//! ## Reports Are the Icon Ledger
//!
//! There is no separate manifest of which icons to keep. The sync stage
//! scans the reports themselves for `icons/<id>.jpg` references and makes
//! the icon directory converge to exactly that set: missing icons are
//! downloaded, unreferenced ones are pruned. Deleting an old report is how
//! you reclaim its disk space, and re-running sync repairs any damage.
//!
//! ## The Cache Is a Text File
//!
//! `seen.txt` holds one canonical id per line, sorted. It is diffable,
//! hand-editable, and trivially restored from backup. A run saves it last,
//! and only with ids whose detail pages were actually fetched, so a crawl
//! killed halfway redoes work instead of silently losing entries.
//!
//! ## Canonical and Natural Ids
//!
//! Listing pages, caches, filenames and report links all use the canonical
//! zero-padded form of an id, so string sorting is numeric sorting and one
//! entry never appears under two spellings. The natural unpadded form
//! exists only at the HTTP boundary, where storefront hosts reject padded
//! ids. [`ident::EntryId`] owns both spellings.
//!
//! ## Maud Over Template Engines
//!
//! Reports are rendered with [Maud](https://maud.lambda.xyz/), a
//! compile-time HTML macro, rather than a runtime template engine.
//! Malformed markup is a build error, there is no template directory to
//! ship, and interpolated text is escaped by default. That last point
//! matters here: entry names and tags are storefront-supplied strings.
//!
//! # Unattended Operation
//!
//! Shelfwatch is meant to run from cron with nobody watching. Transport
//! failures degrade instead of aborting: a dead listing page ends the walk,
//! a dead detail page skips that entry until the next run, a dead icon
//! download leaves the reference in place for the next sync. Progress goes
//! to stdout as fixed-width columns, retry noise goes to stderr, and
//! `last_run.json` records what happened for whoever looks in later.

pub mod assets;
pub mod cache;
pub mod config;
pub mod crawl;
pub mod enrich;
pub mod extract;
pub mod fetch;
pub mod ident;
pub mod output;
pub mod rank;
pub mod report;
pub mod run;
pub mod store;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
