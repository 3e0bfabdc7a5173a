//! On-disk layout of a reports directory.
//!
//! All filesystem naming conventions live here so the pipeline stages never
//! hardcode a path. One reports directory holds everything a crawl leaves
//! behind:
//!
//! ```text
//! reports/
//! ├── seen.txt                   # identity cache, one canonical id per line
//! ├── report.css                 # shared stylesheet, written once
//! ├── last_run.json              # summary of the most recent run
//! ├── 2026_08_24_17_03_11.html   # one report per run with new entries
//! ├── 2026_08_25_09_41_52.html
//! └── icons/
//!     ├── 0000042.jpg            # canonical id names the icon file
//!     └── 0001337.jpg
//! ```
//!
//! Reports are named by their creation time so a directory listing reads as
//! a chronology. The stylesheet is only written when absent, which keeps
//! operator hand-edits across runs.

use crate::config::{ColorConfig, generate_report_css};
use crate::ident::EntryId;
use crate::types::Termination;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use time::OffsetDateTime;
use time::macros::format_description;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("timestamp formatting error: {0}")]
    Timestamp(#[from] time::error::Format),
}

const CACHE_FILE: &str = "seen.txt";
const STYLESHEET_FILE: &str = "report.css";
const SUMMARY_FILE: &str = "last_run.json";
const ICONS_DIR: &str = "icons";

/// Handle on one reports directory.
#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Identity cache file.
    pub fn cache_path(&self) -> PathBuf {
        self.root.join(CACHE_FILE)
    }

    /// Stylesheet shared by every report.
    pub fn stylesheet_path(&self) -> PathBuf {
        self.root.join(STYLESHEET_FILE)
    }

    /// Relative name reports use to link the stylesheet.
    pub fn stylesheet_name(&self) -> &'static str {
        STYLESHEET_FILE
    }

    pub fn icons_dir(&self) -> PathBuf {
        self.root.join(ICONS_DIR)
    }

    /// Icon file for an entry, named by canonical id.
    pub fn icon_path(&self, id: &EntryId) -> PathBuf {
        self.icons_dir().join(format!("{}.jpg", id.canonical()))
    }

    /// Write the stylesheet if it does not exist yet. An existing file is
    /// left alone so hand-edits survive later runs.
    pub fn ensure_stylesheet(&self, colors: &ColorConfig) -> Result<(), StoreError> {
        let path = self.stylesheet_path();
        if !path.exists() {
            fs::create_dir_all(&self.root)?;
            fs::write(&path, generate_report_css(colors))?;
        }
        Ok(())
    }

    /// Write a report under a fresh timestamped name; returns the filename.
    ///
    /// Two runs inside the same second get distinct names rather than one
    /// report replacing the other.
    pub fn write_report(&self, html: &str) -> Result<String, StoreError> {
        fs::create_dir_all(&self.root)?;
        let stamp = now_stamp()?;
        let mut name = format!("{stamp}.html");
        let mut counter = 2;
        while self.root.join(&name).exists() {
            name = format!("{stamp}_{counter}.html");
            counter += 1;
        }
        fs::write(self.root.join(&name), html)?;
        Ok(name)
    }

    /// Paths of every report in the directory, sorted by name (and thereby
    /// by creation time).
    pub fn list_reports(&self) -> Result<Vec<PathBuf>, StoreError> {
        let mut reports = Vec::new();
        if !self.root.exists() {
            return Ok(reports);
        }
        for entry in WalkDir::new(&self.root).min_depth(1).max_depth(1) {
            let entry = entry?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "html") {
                reports.push(path.to_path_buf());
            }
        }
        reports.sort();
        Ok(reports)
    }

    /// Ids of the icons currently on disk. Files that do not follow the
    /// `<digits>.jpg` naming are not icons and are left untouched.
    pub fn list_icons(&self) -> Result<BTreeSet<EntryId>, StoreError> {
        let mut icons = BTreeSet::new();
        let dir = self.icons_dir();
        if !dir.exists() {
            return Ok(icons);
        }
        for entry in WalkDir::new(&dir).min_depth(1).max_depth(1) {
            let entry = entry?;
            let path = entry.path();
            if !path.extension().is_some_and(|ext| ext == "jpg") {
                continue;
            }
            let stem = path.file_stem().and_then(|stem| stem.to_str());
            if let Some(stem) = stem
                && stem.chars().all(|c| c.is_ascii_digit())
                && let Some(id) = EntryId::parse(stem)
            {
                icons.insert(id);
            }
        }
        Ok(icons)
    }

    pub fn write_icon(&self, id: &EntryId, bytes: &[u8]) -> Result<(), StoreError> {
        fs::create_dir_all(self.icons_dir())?;
        fs::write(self.icon_path(id), bytes)?;
        Ok(())
    }

    pub fn remove_icon(&self, id: &EntryId) -> Result<(), StoreError> {
        fs::remove_file(self.icon_path(id))?;
        Ok(())
    }

    /// Persist the run summary, replacing the previous one.
    pub fn write_run_summary(&self, summary: &RunSummary) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root)?;
        let json = serde_json::to_string_pretty(summary)?;
        fs::write(self.root.join(SUMMARY_FILE), json)?;
        Ok(())
    }
}

/// Relative path reports use to reference an icon. This shape is the
/// contract between the report renderer and the asset synchronizer.
pub fn icon_reference(id: &EntryId) -> String {
    format!("{ICONS_DIR}/{}.jpg", id.canonical())
}

/// Current time as the filename-safe stamp used for report names.
///
/// Local clock when the offset is known, UTC otherwise.
pub fn now_stamp() -> Result<String, StoreError> {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    let format = format_description!("[year]_[month]_[day]_[hour]_[minute]_[second]");
    Ok(now.format(&format)?)
}

/// Summary of the most recent run, written to `last_run.json` for
/// debugging and scripting.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub finished_at: String,
    pub pages_visited: u32,
    pub entries_seen: usize,
    pub groups_seen: usize,
    pub new_entries: usize,
    pub enriched: usize,
    pub skipped: usize,
    pub termination: String,
    /// Report filename, absent when the run produced no new entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<String>,
    pub icons_downloaded: usize,
    pub icons_failed: usize,
    pub icons_pruned: usize,
}

impl RunSummary {
    /// Start from the crawl outcome; enrichment and sync fields are filled
    /// in as the run progresses.
    pub fn begin(
        pages_visited: u32,
        entries_seen: usize,
        groups_seen: usize,
        termination: Termination,
    ) -> Self {
        Self {
            finished_at: String::new(),
            pages_visited,
            entries_seen,
            groups_seen,
            new_entries: 0,
            enriched: 0,
            skipped: 0,
            termination: termination.to_string(),
            report: None,
            icons_downloaded: 0,
            icons_failed: 0,
            icons_pruned: 0,
        }
    }
}
