//! Crawler configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. User values are
//! overlaid on stock defaults, unknown keys are rejected, and the result is
//! validated before any network activity happens.
//!
//! ## Configuration Options
//!
//! ```toml
//! # The [store] section is required - everything else has defaults.
//!
//! [store]
//! listing_url = "https://store.example.com/search/?page={page}"
//! entry_url = "https://store.example.com/entry/{id}"
//! image_url = "https://cdn.example.com/entries/{id}/header.jpg"
//! # group_url = "https://store.example.com/bundle/{id}"   # optional
//!
//! [crawl]
//! page_ceiling = 500        # Hard stop if no empty page is reached first
//!
//! [rank]
//! tag_groups = [            # Ordered tag-priority groups, best first
//!     ["RPG", "Open World"],
//!     ["Strategy"],
//! ]
//!
//! [fetch]
//! retries = 50              # Attempts per URL before giving up on it
//! timeout_secs = 25         # Per-request timeout
//! user_agent = "Mozilla/5.0"
//! threads = 0               # Detail-fetch workers, 0 = one per core
//!
//! [fetch.cookies]           # Sent with every request (age gates, etc.)
//! language = "english"
//!
//! [paths]
//! reports_dir = "."         # Where reports, icons/ and seen.txt live
//!
//! [colors]
//! background = "#F0F0F0"    # Report palette
//! row = "mint"              # Palette class applied to table rows
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Beyond `[store]`, override just the values you
//! want:
//!
//! ```toml
//! [store]
//! listing_url = "https://store.example.com/search/?page={page}"
//! entry_url = "https://store.example.com/entry/{id}"
//! image_url = "https://cdn.example.com/entries/{id}/header.jpg"
//!
//! [crawl]
//! page_ceiling = 20
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::ident::EntryId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Crawler configuration loaded from `config.toml`.
///
/// The `[store]` URL templates are required; everything else has defaults.
/// Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CrawlerConfig {
    /// Storefront URL templates (required).
    pub store: StoreConfig,
    /// Listing-walk settings.
    pub crawl: CrawlConfig,
    /// Tag-priority ranking settings.
    pub rank: RankConfig,
    /// HTTP client settings.
    pub fetch: FetchConfig,
    /// On-disk locations.
    pub paths: PathsConfig,
    /// Report palette.
    pub colors: ColorConfig,
}

impl CrawlerConfig {
    /// Validate config values before the first request is made.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.listing_url.is_empty() {
            return Err(ConfigError::Validation(
                "store.listing_url must be set (run gen-config for a template)".into(),
            ));
        }
        if !self.store.listing_url.contains("{page}") {
            return Err(ConfigError::Validation(
                "store.listing_url must contain the {page} placeholder".into(),
            ));
        }
        if self.store.entry_url.is_empty() {
            return Err(ConfigError::Validation(
                "store.entry_url must be set (run gen-config for a template)".into(),
            ));
        }
        if !self.store.entry_url.contains("{id}") {
            return Err(ConfigError::Validation(
                "store.entry_url must contain the {id} placeholder".into(),
            ));
        }
        if self.store.image_url.is_empty() {
            return Err(ConfigError::Validation(
                "store.image_url must be set (run gen-config for a template)".into(),
            ));
        }
        if !self.store.image_url.contains("{id}") {
            return Err(ConfigError::Validation(
                "store.image_url must contain the {id} placeholder".into(),
            ));
        }
        if !self.store.group_url.is_empty() && !self.store.group_url.contains("{id}") {
            return Err(ConfigError::Validation(
                "store.group_url must contain the {id} placeholder when set".into(),
            ));
        }
        if self.rank.tag_groups.is_empty() {
            return Err(ConfigError::Validation(
                "rank.tag_groups must not be empty".into(),
            ));
        }
        if self.rank.tag_groups.iter().any(|group| group.is_empty()) {
            return Err(ConfigError::Validation(
                "rank.tag_groups groups must not be empty".into(),
            ));
        }
        if self.crawl.page_ceiling == 0 {
            return Err(ConfigError::Validation(
                "crawl.page_ceiling must be at least 1".into(),
            ));
        }
        if self.fetch.retries == 0 {
            return Err(ConfigError::Validation(
                "fetch.retries must be at least 1".into(),
            ));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "fetch.timeout_secs must be at least 1".into(),
            ));
        }
        if !PALETTE_CLASSES.contains(&self.colors.row.as_str()) {
            return Err(ConfigError::Validation(format!(
                "colors.row must be one of {PALETTE_CLASSES:?}"
            )));
        }
        Ok(())
    }
}

/// Storefront URL templates.
///
/// `{page}` expands to the 1-based listing page number; `{id}` expands to an
/// entry id. Fetch URLs get the natural (unpadded) id form because that is
/// what storefronts route on; report links use the canonical form so report
/// text and icon filenames agree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Paginated listing, e.g. `https://store.example.com/search/?page={page}`.
    pub listing_url: String,
    /// Entry detail page, e.g. `https://store.example.com/entry/{id}`.
    pub entry_url: String,
    /// Entry header image, e.g. `https://cdn.example.com/entries/{id}/header.jpg`.
    pub image_url: String,
    /// Group (bundle) page URL base. Groups are counted during the listing
    /// walk but never enriched. Leave empty if the storefront has no
    /// grouping concept.
    pub group_url: String,
}

impl StoreConfig {
    /// Listing page URL for a 1-based page number.
    pub fn listing_page_url(&self, page: u32) -> String {
        self.listing_url.replace("{page}", &page.to_string())
    }

    /// Detail page URL for fetching (natural id form).
    pub fn entry_page_url(&self, id: &EntryId) -> String {
        self.entry_url.replace("{id}", id.natural())
    }

    /// Detail page URL for report links (canonical id form).
    pub fn entry_link_url(&self, id: &EntryId) -> String {
        self.entry_url.replace("{id}", id.canonical())
    }

    /// Header image URL for downloading an icon (natural id form).
    pub fn image_file_url(&self, id: &EntryId) -> String {
        self.image_url.replace("{id}", id.natural())
    }
}

/// Listing-walk settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CrawlConfig {
    /// Hard upper bound on listing pages visited in one run. The walk
    /// normally ends at the first empty page; the ceiling catches listings
    /// that never produce one.
    pub page_ceiling: u32,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self { page_ceiling: 500 }
    }
}

/// Tag-priority ranking settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RankConfig {
    /// Ordered groups of required tags, most interesting first. An entry is
    /// ranked by the first group whose every tag it carries; entries
    /// matching no group sort after all groups. Must not be empty.
    pub tag_groups: Vec<Vec<String>>,
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchConfig {
    /// Attempts per URL before it is treated as unavailable this run.
    pub retries: u32,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// User-Agent header sent with every request.
    pub user_agent: String,
    /// Worker threads for detail fetches. 0 means one per CPU core.
    pub threads: usize,
    /// Cookie pairs sent with every request (age gates, language pins).
    pub cookies: BTreeMap<String, String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            retries: 50,
            timeout_secs: 25,
            user_agent: "Mozilla/5.0".to_string(),
            threads: 0,
            cookies: BTreeMap::new(),
        }
    }
}

/// On-disk locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Directory holding the reports, the `icons/` subdirectory, the
    /// stylesheet and the seen cache.
    pub reports_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            reports_dir: ".".to_string(),
        }
    }
}

/// Palette class names usable as a row class.
pub const PALETTE_CLASSES: [&str; 5] = ["grey", "rose", "mint", "blue", "dark"];

/// Report palette.
///
/// The five named classes come out as CSS classes of the same name, so a
/// hand-edited report can recolor individual rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    /// Page background color.
    pub background: String,
    /// Table cell background color.
    pub cell: String,
    pub grey: String,
    pub rose: String,
    pub mint: String,
    pub blue: String,
    pub dark: String,
    /// Palette class applied to generated table rows.
    pub row: String,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            background: "#F0F0F0".to_string(),
            cell: "#FFFFFF".to_string(),
            grey: "#BBBBBB".to_string(),
            rose: "#BB0000".to_string(),
            mint: "#00BB00".to_string(),
            blue: "#0000BB".to_string(),
            dark: "#000000".to_string(),
            row: "mint".to_string(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(CrawlerConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<CrawlerConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: CrawlerConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from the given file.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result. A missing file resolves to the stock defaults,
/// which fail validation with a pointer at the missing `[store]` section.
pub fn load_config(path: &Path) -> Result<CrawlerConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Shelfwatch Configuration
# ========================
# The [store] section is required; every other setting is optional and the
# values shown are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Storefront URLs (required)
# ---------------------------------------------------------------------------
# {page} expands to the 1-based listing page number.
# {id} expands to an entry id.
[store]
listing_url = "https://store.example.com/search/?page={page}"
entry_url = "https://store.example.com/entry/{id}"
image_url = "https://cdn.example.com/entries/{id}/header.jpg"

# Optional: group (bundle) pages, counted during the listing walk but never
# enriched. Leave unset if the storefront has no grouping concept.
# group_url = "https://store.example.com/bundle/{id}"

# ---------------------------------------------------------------------------
# Listing walk
# ---------------------------------------------------------------------------
[crawl]
# Hard upper bound on listing pages per run. The walk normally stops at the
# first page with no entries; the ceiling catches listings that never
# produce one.
page_ceiling = 500

# ---------------------------------------------------------------------------
# Tag-priority ranking
# ---------------------------------------------------------------------------
[rank]
# Ordered groups of required tags, most interesting first. An entry is
# ranked by the first group whose every tag it carries; entries matching no
# group sort after all groups.
tag_groups = [
    ["RPG", "Open World"],
    ["Strategy"],
]

# ---------------------------------------------------------------------------
# HTTP client
# ---------------------------------------------------------------------------
[fetch]
# Attempts per URL before it is treated as unavailable for this run.
retries = 50

# Per-request timeout in seconds.
timeout_secs = 25

# User-Agent header sent with every request.
user_agent = "Mozilla/5.0"

# Worker threads for detail-page fetches. 0 means one per CPU core.
threads = 0

# Cookie pairs sent with every request (age gates, language pins).
# [fetch.cookies]
# mature_content = "1"
# language = "english"

# ---------------------------------------------------------------------------
# Paths
# ---------------------------------------------------------------------------
[paths]
# Directory holding the reports, the icons/ subdirectory, the stylesheet
# and the seen cache.
reports_dir = "."

# ---------------------------------------------------------------------------
# Report palette
# ---------------------------------------------------------------------------
[colors]
background = "#F0F0F0"
cell = "#FFFFFF"
grey = "#BBBBBB"
rose = "#BB0000"
mint = "#00BB00"
blue = "#0000BB"
dark = "#000000"

# Palette class applied to generated table rows (grey/rose/mint/blue/dark).
row = "mint"
"##
}

/// Generate the report stylesheet from the color config.
///
/// Written to disk once per reports directory; reports reference it by
/// relative filename so every report shares one stylesheet.
pub fn generate_report_css(colors: &ColorConfig) -> String {
    format!(
        r#"body {{
    background-color: {background};
    font-family: monospace;
}}

table {{
    margin: auto;
}}

td {{
    background-color: {cell};
    text-align: center;
    padding: 10px;
}}

.grey {{ color: {grey}; }}
.rose {{ color: {rose}; }}
.mint {{ color: {mint}; }}
.blue {{ color: {blue}; }}
.dark {{ color: {dark}; }}
"#,
        background = colors.background,
        cell = colors.cell,
        grey = colors.grey,
        rose = colors.rose,
        mint = colors.mint,
        blue = colors.blue,
        dark = colors.dark,
    )
}
