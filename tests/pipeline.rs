//! End-to-end pipeline test against an in-memory storefront.
//!
//! Exercises a full crawl through the public API: listing walk, identity
//! diff, detail enrichment, ranking, report rendering, icon sync and cache
//! persistence, with only the HTTP transport faked. The extractor runs
//! against realistic storefront markup, not canned parse results.

use shelfwatch::assets::{self, SyncStats};
use shelfwatch::config::CrawlerConfig;
use shelfwatch::extract::MarkupExtractor;
use shelfwatch::fetch::Fetcher;
use shelfwatch::output;
use shelfwatch::run::run;
use shelfwatch::store::Store;
use shelfwatch::types::RunEvent;
use std::collections::HashMap;
use std::fs;
use std::sync::mpsc;
use tempfile::TempDir;

/// Canned storefront: maps URLs to listing pages, detail pages and icons.
#[derive(Default)]
struct FakeStorefront {
    pages: HashMap<String, String>,
    blobs: HashMap<String, Vec<u8>>,
}

impl FakeStorefront {
    fn listing(mut self, page: u32, entry_ids: &[u32]) -> Self {
        let mut html = String::from("<html><body>\n");
        for id in entry_ids {
            html.push_str(&format!(
                "<a href=\"https://store.test/entry/{id}\">an entry</a>\n"
            ));
        }
        html.push_str("</body></html>\n");
        self.pages
            .insert(format!("https://store.test/search/?page={page}"), html);
        self
    }

    fn detail(mut self, id: u32, name: &str, percent: u32, tags: &[&str]) -> Self {
        let tag_blob: Vec<String> = tags
            .iter()
            .enumerate()
            .map(|(index, tag)| format!("{{\"tagid\":{index},\"name\":\"{tag}\"}}"))
            .collect();
        let html = format!(
            "<html><body>\n\
             <div class=\"entry_name\">{name}</div>\n\
             <span>{percent}% of the 1,234 user reviews for this item are positive</span>\n\
             <script>[{}]</script>\n\
             </body></html>\n",
            tag_blob.join(",")
        );
        self.pages
            .insert(format!("https://store.test/entry/{id}"), html);
        self
    }

    fn icon(mut self, id: u32, bytes: &[u8]) -> Self {
        self.blobs
            .insert(format!("https://cdn.test/{id}/header.jpg"), bytes.to_vec());
        self
    }
}

impl Fetcher for FakeStorefront {
    fn fetch_text(&self, url: &str) -> Option<String> {
        self.pages.get(url).cloned()
    }

    fn fetch_bytes(&self, url: &str) -> Option<Vec<u8>> {
        self.blobs.get(url).cloned()
    }
}

fn config() -> CrawlerConfig {
    let mut config = CrawlerConfig::default();
    config.store.listing_url = "https://store.test/search/?page={page}".to_string();
    config.store.entry_url = "https://store.test/entry/{id}".to_string();
    config.store.image_url = "https://cdn.test/{id}/header.jpg".to_string();
    config.rank.tag_groups = vec![
        vec!["RPG".to_string(), "Open World".to_string()],
        vec!["Strategy".to_string()],
    ];
    config
}

fn extractor(config: &CrawlerConfig) -> MarkupExtractor {
    MarkupExtractor::new(&config.store).unwrap()
}

#[test]
fn full_crawl_renders_a_ranked_report() {
    let tmp = TempDir::new().unwrap();
    let store = Store::new(tmp.path());
    let config = config();

    // Three entries across two listing pages. Entry 2 matches the first
    // tag group, entry 1 the second, entry 3 neither.
    let storefront = FakeStorefront::default()
        .listing(1, &[3, 1])
        .listing(2, &[2])
        .listing(3, &[])
        .detail(1, "Alpha Siege", 90, &["Strategy", "Wargame"])
        .detail(2, "Beta Vale", 70, &["RPG", "Open World"])
        .detail(3, "Gamma Drift", 85, &["RPG"])
        .icon(1, b"icon-1")
        .icon(2, b"icon-2")
        .icon(3, b"icon-3");

    let summary = run(&storefront, &extractor(&config), &config, &store, false, None).unwrap();

    assert_eq!(summary.pages_visited, 3);
    assert_eq!(summary.new_entries, 3);
    assert_eq!(summary.enriched, 3);
    assert_eq!(summary.termination, "empty page");

    // Rows are ordered by tag-group priority, not by id or rating.
    let report = summary.report.clone().unwrap();
    let html = fs::read_to_string(tmp.path().join(&report)).unwrap();
    let beta = html.find("icons/0000002.jpg").unwrap();
    let alpha = html.find("icons/0000001.jpg").unwrap();
    let gamma = html.find("icons/0000003.jpg").unwrap();
    assert!(beta < alpha, "first tag group must outrank the second");
    assert!(alpha < gamma, "matched groups must outrank unmatched tags");

    assert!(html.contains("<td>70%</td>"));
    assert!(html.contains("Open World<br>RPG"));
    assert!(html.contains(r#"href="https://store.test/entry/0000002""#));

    // Everything the report references is on disk, and all three ids are
    // remembered.
    for id in ["0000001", "0000002", "0000003"] {
        assert!(store.icons_dir().join(format!("{id}.jpg")).exists());
    }
    assert_eq!(
        fs::read_to_string(store.cache_path()).unwrap(),
        "0000001\n0000002\n0000003\n"
    );
    assert!(store.stylesheet_path().exists());
}

#[test]
fn standalone_sync_repairs_a_damaged_icon_directory() {
    let tmp = TempDir::new().unwrap();
    let store = Store::new(tmp.path());
    let config = config();

    let storefront = FakeStorefront::default()
        .listing(1, &[42])
        .listing(2, &[])
        .detail(42, "Dwarf Keep", 80, &["RPG"])
        .icon(42, b"jpeg");
    run(&storefront, &extractor(&config), &config, &store, false, None).unwrap();

    // Someone deleted a referenced icon and dropped in a stray one.
    fs::remove_file(store.icons_dir().join("0000042.jpg")).unwrap();
    fs::write(store.icons_dir().join("0009999.jpg"), b"stray").unwrap();

    let stats = assets::sync_icons(&storefront, &config.store, &store, None).unwrap();

    assert_eq!(
        stats,
        SyncStats {
            downloaded: 1,
            failed: 0,
            pruned: 1
        }
    );
    assert!(store.icons_dir().join("0000042.jpg").exists());
    assert!(!store.icons_dir().join("0009999.jpg").exists());
}

#[test]
fn console_transcript_of_a_single_entry_run() {
    let tmp = TempDir::new().unwrap();
    let store = Store::new(tmp.path());
    let config = config();

    let storefront = FakeStorefront::default()
        .listing(1, &[42])
        .listing(2, &[])
        .detail(42, "Dwarf Keep", 80, &["RPG"])
        .icon(42, b"jpeg");

    let (tx, rx) = mpsc::channel();
    let summary = run(
        &storefront,
        &extractor(&config),
        &config,
        &store,
        false,
        Some(tx),
    )
    .unwrap();

    let lines: Vec<String> = rx
        .iter()
        .flat_map(|event: RunEvent| output::format_run_event(&event))
        .collect();
    assert_eq!(
        lines,
        vec![
            "00001 01 00 00001 00000 00001",
            "00001 of 00001 0000042 Dwarf Keep",
            "Download image: 00001 0000042",
        ]
    );

    assert_eq!(
        output::format_summary(summary.entries_seen, summary.groups_seen),
        vec!["-".repeat(45), "00001 00000".to_string(), "-".repeat(45)]
    );
}
