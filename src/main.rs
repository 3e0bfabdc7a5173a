use clap::{Parser, Subcommand};
use shelfwatch::{assets, config, extract, fetch, output, run, store};
use std::path::PathBuf;

/// Flags for the crawl command.
#[derive(clap::Args, Clone)]
struct CrawlArgs {
    /// Pause for Enter between discovery and detail fetching
    #[arg(long)]
    pause: bool,
}

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup, never reclaimed
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "shelfwatch")]
#[command(about = "Incremental storefront catalog crawler")]
#[command(long_about = "\
Incremental storefront catalog crawler

Walks a paginated store listing until it runs dry, looks up every entry it
has not reported before, and renders the newcomers into a static HTML
report ranked by tag priority and review score. Entries already reported
once never appear again, so a daily run reads as a changelog of the
catalog.

Reports directory layout:

  reports/
  ├── seen.txt                   # Every id ever reported; delete to start over
  ├── report.css                 # Written once, safe to hand-edit
  ├── last_run.json              # Machine-readable summary of the last run
  ├── 2026_08_24_17_03_11.html   # One report per run that found newcomers
  └── icons/
      └── 0000042.jpg            # Entry icons, synced to what reports reference

Deleting an old report reclaims its icons on the next sync; deleting
seen.txt makes the next crawl report the whole catalog from scratch.

Run 'shelfwatch gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Configuration file
    #[arg(long, default_value = "config.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline: crawl listing → enrich newcomers → report → sync icons
    Crawl(CrawlArgs),
    /// Reconcile the icon directory against the reports on disk
    Sync,
    /// Validate the configuration without touching the network
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Crawl(crawl_args) => {
            let config = config::load_config(&cli.config)?;
            init_thread_pool(&config.fetch);
            let fetcher = fetch::HttpFetcher::new(&config.fetch)?;
            let extractor = extract::MarkupExtractor::new(&config.store)?;
            let store = store::Store::new(&config.paths.reports_dir);

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_run_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let summary = run::run(
                &fetcher,
                &extractor,
                &config,
                &store,
                crawl_args.pause,
                Some(tx),
            )?;
            printer.join().unwrap();

            for line in output::format_summary(summary.entries_seen, summary.groups_seen) {
                println!("{}", line);
            }
        }
        Command::Sync => {
            let config = config::load_config(&cli.config)?;
            let fetcher = fetch::HttpFetcher::new(&config.fetch)?;
            let store = store::Store::new(&config.paths.reports_dir);

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_run_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let stats = assets::sync_icons(&fetcher, &config.store, &store, Some(tx))?;
            printer.join().unwrap();

            println!("Icons: {}", stats);
        }
        Command::Check => {
            println!("==> Checking {}", cli.config.display());
            let config = config::load_config(&cli.config)?;
            extract::MarkupExtractor::new(&config.store)?;
            println!(
                "    {} tag groups, page ceiling {}, reports in {}",
                config.rank.tag_groups.len(),
                config.crawl.page_ceiling,
                config.paths.reports_dir
            );
            println!("==> Config is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Initialize the rayon thread pool used for detail-page fetches.
///
/// Zero keeps rayon's default of one worker per core.
fn init_thread_pool(fetch: &config::FetchConfig) {
    if fetch.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(fetch.threads)
            .build_global()
            .ok();
    }
}
