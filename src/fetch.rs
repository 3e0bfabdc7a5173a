//! HTTP page fetching with bounded retries.
//!
//! The storefront is flaky by nature (rate limiting, transient 5xx, slow
//! CDN edges), so transport failure is treated as weather, not as an error:
//! every fetch retries up to the configured attempt count and an exhausted
//! URL surfaces as `None`. Callers decide what "unavailable this run" means
//! for them; nothing in this module ever aborts the run.

use crate::config::FetchConfig;
use reqwest::blocking::Client;
use reqwest::header::{COOKIE, HeaderMap, HeaderValue};
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
    #[error("cookie {0:?} is not a valid header value")]
    Cookie(String),
}

/// External page source.
///
/// `None` means the URL is unavailable this run; the caller skips whatever
/// needed it and moves on. Implementations must be shareable across the
/// enrichment worker threads.
pub trait Fetcher: Sync {
    fn fetch_text(&self, url: &str) -> Option<String>;
    fn fetch_bytes(&self, url: &str) -> Option<Vec<u8>>;
}

/// Blocking HTTP fetcher over a persistent reqwest client.
///
/// The user agent, cookie pairs and timeout come from `[fetch]` config and
/// are attached to every request. Non-2xx statuses count as failed attempts
/// just like transport errors.
pub struct HttpFetcher {
    client: Client,
    retries: u32,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        if let Some(cookie_line) = cookie_header(&config.cookies) {
            let value = HeaderValue::from_str(&cookie_line)
                .map_err(|_| FetchError::Cookie(cookie_line.clone()))?;
            headers.insert(COOKIE, value);
        }
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()?;
        Ok(Self {
            client,
            retries: config.retries,
        })
    }

    fn get(&self, url: &str) -> Option<reqwest::blocking::Response> {
        for _ in 0..self.retries {
            match self
                .client
                .get(url)
                .send()
                .and_then(|response| response.error_for_status())
            {
                Ok(response) => return Some(response),
                // Retry noise goes to stderr so it never interleaves with
                // the progress lines on stdout.
                Err(error) => eprintln!("{url}: {}", describe(&error)),
            }
        }
        None
    }
}

impl Fetcher for HttpFetcher {
    fn fetch_text(&self, url: &str) -> Option<String> {
        self.get(url)?.text().ok()
    }

    fn fetch_bytes(&self, url: &str) -> Option<Vec<u8>> {
        Some(self.get(url)?.bytes().ok()?.to_vec())
    }
}

/// Join cookie pairs into a single `Cookie` header line.
fn cookie_header(cookies: &BTreeMap<String, String>) -> Option<String> {
    if cookies.is_empty() {
        return None;
    }
    let line = cookies
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("; ");
    Some(line)
}

/// Short classification of a failed attempt for the retry log line.
fn describe(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "timeout".to_string()
    } else if error.is_connect() {
        "connect error".to_string()
    } else if let Some(status) = error.status() {
        format!("HTTP {status}")
    } else {
        "request error".to_string()
    }
}
