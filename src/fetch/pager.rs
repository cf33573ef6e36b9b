// src/fetch/pager.rs
// =============================================================================
// This module downloads pages and runs the extractor over each one.
//
// How it works:
// 1. Expand every source into page URLs (page 1 = base, page N = base/page/N/)
// 2. Fetch the pages one after another, never in parallel
// 3. Wait a fixed delay plus a random jitter between two fetches
// 4. Run a brand new Extractor over every page
// 5. Merge the links of all pages, keeping the first copy of each URL
//
// A page that fails to load (timeout, DNS, HTTP 500...) is logged and
// skipped, the remaining pages are still scraped.
// =============================================================================

use rand::Rng;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::extract::{extract_links, ExtractedLink, ExtractorConfig, LinkFilter};

/// Timeout and pacing for page downloads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchSettings {
    /// Per-request timeout
    pub timeout: Duration,
    /// Fixed wait between two fetches
    pub base_delay: Duration,
    /// Upper bound of the random wait added on top of `base_delay`
    pub jitter: Duration,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            base_delay: Duration::from_millis(2000),
            jitter: Duration::from_millis(1500),
        }
    }
}

/// Where a document comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Source {
    /// A listing on the web, optionally paginated
    Remote {
        url: String,
        #[serde(default = "default_pages")]
        pages: usize,
    },
    /// A page saved to disk
    Local { path: PathBuf },
}

fn default_pages() -> usize {
    1
}

impl Source {
    // Builds a source from a command-line argument
    //
    // Anything starting with http:// or https:// is fetched, everything
    // else is read from disk (pages is ignored for files)
    pub fn parse(input: &str, pages: usize) -> Self {
        let lower = input.trim().to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Source::Remote {
                url: input.trim().to_string(),
                pages: pages.max(1),
            }
        } else {
            Source::Local {
                path: PathBuf::from(input),
            }
        }
    }

    /// The URL relative links on this source would naturally resolve against
    pub fn url(&self) -> Option<&str> {
        match self {
            Source::Remote { url, .. } => Some(url),
            Source::Local { .. } => None,
        }
    }
}

// URL of a given page of a paginated listing
//
// Examples:
//   ("https://example.com/category/poems", 1) -> "https://example.com/category/poems"
//   ("https://example.com/category/poems", 3) -> "https://example.com/category/poems/page/3/"
pub fn page_url_for(base_url: &str, page: usize) -> String {
    if page <= 1 {
        return base_url.to_string();
    }
    let base = base_url.trim_end_matches('/');
    format!("{}/page/{}/", base, page)
}

// Fixed delay plus a random amount in [0, jitter]
pub fn jittered_delay(base: Duration, jitter: Duration) -> Duration {
    let max_ms = u64::try_from(jitter.as_millis()).unwrap_or(u64::MAX);
    if max_ms == 0 {
        return base;
    }
    base + Duration::from_millis(rand::thread_rng().gen_range(0..=max_ms))
}

/// Sequential page downloader
pub struct PageFetcher {
    client: Client,
    settings: FetchSettings,
    // Set once the first page has been requested, so we know to wait
    fetched_any: bool,
}

impl PageFetcher {
    pub fn new(settings: FetchSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(concat!("scoped-links/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(Error::Client)?;

        Ok(Self {
            client,
            settings,
            fetched_any: false,
        })
    }

    // Fetches one page, waiting first if another page was fetched before
    pub async fn fetch(&mut self, url: &str) -> Result<String> {
        if self.fetched_any {
            let delay = jittered_delay(self.settings.base_delay, self.settings.jitter);
            tokio::time::sleep(delay).await;
        }
        self.fetched_any = true;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| Error::Fetch {
                url: url.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(Error::HttpStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        response.text().await.map_err(|source| Error::Fetch {
            url: url.to_string(),
            source,
        })
    }
}

async fn read_local(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })
}

// Adds links to `all`, skipping URLs that are already there
fn merge_unique(all: &mut Vec<ExtractedLink>, seen: &mut HashSet<String>, links: Vec<ExtractedLink>) -> usize {
    let before = all.len();
    for link in links {
        if seen.insert(link.url.clone()) {
            all.push(link);
        }
    }
    all.len() - before
}

// Scrapes every page of every source
//
// Parameters:
//   fetcher: downloader (carries the pacing between requests)
//   sources: remote listings and/or local files
//   config: region to read on every page
//   filter: base URL, root domain and skip classes
//
// Returns: unique links across all pages, first seen first.
//          Err only if a local file can't be read.
pub async fn scrape_sources(
    fetcher: &mut PageFetcher,
    sources: &[Source],
    config: &ExtractorConfig,
    filter: &LinkFilter,
) -> Result<Vec<ExtractedLink>> {
    let mut all = Vec::new();
    let mut seen = HashSet::new();

    for source in sources {
        match source {
            Source::Local { path } => {
                let html = read_local(path).await?;
                let links = extract_links(&html, config, filter);
                let added = merge_unique(&mut all, &mut seen, links);
                info!(path = %path.display(), new_links = added, "scraped file");
            }
            Source::Remote { url, pages } => {
                for page in 1..=(*pages).max(1) {
                    let page_url = page_url_for(url, page);
                    info!(url = %page_url, "scraping page");

                    let html = match fetcher.fetch(&page_url).await {
                        Ok(html) => html,
                        Err(e) => {
                            warn!(url = %page_url, error = %e, "skipping page");
                            continue;
                        }
                    };

                    // extract_links builds a fresh Extractor for every page
                    let links = extract_links(&html, config, filter);
                    let added = merge_unique(&mut all, &mut seen, links);
                    info!(url = %page_url, new_links = added, "scraped page");
                }
            }
        }
    }

    Ok(all)
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why not fetch pages concurrently like a link checker would?
//    - We are scraping one site, many pages in a row
//    - Sequential requests with a random pause look like a person browsing
//      and keep the load on the site low
//
// 2. What does `#[serde(untagged)]` do on Source?
//    - JSON has no "type" field to say which variant it is
//    - serde tries Remote first (needs "url"), then Local (needs "path")
//
// 3. Why is `fetch` taking `&mut self`?
//    - The fetcher remembers whether it already made a request, so the
//      very first page is fetched without waiting
// -----------------------------------------------------------------------------
