// src/download.rs
// =============================================================================
// This module saves the pages behind extracted links to disk, so they can
// be scraped again later without touching the site.
//
// How it works:
// 1. Read the rows of a links CSV (the files `output::write_csv` writes)
// 2. Pick a file name per row: slug of the link text, else slug of the URL
//    path, else "home". Names already used in this run get -2, -3, ...
// 3. Skip rows whose URL is not http(s), and rows whose file already exists
// 4. Fetch the rest with the same paced PageFetcher the scraper uses
//
// A page that fails to download or to save is logged and counted, the
// remaining rows are still processed.
// =============================================================================

use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{info, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::fetch::PageFetcher;

// Runs of anything that isn't a lowercase letter or digit
static NON_SLUG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// One row of a links CSV. Every column is optional so both layouts
/// (`link_text,full_url` and `post_url`) and plain `url` files can be read.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LinkRow {
    link_text: Option<String>,
    post_url: Option<String>,
    full_url: Option<String>,
    url: Option<String>,
}

impl LinkRow {
    fn into_target(self) -> DownloadTarget {
        let url = [self.post_url, self.full_url, self.url]
            .into_iter()
            .flatten()
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty())
            .unwrap_or_default();

        DownloadTarget {
            text: self.link_text.unwrap_or_default().trim().to_string(),
            url,
        }
    }
}

/// A page to save
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    /// Link text, may be empty
    pub text: String,
    /// URL as written in the CSV (not validated yet)
    pub url: String,
}

/// What happened to the rows of one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadReport {
    pub saved: usize,
    pub skipped_existing: usize,
    pub invalid: usize,
    pub failed: usize,
}

// Returns the first path that exists, e.g. the CSV and its fallback name
pub fn pick_csv_path(candidates: &[PathBuf]) -> Option<&Path> {
    candidates
        .iter()
        .map(PathBuf::as_path)
        .find(|path| path.is_file())
}

// Reads every row of a links CSV
//
// Rows keep their order. Rows without any URL column are kept too (with
// an empty URL) so they show up as invalid in the report.
pub fn read_targets(path: &Path) -> Result<Vec<DownloadTarget>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut targets = Vec::new();
    for row in reader.deserialize::<LinkRow>() {
        targets.push(row?.into_target());
    }
    Ok(targets)
}

// Lowercases and joins the letters/digits with single dashes
//
// Examples:
//   "Pricing & Plans" -> "pricing-plans"
//   "  ---  " -> ""
pub fn slugify(value: &str) -> String {
    let lower = value.trim().to_lowercase();
    NON_SLUG_RE
        .replace_all(&lower, "-")
        .trim_matches('-')
        .to_string()
}

/// Only absolute http(s) URLs with a host are downloaded
pub fn is_valid_url(url: &str) -> bool {
    match Url::parse(url.trim()) {
        Ok(parsed) => {
            matches!(parsed.scheme(), "http" | "https")
                && parsed.host_str().is_some_and(|host| !host.is_empty())
        }
        Err(_) => false,
    }
}

/// Hands out file names, never the same one twice in a run
#[derive(Debug, Default)]
pub struct FileNamer {
    used: HashSet<String>,
}

impl FileNamer {
    pub fn new() -> Self {
        Self::default()
    }

    // Picks the file name for one page
    //
    // Parameters:
    //   text: link text (preferred source of the name)
    //   url: page URL, its path is used when the text has no usable characters
    //
    // Returns: "<slug>.html", or "<slug>-N.html" when the slug was taken
    pub fn name_for(&mut self, text: &str, url: &str) -> String {
        let mut slug = slugify(text);
        if slug.is_empty() {
            let path = Url::parse(url.trim())
                .map(|parsed| parsed.path().trim_matches('/').replace('/', "-"))
                .unwrap_or_default();
            slug = slugify(&path);
        }
        if slug.is_empty() {
            slug = "home".to_string();
        }

        let mut name = format!("{}.html", slug);
        let mut index = 2;
        while self.used.contains(&name) {
            name = format!("{}-{}.html", slug, index);
            index += 1;
        }
        self.used.insert(name.clone());
        name
    }
}

// Downloads every target into `out_dir`
//
// Parameters:
//   fetcher: paced downloader (waits between two real requests)
//   targets: rows from the CSV, in order
//   out_dir: created if missing
//
// Returns: counts per outcome. Err only if `out_dir` can't be created.
pub async fn download_pages(
    fetcher: &mut PageFetcher,
    targets: &[DownloadTarget],
    out_dir: &Path,
) -> Result<DownloadReport> {
    tokio::fs::create_dir_all(out_dir)
        .await
        .map_err(|source| Error::Io {
            path: out_dir.to_path_buf(),
            source,
        })?;

    let mut namer = FileNamer::new();
    let mut report = DownloadReport::default();
    let total = targets.len();

    for (index, target) in targets.iter().enumerate() {
        let row = index + 1;
        if !is_valid_url(&target.url) {
            warn!(row, url = %target.url, "skipping invalid URL");
            report.invalid += 1;
            continue;
        }

        let path = out_dir.join(namer.name_for(&target.text, &target.url));
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            info!(path = %path.display(), "skipping existing file");
            report.skipped_existing += 1;
            continue;
        }

        info!(row, total, url = %target.url, "downloading");
        let html = match fetcher.fetch(&target.url).await {
            Ok(html) => html,
            Err(e) => {
                warn!(url = %target.url, error = %e, "download failed");
                report.failed += 1;
                continue;
            }
        };

        match tokio::fs::write(&path, html).await {
            Ok(()) => {
                info!(path = %path.display(), "saved");
                report.saved += 1;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to write page");
                report.failed += 1;
            }
        }
    }

    Ok(report)
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is LazyLock?
//    - A static that is built the first time it is used
//    - The regex is compiled once, not once per slugify() call
//
// 2. Why `#[serde(default)]` on LinkRow?
//    - The csv crate maps columns to fields by header name
//    - A missing column becomes None instead of an error, so one struct
//      reads every CSV layout
//
// 3. Why are names not reused across runs?
//    - Names depend only on the rows, so a second run over the same CSV
//      picks the same names and skips every page that is already saved
// -----------------------------------------------------------------------------
