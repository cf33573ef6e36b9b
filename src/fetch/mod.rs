// src/fetch/mod.rs
// =============================================================================
// This module gets HTML documents into the extractor.
//
// Features:
// - Local files or http(s) URLs
// - Paginated listings (base, base/page/2/, base/page/3/, ...)
// - One request at a time, with a fixed delay plus random jitter between
//   requests so we don't hammer the site
// - A failed page is logged and skipped instead of stopping the run
// =============================================================================

mod pager;

pub use pager::{jittered_delay, page_url_for, scrape_sources, FetchSettings, PageFetcher, Source};
