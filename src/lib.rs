// src/lib.rs
// =============================================================================
// scoped-links: pull the links out of one region of an HTML page, such as
// the main menu inside the site header or the image overlays of a blog
// listing, and ignore every other link on the page.
//
// Modules:
// - extract: the extraction engine (pure, no I/O)
// - fetch: downloads pages (with pagination and polite pacing)
// - output: CSV / JSON / table writers
// - job: JSON job profiles for multi-page runs
// - download: saves the pages behind a links CSV to disk
// =============================================================================

pub mod download;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod job;
pub mod output;

pub use error::{Error, Result};
pub use extract::{extract_links, ExtractedLink, Extractor, ExtractorConfig, LinkFilter};
