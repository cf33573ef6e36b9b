// src/error.rs
// =============================================================================
// Error types for the library side of the crate.
//
// Extraction itself never fails on bad markup: malformed tags, unmatched
// closes and unresolvable hrefs are simply left out of the output.
// The errors here cover the few things that really are the caller's fault
// (a base URL that is not a URL, an empty root domain) plus the I/O done
// by the fetcher and the writers.
// =============================================================================

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The base URL used to resolve relative links is not an absolute URL
    #[error("invalid base URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The root domain used for the domain filter is blank
    #[error("root domain must not be empty")]
    EmptyRootDomain,

    /// Reading or writing a local file failed
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The HTTP client could not be set up
    #[error("failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Downloading a page failed
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// A page answered with a non-success status code
    #[error("failed to fetch {url}: HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
