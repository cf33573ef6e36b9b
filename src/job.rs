// src/job.rs
// =============================================================================
// Job profiles: a JSON file that describes a whole scraping run, so a
// site with many paginated categories doesn't need a long command line.
//
// Example:
// {
//   "region": { "container": { "tag": "div", "classes": ["featured-image-overlay"] } },
//   "capture": "href_only",
//   "base_url": "https://example.com/",
//   "sources": [
//     { "url": "https://example.com/category/poems/", "pages": 7 },
//     { "url": "https://example.com/category/prose/", "pages": 5 }
//   ],
//   "output": "article_csv.csv"
// }
// =============================================================================

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::extract::{ExtractorConfig, LinkFilter};
use crate::fetch::{FetchSettings, Source};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    #[serde(flatten)]
    pub extractor: ExtractorConfig,
    /// Relative links are resolved against this URL
    pub base_url: String,
    /// Defaults to the host of `base_url`
    #[serde(default)]
    pub root_domain: Option<String>,
    #[serde(default)]
    pub skip_classes: Vec<String>,
    pub sources: Vec<Source>,
    /// CSV file to write; links are printed when missing
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub delay_ms: Option<u64>,
    #[serde(default)]
    pub jitter_ms: Option<u64>,
}

impl Job {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn link_filter(&self) -> Result<LinkFilter> {
        match &self.root_domain {
            Some(domain) => LinkFilter::new(&self.base_url, domain, self.skip_classes.clone()),
            None => LinkFilter::for_site(&self.base_url, self.skip_classes.clone()),
        }
    }

    /// Settings from the file, defaults for anything left out
    pub fn fetch_settings(&self) -> FetchSettings {
        let defaults = FetchSettings::default();
        FetchSettings {
            timeout: self
                .timeout_secs
                .map_or(defaults.timeout, Duration::from_secs),
            base_delay: self
                .delay_ms
                .map_or(defaults.base_delay, Duration::from_millis),
            jitter: self.jitter_ms.map_or(defaults.jitter, Duration::from_millis),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::AnchorCapture;
    use std::io::Write;

    const JOB: &str = r#"{
        "region": { "container": { "tag": "div", "classes": ["featured-image-overlay"] } },
        "capture": "href_only",
        "base_url": "https://example.com/",
        "sources": [
            { "url": "https://example.com/category/poems/", "pages": 7 },
            { "url": "https://example.com/category/prose/" }
        ],
        "output": "article_csv.csv",
        "delay_ms": 500
    }"#;

    #[test]
    fn test_load_job() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(JOB.as_bytes()).unwrap();

        let job = Job::load(file.path()).unwrap();
        assert_eq!(job.extractor.capture, AnchorCapture::HrefOnly);
        assert!(job.extractor.region.gate.is_none());
        assert_eq!(
            job.sources[1],
            Source::Remote {
                url: "https://example.com/category/prose/".to_string(),
                pages: 1
            }
        );
        assert_eq!(job.output, Some(PathBuf::from("article_csv.csv")));

        let settings = job.fetch_settings();
        assert_eq!(settings.base_delay, Duration::from_millis(500));
        assert_eq!(settings.jitter, FetchSettings::default().jitter);

        assert_eq!(job.link_filter().unwrap().root_domain(), "example.com");
    }

    #[test]
    fn test_bad_json_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        assert!(matches!(Job::load(file.path()), Err(Error::Json(_))));
    }
}
