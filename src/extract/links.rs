// src/extract/links.rs
// =============================================================================
// This module turns captured anchors into the final list of links.
//
// Steps, in order:
// 1. Skip rules (first match wins, the anchor is dropped):
//    - href missing or blank
//    - href is a fragment ("#top")
//    - href is mailto:, tel: or javascript:
//    - text is blank (only when text is required)
//    - the anchor has a class from the skip list (e.g. "logo")
// 2. Resolve the href against the base URL (the `url` crate does the
//    RFC 3986 merge, like a browser would)
// 3. Keep only URLs on the root domain or one of its subdomains
// 4. Drop duplicate URLs, keeping the first one
// =============================================================================

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use url::Url;

use super::anchor::AnchorCandidate;
use crate::error::{Error, Result};

// Schemes that never point to a page
const SKIPPED_SCHEMES: &[&str] = &["mailto", "tel", "javascript"];

/// A link that made it through every filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedLink {
    /// Visible text of the anchor (empty for href-only capture)
    pub text: String,
    /// Absolute URL
    pub url: String,
}

/// Everything needed to turn candidates into links
#[derive(Debug, Clone)]
pub struct LinkFilter {
    base: Url,
    root_domain: String,
    skip_classes: Vec<String>,
}

impl LinkFilter {
    // Creates a filter after checking its inputs
    //
    // Parameters:
    //   base_url: absolute URL that relative hrefs are resolved against
    //   root_domain: e.g. "example.com"; subdomains are accepted too
    //   skip_classes: anchors carrying any of these classes are dropped
    //
    // Returns: Err if the base URL doesn't parse or the domain is blank
    pub fn new(base_url: &str, root_domain: &str, skip_classes: Vec<String>) -> Result<Self> {
        let base = Url::parse(base_url.trim()).map_err(|source| Error::InvalidBaseUrl {
            url: base_url.to_string(),
            source,
        })?;

        let root_domain = root_domain.trim().trim_end_matches('.').to_ascii_lowercase();
        if root_domain.is_empty() {
            return Err(Error::EmptyRootDomain);
        }

        Ok(Self {
            base,
            root_domain,
            skip_classes,
        })
    }

    /// Uses the host of the base URL as the root domain
    pub fn for_site(base_url: &str, skip_classes: Vec<String>) -> Result<Self> {
        let base = Url::parse(base_url.trim()).map_err(|source| Error::InvalidBaseUrl {
            url: base_url.to_string(),
            source,
        })?;
        let host = base.host_str().unwrap_or("").to_string();
        Self::new(base_url, &host, skip_classes)
    }

    pub fn root_domain(&self) -> &str {
        &self.root_domain
    }

    // Filters, resolves and deduplicates candidates
    //
    // Parameters:
    //   candidates: anchors in document order
    //   require_text: whether blank text drops a candidate
    //
    // Returns: links in first-seen order, unique by URL
    pub fn apply(&self, candidates: &[AnchorCandidate], require_text: bool) -> Vec<ExtractedLink> {
        let mut seen = HashSet::new();
        let mut links = Vec::new();

        for candidate in candidates {
            let Some(href) = self.accepted_href(candidate, require_text) else {
                continue;
            };
            let Some(url) = resolve(&self.base, href) else {
                continue;
            };
            if !self.is_on_domain(&url) {
                continue;
            }

            let url = url.to_string();
            if seen.insert(url.clone()) {
                links.push(ExtractedLink {
                    text: candidate.text.clone(),
                    url,
                });
            }
        }

        links
    }

    // Runs the skip rules; Some(trimmed href) when the candidate survives
    fn accepted_href<'a>(&self, candidate: &'a AnchorCandidate, require_text: bool) -> Option<&'a str> {
        let href = candidate.href.as_deref()?.trim();
        if href.is_empty() || href.starts_with('#') || has_skipped_scheme(href) {
            return None;
        }
        if require_text && is_blank(&candidate.text) {
            return None;
        }
        if candidate
            .attrs
            .classes()
            .any(|c| self.skip_classes.iter().any(|skip| skip == c))
        {
            return None;
        }
        Some(href)
    }

    // Host equals the root domain, or ends with "." + root domain
    fn is_on_domain(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        let host = host.trim_end_matches('.').to_ascii_lowercase();
        host == self.root_domain
            || host
                .strip_suffix(&self.root_domain)
                .is_some_and(|prefix| prefix.ends_with('.'))
    }
}

// Checks the part before the first ':' against the skipped schemes
fn has_skipped_scheme(href: &str) -> bool {
    href.split_once(':').is_some_and(|(scheme, _)| {
        SKIPPED_SCHEMES
            .iter()
            .any(|s| scheme.trim().eq_ignore_ascii_case(s))
    })
}

fn is_blank(text: &str) -> bool {
    text.split_whitespace().next().is_none()
}

// Resolves a possibly-relative href to an absolute URL
//
// Returns: None when the href can't be parsed even relative to the base
fn resolve(base: &Url, href: &str) -> Option<Url> {
    base.join(href).ok()
}
