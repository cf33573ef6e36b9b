// src/extract/engine.rs
// =============================================================================
// This module wires the pieces together.
//
//   events -> RegionTracker -> AnchorCollector -> LinkFilter -> links
//
// One `ExtractorConfig` describes both kinds of page we scrape:
// - navigation menus: a <nav> inside a <header>, text required
// - image overlays: a <div class="..."> anywhere, href only
//
// An `Extractor` is good for exactly one document: `finish` consumes it.
// =============================================================================

use serde::{Deserialize, Serialize};

use super::anchor::{AnchorCandidate, AnchorCapture, AnchorCollector};
use super::events::{tokenize, TagEvent};
use super::links::{ExtractedLink, LinkFilter};
use super::region::{ElementMatcher, RegionSpec, RegionTracker};

/// What to extract from a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractorConfig {
    pub region: RegionSpec,
    /// Text under elements with these classes is left out of link text
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude_text_classes: Vec<String>,
    #[serde(default)]
    pub capture: AnchorCapture,
}

impl ExtractorConfig {
    /// Links with text from `container`, which must sit inside `gate`
    pub fn navigation(gate: ElementMatcher, container: ElementMatcher) -> Self {
        Self {
            region: RegionSpec {
                gate: Some(gate),
                container,
            },
            exclude_text_classes: Vec::new(),
            capture: AnchorCapture::WithText,
        }
    }

    /// Every href inside `container`, text not needed
    pub fn overlay(container: ElementMatcher) -> Self {
        Self {
            region: RegionSpec {
                gate: None,
                container,
            },
            exclude_text_classes: Vec::new(),
            capture: AnchorCapture::HrefOnly,
        }
    }

    pub fn with_excluded_text_classes(mut self, classes: Vec<String>) -> Self {
        self.exclude_text_classes = classes;
        self
    }
}

/// Single-use state machine over one document's events
#[derive(Debug)]
pub struct Extractor {
    region: RegionTracker,
    anchors: AnchorCollector,
}

impl Extractor {
    pub fn new(config: &ExtractorConfig) -> Self {
        Self {
            region: RegionTracker::new(config.region.clone()),
            anchors: AnchorCollector::new(config.capture, config.exclude_text_classes.clone()),
        }
    }

    pub fn feed(&mut self, event: &TagEvent) {
        let signal = self.region.on_event(event);
        self.anchors.on_event(event, signal);
    }

    /// Ends the document. A region that is still open counts as closed here.
    pub fn finish(self) -> Vec<AnchorCandidate> {
        self.anchors.finish()
    }
}

// Extracts the links of one HTML document
//
// Parameters:
//   html: raw page source
//   config: which region to read and how
//   filter: base URL, root domain and skip classes
//
// Returns: unique (text, url) pairs in document order; empty when the
//          region isn't on the page
pub fn extract_links(html: &str, config: &ExtractorConfig, filter: &LinkFilter) -> Vec<ExtractedLink> {
    let mut extractor = Extractor::new(config);
    for event in tokenize(html) {
        extractor.feed(&event);
    }
    let candidates = extractor.finish();
    filter.apply(&candidates, config.capture.requires_text())
}
