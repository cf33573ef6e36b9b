// src/extract/mod.rs
// =============================================================================
// This module contains the link extraction engine.
//
// Submodules:
// - events: Turns raw HTML into start tag / end tag / text events
// - region: Tracks whether we are inside the target container
// - anchor: Collects <a> elements (href, text, classes) inside the region
// - links: Skip rules, URL resolution, domain filter and dedup
// - engine: Configuration and the glue that runs all of the above
//
// Nothing in here does I/O. Give it a string, get back a list of links.
// =============================================================================

mod anchor;
mod engine;
mod events;
mod links;
mod region;

// Re-export public items from submodules so callers can write
// `extract::extract_links()` instead of `extract::engine::extract_links()`
pub use anchor::{AnchorCandidate, AnchorCapture, AnchorCollector};
pub use engine::{extract_links, Extractor, ExtractorConfig};
pub use events::{tokenize, Attributes, StartTag, TagEvent};
pub use links::{ExtractedLink, LinkFilter};
pub use region::{transition, ElementMatcher, RegionSignal, RegionSpec, RegionState, RegionTracker};
