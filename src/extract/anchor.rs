// src/extract/anchor.rs
// =============================================================================
// This module collects the <a> elements found inside a region.
//
// For every anchor we keep:
// - the raw href (relative links are resolved later, in links.rs)
// - the visible text, with runs of whitespace collapsed to one space
// - the anchor's own attributes (the skip rules look at its classes)
// - the class lists of the elements that were open around it
//
// Text inside an element carrying one of the "exclude text" classes is not
// captured, e.g. <a href="/x">Shop<span class="badge">new</span></a>
// gives "Shop" when "badge" is excluded.
//
// Only one anchor can be open at a time. A second <a> before the first
// one closes means the first is broken markup, so it is thrown away.
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::events::{Attributes, StartTag, TagEvent};
use super::region::RegionSignal;

/// How much of an anchor we need
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorCapture {
    /// Collect text until </a>; links without text are skipped later
    #[default]
    WithText,
    /// Take the href at <a> and move on; text is not needed
    HrefOnly,
}

impl AnchorCapture {
    pub fn requires_text(self) -> bool {
        matches!(self, AnchorCapture::WithText)
    }
}

/// An anchor captured inside a region, before any filtering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorCandidate {
    /// href exactly as written, None when the attribute is missing
    pub href: Option<String>,
    /// Trimmed text with whitespace collapsed (empty for href-only capture)
    pub text: String,
    pub attrs: Attributes,
    /// Class lists of the enclosing elements when the anchor opened,
    /// outermost first
    pub context: Vec<Vec<String>>,
}

// An element opened inside the region that has not been closed yet
#[derive(Debug, Clone)]
struct OpenElement {
    tag: String,
    classes: Vec<String>,
}

impl OpenElement {
    fn from_tag(tag: &StartTag) -> Self {
        Self {
            tag: tag.name.clone(),
            classes: tag.attrs.classes().map(str::to_string).collect(),
        }
    }
}

// The anchor currently being read
#[derive(Debug)]
struct OpenAnchor {
    candidate: AnchorCandidate,
    // Index of the anchor itself in `open`
    base: usize,
}

#[derive(Debug)]
pub struct AnchorCollector {
    capture: AnchorCapture,
    exclude_text_classes: Vec<String>,
    open: Vec<OpenElement>,
    current: Option<OpenAnchor>,
    collected: Vec<AnchorCandidate>,
}

impl AnchorCollector {
    pub fn new(capture: AnchorCapture, exclude_text_classes: Vec<String>) -> Self {
        Self {
            capture,
            exclude_text_classes,
            open: Vec::new(),
            current: None,
            collected: Vec::new(),
        }
    }

    // Handles one event, given what the region tracker made of it
    //
    // Parameters:
    //   event: the tag event
    //   signal: whether the event entered, stayed in, or left the region
    pub fn on_event(&mut self, event: &TagEvent, signal: RegionSignal) {
        match signal {
            RegionSignal::Outside => {}
            RegionSignal::Entered => {
                self.clear_region();
                if let TagEvent::Start(tag) = event {
                    self.open.push(OpenElement::from_tag(tag));
                }
            }
            RegionSignal::Exited => self.clear_region(),
            RegionSignal::Inside => match event {
                TagEvent::Start(tag) => self.on_start(tag),
                TagEvent::End(name) => self.on_end(name),
                TagEvent::Text(text) => self.on_text(text),
            },
        }
    }

    /// Returns every anchor that was properly closed.
    ///
    /// An anchor still open at the end of the document is dropped.
    pub fn finish(mut self) -> Vec<AnchorCandidate> {
        self.clear_region();
        self.collected
    }

    fn on_start(&mut self, tag: &StartTag) {
        if tag.name != "a" {
            if !tag.is_void() {
                self.open.push(OpenElement::from_tag(tag));
            }
            return;
        }

        if let Some(previous) = self.current.take() {
            debug!(
                href = previous.candidate.href.as_deref().unwrap_or(""),
                "discarding anchor that was never closed"
            );
            self.open.truncate(previous.base);
        }

        let candidate = AnchorCandidate {
            href: tag.attrs.get("href").map(str::to_string),
            text: String::new(),
            attrs: tag.attrs.clone(),
            context: self.open.iter().map(|e| e.classes.clone()).collect(),
        };

        match self.capture {
            AnchorCapture::HrefOnly => self.collected.push(candidate),
            AnchorCapture::WithText => {
                // <a/> still opens an anchor in HTML, so no is_void() check here
                let base = self.open.len();
                self.open.push(OpenElement::from_tag(tag));
                self.current = Some(OpenAnchor { candidate, base });
            }
        }
    }

    fn on_end(&mut self, name: &str) {
        if name == "a" {
            if let Some(anchor) = self.current.take() {
                let mut candidate = anchor.candidate;
                candidate.text = candidate.text.trim().to_string();
                self.open.truncate(anchor.base);
                self.collected.push(candidate);
                return;
            }
        }

        // Only elements opened after the anchor can be popped while it is
        // open, so a stray close can't take the anchor with it
        let floor = self.current.as_ref().map_or(0, |a| a.base + 1);
        if let Some(pos) = self.open[floor..].iter().rposition(|e| e.tag == name) {
            self.open.truncate(floor + pos);
        }
    }

    fn on_text(&mut self, text: &str) {
        let excluded = match &self.current {
            Some(anchor) => self.is_excluded(anchor.base),
            None => return,
        };
        if excluded {
            return;
        }
        if let Some(anchor) = self.current.as_mut() {
            push_collapsed(&mut anchor.candidate.text, text);
        }
    }

    // True when the anchor or anything open inside it has an excluded class
    fn is_excluded(&self, base: usize) -> bool {
        if self.exclude_text_classes.is_empty() {
            return false;
        }
        self.open[base..].iter().any(|element| {
            element
                .classes
                .iter()
                .any(|c| self.exclude_text_classes.contains(c))
        })
    }

    fn clear_region(&mut self) {
        if let Some(anchor) = self.current.take() {
            debug!(
                href = anchor.candidate.href.as_deref().unwrap_or(""),
                "dropping anchor left open at end of region"
            );
        }
        self.open.clear();
    }
}

// Appends text, turning every run of whitespace into a single space
fn push_collapsed(buffer: &mut String, text: &str) {
    for c in text.chars() {
        if c.is_whitespace() {
            if !buffer.ends_with(' ') {
                buffer.push(' ');
            }
        } else {
            buffer.push(c);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // Feeds events as if they all happened inside an already-entered region
    fn collect(capture: AnchorCapture, exclude: &[&str], events: &[TagEvent]) -> Vec<AnchorCandidate> {
        let mut collector =
            AnchorCollector::new(capture, exclude.iter().map(|s| s.to_string()).collect());
        collector.on_event(&TagEvent::start("nav", [("class", "menu")]), RegionSignal::Entered);
        for event in events {
            collector.on_event(event, RegionSignal::Inside);
        }
        collector.finish()
    }

    fn texts(candidates: &[AnchorCandidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.text.as_str()).collect()
    }

    #[test]
    fn test_collects_text_and_href() {
        let found = collect(
            AnchorCapture::WithText,
            &[],
            &[
                TagEvent::start("a", [("href", "/about"), ("class", "item")]),
                TagEvent::text("  About\n   "),
                TagEvent::bare("span"),
                TagEvent::text("us "),
                TagEvent::end("span"),
                TagEvent::end("a"),
            ],
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].href.as_deref(), Some("/about"));
        assert_eq!(found[0].text, "About us");
        assert!(found[0].attrs.has_class("item"));
        assert_eq!(found[0].context, vec![vec!["menu".to_string()]]);
    }

    #[test]
    fn test_excluded_class_hides_text() {
        let found = collect(
            AnchorCapture::WithText,
            &["badge"],
            &[
                TagEvent::start("a", [("href", "/shop")]),
                TagEvent::text("Shop"),
                TagEvent::start("span", [("class", "badge hot")]),
                TagEvent::text(" new"),
                TagEvent::bare("b"),
                TagEvent::text("!!"),
                TagEvent::end("b"),
                TagEvent::end("span"),
                TagEvent::text(" now"),
                TagEvent::end("a"),
            ],
        );
        assert_eq!(texts(&found), vec!["Shop now"]);
    }

    #[test]
    fn test_exclusion_is_exact_token() {
        let found = collect(
            AnchorCapture::WithText,
            &["badge"],
            &[
                TagEvent::start("a", [("href", "/shop")]),
                TagEvent::start("span", [("class", "badges")]),
                TagEvent::text("Shop"),
                TagEvent::end("span"),
                TagEvent::end("a"),
            ],
        );
        assert_eq!(texts(&found), vec!["Shop"]);
    }

    #[test]
    fn test_second_anchor_discards_first() {
        let found = collect(
            AnchorCapture::WithText,
            &[],
            &[
                TagEvent::start("a", [("href", "/one")]),
                TagEvent::text("One"),
                TagEvent::start("a", [("href", "/two")]),
                TagEvent::text("Two"),
                TagEvent::end("a"),
            ],
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].href.as_deref(), Some("/two"));
        assert_eq!(found[0].text, "Two");
    }

    #[test]
    fn test_unclosed_anchor_is_dropped() {
        let found = collect(
            AnchorCapture::WithText,
            &[],
            &[
                TagEvent::start("a", [("href", "/done")]),
                TagEvent::text("Done"),
                TagEvent::end("a"),
                TagEvent::start("a", [("href", "/open")]),
                TagEvent::text("Open"),
            ],
        );
        assert_eq!(texts(&found), vec!["Done"]);
    }

    #[test]
    fn test_region_exit_drops_open_anchor() {
        let mut collector = AnchorCollector::new(AnchorCapture::WithText, Vec::new());
        collector.on_event(&TagEvent::bare("nav"), RegionSignal::Entered);
        collector.on_event(&TagEvent::start("a", [("href", "/x")]), RegionSignal::Inside);
        collector.on_event(&TagEvent::end("nav"), RegionSignal::Exited);
        // the close arrives after the region is gone
        collector.on_event(&TagEvent::end("a"), RegionSignal::Outside);
        assert!(collector.finish().is_empty());
    }

    #[test]
    fn test_stray_close_does_not_close_anchor() {
        let found = collect(
            AnchorCapture::WithText,
            &[],
            &[
                TagEvent::start("a", [("href", "/x")]),
                TagEvent::text("Left"),
                TagEvent::end("nav"),
                TagEvent::end("li"),
                TagEvent::text("Right"),
                TagEvent::end("a"),
            ],
        );
        assert_eq!(texts(&found), vec!["LeftRight"]);
    }

    #[test]
    fn test_href_only_captures_at_start() {
        let found = collect(
            AnchorCapture::HrefOnly,
            &[],
            &[
                TagEvent::start("a", [("href", "/post-1")]),
                TagEvent::start("img", [("src", "1.jpg")]),
                TagEvent::start("a", [("href", "/post-2")]),
                TagEvent::bare("a"),
            ],
        );
        let hrefs: Vec<Option<&str>> = found.iter().map(|c| c.href.as_deref()).collect();
        assert_eq!(hrefs, vec![Some("/post-1"), Some("/post-2"), None]);
        assert!(found.iter().all(|c| c.text.is_empty()));
    }

    #[test]
    fn test_push_collapsed() {
        let mut buffer = String::new();
        push_collapsed(&mut buffer, " a \t\n b ");
        push_collapsed(&mut buffer, "  c");
        assert_eq!(buffer, " a b c");
    }
}
