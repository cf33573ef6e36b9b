// src/extract/region.rs
// =============================================================================
// This module decides which part of the document we are "inside".
//
// A region is a container element (e.g. <nav id="access">) and everything
// up to its matching close tag. Optionally the container only counts when
// it sits inside a gate element (e.g. <header id="masthead">).
//
// States:
//   Outside -> AwaitingContainer (gate seen) -> InRegion -> ...
//   Outside -> InRegion                      (no gate configured)
//
// Nested elements with the same tag name as the container bump a depth
// counter, so <nav><nav></nav></nav> only ends at the outer close.
//
// The transition is a plain function over (spec, state, event), so the
// whole state machine can be driven by hand-built events in tests.
// =============================================================================

use serde::{Deserialize, Serialize};

use super::events::{StartTag, TagEvent};

/// Describes which start tag opens a region (or a gate)
///
/// All configured parts must match: the tag name, the id when set, and
/// at least one of the classes when any are set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementMatcher {
    /// Tag name, compared case-insensitively
    pub tag: String,
    /// Exact value of the id attribute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Any one of these must be a class token of the element
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
}

impl ElementMatcher {
    pub fn tag(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            id: None,
            classes: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    /// Same tag name, regardless of id or class
    pub fn is_named(&self, name: &str) -> bool {
        self.tag.eq_ignore_ascii_case(name)
    }

    pub fn matches(&self, tag: &StartTag) -> bool {
        if !self.is_named(&tag.name) {
            return false;
        }
        if let Some(id) = &self.id {
            if tag.attrs.id() != Some(id.as_str()) {
                return false;
            }
        }
        self.classes.is_empty() || self.classes.iter().any(|c| tag.attrs.has_class(c))
    }
}

/// Where links are collected from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSpec {
    /// Ancestor that must be open before the container counts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gate: Option<ElementMatcher>,
    pub container: ElementMatcher,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegionState {
    #[default]
    Outside,
    /// Inside the gate, no container open yet
    AwaitingContainer { gate_depth: usize },
    /// Inside the container. `gate_depth` is None when no gate is configured
    InRegion {
        gate_depth: Option<usize>,
        depth: usize,
    },
}

impl RegionState {
    pub fn is_inside(&self) -> bool {
        matches!(self, RegionState::InRegion { .. })
    }
}

/// What an event meant for the region, used by the anchor collector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionSignal {
    /// This event is the container's own start tag
    Entered,
    /// This event happened inside the region
    Inside,
    /// The region ended on this event (its close tag, or the gate closing)
    Exited,
    Outside,
}

// Computes the next region state for one event
//
// Parameters:
//   spec: gate and container predicates
//   state: the state before the event
//   event: the event to apply
//
// Returns: (new state, what the event meant for the region)
pub fn transition(
    spec: &RegionSpec,
    state: RegionState,
    event: &TagEvent,
) -> (RegionState, RegionSignal) {
    match event {
        TagEvent::Start(tag) => on_start(spec, state, tag),
        TagEvent::End(name) => on_end(spec, state, name),
        TagEvent::Text(_) if state.is_inside() => (state, RegionSignal::Inside),
        TagEvent::Text(_) => (state, RegionSignal::Outside),
    }
}

fn on_start(spec: &RegionSpec, state: RegionState, tag: &StartTag) -> (RegionState, RegionSignal) {
    // Void and self-closing tags never get a close tag, so they can't
    // open a gate, a container, or a nesting level
    if tag.is_void() {
        let signal = if state.is_inside() {
            RegionSignal::Inside
        } else {
            RegionSignal::Outside
        };
        return (state, signal);
    }

    let gate = spec.gate.as_ref();
    let nested_gate = |gate_depth: usize| match gate {
        Some(g) if g.is_named(&tag.name) => gate_depth + 1,
        _ => gate_depth,
    };

    match state {
        RegionState::Outside => match gate {
            Some(g) if g.matches(tag) => (
                RegionState::AwaitingContainer { gate_depth: 1 },
                RegionSignal::Outside,
            ),
            Some(_) => (state, RegionSignal::Outside),
            None if spec.container.matches(tag) => (
                RegionState::InRegion {
                    gate_depth: None,
                    depth: 1,
                },
                RegionSignal::Entered,
            ),
            None => (state, RegionSignal::Outside),
        },
        RegionState::AwaitingContainer { gate_depth } => {
            if spec.container.matches(tag) {
                (
                    RegionState::InRegion {
                        gate_depth: Some(gate_depth),
                        depth: 1,
                    },
                    RegionSignal::Entered,
                )
            } else {
                (
                    RegionState::AwaitingContainer {
                        gate_depth: nested_gate(gate_depth),
                    },
                    RegionSignal::Outside,
                )
            }
        }
        RegionState::InRegion { gate_depth, depth } => {
            // Any same-named element nests, whether or not it matches the
            // predicate again
            let depth = if spec.container.is_named(&tag.name) {
                depth + 1
            } else {
                depth
            };
            (
                RegionState::InRegion {
                    gate_depth: gate_depth.map(nested_gate),
                    depth,
                },
                RegionSignal::Inside,
            )
        }
    }
}

fn on_end(spec: &RegionSpec, state: RegionState, name: &str) -> (RegionState, RegionSignal) {
    let closes_gate = spec.gate.as_ref().is_some_and(|g| g.is_named(name));

    match state {
        RegionState::Outside => (state, RegionSignal::Outside),
        RegionState::AwaitingContainer { gate_depth } => {
            if !closes_gate {
                return (state, RegionSignal::Outside);
            }
            match gate_depth.saturating_sub(1) {
                0 => (RegionState::Outside, RegionSignal::Outside),
                gate_depth => (
                    RegionState::AwaitingContainer { gate_depth },
                    RegionSignal::Outside,
                ),
            }
        }
        RegionState::InRegion { gate_depth, depth } => {
            let depth = if spec.container.is_named(name) {
                depth.saturating_sub(1)
            } else {
                depth
            };
            let gate_depth = match gate_depth {
                Some(d) if closes_gate => Some(d.saturating_sub(1)),
                other => other,
            };

            match (gate_depth, depth) {
                // Leaving the gate ends the region no matter how deep we are
                (Some(0), _) => (RegionState::Outside, RegionSignal::Exited),
                (Some(gate_depth), 0) => (
                    RegionState::AwaitingContainer { gate_depth },
                    RegionSignal::Exited,
                ),
                (None, 0) => (RegionState::Outside, RegionSignal::Exited),
                (gate_depth, depth) => (
                    RegionState::InRegion { gate_depth, depth },
                    RegionSignal::Inside,
                ),
            }
        }
    }
}

/// Holds a region spec together with the current state
#[derive(Debug, Clone)]
pub struct RegionTracker {
    spec: RegionSpec,
    state: RegionState,
}

impl RegionTracker {
    pub fn new(spec: RegionSpec) -> Self {
        Self {
            spec,
            state: RegionState::Outside,
        }
    }

    pub fn state(&self) -> RegionState {
        self.state
    }

    pub fn is_inside(&self) -> bool {
        self.state.is_inside()
    }

    pub fn on_event(&mut self, event: &TagEvent) -> RegionSignal {
        let (state, signal) = transition(&self.spec, self.state, event);
        self.state = state;
        signal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn nav_spec() -> RegionSpec {
        RegionSpec {
            gate: Some(ElementMatcher::tag("header").with_id("masthead")),
            container: ElementMatcher::tag("nav").with_id("access"),
        }
    }

    fn overlay_spec() -> RegionSpec {
        RegionSpec {
            gate: None,
            container: ElementMatcher::tag("div").with_class("featured-image-overlay"),
        }
    }

    fn run(spec: RegionSpec, events: &[TagEvent]) -> Vec<RegionSignal> {
        let mut tracker = RegionTracker::new(spec);
        events.iter().map(|e| tracker.on_event(e)).collect()
    }

    #[test]
    fn test_container_needs_gate() {
        let signals = run(
            nav_spec(),
            &[
                TagEvent::start("nav", [("id", "access")]),
                TagEvent::end("nav"),
            ],
        );
        assert_eq!(signals, vec![RegionSignal::Outside, RegionSignal::Outside]);
    }

    #[test]
    fn test_gated_entry_and_exit() {
        let signals = run(
            nav_spec(),
            &[
                TagEvent::start("header", [("id", "masthead")]),
                TagEvent::start("nav", [("id", "access")]),
                TagEvent::text("x"),
                TagEvent::end("nav"),
                TagEvent::end("header"),
            ],
        );
        assert_eq!(
            signals,
            vec![
                RegionSignal::Outside,
                RegionSignal::Entered,
                RegionSignal::Inside,
                RegionSignal::Exited,
                RegionSignal::Outside,
            ]
        );
    }

    #[test]
    fn test_nested_same_tag_keeps_region_open() {
        let mut tracker = RegionTracker::new(nav_spec());
        tracker.on_event(&TagEvent::start("header", [("id", "masthead")]));
        tracker.on_event(&TagEvent::start("nav", [("id", "access")]));
        tracker.on_event(&TagEvent::bare("nav"));
        assert_eq!(
            tracker.state(),
            RegionState::InRegion {
                gate_depth: Some(1),
                depth: 2
            }
        );

        // closing only the inner one keeps us inside
        assert_eq!(tracker.on_event(&TagEvent::end("nav")), RegionSignal::Inside);
        assert!(tracker.is_inside());

        assert_eq!(tracker.on_event(&TagEvent::end("nav")), RegionSignal::Exited);
        assert_eq!(
            tracker.state(),
            RegionState::AwaitingContainer { gate_depth: 1 }
        );
    }

    #[test]
    fn test_closing_gate_forces_exit() {
        let mut tracker = RegionTracker::new(nav_spec());
        tracker.on_event(&TagEvent::start("header", [("id", "masthead")]));
        tracker.on_event(&TagEvent::start("nav", [("id", "access")]));
        tracker.on_event(&TagEvent::bare("nav"));
        assert_eq!(tracker.on_event(&TagEvent::end("header")), RegionSignal::Exited);
        assert_eq!(tracker.state(), RegionState::Outside);
    }

    #[test]
    fn test_nested_gate_tag_does_not_end_gate() {
        let mut tracker = RegionTracker::new(nav_spec());
        tracker.on_event(&TagEvent::start("header", [("id", "masthead")]));
        tracker.on_event(&TagEvent::bare("header"));
        tracker.on_event(&TagEvent::end("header"));
        assert_eq!(
            tracker.on_event(&TagEvent::start("nav", [("id", "access")])),
            RegionSignal::Entered
        );
    }

    #[test]
    fn test_unmatched_close_is_ignored() {
        let mut tracker = RegionTracker::new(overlay_spec());
        assert_eq!(tracker.on_event(&TagEvent::end("div")), RegionSignal::Outside);
        assert_eq!(tracker.on_event(&TagEvent::end("div")), RegionSignal::Outside);
        assert_eq!(tracker.state(), RegionState::Outside);

        // a later region is still found
        let overlay = TagEvent::start("div", [("class", "featured-image-overlay")]);
        assert_eq!(tracker.on_event(&overlay), RegionSignal::Entered);
    }

    #[test]
    fn test_overlay_reused_class_on_nested_div() {
        let overlay = TagEvent::start("div", [("class", "featured-image-overlay")]);
        let signals = run(
            overlay_spec(),
            &[
                overlay.clone(),
                overlay.clone(),
                TagEvent::end("div"),
                TagEvent::start("a", [("href", "/p")]),
                TagEvent::end("a"),
                TagEvent::end("div"),
            ],
        );
        assert_eq!(
            signals,
            vec![
                RegionSignal::Entered,
                RegionSignal::Inside,
                RegionSignal::Inside,
                RegionSignal::Inside,
                RegionSignal::Inside,
                RegionSignal::Exited,
            ]
        );
    }

    #[test]
    fn test_class_match_is_exact_token() {
        let matcher = ElementMatcher::tag("nav")
            .with_class("navbar")
            .with_class("pix-main-menu");
        let hit = TagEvent::start("nav", [("class", "main navbar")]);
        let miss = TagEvent::start("nav", [("class", "navbar-expand")]);
        match (&hit, &miss) {
            (TagEvent::Start(hit), TagEvent::Start(miss)) => {
                assert!(matcher.matches(hit));
                assert!(!matcher.matches(miss));
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_void_tag_does_not_nest() {
        let mut tracker = RegionTracker::new(overlay_spec());
        tracker.on_event(&TagEvent::start("div", [("class", "featured-image-overlay")]));
        tracker.on_event(&TagEvent::Start(StartTag {
            name: "div".to_string(),
            attrs: Default::default(),
            self_closing: true,
        }));
        assert_eq!(tracker.on_event(&TagEvent::end("div")), RegionSignal::Exited);
    }
}
