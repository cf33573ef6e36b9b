// src/extract/events.rs
// =============================================================================
// This module turns raw HTML into a flat stream of tag events.
//
// We use the tokenizer from `html5ever` (the parser scraper is built on)
// without its tree builder. That gives us:
// - start tags (with attributes), end tags and text, in document order
// - entity decoding (&amp; -> &) in text and attribute values
// - no panics and no errors on broken markup, it just keeps going
//
// Because nothing builds a DOM, unbalanced markup reaches the extractor
// exactly as written. The region tracker and anchor collector deal with it.
// =============================================================================

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};

// Elements that never have an end tag
const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// One event produced by the tokenizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagEvent {
    Start(StartTag),
    End(String),
    Text(String),
}

impl TagEvent {
    /// Shorthand for building start events in tests and callers that
    /// don't come from real markup
    pub fn start<'a>(name: &str, attrs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        TagEvent::Start(StartTag {
            name: name.to_ascii_lowercase(),
            attrs: attrs.into_iter().collect(),
            self_closing: false,
        })
    }

    /// Start tag without attributes
    pub fn bare(name: &str) -> Self {
        TagEvent::start(name, std::iter::empty::<(&str, &str)>())
    }

    pub fn end(name: &str) -> Self {
        TagEvent::End(name.to_ascii_lowercase())
    }

    pub fn text(text: &str) -> Self {
        TagEvent::Text(text.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag {
    pub name: String,
    pub attrs: Attributes,
    pub self_closing: bool,
}

impl StartTag {
    /// True when this start tag will never see a matching end tag
    pub fn is_void(&self) -> bool {
        self.self_closing || VOID_TAGS.contains(&self.name.as_str())
    }
}

/// Attribute map with case-insensitive names.
///
/// Names are stored lowercase. When an attribute is repeated the first
/// value wins, which is what browsers do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<(String, String)>,
}

impl Attributes {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn insert(&mut self, name: &str, value: &str) {
        if self.get(name).is_none() {
            self.entries
                .push((name.to_ascii_lowercase(), value.to_string()));
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.get("id")
    }

    /// Whitespace-separated tokens of the class attribute
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.get("class").unwrap_or("").split_whitespace()
    }

    /// Exact token match, "navbar-brandx" does not contain "navbar-brand"
    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut attrs = Attributes::default();
        for (name, value) in iter {
            attrs.insert(name, value);
        }
        attrs
    }
}

// Collects tokens from html5ever into our own event type
#[derive(Default)]
struct EventSink {
    events: Vec<TagEvent>,
}

impl EventSink {
    fn push_text(&mut self, text: &str) {
        // Adjacent character tokens are merged into one text event
        if let Some(TagEvent::Text(last)) = self.events.last_mut() {
            last.push_str(text);
        } else {
            self.events.push(TagEvent::Text(text.to_string()));
        }
    }
}

impl TokenSink for EventSink {
    type Handle = ();

    fn process_token(&mut self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        match token {
            Token::TagToken(tag) => {
                // LocalName is an Atom; go through String so we don't get an Atom back
                let name = tag.name.to_string().to_ascii_lowercase();
                match tag.kind {
                    TagKind::StartTag => {
                        let mut attrs = Attributes::default();
                        for attr in &tag.attrs {
                            attrs.insert(&attr.name.local, &attr.value);
                        }
                        let switch = raw_text_state(&name);
                        self.events.push(TagEvent::Start(StartTag {
                            name,
                            attrs,
                            self_closing: tag.self_closing,
                        }));
                        // The tree builder normally tells the tokenizer about
                        // these elements; without it we have to do it here
                        if let Some(result) = switch {
                            return result;
                        }
                    }
                    TagKind::EndTag => self.events.push(TagEvent::End(name)),
                }
            }
            Token::CharacterTokens(text) => self.push_text(&text),
            // Comments, doctypes, NULs and parse errors carry nothing we need
            _ => {}
        }
        TokenSinkResult::Continue
    }
}

// Tokenizer state to switch to after a start tag, if its content is not markup
fn raw_text_state(name: &str) -> Option<TokenSinkResult<()>> {
    let kind = match name {
        "script" => RawKind::ScriptData,
        "style" | "xmp" | "iframe" | "noembed" | "noframes" => RawKind::Rawtext,
        "title" | "textarea" => RawKind::Rcdata,
        "plaintext" => return Some(TokenSinkResult::Plaintext),
        _ => return None,
    };
    Some(TokenSinkResult::RawData(kind))
}

// Tokenizes an HTML document into tag events
//
// Parameters:
//   html: the raw document (may be broken or truncated)
//
// Returns: every start tag, end tag and text run in document order
//
// Example:
//   "<a href='/x'>Hi</a>" -> [Start(a, href=/x), Text("Hi"), End(a)]
pub fn tokenize(html: &str) -> Vec<TagEvent> {
    let mut tokenizer = Tokenizer::new(EventSink::default(), TokenizerOpts::default());

    let mut input = BufferQueue::new();
    input.push_back(StrTendril::from_slice(html));

    // feed() only returns early for <script> handling in a tree builder,
    // our sink never asks for that
    let _ = tokenizer.feed(&mut input);
    tokenizer.end();

    tokenizer.sink.events
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is a TokenSink?
//    - html5ever's tokenizer doesn't return tokens, it pushes them into a
//      "sink" we provide, one call to process_token() per token
//    - Our sink just converts them and appends them to a Vec
//
// 2. Why switch to RawData for <script> and friends?
//    - Inside <script>, "<a href=...>" is JavaScript text, not a tag
//    - The tokenizer can't know that on its own; normally the tree builder
//      tells it, and we don't use one
//
// 3. Why lowercase names?
//    - HTML tag and attribute names are case-insensitive: <NAV> == <nav>
//    - Attribute *values* (ids, classes, hrefs) are kept exactly as written
// -----------------------------------------------------------------------------
