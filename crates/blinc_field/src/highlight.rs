//! Keyword highlighting for option labels
//!
//! Splits a label into plain and highlighted segments around
//! case-insensitive keyword matches. Keywords are escaped before they are
//! joined into one alternation, so any user input is a valid pattern.
//! Concatenating the segment texts always reproduces the label.
//!
//! # Example
//!
//! ```rust
//! use blinc_field::highlight::{highlight, Segment};
//!
//! let segments = highlight("Banana", &["an"]);
//! assert_eq!(
//!     segments.as_slice(),
//!     &[
//!         Segment::Plain("B".into()),
//!         Segment::Highlighted("an".into()),
//!         Segment::Highlighted("an".into()),
//!         Segment::Plain("a".into()),
//!     ]
//! );
//! ```

use regex::{Regex, RegexBuilder};
use smallvec::{smallvec, SmallVec};

/// One piece of a highlighted label
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    Plain(String),
    Highlighted(String),
}

impl Segment {
    /// The underlying text
    pub fn text(&self) -> &str {
        match self {
            Segment::Plain(s) | Segment::Highlighted(s) => s,
        }
    }

    pub fn is_highlighted(&self) -> bool {
        matches!(self, Segment::Highlighted(_))
    }
}

/// Segments of a label, in order
pub type Segments = SmallVec<[Segment; 4]>;

/// Precompiled keyword matcher, reusable across many labels
#[derive(Clone, Debug)]
pub struct Highlighter {
    pattern: Option<Regex>,
}

impl Highlighter {
    /// Build a matcher for `keywords`; empty keywords are ignored
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Self {
        let alternation = keywords
            .iter()
            .map(AsRef::as_ref)
            .filter(|k| !k.is_empty())
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join("|");

        if alternation.is_empty() {
            return Self { pattern: None };
        }

        let pattern = match RegexBuilder::new(&alternation).case_insensitive(true).build() {
            Ok(re) => Some(re),
            Err(e) => {
                // Only reachable through regex size limits on huge keyword sets
                tracing::warn!("Keyword pattern rejected, highlighting disabled: {}", e);
                None
            }
        };
        Self { pattern }
    }

    /// Whether any keyword is active
    pub fn is_active(&self) -> bool {
        self.pattern.is_some()
    }

    /// Split `label` around keyword matches
    pub fn segments(&self, label: &str) -> Segments {
        let Some(pattern) = &self.pattern else {
            return smallvec![Segment::Plain(label.to_string())];
        };

        let mut segments = Segments::new();
        let mut cursor = 0;
        for found in pattern.find_iter(label) {
            if found.start() > cursor {
                segments.push(Segment::Plain(label[cursor..found.start()].to_string()));
            }
            segments.push(Segment::Highlighted(found.as_str().to_string()));
            cursor = found.end();
        }

        if segments.is_empty() {
            return smallvec![Segment::Plain(label.to_string())];
        }
        if cursor < label.len() {
            segments.push(Segment::Plain(label[cursor..].to_string()));
        }
        segments
    }
}

/// Split `label` around matches of any of `keywords`
pub fn highlight<S: AsRef<str>>(label: &str, keywords: &[S]) -> Segments {
    Highlighter::new(keywords).segments(label)
}

/// Render segments as text, wrapping highlighted spans in `open`/`close`
pub fn render_marked(segments: &[Segment], open: &str, close: &str) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Plain(s) => out.push_str(s),
            Segment::Highlighted(s) => {
                out.push_str(open);
                out.push_str(s);
                out.push_str(close);
            }
        }
    }
    out
}
