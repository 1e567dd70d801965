//! Parsing of `namespace:path + tag, tag` selectors.
//!
//! ```text
//! selector  := namespace ("+" tags)?
//! namespace := name (":" name)*
//! tags      := name ("," name)*
//! ```
//!
//! Separators may be repeated and surrounded by whitespace. Empty names are dropped, so a
//! malformed selector degrades to fewer segments or tags rather than failing.
use core::{cmp::Ordering, convert::Infallible, str::FromStr};

use unicode_normalization::{UnicodeNormalization as _, char::is_combining_mark};

use crate::{Namespace, Segment, Tag, Tags};

/// The parsed, timing-independent part of a log call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Selector {
    namespace: Vec<String>,
    tags: Vec<String>,
}

impl Selector {
    /// Parse `raw` into namespace names and a deduplicated, sorted set of tag names.
    pub fn parse(raw: &str) -> Self {
        let (head, tail) = split_head_tail(raw.trim());

        let namespace = head
            .split(':')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_owned)
            .collect();

        let mut tags = Vec::<String>::new();
        for name in tail.split(',').map(str::trim) {
            if !name.is_empty() && !tags.iter().any(|tag| tag == name) {
                tags.push(name.to_owned());
            }
        }
        // Stable, so names that collate equal keep their first-seen order
        tags.sort_by(|a, b| natural_cmp(a, b));

        Self { namespace, tags }
    }

    /// The namespace names, outermost first
    pub fn names(&self) -> &[String] {
        &self.namespace
    }

    /// The tag names, in display order
    pub fn tag_names(&self) -> &[String] {
        &self.tags
    }

    /// Returns true if this selector has neither a namespace nor tags
    pub fn is_empty(&self) -> bool {
        self.namespace.is_empty() && self.tags.is_empty()
    }

    /// Build fresh (un-annotated) segments for this selector, rooted at the empty id
    pub fn namespace(&self) -> Namespace {
        self.namespace_under("")
    }

    /// Build fresh segments for this selector, nested under the segment id `root`
    pub fn namespace_under(&self, root: &str) -> Namespace {
        segments_under(root, &self.namespace)
    }

    /// Build fresh (un-annotated) tags for this selector
    pub fn tags(&self) -> Tags {
        self.tags.iter().map(Tag::new).collect()
    }
}

impl FromStr for Selector {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for Selector {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

/// Build a chain of segments from `names`, the first of which is nested under `root`.
///
/// Each segment id is its parent's id followed by `:` and its own name.
pub fn segments_under<I>(root: &str, names: I) -> Namespace
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut namespace = Namespace::new();
    for name in names {
        let parent = namespace.last().map_or(root, |segment: &Segment| segment.id.as_str());
        let segment = Segment::under(parent, name.as_ref());
        namespace.push(segment);
    }
    namespace
}

/// Split on runs of `+`, returning the first piece and the second one.
///
/// Anything after a second run of `+` is ignored.
fn split_head_tail(raw: &str) -> (&str, &str) {
    match raw.split_once('+') {
        None => (raw, ""),
        Some((head, rest)) => {
            let rest = rest.trim_start_matches('+');
            let tail = rest.split_once('+').map_or(rest, |(tail, _)| tail);
            (head.trim_end(), tail.trim())
        }
    }
}

/// The ASCII punctuation and symbols, in the order collation places them before digits
const PUNCTUATION: &str = "_-,;:!?.'\"()[]{}@*/\\&#%`^+<=>|~$";

/// Compare two names the way a human would sort them.
///
/// Only base letters matter: case and accents are ignored, so `"Alpha" == "alpha"` and
/// `"é" == "e"`. Runs of ASCII digits are compared by numeric value, so `"item2" < "item10"`.
/// Whitespace sorts first, then punctuation and symbols, then numbers, then letters.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    collation_keys(a).cmp(collation_keys(b))
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum CollationKey {
    Space,
    Punctuation(usize),
    /// Any other non-alphanumeric character
    Symbol(char),
    /// The significant digits of a number, ordered by length first
    Number(usize, String),
    Letter(char),
}

fn collation_keys(name: &str) -> impl Iterator<Item = CollationKey> + '_ {
    let mut chars = name
        .nfd()
        .filter(|&c| !is_combining_mark(c))
        .flat_map(char::to_lowercase)
        .peekable();
    core::iter::from_fn(move || {
        let c = chars.next()?;
        Some(if c.is_ascii_digit() {
            let mut digits = String::from(c);
            while let Some(c) = chars.next_if(char::is_ascii_digit) {
                digits.push(c);
            }
            let significant = digits.trim_start_matches('0');
            CollationKey::Number(significant.len(), significant.to_string())
        } else if c.is_whitespace() {
            CollationKey::Space
        } else if let Some(rank) = PUNCTUATION.find(c) {
            CollationKey::Punctuation(rank)
        } else if c.is_alphanumeric() {
            CollationKey::Letter(c)
        } else {
            CollationKey::Symbol(c)
        })
    })
}
