use super::FilterOp;
use crate::{Level, Message};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Directive {
    pub kind: DirectiveKind,
    /// The most verbose level enabled by this directive, `None` meaning `off`
    pub level: Option<Level>,
    pub negated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectiveKind {
    Any,
    Tag { name: String },
    Namespace { pattern: FilterOp },
}

impl PartialOrd for DirectiveKind {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DirectiveKind {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        use core::cmp::Ordering;

        match (self, other) {
            (Self::Any, Self::Any) => Ordering::Equal,
            (Self::Any, _) => Ordering::Less,
            (_, Self::Any) => Ordering::Greater,
            (Self::Tag { name: l }, Self::Tag { name: r }) => {
                l.len().cmp(&r.len()).then_with(|| l.cmp(r))
            }
            // Namespace patterns are more specific than tags
            (Self::Tag { .. }, Self::Namespace { .. }) => Ordering::Less,
            (Self::Namespace { .. }, Self::Tag { .. }) => Ordering::Greater,
            (Self::Namespace { pattern: l }, Self::Namespace { pattern: r }) => l.cmp(r),
        }
    }
}

impl DirectiveKind {
    pub fn matches(&self, message: &Message) -> bool {
        match self {
            Self::Any => true,
            Self::Tag { name } => message.has_tag(name),
            Self::Namespace { pattern } => pattern.is_match(message.path()),
        }
    }
}

// Check whether a message is enabled by the set of directives.
pub fn enabled(directives: &[Directive], message: &Message) -> bool {
    // Search for the most specific match, the vector is assumed to be pre-sorted.
    let mut was_matched = false;
    for directive in directives.iter().rev() {
        // Don't bother applying further positive matches once we've had one positive match
        if was_matched && !directive.negated {
            continue;
        }

        // Setting level to `off` is equivalent to negation and takes precedence over it
        let (matches, negated) = match directive.level {
            None => (directive.kind.matches(message), true),
            Some(max) if message.level <= max => {
                (directive.kind.matches(message), directive.negated)
            }
            _ => continue,
        };
        // If we find a negative match, we don't need to do any more checking
        if matches && negated {
            return false;
        }
        was_matched |= matches;
    }
    was_matched
}
