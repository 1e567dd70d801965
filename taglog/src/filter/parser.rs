use std::{
    error::Error,
    fmt::{Display, Formatter},
};

use super::directive::DirectiveKind;
use crate::{
    Level,
    filter::{Directive, FilterOp},
    level::parse_level_or_off,
};

#[derive(Default, Debug)]
pub(crate) struct ParseResult {
    pub(crate) directives: Vec<Directive>,
    pub(crate) errors: Vec<String>,
}

impl ParseResult {
    fn add_directive(&mut self, directive: Directive) {
        self.directives.push(directive);
    }

    fn add_error(&mut self, message: String) {
        self.errors.push(message);
    }

    pub(crate) fn ok(self) -> Result<Vec<Directive>, ParseError> {
        let Self { directives, errors } = self;
        if let Some(error) = errors.into_iter().next() {
            Err(ParseError { details: error })
        } else {
            Ok(directives)
        }
    }
}

/// Error during filter directive parsing process.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParseError {
    details: String,
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "error parsing logger filter: {}", self.details)
    }
}

impl Error for ParseError {}

/// Parse a filter specification string (e.g: `warning,app:*=trace,-app:noisy,+slow=flood`)
/// and return a vector with filter directives.
pub(crate) fn parse_spec(s: &str) -> ParseResult {
    let mut result = ParseResult::default();

    let directives = s.split(',').map(|s| s.trim());
    for directive in directives {
        if directive.is_empty() {
            continue;
        }

        let (matcher_spec, level, negated) = match directive.rsplit_once('=') {
            Some((ms, level)) => {
                let ms = ms.trim();
                if ms.contains('=') {
                    result.add_error(format!(
                        "invalid logging spec '{directive}': '=' is not allowed in paths"
                    ));
                    continue;
                }
                let level = match level.trim() {
                    "" => Ok(Some(Level::Flood)),
                    level => parse_level_or_off(level)
                        .map_err(|err| format!("invalid logging spec '{directive}': {err}")),
                };
                match level {
                    Ok(level) => match ms.strip_prefix('-') {
                        Some(ms) => (Some(ms.trim()), level, true),
                        None => (Some(ms), level, false),
                    },
                    Err(err) => {
                        result.add_error(err);
                        continue;
                    }
                }
            }
            None => {
                let (spec, negated) = match directive.strip_prefix('-') {
                    Some(spec) => (spec.trim(), true),
                    None => (directive, false),
                };
                match parse_level_or_off(spec) {
                    Ok(level) => (None, level, negated),
                    Err(_) => (Some(spec), Some(Level::Flood), negated),
                }
            }
        };

        let Some(matcher_spec) = matcher_spec else {
            result.add_directive(Directive {
                kind: DirectiveKind::Any,
                level,
                negated,
            });
            continue;
        };

        if let Some(name) = matcher_spec.strip_prefix('+') {
            let name = name.trim();
            if name.is_empty() {
                result.add_error(format!("invalid logging spec '{directive}': empty tag name"));
                continue;
            }
            result.add_directive(Directive {
                kind: DirectiveKind::Tag {
                    name: name.to_owned(),
                },
                level,
                negated,
            });
            continue;
        }

        if matcher_spec.is_empty() {
            result.add_error(format!("invalid logging spec '{directive}': empty namespace"));
            continue;
        }

        match FilterOp::new(matcher_spec) {
            Ok(pattern) => result.add_directive(Directive {
                kind: DirectiveKind::Namespace { pattern },
                level,
                negated,
            }),
            Err(err) => result.add_error(format!("invalid logging spec '{directive}': {err}")),
        }
    }

    result
}
