use std::{env, fmt, mem};

use crate::{
    Level, Message, Plugin,
    filter::{Directive, DirectiveKind, FilterOp, ParseError, enabled, parse_spec},
};

/// A builder for a [`DirectiveFilter`].
///
/// It can be used to parse a set of directives from a string before building
/// a [`DirectiveFilter`] instance.
///
/// ## Example
///
/// ```
/// # use std::env;
/// use taglog::filter::Builder;
///
/// let mut builder = Builder::new();
///
/// // Parse a logging filter from an environment variable.
/// if let Ok(spec) = env::var("TAGLOG") {
///     builder.parse(&spec);
/// }
///
/// let filter = builder.build();
/// ```
pub struct Builder {
    directives: Vec<Directive>,
    built: bool,
}

impl Builder {
    /// Initializes the filter builder with defaults.
    pub fn new() -> Builder {
        Builder {
            directives: Vec::new(),
            built: false,
        }
    }

    /// Initializes the filter builder from an environment.
    pub fn from_env(env: &str) -> Builder {
        let mut builder = Builder::new();

        if let Ok(s) = env::var(env) {
            builder.parse(&s);
        }

        builder
    }

    /// Insert the directive but ignore duplicates
    fn insert_directive(&mut self, directive: Directive) {
        for d in self.directives.iter_mut() {
            if d.negated != directive.negated {
                continue;
            }
            let same = match (&d.kind, &directive.kind) {
                (DirectiveKind::Any, DirectiveKind::Any) => true,
                (DirectiveKind::Tag { name: l }, DirectiveKind::Tag { name: r }) => l == r,
                (
                    DirectiveKind::Namespace { pattern: l },
                    DirectiveKind::Namespace { pattern: r },
                ) => l.as_str() == r.as_str(),
                _ => false,
            };
            if same {
                d.level = directive.level;
                return;
            }
        }
        self.directives.push(directive);
    }

    /// Adds a directive to the filter for all messages.
    ///
    /// `None` disables everything this directive matches.
    pub fn filter_level(&mut self, level: Option<Level>) -> &mut Self {
        self.insert_directive(Directive {
            kind: DirectiveKind::Any,
            level,
            negated: false,
        });
        self
    }

    /// Adds a namespace pattern directive to the filter.
    pub fn filter_namespace(
        &mut self,
        pattern: &str,
        level: Option<Level>,
        negated: bool,
    ) -> &mut Self {
        match FilterOp::new(pattern) {
            Ok(pattern) => self.insert_directive(Directive {
                kind: DirectiveKind::Namespace { pattern },
                level,
                negated,
            }),
            Err(err) => {
                log::warn!(target: "taglog", "invalid namespace pattern '{pattern}': {err}")
            }
        }
        self
    }

    /// Adds a tag directive to the filter.
    pub fn filter_tag(&mut self, name: &str, level: Option<Level>, negated: bool) -> &mut Self {
        self.insert_directive(Directive {
            kind: DirectiveKind::Tag {
                name: name.to_owned(),
            },
            level,
            negated,
        });
        self
    }

    /// Parses the directives string.
    ///
    /// Invalid directives are reported through the `log` facade and otherwise ignored.
    pub fn parse(&mut self, filters: &str) -> &mut Self {
        let result = parse_spec(filters);

        for error in result.errors {
            log::warn!(target: "taglog", "{error}, ignoring it");
        }

        for directive in result.directives {
            self.insert_directive(directive);
        }
        self
    }

    /// Parses the directive string, returning an error if the given directive string is invalid.
    pub fn try_parse(&mut self, filters: &str) -> Result<&mut Self, ParseError> {
        let directives = parse_spec(filters).ok()?;

        for directive in directives {
            self.insert_directive(directive);
        }
        Ok(self)
    }

    /// Build a directive filter.
    pub fn build(&mut self) -> DirectiveFilter {
        assert!(!self.built, "attempt to re-use consumed builder");
        self.built = true;

        let mut directives = Vec::new();
        if self.directives.is_empty() {
            // Adds the default filter if none exist
            directives.push(Directive {
                kind: DirectiveKind::Any,
                level: Some(Level::Warning),
                negated: false,
            });
        } else {
            // Consume directives.
            directives = mem::take(&mut self.directives);
            // Sort the directives to place more general matches at the start
            directives.sort();
        }

        DirectiveFilter { directives }
    }
}

impl Default for Builder {
    fn default() -> Self {
        Builder::new()
    }
}

impl fmt::Debug for Builder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.built {
            f.debug_struct("Filter").field("built", &true).finish()
        } else {
            f.debug_struct("Filter").field("directives", &self.directives).finish()
        }
    }
}

/// A filter plugin driven by `DEBUG`-style directives.
///
/// The directive string is a comma-separated list of:
///
/// * `level`: enable every message at least as severe as `level`
/// * `pattern[=level]`: enable messages whose namespace path matches `pattern`
/// * `+tag[=level]`: enable messages carrying `tag`
///
/// A leading `-` negates a directive, and the level `off` disables what it matches. When no
/// level is given, all levels are enabled.
///
/// Use the [`Builder`] type to parse and construct a `DirectiveFilter`.
#[derive(Clone)]
pub struct DirectiveFilter {
    directives: Vec<Directive>,
}

impl DirectiveFilter {
    /// Parse `spec`, reporting and skipping invalid directives
    pub fn parse(spec: &str) -> Self {
        Builder::new().parse(spec).build()
    }

    /// Build a filter from the directives in the environment variable `var`
    pub fn from_env(var: &str) -> Self {
        Builder::from_env(var).build()
    }

    /// Returns the most verbose level that this filter can let through, `None` if it rejects
    /// everything.
    ///
    /// # Example
    ///
    /// ```rust
    /// use taglog::{Level, filter::Builder};
    ///
    /// let mut builder = Builder::new();
    /// builder.filter_namespace("app", Some(Level::Ok), false);
    /// builder.filter_namespace("db", Some(Level::Error), false);
    ///
    /// let filter = builder.build();
    /// assert_eq!(filter.max_level(), Some(Level::Ok));
    /// ```
    pub fn max_level(&self) -> Option<Level> {
        self.directives
            .iter()
            .filter(|d| !d.negated)
            .filter_map(|d| d.level)
            .max()
    }

    /// Checks if this message matches the configured filter.
    pub fn matches(&self, message: &Message) -> bool {
        enabled(&self.directives, message)
    }
}

impl Plugin for DirectiveFilter {
    fn filter(&self, message: &Message) -> anyhow::Result<bool> {
        Ok(self.matches(message))
    }
}

impl fmt::Debug for DirectiveFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectiveFilter").field("directives", &self.directives).finish()
    }
}

#[cfg(test)]
mod tests {
    use snapbox::{assert_data_eq, str};

    use super::{Builder, Directive, DirectiveFilter, DirectiveKind, enabled};
    use crate::{Level, Message, Selector, filter::FilterOp};

    fn msg(level: Level, raw: &str) -> Message {
        let selector = Selector::parse(raw);
        Message {
            time: 0,
            level,
            namespace: selector.namespace(),
            tags: selector.tags(),
            payload: vec![],
        }
    }

    fn make_filter(dirs: Vec<Directive>) -> DirectiveFilter {
        let mut filter = Builder::new().build();
        filter.directives = dirs;
        filter
    }

    fn namespace(pattern: &str) -> DirectiveKind {
        DirectiveKind::Namespace {
            pattern: FilterOp::new(pattern).unwrap(),
        }
    }

    #[test]
    fn default_is_warning() {
        let filter = Builder::new().build();
        assert!(filter.matches(&msg(Level::Warning, "app")));
        assert!(filter.matches(&msg(Level::Apocalypse, "")));
        assert!(!filter.matches(&msg(Level::Ok, "app")));
    }

    #[test]
    fn filter_ok() {
        let filter = Builder::new().filter_level(Some(Level::Ok)).build();
        assert!(enabled(&filter.directives, &msg(Level::Ok, "app")));
        assert!(!enabled(&filter.directives, &msg(Level::Log, "app")));
    }

    #[test]
    fn most_specific_match_wins() {
        let filter = Builder::new()
            .filter_namespace("app", Some(Level::Ok), false)
            .filter_namespace("app:*", Some(Level::Trace), false)
            .filter_namespace("db", Some(Level::Warning), false)
            .build();
        assert!(filter.matches(&msg(Level::Trace, "app:pool")));
        assert!(filter.matches(&msg(Level::Ok, "app")));
        assert!(!filter.matches(&msg(Level::Flood, "app")));
        assert!(!filter.matches(&msg(Level::Ok, "db")));
        assert!(!filter.matches(&msg(Level::Error, "other")));
    }

    #[test]
    fn ensure_tests_cover_level_universe() {
        let level_universe = Level::Flood;
        match level_universe {
            Level::Apocalypse
            | Level::Disaster
            | Level::Crash
            | Level::Error
            | Level::Warning
            | Level::Ok
            | Level::Log
            | Level::Trace
            | Level::Flood => (),
        }
    }

    #[test]
    fn parse_bare_levels() {
        for max in Level::ALL {
            let filter = DirectiveFilter::parse(max.as_str());
            for level in Level::ALL {
                assert_eq!(filter.matches(&msg(level, "x")), level <= max, "{max} vs {level}");
            }
        }
    }

    #[test]
    fn parse_bare_level_off() {
        for spec in ["off", "OFF", "Off"] {
            let filter = DirectiveFilter::parse(spec);
            for level in Level::ALL {
                assert!(!filter.matches(&msg(level, "")));
            }
        }
    }

    #[test]
    fn parse_default_with_namespace() {
        let filter = DirectiveFilter::parse("warning,app:db=trace");
        assert!(filter.matches(&msg(Level::Trace, "app:db")));
        assert!(filter.matches(&msg(Level::Warning, "app:cache")));
        assert!(!filter.matches(&msg(Level::Ok, "app:cache")));
    }

    #[test]
    fn negated_namespace() {
        let filter = DirectiveFilter::parse("flood,-app:noisy:*");
        assert!(filter.matches(&msg(Level::Flood, "app:quiet")));
        assert!(!filter.matches(&msg(Level::Apocalypse, "app:noisy")));
        assert!(!filter.matches(&msg(Level::Log, "app:noisy:inner")));
    }

    #[test]
    fn negated_with_level_hides_levels_up_to_it() {
        let filter = DirectiveFilter::parse("flood,-app=ok");
        assert!(!filter.matches(&msg(Level::Warning, "app")));
        assert!(!filter.matches(&msg(Level::Ok, "app")));
        // levels beyond the negated directive fall back to the general rule
        assert!(filter.matches(&msg(Level::Log, "app")));
        assert!(filter.matches(&msg(Level::Warning, "db")));
    }

    #[test]
    fn tags_enable_messages() {
        let filter = DirectiveFilter::parse("error,+slow=trace");
        assert!(filter.matches(&msg(Level::Trace, "db + slow")));
        assert!(!filter.matches(&msg(Level::Trace, "db + fast")));
        assert!(filter.matches(&msg(Level::Error, "db + fast")));
    }

    #[test]
    fn negated_tag() {
        let filter = DirectiveFilter::parse("flood,-+secret");
        assert!(!filter.matches(&msg(Level::Error, "auth + secret, user")));
        assert!(filter.matches(&msg(Level::Error, "auth + user")));
    }

    #[test]
    fn zero_level() {
        let filter = make_filter(vec![
            Directive {
                kind: DirectiveKind::Any,
                level: Some(Level::Ok),
                negated: false,
            },
            Directive {
                kind: namespace("app:db"),
                level: None,
                negated: false,
            },
        ]);
        assert!(!enabled(&filter.directives, &msg(Level::Apocalypse, "app:db")));
        assert!(enabled(&filter.directives, &msg(Level::Ok, "app:cache")));
    }

    #[test]
    fn duplicate_directives_keep_last_level() {
        let filter = Builder::new()
            .filter_namespace("app", Some(Level::Error), false)
            .filter_namespace("app", Some(Level::Trace), false)
            .build();
        assert_eq!(filter.directives.len(), 1);
        assert_eq!(filter.max_level(), Some(Level::Trace));
    }

    #[test]
    fn max_level_of_off_is_none() {
        assert_eq!(DirectiveFilter::parse("off").max_level(), None);
    }

    #[test]
    fn try_parse_valid_filter() {
        let filter = Builder::new()
            .try_parse("ok,app:db=warning")
            .expect("valid filter returned error")
            .build();
        assert!(filter.matches(&msg(Level::Warning, "app:db")));
        assert!(filter.matches(&msg(Level::Ok, "app:cache")));
    }

    #[test]
    fn try_parse_invalid_filter() {
        let error = Builder::new().try_parse("ok,app=invalid").unwrap_err();
        assert_data_eq!(
            error.to_string(),
            str![
                "error parsing logger filter: invalid logging spec 'app=invalid': attempted to \
                 convert a string that doesn't match an existing log level"
            ]
        );
    }
}
