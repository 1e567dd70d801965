//! Filtering plugins.
//!
//! [`LevelFilter`] passes messages up to a fixed verbosity. [`DirectiveFilter`] is driven by a
//! `DEBUG`-style list of directives, usually read from the `TAGLOG` environment variable:
//!
//! ```console
//! TAGLOG=warning,app:db=trace,-app:db:pool,+slow=flood
//! ```
//!
//! Each directive is `[-]pattern[=level]`, `+tag[=level]` or a bare level. Patterns match the
//! namespace path of a message (`app:db` for `logger.ok("app:db")`), `*` matches any run of
//! characters and a trailing `:*` also matches the parent namespace itself.
//!
//! ```
//! use taglog::{Level, Message, Selector, filter::DirectiveFilter};
//!
//! let filter = DirectiveFilter::parse("error,app:*=trace,-app:noisy");
//!
//! let selector = Selector::parse("app:db + slow");
//! let message = Message {
//!     time: 0,
//!     level: Level::Trace,
//!     namespace: selector.namespace(),
//!     tags: selector.tags(),
//!     payload: vec![],
//! };
//! assert!(filter.matches(&message));
//! ```

mod directive;
#[allow(clippy::module_inception)]
mod filter;
mod level;
mod op;
mod parser;

use directive::{Directive, DirectiveKind, enabled};
pub use filter::{Builder, DirectiveFilter};
pub use level::LevelFilter;
use op::FilterOp;
pub use parser::ParseError;
use parser::parse_spec;
