//! A leveled logger whose messages are addressed by namespace and tags, carrying the time
//! elapsed since the last message with the same address.
//!
//! Every log call names a *selector* of the form `namespace:path + tag, tag`:
//!
//! ```
//! use taglog::{
//!     Level, Logger, PrefixPreprocessor, filter::LevelFilter, fmt::ConsoleTransport, payload,
//! };
//!
//! let logger = Logger::builder()
//!     .plugin(PrefixPreprocessor::new(["demo"]))
//!     .plugin(LevelFilter::new(Level::Log))
//!     .plugin(ConsoleTransport::new())
//!     .build();
//!
//! logger.log("foo:bar").emit(payload!["%o", "first message"]).unwrap();
//! logger.warning("foo:baz + slow").emit(payload!["query took %dms", 12]).unwrap();
//! ```
//!
//! The selector is split into namespace segments (`demo`, `demo:foo`, `demo:foo:bar`) and tags
//! (`slow`). Each of them remembers when it was last seen, so every message tells you how much
//! time passed since the previous message in the same area, at every depth:
//!
//! ```console
//! 👌 slow +2s  demo  foo +250ms  baz  query took 12ms
//! ```
//!
//! There are nine levels, from the most severe to the most verbose: `apocalypse`, `disaster`,
//! `crash`, `error`, `warning`, `ok`, `log`, `trace` and `flood`. See [`Level`].
//!
//! ## Plugins
//!
//! A [`Logger`] does nothing on its own. Each message is run through its [`Plugin`]s:
//!
//! 1. preprocessors replace the message, e.g. [`PrefixPreprocessor`] nests it under a prefix
//! 2. the diffs of every segment and tag are computed and recorded
//! 3. filters decide whether the message goes on, e.g. [`LevelFilter`](filter::LevelFilter)
//!    and [`DirectiveFilter`](filter::DirectiveFilter)
//! 4. transports deliver it, e.g. [`ConsoleTransport`](fmt::ConsoleTransport) and
//!    [`LogTransport`]
//!
//! Timings are recorded before filtering, so a filtered-out message still resets the clock of
//! its segments and tags. Two loggers built with the same [`Timings`] share their clocks.
//!
//! ## Enabling logging
//!
//! The default logger returned by [`logger()`] reads its filter from the **`TAGLOG`**
//! environment variable, a comma-separated list of directives:
//!
//! ```console
//! TAGLOG=[-][pattern|+tag][=level][,...]
//! ```
//!
//! For example:
//!
//! - `TAGLOG=trace` enables all messages at `trace` and above
//! - `TAGLOG=app:db` enables everything in the `app:db` namespace, and nothing else
//! - `TAGLOG=app:*` enables everything in `app` and any namespace below it
//! - `TAGLOG=error,app:db=trace` enables `error` and above, and up to `trace` for `app:db`
//! - `TAGLOG=flood,-app:noisy:*` enables everything except the `app:noisy` namespace
//! - `TAGLOG=flood,-app=ok` enables everything, except `ok` and more severe messages from `app`
//! - `TAGLOG=warning,+slow=trace` additionally enables messages tagged `slow` up to `trace`
//! - `TAGLOG=off` turns off all logging
//!
//! Level names are case-insensitive. Without any directive, `warning` and more severe messages
//! are shown. Invalid directives are reported through the `log` facade under the `taglog`
//! target and otherwise ignored.
//!
//! ## Colors
//!
//! Outputting of colors and other styles can be controlled by the `TAGLOG_STYLE` environment
//! variable. It accepts the following [values][fmt::WriteStyle]:
//!
//! * `auto` (default) will attempt to print style characters, but don't force the issue.
//!   If the console isn't available on Windows, or if TERM=dumb, for example, then don't print
//!   colors.
//! * `always` will always print style characters even if they aren't supported by the terminal.
//! * `never` will never print style characters.
//!
//! <div class="warning">
//!
//! Logging of untrusted inputs can cause unexpected behavior as they may include ANSI escape
//! codes which will be forwarded to the users terminal.
//!
//! Mitigations include:
//! - Setting `TAGLOG_STYLE=never` to have all ANSI escape codes stripped
//! - Writing to a [`Target::Pipe`](fmt::Target::Pipe), where escape codes are stripped unless
//!   the write style is `always`
//!
//! </div>
//!
//! ## Specifying defaults for environment variables
//!
//! If these variables aren't present, the default value to use can be tweaked with the [`Env`]
//! type. The following example defaults to `log` and above if the `TAGLOG` environment
//! variable isn't set:
//!
//! ```
//! use taglog::{Builder, Env};
//!
//! let logger = Builder::from_env(Env::default().default_filter_or("log")).build();
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(clippy::print_stderr)]
#![warn(clippy::print_stdout)]

mod bridge;
mod clock;
mod duration;
pub mod filter;
pub mod fmt;
mod level;
mod logger;
mod message;
mod plugin;
mod prefix;
pub mod selector;
mod timing;
mod writer;

pub use self::{
    bridge::LogTransport,
    clock::{Clock, ManualClock, SystemClock},
    duration::{HumanDiff, format_diff},
    level::{Level, ParseLevelError},
    logger::*,
    message::{Message, Namespace, Segment, Tag, Tags, Value},
    plugin::{FnPlugin, Pipeline, Plugin},
    prefix::PrefixPreprocessor,
    selector::Selector,
    timing::Timings,
};
