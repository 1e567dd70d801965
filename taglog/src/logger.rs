use std::{borrow::Cow, env, fmt, mem, sync::Arc, sync::OnceLock};

use crate::{
    Clock, Level, Message, Pipeline, Plugin, Selector, SystemClock, Timings, Value, filter,
    fmt::ConsoleTransport,
};

/// The default name for the environment variable to read filters from.
pub const DEFAULT_FILTER_ENV: &str = "TAGLOG";

/// The default name for the environment variable to read style preferences from.
pub const DEFAULT_WRITE_STYLE_ENV: &str = "TAGLOG_STYLE";

/// The plugins a [`Logger`] runs every message through, in order.
#[derive(Clone, Default)]
pub struct Config {
    pub plugins: Vec<Arc<dyn Plugin>>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `plugin` to the chain
    pub fn plugin<P: Plugin + 'static>(mut self, plugin: P) -> Self {
        self.plugins.push(Arc::new(plugin));
        self
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config").field("plugins", &self.plugins.len()).finish()
    }
}

/// A leveled logger.
///
/// Each level method takes a selector of the form `namespace:path + tag, tag` and returns a
/// [`Prepared`] call, which is then given the payload:
///
/// ```
/// use taglog::{Logger, payload};
///
/// let logger = Logger::builder().build();
/// logger.warning("app:db + slow, sql").emit(payload!["query took %dms", 12]).unwrap();
/// ```
///
/// Cloning a logger is cheap, clones share their plugins and timing store.
#[derive(Clone)]
pub struct Logger {
    inner: Arc<Inner>,
}

struct Inner {
    pipeline: Pipeline,
    timings: Timings,
    clock: Arc<dyn Clock>,
}

macro_rules! level_methods {
    ($($(#[$meta:meta])* $name:ident => $level:ident),+ $(,)?) => {
        $(
            $(#[$meta])*
            pub fn $name(&self, selector: &str) -> Prepared {
                self.at(Level::$level, selector)
            }
        )+
    };
}

impl Logger {
    /// Create a logger with its own, empty timing store
    pub fn new(config: Config) -> Self {
        Self::with_timings(config, Timings::new())
    }

    /// Create a logger sharing `timings` with any other holder of the same store
    pub fn with_timings(config: Config, timings: Timings) -> Self {
        Self {
            inner: Arc::new(Inner {
                pipeline: Pipeline::new(config.plugins),
                timings,
                clock: Arc::new(SystemClock),
            }),
        }
    }

    pub fn builder() -> Builder {
        Builder::new()
    }

    /// The timing store of this logger
    pub fn timings(&self) -> &Timings {
        &self.inner.timings
    }

    /// Prepare a call at `level`.
    ///
    /// Only the selector is parsed here. Nothing is timed or delivered until the returned call
    /// is emitted, and it may be emitted any number of times.
    pub fn at(&self, level: Level, selector: &str) -> Prepared {
        Prepared {
            logger: self.clone(),
            level,
            selector: Selector::parse(selector),
        }
    }

    level_methods! {
        apocalypse => Apocalypse,
        disaster => Disaster,
        crash => Crash,
        error => Error,
        warning => Warning,
        ok => Ok,
        log => Log,
        trace => Trace,
        flood => Flood,
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("pipeline", &self.inner.pipeline)
            .field("timings", &self.inner.timings)
            .finish_non_exhaustive()
    }
}

/// A log call whose level and selector are fixed, waiting for its payload.
#[derive(Clone)]
pub struct Prepared {
    logger: Logger,
    level: Level,
    selector: Selector,
}

impl Prepared {
    pub fn level(&self) -> Level {
        self.level
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Emit a message now, as told by the logger's clock
    pub fn emit(&self, payload: Vec<Value>) -> anyhow::Result<()> {
        let time = self.logger.inner.clock.now();
        self.emit_at(time, payload)
    }

    /// Emit a message stamped with `time`, in milliseconds since the Unix epoch.
    ///
    /// The first error returned by a plugin is propagated. Timing diffs have been recorded by
    /// then and stay recorded.
    pub fn emit_at(&self, time: i64, payload: Vec<Value>) -> anyhow::Result<()> {
        let message = Message {
            time,
            level: self.level,
            namespace: self.selector.namespace(),
            tags: self.selector.tags(),
            payload,
        };
        let Inner {
            pipeline, timings, ..
        } = &*self.logger.inner;
        pipeline.run(message, timings)?;
        Ok(())
    }
}

impl fmt::Debug for Prepared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Prepared")
            .field("level", &self.level)
            .field("selector", &self.selector)
            .finish_non_exhaustive()
    }
}

/// `Builder` acts as builder for initializing a `Logger`.
///
/// ## Example
///
/// ```
/// use taglog::{Builder, Level, PrefixPreprocessor, filter::LevelFilter, payload};
///
/// let logger = Builder::new()
///     .plugin(PrefixPreprocessor::new(["demo"]))
///     .plugin(LevelFilter::new(Level::Log))
///     .build();
///
/// logger.log("foo:bar").emit(payload!["%o", "hello"]).unwrap();
/// ```
pub struct Builder {
    plugins: Vec<Arc<dyn Plugin>>,
    timings: Option<Timings>,
    clock: Option<Arc<dyn Clock>>,
    built: bool,
}

impl Builder {
    /// Initializes the logger builder with defaults: no plugins, a fresh timing store and the
    /// system clock.
    pub fn new() -> Builder {
        Builder {
            plugins: Vec::new(),
            timings: None,
            clock: None,
            built: false,
        }
    }

    /// Initializes the logger builder from the environment.
    ///
    /// The filter directives are read into a [`DirectiveFilter`](filter::DirectiveFilter) and
    /// the write style into a [`ConsoleTransport`] writing to `stderr`.
    ///
    /// # Examples
    ///
    /// Initialise a logger reading the log filter from an environment variable
    /// called `MY_LOG`:
    ///
    /// ```
    /// use taglog::Builder;
    ///
    /// let logger = Builder::from_env("MY_LOG").build();
    /// ```
    ///
    /// Initialise a logger using the `MY_LOG` variable for filtering and
    /// `MY_LOG_STYLE` for whether or not to write styles:
    ///
    /// ```
    /// use taglog::{Builder, Env};
    ///
    /// let env = Env::new().filter("MY_LOG").write_style("MY_LOG_STYLE");
    ///
    /// let logger = Builder::from_env(env).build();
    /// ```
    pub fn from_env<'a, E>(env: E) -> Self
    where
        E: Into<Env<'a>>,
    {
        let env = env.into();

        let mut filter = filter::Builder::new();
        if let Some(spec) = env.get_filter() {
            filter.parse(&spec);
        }

        let mut console = ConsoleTransport::builder();
        if let Some(style) = env.get_write_style() {
            console.parse_write_style(&style);
        }

        let mut builder = Builder::new();
        builder.plugin(filter.build()).plugin(console.build());
        builder
    }

    /// Append a plugin to the chain
    pub fn plugin<P: Plugin + 'static>(&mut self, plugin: P) -> &mut Self {
        self.plugins.push(Arc::new(plugin));
        self
    }

    /// Append a plugin that is shared with other loggers
    pub fn shared_plugin(&mut self, plugin: Arc<dyn Plugin>) -> &mut Self {
        self.plugins.push(plugin);
        self
    }

    /// Share `timings` with the logger being built
    pub fn timings(&mut self, timings: Timings) -> &mut Self {
        self.timings = Some(timings);
        self
    }

    /// Read message times from `clock` instead of the system clock
    pub fn clock<C: Clock + 'static>(&mut self, clock: C) -> &mut Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Build a `Logger`.
    pub fn build(&mut self) -> Logger {
        assert!(!self.built, "attempt to re-use consumed builder");
        self.built = true;

        Logger {
            inner: Arc::new(Inner {
                pipeline: Pipeline::new(mem::take(&mut self.plugins)),
                timings: self.timings.take().unwrap_or_default(),
                clock: self.clock.take().unwrap_or_else(|| Arc::new(SystemClock)),
            }),
        }
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
            f.debug_struct("Logger").field("built", &true).finish()
        } else {
            f.debug_struct("Logger")
                .field("plugins", &self.plugins.len())
                .field("timings", &self.timings)
                .finish()
        }
    }
}

/// Set of environment variables to configure from.
///
/// # Default environment variables
///
/// By default, the `Env` will read the following environment variables:
///
/// - `TAGLOG`: the level filter
/// - `TAGLOG_STYLE`: whether or not to print styles with records.
///
/// These sources can be configured using the builder methods on `Env`.
#[derive(Debug)]
pub struct Env<'a> {
    filter: Var<'a>,
    write_style: Var<'a>,
}

impl<'a> Env<'a> {
    /// Get a default set of environment variables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Specify an environment variable to read the filter from.
    pub fn filter<E>(mut self, filter_env: E) -> Self
    where
        E: Into<Cow<'a, str>>,
    {
        self.filter = Var::new(filter_env);

        self
    }

    /// Specify an environment variable to read the filter from.
    ///
    /// If the variable is not set, the default value will be used.
    pub fn filter_or<E, V>(mut self, filter_env: E, default: V) -> Self
    where
        E: Into<Cow<'a, str>>,
        V: Into<Cow<'a, str>>,
    {
        self.filter = Var::new_with_default(filter_env, default);

        self
    }

    /// Use the default environment variable to read the filter from.
    ///
    /// If the variable is not set, the default value will be used.
    pub fn default_filter_or<V>(mut self, default: V) -> Self
    where
        V: Into<Cow<'a, str>>,
    {
        self.filter = Var::new_with_default(DEFAULT_FILTER_ENV, default);

        self
    }

    fn get_filter(&self) -> Option<String> {
        self.filter.get()
    }

    /// Specify an environment variable to read the style from.
    pub fn write_style<E>(mut self, write_style_env: E) -> Self
    where
        E: Into<Cow<'a, str>>,
    {
        self.write_style = Var::new(write_style_env);

        self
    }

    /// Specify an environment variable to read the style from.
    ///
    /// If the variable is not set, the default value will be used.
    pub fn write_style_or<E, V>(mut self, write_style_env: E, default: V) -> Self
    where
        E: Into<Cow<'a, str>>,
        V: Into<Cow<'a, str>>,
    {
        self.write_style = Var::new_with_default(write_style_env, default);

        self
    }

    /// Use the default environment variable to read the style from.
    ///
    /// If the variable is not set, the default value will be used.
    pub fn default_write_style_or<V>(mut self, default: V) -> Self
    where
        V: Into<Cow<'a, str>>,
    {
        self.write_style = Var::new_with_default(DEFAULT_WRITE_STYLE_ENV, default);

        self
    }

    fn get_write_style(&self) -> Option<String> {
        self.write_style.get()
    }
}

impl<'a, T> From<T> for Env<'a>
where
    T: Into<Cow<'a, str>>,
{
    fn from(filter_env: T) -> Self {
        Env::default().filter(filter_env.into())
    }
}

impl Default for Env<'_> {
    fn default() -> Self {
        Env {
            filter: Var::new(DEFAULT_FILTER_ENV),
            write_style: Var::new(DEFAULT_WRITE_STYLE_ENV),
        }
    }
}

#[derive(Debug)]
struct Var<'a> {
    name: Cow<'a, str>,
    default: Option<Cow<'a, str>>,
}

impl<'a> Var<'a> {
    fn new<E>(name: E) -> Self
    where
        E: Into<Cow<'a, str>>,
    {
        Var {
            name: name.into(),
            default: None,
        }
    }

    fn new_with_default<E, V>(name: E, default: V) -> Self
    where
        E: Into<Cow<'a, str>>,
        V: Into<Cow<'a, str>>,
    {
        Var {
            name: name.into(),
            default: Some(default.into()),
        }
    }

    fn get(&self) -> Option<String> {
        env::var(&*self.name)
            .ok()
            .or_else(|| self.default.clone().map(|v| v.into_owned()))
    }
}

/// The process-wide logger.
///
/// It is built on first use from the default [`Env`]: a
/// [`DirectiveFilter`](filter::DirectiveFilter) reading `TAGLOG`
/// (which lets `warning` and more severe messages through when unset) followed by a
/// [`ConsoleTransport`] writing to `stderr`.
pub fn logger() -> &'static Logger {
    static LOGGER: OnceLock<Logger> = OnceLock::new();

    LOGGER.get_or_init(|| Builder::from_env(Env::default()).build())
}
