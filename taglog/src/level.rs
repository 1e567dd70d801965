use core::{fmt, str::FromStr};

/// The severity of a message.
///
/// Levels are totally ordered from the most severe ([`Level::Apocalypse`], rank 1) to the most
/// verbose ([`Level::Flood`], rank 9). As with [`log::Level`], a *lower* level is a *more severe*
/// one, so `Level::Error < Level::Warning`.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// The application owner should be alerted immediately.
    Apocalypse = 1,
    /// The application owner should be notified the next morning.
    Disaster,
    /// The application owner may be notified, depending on circumstances.
    Crash,
    /// The application can recover on its own.
    Error,
    /// Nothing critical.
    Warning,
    /// Something good happened.
    Ok,
    /// Regular development output.
    Log,
    /// Helps to locate errors.
    Trace,
    /// Use it to flood your console.
    Flood,
}

impl Level {
    /// All levels, most severe first.
    pub const ALL: [Level; 9] = [
        Level::Apocalypse,
        Level::Disaster,
        Level::Crash,
        Level::Error,
        Level::Warning,
        Level::Ok,
        Level::Log,
        Level::Trace,
        Level::Flood,
    ];

    /// The numeric rank of this level, in `1..=9`
    #[inline]
    pub const fn rank(self) -> u8 {
        self as u8
    }

    /// Get the level with the given rank, if it exists
    pub const fn from_rank(rank: u8) -> Option<Self> {
        match rank {
            1..=9 => Some(Self::ALL[(rank - 1) as usize]),
            _ => None,
        }
    }

    /// The lower-case name of this level, as accepted by [`Level::from_str`]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Apocalypse => "apocalypse",
            Self::Disaster => "disaster",
            Self::Crash => "crash",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Ok => "ok",
            Self::Log => "log",
            Self::Trace => "trace",
            Self::Flood => "flood",
        }
    }

    /// Returns true if a message at `self` is at least as severe as `max`
    #[inline]
    pub fn is_within(self, max: Level) -> bool {
        self <= max
    }
}

impl Default for Level {
    fn default() -> Self {
        Self::Warning
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Error returned when a string does not name a [`Level`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("attempted to convert a string that doesn't match an existing log level")]
pub struct ParseLevelError(());

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s))
            .ok_or(ParseLevelError(()))
    }
}

/// Parse a level name, or `off`, used by directive strings.
///
/// Returns `Ok(None)` for `off`.
pub(crate) fn parse_level_or_off(s: &str) -> Result<Option<Level>, ParseLevelError> {
    if s.eq_ignore_ascii_case("off") {
        Ok(None)
    } else {
        s.parse().map(Some)
    }
}

impl From<Level> for log::Level {
    /// Collapse the nine severities onto the five `log` levels
    fn from(level: Level) -> Self {
        match level {
            Level::Apocalypse | Level::Disaster | Level::Crash | Level::Error => log::Level::Error,
            Level::Warning => log::Level::Warn,
            Level::Ok | Level::Log => log::Level::Info,
            Level::Trace => log::Level::Debug,
            Level::Flood => log::Level::Trace,
        }
    }
}
