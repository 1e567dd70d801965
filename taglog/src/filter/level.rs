use crate::{Level, Message, Plugin};

/// A filter plugin that passes messages at least as severe as a configured level.
///
/// ```
/// use taglog::{Level, Logger, filter::LevelFilter, payload};
///
/// let logger = Logger::builder().plugin(LevelFilter::new(Level::Error)).build();
/// logger.error("app").emit(payload!["kept"]).unwrap();
/// logger.warning("app").emit(payload!["dropped"]).unwrap();
/// ```
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct LevelFilter {
    level: Level,
}

impl LevelFilter {
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    /// The most verbose level this filter lets through
    pub fn level(&self) -> Level {
        self.level
    }
}

impl From<Level> for LevelFilter {
    fn from(level: Level) -> Self {
        Self::new(level)
    }
}

impl Plugin for LevelFilter {
    fn filter(&self, message: &Message) -> anyhow::Result<bool> {
        Ok(message.level.rank() <= self.level.rank())
    }
}
