use crate::{Message, Plugin, fmt::format_payload};

/// The `log` target of messages without a namespace
const FALLBACK_TARGET: &str = "taglog";

/// A transport forwarding messages to the [`log`] facade.
///
/// This lets an application keep whatever `log` backend it already has installed. The nine
/// levels collapse onto the five `log` levels (see `From<Level> for log::Level`), the record
/// target is the namespace path (`app:db`) unless overridden, and the tag names are attached
/// as the `tags` key-value pair.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LogTransport {
    target: Option<String>,
}

impl LogTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log every message under `target` instead of its namespace path
    pub fn with_target(target: impl Into<String>) -> Self {
        Self {
            target: Some(target.into()),
        }
    }

    fn target<'a>(&'a self, message: &'a Message) -> &'a str {
        match self.target.as_deref() {
            Some(target) => target,
            None => match message.path() {
                "" => FALLBACK_TARGET,
                path => path,
            },
        }
    }
}

impl Plugin for LogTransport {
    fn transport(&self, message: &Message) -> anyhow::Result<()> {
        let level = log::Level::from(message.level);
        let target = self.target(message);
        if log::log_enabled!(target: target, level) {
            let tags = message
                .tags
                .iter()
                .map(|tag| tag.name.as_str())
                .collect::<Vec<_>>()
                .join(",");
            let text = format_payload(&message.payload);
            log::log!(target: target, level, tags = tags.as_str(); "{text}");
        }
        Ok(())
    }
}
