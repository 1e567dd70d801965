use std::{fmt, sync::Arc};

use crate::{Message, Timings};

/// A bundle of optional message-processing capabilities.
///
/// Every method has a default that makes the plugin transparent for that stage, so a plugin
/// implements only what it needs. A plugin implementing none of them is legal and does nothing.
///
/// Errors are not caught by the pipeline: the first error aborts the remaining plugins of the
/// current stage and is returned to the caller of [`Prepared::emit`](crate::Prepared::emit).
pub trait Plugin: Send + Sync {
    /// Decide whether the message should reach the transports.
    ///
    /// Filters run after diffs have been computed, so they may inspect them.
    fn filter(&self, message: &Message) -> anyhow::Result<bool> {
        let _ = message;
        Ok(true)
    }

    /// Optionally replace the message before diffs are computed.
    ///
    /// Returning `Ok(None)` leaves the message unchanged.
    fn preprocess(&self, message: &Message) -> anyhow::Result<Option<Message>> {
        let _ = message;
        Ok(None)
    }

    /// Deliver a message that passed every filter
    fn transport(&self, message: &Message) -> anyhow::Result<()> {
        let _ = message;
        Ok(())
    }
}

impl<P: ?Sized + Plugin> Plugin for Arc<P> {
    fn filter(&self, message: &Message) -> anyhow::Result<bool> {
        (**self).filter(message)
    }

    fn preprocess(&self, message: &Message) -> anyhow::Result<Option<Message>> {
        (**self).preprocess(message)
    }

    fn transport(&self, message: &Message) -> anyhow::Result<()> {
        (**self).transport(message)
    }
}

impl<P: ?Sized + Plugin> Plugin for Box<P> {
    fn filter(&self, message: &Message) -> anyhow::Result<bool> {
        (**self).filter(message)
    }

    fn preprocess(&self, message: &Message) -> anyhow::Result<Option<Message>> {
        (**self).preprocess(message)
    }

    fn transport(&self, message: &Message) -> anyhow::Result<()> {
        (**self).transport(message)
    }
}

type FilterFn = dyn Fn(&Message) -> anyhow::Result<bool> + Send + Sync;
type PreprocessFn = dyn Fn(&Message) -> anyhow::Result<Option<Message>> + Send + Sync;
type TransportFn = dyn Fn(&Message) -> anyhow::Result<()> + Send + Sync;

/// A [`Plugin`] assembled from up to three closures.
///
/// ```
/// use taglog::{FnPlugin, Logger, Level, payload};
///
/// let logger = Logger::builder()
///     .plugin(FnPlugin::new().with_filter(|message| Ok(message.level <= Level::Error)))
///     .build();
/// logger.crash("app").emit(payload!["this passes"]).unwrap();
/// ```
#[derive(Default)]
pub struct FnPlugin {
    filter: Option<Box<FilterFn>>,
    preprocessor: Option<Box<PreprocessFn>>,
    transport: Option<Box<TransportFn>>,
}

impl FnPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&Message) -> anyhow::Result<bool> + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(filter));
        self
    }

    pub fn with_preprocessor<F>(mut self, preprocessor: F) -> Self
    where
        F: Fn(&Message) -> anyhow::Result<Option<Message>> + Send + Sync + 'static,
    {
        self.preprocessor = Some(Box::new(preprocessor));
        self
    }

    pub fn with_transport<F>(mut self, transport: F) -> Self
    where
        F: Fn(&Message) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.transport = Some(Box::new(transport));
        self
    }
}

impl Plugin for FnPlugin {
    fn filter(&self, message: &Message) -> anyhow::Result<bool> {
        self.filter.as_ref().map_or(Ok(true), |filter| filter(message))
    }

    fn preprocess(&self, message: &Message) -> anyhow::Result<Option<Message>> {
        self.preprocessor.as_ref().map_or(Ok(None), |preprocessor| preprocessor(message))
    }

    fn transport(&self, message: &Message) -> anyhow::Result<()> {
        self.transport.as_ref().map_or(Ok(()), |transport| transport(message))
    }
}

impl fmt::Debug for FnPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnPlugin")
            .field("filter", &self.filter.is_some())
            .field("preprocessor", &self.preprocessor.is_some())
            .field("transport", &self.transport.is_some())
            .finish()
    }
}

/// The ordered plugin chain a message is run through.
#[derive(Clone, Default)]
pub struct Pipeline {
    plugins: Vec<Arc<dyn Plugin>>,
}

impl Pipeline {
    pub fn new(plugins: Vec<Arc<dyn Plugin>>) -> Self {
        Self { plugins }
    }

    pub fn plugins(&self) -> &[Arc<dyn Plugin>] {
        &self.plugins
    }

    /// Run `message` through every stage.
    ///
    /// 1. Preprocessors, left to right, each seeing the output of the previous one.
    /// 2. Diff annotation against `timings`, at the time of the original message even if a
    ///    preprocessor changed it. This happens even if the message is later filtered out, and
    ///    is not undone on error.
    /// 3. Filters, left to right, stopping at the first rejection.
    /// 4. Transports, in order, if every filter accepted the message.
    ///
    /// Returns `Ok(true)` if the message reached the transports.
    pub fn run(&self, mut message: Message, timings: &Timings) -> anyhow::Result<bool> {
        let time = message.time;
        for plugin in self.plugins.iter() {
            if let Some(next) = plugin.preprocess(&message)? {
                message = next;
            }
        }

        timings.annotate(time, &mut message.namespace, &mut message.tags);

        for plugin in self.plugins.iter() {
            if !plugin.filter(&message)? {
                log::trace!(
                    target: "taglog",
                    "dropped message '{}' at {}",
                    message.marker(),
                    message.level
                );
                return Ok(false);
            }
        }

        for plugin in self.plugins.iter() {
            plugin.transport(&message)?;
        }
        Ok(true)
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline").field("plugins", &self.plugins.len()).finish()
    }
}
