use std::{fmt, io, io::Write as _};

use parking_lot::Mutex;

/// Whether or not to print styles to the target.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Default)]
pub enum WriteStyle {
    /// Try to print styles, but don't force the issue.
    #[default]
    Auto,
    /// Try very hard to print styles.
    Always,
    /// Never print styles.
    Never,
}

impl WriteStyle {
    /// Parse a write style, as read from `TAGLOG_STYLE`.
    ///
    /// Unrecognised values fall back to [`WriteStyle::Auto`].
    pub fn parse(spec: &str) -> Self {
        match spec {
            "auto" => WriteStyle::Auto,
            "always" => WriteStyle::Always,
            "never" => WriteStyle::Never,
            _ => Default::default(),
        }
    }
}

#[cfg(feature = "color")]
impl From<WriteStyle> for anstream::ColorChoice {
    fn from(choice: WriteStyle) -> Self {
        match choice {
            WriteStyle::Auto => anstream::ColorChoice::Auto,
            WriteStyle::Always => anstream::ColorChoice::Always,
            WriteStyle::Never => anstream::ColorChoice::Never,
        }
    }
}

/// Log target, either `stdout`, `stderr` or a custom pipe.
#[non_exhaustive]
#[derive(Default)]
pub enum Target {
    /// Logs will be sent to standard output.
    Stdout,
    /// Logs will be sent to standard error.
    #[default]
    Stderr,
    /// Logs will be sent to a custom pipe.
    Pipe(Box<dyn io::Write + Send + 'static>),
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Stdout => "stdout",
                Self::Stderr => "stderr",
                Self::Pipe(_) => "pipe",
            }
        )
    }
}

enum WritableTarget {
    Stdout,
    Stderr,
    Pipe(Mutex<Box<dyn io::Write + Send + 'static>>),
}

impl From<Target> for WritableTarget {
    fn from(target: Target) -> Self {
        match target {
            Target::Stdout => Self::Stdout,
            Target::Stderr => Self::Stderr,
            Target::Pipe(pipe) => Self::Pipe(Mutex::new(pipe)),
        }
    }
}

/// A terminal or pipe that whole lines are written to.
pub(crate) struct Writer {
    target: WritableTarget,
    write_style: WriteStyle,
}

impl Writer {
    pub(crate) fn new(target: Target, write_style: WriteStyle) -> Self {
        Self {
            target: target.into(),
            write_style,
        }
    }

    pub(crate) fn write_style(&self) -> WriteStyle {
        self.write_style
    }

    /// Write `line` followed by a newline.
    ///
    /// Terminal escapes are stripped when the target does not want them. Pipes only keep them
    /// with [`WriteStyle::Always`].
    pub(crate) fn print(&self, line: &str) -> io::Result<()> {
        match &self.target {
            WritableTarget::Stdout => {
                let mut stream = self.stream(io::stdout());
                writeln!(stream, "{line}")?;
                stream.flush()
            }
            WritableTarget::Stderr => {
                let mut stream = self.stream(io::stderr());
                writeln!(stream, "{line}")?;
                stream.flush()
            }
            WritableTarget::Pipe(pipe) => {
                let mut pipe = pipe.lock();
                #[cfg(feature = "color")]
                if self.write_style != WriteStyle::Always {
                    writeln!(pipe, "{}", anstream::adapter::strip_str(line))?;
                    return pipe.flush();
                }
                writeln!(pipe, "{line}")?;
                pipe.flush()
            }
        }
    }

    #[cfg(feature = "color")]
    fn stream<S: anstream::stream::RawStream>(&self, raw: S) -> anstream::AutoStream<S> {
        anstream::AutoStream::new(raw, self.write_style.into())
    }

    #[cfg(not(feature = "color"))]
    fn stream<S: io::Write>(&self, raw: S) -> S {
        raw
    }
}

impl fmt::Debug for Writer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let target = match self.target {
            WritableTarget::Stdout => "stdout",
            WritableTarget::Stderr => "stderr",
            WritableTarget::Pipe(_) => "pipe",
        };
        f.debug_struct("Writer")
            .field("target", &target)
            .field("write_style", &self.write_style)
            .finish()
    }
}
