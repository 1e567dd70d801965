//! Console output.
//!
//! [`ConsoleTransport`] renders each message on a single line:
//!
//! ```text
//!  12:03:44.512 👌 slow +250ms, sql  app  db +1s  query took 12ms
//! ```
//!
//! That is an optional UTC timestamp, the level symbol, the message tags, the namespace segments
//! as powerline blocks, and the formatted payload (see [`format_payload`]). Tags and segments
//! are colored by a hash of their id. A timing diff is only printed when it is non-zero and
//! differs from the diff of the item that follows, so a run of items that were all last seen at
//! the same time shows a single diff.
//!
//! Styling is controlled with [`WriteStyle`], usually read from `TAGLOG_STYLE`.

mod color;
mod payload;
mod style;

use std::{fmt, mem};

use anyhow::Context as _;

pub use self::{color::Rgb, payload::format_payload};
use self::{
    color::{SEGMENT_LIGHTNESS, TAG_LIGHTNESS, color_for},
    style::{Paint, Painted},
};
pub use crate::writer::{Target, WriteStyle};
use crate::{HumanDiff, Level, Message, Plugin, Segment, Tag, writer::Writer};

/// The glyph closing each powerline block
const POWERLINE: &str = "\u{E0B0}";

/// How the level of a message is shown.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum Symbols {
    /// One emoji per level, from 🤬 for `apocalypse` to 👀 for `flood`
    #[default]
    Emoji,
    /// The upper-case initial of the level name
    Letters,
    /// One symbol per level, most severe first
    Custom([&'static str; 9]),
}

impl Symbols {
    pub fn symbol(self, level: Level) -> &'static str {
        match self {
            Self::Emoji => match level {
                Level::Apocalypse => "\u{1F92C}",
                Level::Disaster => "\u{1F621}",
                Level::Crash => "\u{1F620}",
                Level::Error => "\u{1F4A9}",
                Level::Warning => "\u{1F937}\u{200D}\u{2640}\u{FE0F}",
                Level::Ok => "\u{1F44C}",
                Level::Log => "\u{270D}\u{FE0F}",
                Level::Trace => "\u{1F43E}",
                Level::Flood => "\u{1F440}",
            },
            Self::Letters => match level {
                Level::Apocalypse => "A",
                Level::Disaster => "D",
                Level::Crash => "C",
                Level::Error => "E",
                Level::Warning => "W",
                Level::Ok => "O",
                Level::Log => "L",
                Level::Trace => "T",
                Level::Flood => "F",
            },
            Self::Custom(symbols) => symbols[usize::from(level.rank()) - 1],
        }
    }
}

type MessageFilterFn = dyn Fn(&Message) -> bool + Send + Sync;
type PreprocessFn = dyn Fn(&Message) -> Message + Send + Sync;
type SegmentFilterFn = dyn Fn(&Segment, usize, &[Segment]) -> bool + Send + Sync;
type TagFilterFn = dyn Fn(&Tag, usize, &[Tag]) -> bool + Send + Sync;

/// A transport printing styled lines to a terminal or pipe.
pub struct ConsoleTransport {
    writer: Writer,
    timestamps: bool,
    symbols: Symbols,
    backgrounds: [Rgb; 9],
    filter_messages: Option<Box<MessageFilterFn>>,
    preprocessor: Option<Box<PreprocessFn>>,
    filter_segments: Option<Box<SegmentFilterFn>>,
    filter_tags: Option<Box<TagFilterFn>>,
}

impl ConsoleTransport {
    /// A transport writing to `stderr` with the default settings
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> Builder {
        Builder::new()
    }

    /// Render `message` as it would be printed, without the trailing newline.
    ///
    /// The transport-local message filter and preprocessor are not applied.
    pub fn render(&self, message: &Message) -> String {
        Line {
            transport: self,
            message,
            styled: cfg!(feature = "color") && self.writer.write_style() != WriteStyle::Never,
        }
        .to_string()
    }

    /// The background behind the symbol and tags of messages at `level`
    pub fn background(&self, level: Level) -> Rgb {
        self.backgrounds[usize::from(level.rank()) - 1]
    }

    fn shows_segment(&self, index: usize, namespace: &[Segment]) -> bool {
        self.filter_segments
            .as_ref()
            .is_none_or(|filter| filter(&namespace[index], index, namespace))
    }

    fn shows_tag(&self, index: usize, tags: &[Tag]) -> bool {
        self.filter_tags.as_ref().is_none_or(|filter| filter(&tags[index], index, tags))
    }
}

impl Default for ConsoleTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for ConsoleTransport {
    fn transport(&self, message: &Message) -> anyhow::Result<()> {
        if let Some(filter) = &self.filter_messages
            && !filter(message)
        {
            return Ok(());
        }

        let line = match &self.preprocessor {
            Some(preprocessor) => self.render(&preprocessor(message)),
            None => self.render(message),
        };
        self.writer.print(&line).context("failed to write log line")
    }
}

impl fmt::Debug for ConsoleTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleTransport")
            .field("writer", &self.writer)
            .field("timestamps", &self.timestamps)
            .field("symbols", &self.symbols)
            .finish_non_exhaustive()
    }
}

/// Only show a diff when it is set and the next item does not repeat it
fn shows_diff(diff: i64, next: Option<i64>) -> bool {
    diff != 0 && next.is_none_or(|next| next != diff)
}

struct Line<'a> {
    transport: &'a ConsoleTransport,
    message: &'a Message,
    styled: bool,
}

impl Line<'_> {
    fn paint<T: fmt::Display>(&self, paint: Paint, value: T) -> Painted<T> {
        paint.paint(value, self.styled)
    }
}

impl fmt::Display for Line<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Message {
            time,
            level,
            namespace,
            tags,
            payload,
        } = self.message;
        let head_background = self.transport.background(*level);
        let head = Paint::new().fg(Rgb::WHITE).bg(head_background);

        if self.transport.timestamps {
            let paint = Paint::new().fg(Rgb::WHITE).bg(Rgb::BLACK);
            write!(f, "{}", self.paint(paint, format_args!(" {} ", Timestamp(*time))))?;
        }

        let symbol = self.transport.symbols.symbol(*level);
        write!(f, "{}", self.paint(head, format_args!("{symbol} ")))?;

        let visible =
            (0..tags.len()).filter(|&i| self.transport.shows_tag(i, tags)).collect::<Vec<_>>();
        for (position, &i) in visible.iter().enumerate() {
            let tag = &tags[i];
            let paint = head.fg(color_for(&tag.id, TAG_LIGHTNESS)).bold();
            write!(f, "{}", self.paint(paint, &tag.name))?;

            let next = match tags.get(i + 1) {
                Some(next) => Some(next.diff),
                None => namespace.first().map(|segment| segment.diff),
            };
            if shows_diff(tag.diff, next) {
                let timing = head.italic();
                write!(f, "{}", self.paint(timing, format_args!(" +{}", HumanDiff(tag.diff))))?;
            }

            let separator = if position + 1 < visible.len() { ", " } else { " " };
            write!(f, "{}", self.paint(head, separator))?;
        }

        let mut background = head_background;
        for (i, segment) in namespace.iter().enumerate() {
            if !self.transport.shows_segment(i, namespace) {
                continue;
            }
            let color = color_for(&segment.id, SEGMENT_LIGHTNESS);
            write!(f, "{}", self.paint(Paint::new().fg(background).bg(color), POWERLINE))?;
            background = color;

            let paint = Paint::new().fg(Rgb::WHITE).bg(background);
            write!(f, "{}", self.paint(paint, format_args!(" {} ", segment.name)))?;

            let next = namespace.get(i + 1).map(|next| next.diff);
            if shows_diff(segment.diff, next) {
                let timing = paint.italic();
                write!(f, "{}", self.paint(timing, format_args!("+{} ", HumanDiff(segment.diff))))?;
            }
        }
        write!(f, "{}", self.paint(Paint::new().fg(background), POWERLINE))?;

        let payload = format_payload(payload);
        if !payload.is_empty() {
            write!(f, " {payload}")?;
        }
        Ok(())
    }
}

/// The UTC time of day of a millisecond timestamp, as `HH:MM:SS.mmm`
struct Timestamp(i64);

impl fmt::Display for Timestamp {
    #[cfg(feature = "humantime")]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match jiff::Timestamp::from_millisecond(self.0) {
            Ok(ts) => write!(f, "{}.{:03}", ts.strftime("%H:%M:%S"), self.0.rem_euclid(1_000)),
            Err(_) => self.write_time_of_day(f),
        }
    }

    #[cfg(not(feature = "humantime"))]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_time_of_day(f)
    }
}

impl Timestamp {
    fn write_time_of_day(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ms = self.0.rem_euclid(86_400_000);
        let (hours, ms) = (ms / 3_600_000, ms % 3_600_000);
        let (minutes, ms) = (ms / 60_000, ms % 60_000);
        let (seconds, ms) = (ms / 1_000, ms % 1_000);
        write!(f, "{hours:02}:{minutes:02}:{seconds:02}.{ms:03}")
    }
}

/// `Builder` acts as builder for initializing a [`ConsoleTransport`].
pub struct Builder {
    target: Target,
    write_style: WriteStyle,
    timestamps: bool,
    symbols: Symbols,
    backgrounds: [Rgb; 9],
    filter_messages: Option<Box<MessageFilterFn>>,
    preprocessor: Option<Box<PreprocessFn>>,
    filter_segments: Option<Box<SegmentFilterFn>>,
    filter_tags: Option<Box<TagFilterFn>>,
    built: bool,
}

impl Builder {
    /// Initializes the console builder with defaults: `stderr`, automatic styling, no
    /// timestamps and emoji symbols.
    pub fn new() -> Self {
        Self {
            target: Target::default(),
            write_style: WriteStyle::default(),
            timestamps: false,
            symbols: Symbols::default(),
            backgrounds: [Rgb::BACKGROUND; 9],
            filter_messages: None,
            preprocessor: None,
            filter_segments: None,
            filter_tags: None,
            built: false,
        }
    }

    /// Sets the target for the log output.
    pub fn target(&mut self, target: Target) -> &mut Self {
        self.target = target;
        self
    }

    /// Sets whether or not styles will be written.
    pub fn write_style(&mut self, write_style: WriteStyle) -> &mut Self {
        self.write_style = write_style;
        self
    }

    /// Parses a style choice string, see [`WriteStyle::parse`].
    pub fn parse_write_style(&mut self, write_style: &str) -> &mut Self {
        self.write_style(WriteStyle::parse(write_style))
    }

    /// Whether or not to prefix lines with the time of day
    pub fn timestamps(&mut self, timestamps: bool) -> &mut Self {
        self.timestamps = timestamps;
        self
    }

    pub fn symbols(&mut self, symbols: Symbols) -> &mut Self {
        self.symbols = symbols;
        self
    }

    /// Use `background` behind the symbol and tags of every message
    pub fn background(&mut self, background: Rgb) -> &mut Self {
        self.backgrounds = [background; 9];
        self
    }

    /// Use one background per level, most severe first
    pub fn level_backgrounds(&mut self, backgrounds: [Rgb; 9]) -> &mut Self {
        self.backgrounds = backgrounds;
        self
    }

    /// Skip messages for which `filter` returns false.
    ///
    /// This filter only applies to this transport, and runs before its preprocessor.
    pub fn filter_messages<F>(&mut self, filter: F) -> &mut Self
    where
        F: Fn(&Message) -> bool + Send + Sync + 'static,
    {
        self.filter_messages = Some(Box::new(filter));
        self
    }

    /// Replace messages before rendering them, without affecting other plugins
    pub fn preprocessor<F>(&mut self, preprocessor: F) -> &mut Self
    where
        F: Fn(&Message) -> Message + Send + Sync + 'static,
    {
        self.preprocessor = Some(Box::new(preprocessor));
        self
    }

    /// Hide the segments for which `filter` returns false, e.g. a common prefix.
    ///
    /// The filter is given the segment, its index and the whole namespace.
    pub fn filter_segments<F>(&mut self, filter: F) -> &mut Self
    where
        F: Fn(&Segment, usize, &[Segment]) -> bool + Send + Sync + 'static,
    {
        self.filter_segments = Some(Box::new(filter));
        self
    }

    /// Hide the tags for which `filter` returns false.
    ///
    /// The filter is given the tag, its index and all tags of the message.
    pub fn filter_tags<F>(&mut self, filter: F) -> &mut Self
    where
        F: Fn(&Tag, usize, &[Tag]) -> bool + Send + Sync + 'static,
    {
        self.filter_tags = Some(Box::new(filter));
        self
    }

    /// Build a console transport.
    pub fn build(&mut self) -> ConsoleTransport {
        assert!(!self.built, "attempt to re-use consumed builder");
        self.built = true;

        ConsoleTransport {
            writer: Writer::new(mem::take(&mut self.target), self.write_style),
            timestamps: self.timestamps,
            symbols: self.symbols,
            backgrounds: self.backgrounds,
            filter_messages: self.filter_messages.take(),
            preprocessor: self.preprocessor.take(),
            filter_segments: self.filter_segments.take(),
            filter_tags: self.filter_tags.take(),
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
            f.debug_struct("ConsoleTransport").field("built", &true).finish()
        } else {
            f.debug_struct("ConsoleTransport")
                .field("target", &self.target)
                .field("write_style", &self.write_style)
                .field("timestamps", &self.timestamps)
                .field("symbols", &self.symbols)
                .finish_non_exhaustive()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{io, sync::Arc};

    use parking_lot::Mutex;
    use snapbox::{assert_data_eq, str};

    use super::*;
    use crate::{Selector, payload};

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Buffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().clone()).unwrap()
        }
    }

    fn plain() -> Builder {
        let mut builder = Builder::new();
        builder.write_style(WriteStyle::Never).symbols(Symbols::Letters);
        builder
    }

    fn message(raw: &str, diffs: &[i64]) -> Message {
        let selector = Selector::parse(raw);
        let mut tags = selector.tags();
        let mut namespace = selector.namespace();
        let mut diffs = diffs.iter().copied();
        for tag in tags.iter_mut() {
            tag.diff = diffs.next().unwrap_or(0);
        }
        for segment in namespace.iter_mut() {
            segment.diff = diffs.next().unwrap_or(0);
        }
        Message {
            time: 0,
            level: Level::Log,
            namespace,
            tags,
            payload: payload!["hello"],
        }
    }

    #[test]
    fn renders_tags_segments_and_payload() {
        let console = plain().build();
        assert_eq!(
            console.render(&message("a:b + x", &[0, 0, 250])),
            "L x \u{E0B0} a \u{E0B0} b +250ms \u{E0B0} hello"
        );
    }

    #[test]
    fn repeated_diffs_are_shown_once() {
        let console = plain().build();
        assert_eq!(
            console.render(&message("a:b + x, y", &[1_000, 1_000, 1_000, 1_000])),
            "L x, y \u{E0B0} a \u{E0B0} b +1s \u{E0B0} hello"
        );
        assert_eq!(
            console.render(&message("a:b + x", &[5, 1_000, 1_000])),
            "L x +5ms \u{E0B0} a \u{E0B0} b +1s \u{E0B0} hello"
        );
    }

    #[test]
    fn empty_message() {
        let console = plain().build();
        let mut message = message("", &[]);
        message.payload.clear();
        message.level = Level::Apocalypse;
        assert_eq!(console.render(&message), "A \u{E0B0}");
    }

    #[test]
    fn emoji_symbols() {
        let console = Builder::new().write_style(WriteStyle::Never).build();
        let rendered = console.render(&message("a", &[]));
        assert!(rendered.starts_with("\u{270D}\u{FE0F} "), "{rendered}");
    }

    #[test]
    fn timestamps_are_utc_time_of_day() {
        let console = plain().timestamps(true).build();
        let mut message = message("a", &[]);
        // 2021-03-04T05:06:07.089Z
        message.time = 1_614_834_367_089;
        assert_data_eq!(
            console.render(&message),
            str![" 05:06:07.089 L \u{E0B0} a \u{E0B0} hello"]
        );
    }

    #[test]
    fn timestamps_before_the_epoch() {
        assert_eq!(Timestamp(-1).to_string(), "23:59:59.999");
    }

    #[test]
    fn segments_and_tags_can_be_hidden() {
        let console = plain()
            .filter_segments(|_, index, _| index > 0)
            .filter_tags(|tag, _, _| tag.name != "user")
            .build();
        assert_eq!(
            console.render(&message("company:app + user, slow", &[])),
            "L slow \u{E0B0} app \u{E0B0} hello"
        );
    }

    #[test]
    fn writes_to_the_target() {
        let buffer = Buffer::default();
        let console = plain().target(Target::Pipe(Box::new(buffer.clone()))).build();
        console.transport(&message("a", &[])).unwrap();
        console.transport(&message("b", &[])).unwrap();
        assert_eq!(buffer.contents(), "L \u{E0B0} a \u{E0B0} hello\nL \u{E0B0} b \u{E0B0} hello\n");
    }

    #[test]
    fn local_filter_runs_before_local_preprocessor() {
        let buffer = Buffer::default();
        let console = plain()
            .target(Target::Pipe(Box::new(buffer.clone())))
            .filter_messages(|message| message.path() != "skip")
            .preprocessor(|message| Message {
                namespace: Selector::parse("skip").namespace(),
                ..message.clone()
            })
            .build();
        console.transport(&message("keep", &[])).unwrap();
        console.transport(&message("skip", &[])).unwrap();
        assert_eq!(buffer.contents(), "L \u{E0B0} skip \u{E0B0} hello\n");
    }

    #[cfg(feature = "color")]
    #[test]
    fn styled_output_is_stripped_for_pipes() {
        let buffer = Buffer::default();
        let console = Builder::new()
            .symbols(Symbols::Letters)
            .target(Target::Pipe(Box::new(buffer.clone())))
            .build();
        let message = message("a + x", &[]);
        assert!(console.render(&message).contains("\x1b["));
        console.transport(&message).unwrap();
        assert_eq!(buffer.contents(), "L x \u{E0B0} a \u{E0B0} hello\n");
    }

    #[test]
    fn symbols_cover_every_level() {
        for level in Level::ALL {
            assert_eq!(Symbols::Letters.symbol(level), level.as_str()[..1].to_uppercase());
            assert!(!Symbols::Emoji.symbol(level).is_empty());
        }
    }

    #[test]
    fn custom_symbols_by_level() {
        let symbols = Symbols::Custom(["!!!", "!!", "!", "e", "w", "o", "l", "t", "f"]);
        assert_eq!(symbols.symbol(Level::Apocalypse), "!!!");
        assert_eq!(symbols.symbol(Level::Warning), "w");
        assert_eq!(symbols.symbol(Level::Flood), "f");

        let console = plain().symbols(symbols).build();
        assert_eq!(console.render(&message("a", &[])), "l \u{E0B0} a \u{E0B0} hello");
    }

    #[cfg(feature = "color")]
    #[test]
    fn level_backgrounds_color_the_head() {
        let red = Rgb(231, 38, 0);
        let mut backgrounds = [Rgb::BACKGROUND; 9];
        backgrounds[usize::from(Level::Log.rank()) - 1] = red;
        let console = Builder::new()
            .write_style(WriteStyle::Always)
            .symbols(Symbols::Letters)
            .level_backgrounds(backgrounds)
            .build();
        assert_eq!(console.background(Level::Log), red);
        assert_eq!(console.background(Level::Error), Rgb::BACKGROUND);

        let line = console.render(&message("", &[]));
        assert!(line.contains("48;2;231;38;0m"), "{line:?}");
        assert!(!line.contains("48;2;36;36;36m"), "{line:?}");
    }
}
