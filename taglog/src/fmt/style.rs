use std::fmt;

use super::color::Rgb;

/// Colors and emphasis for one span of console output.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(not(feature = "color"), allow(dead_code))]
pub(crate) struct Paint {
    fg: Option<Rgb>,
    bg: Option<Rgb>,
    bold: bool,
    italic: bool,
}

impl Paint {
    pub(crate) const fn new() -> Self {
        Self {
            fg: None,
            bg: None,
            bold: false,
            italic: false,
        }
    }

    pub(crate) const fn fg(mut self, color: Rgb) -> Self {
        self.fg = Some(color);
        self
    }

    pub(crate) const fn bg(mut self, color: Rgb) -> Self {
        self.bg = Some(color);
        self
    }

    pub(crate) const fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub(crate) const fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    /// Wrap `value` so that it displays with this paint, or plainly if `styled` is false
    pub(crate) fn paint<T: fmt::Display>(self, value: T, styled: bool) -> Painted<T> {
        Painted {
            paint: self,
            value,
            styled,
        }
    }

    #[cfg(feature = "color")]
    fn to_style(self) -> anstyle::Style {
        let mut style = anstyle::Style::new()
            .fg_color(self.fg.map(Into::into))
            .bg_color(self.bg.map(Into::into));
        if self.bold {
            style = style.bold();
        }
        if self.italic {
            style = style.italic();
        }
        style
    }
}

#[cfg_attr(not(feature = "color"), allow(dead_code))]
pub(crate) struct Painted<T> {
    paint: Paint,
    value: T,
    styled: bool,
}

impl<T: fmt::Display> fmt::Display for Painted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        #[cfg(feature = "color")]
        if self.styled {
            let style = self.paint.to_style();
            return write!(f, "{}{}{}", style.render(), self.value, style.render_reset());
        }
        fmt::Display::fmt(&self.value, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unstyled_is_plain() {
        let paint = Paint::new().fg(Rgb::WHITE).bg(Rgb::BLACK).bold();
        assert_eq!(paint.paint("text", false).to_string(), "text");
    }

    #[cfg(feature = "color")]
    #[test]
    fn styled_wraps_in_escapes() {
        let paint = Paint::new().fg(Rgb(1, 2, 3)).italic();
        assert_eq!(paint.paint("text", true).to_string(), "\x1b[3m\x1b[38;2;1;2;3mtext\x1b[0m");
    }

    #[cfg(feature = "color")]
    #[test]
    fn empty_paint_adds_nothing() {
        assert_eq!(Paint::new().paint("text", true).to_string(), "text");
    }
}
