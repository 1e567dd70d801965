//! Deterministic per-id colors.
//!
//! An id is hashed to a hue, so the same segment or tag keeps its color across messages and
//! runs. Tags use a lighter shade than segments.
use std::sync::LazyLock;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

/// Lightness of tag foregrounds, in percent
pub(crate) const TAG_LIGHTNESS: u8 = 50;
/// Lightness of segment backgrounds, in percent
pub(crate) const SEGMENT_LIGHTNESS: u8 = 40;

/// A 24-bit color.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub(crate) const BACKGROUND: Rgb = Rgb(0x24, 0x24, 0x24);
    pub(crate) const BLACK: Rgb = Rgb(0, 0, 0);
    pub(crate) const WHITE: Rgb = Rgb(0xff, 0xff, 0xff);
}

#[cfg(feature = "color")]
impl From<Rgb> for anstyle::Color {
    fn from(Rgb(r, g, b): Rgb) -> Self {
        anstyle::Color::Rgb(anstyle::RgbColor(r, g, b))
    }
}

// Segment ids start with `:` and tag ids with `+`, so the two never share an entry.
static COLORS: LazyLock<Mutex<FxHashMap<String, Rgb>>> = LazyLock::new(Default::default);

/// The color of the segment or tag `id`, computed on first use
pub(crate) fn color_for(id: &str, lightness: u8) -> Rgb {
    let mut colors = COLORS.lock();
    if let Some(color) = colors.get(id) {
        return *color;
    }
    let color = hsl(string_hash(id) % 360, 100, lightness);
    colors.insert(id.to_owned(), color);
    color
}

/// The djb2-xor hash of the UTF-16 code units of `s`, last unit first
pub(crate) fn string_hash(s: &str) -> u32 {
    let units = s.encode_utf16().collect::<Vec<_>>();
    units
        .iter()
        .rev()
        .fold(5381u32, |hash, &unit| hash.wrapping_mul(33) ^ u32::from(unit))
}

/// Convert a hue in degrees and saturation/lightness in percent to RGB
pub(crate) fn hsl(hue: u32, saturation: u8, lightness: u8) -> Rgb {
    let s = f64::from(saturation.min(100)) / 100.0;
    let l = f64::from(lightness.min(100)) / 100.0;
    let h = f64::from(hue % 360) / 60.0;

    let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = chroma * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = l - chroma / 2.0;
    let channel = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgb(channel(r), channel(g), channel(b))
}
