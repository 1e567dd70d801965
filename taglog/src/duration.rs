use core::fmt;

const SECOND: i64 = 1_000;
const MINUTE: i64 = SECOND * 60;
const HOUR: i64 = MINUTE * 60;
const DAY: i64 = HOUR * 24;

/// A millisecond delta rendered as a compact, single-unit string.
///
/// The largest unit whose threshold the magnitude reaches is chosen and the value is rounded
/// to the nearest whole unit (halves round up). Below one second the raw signed value is
/// printed with an `ms` suffix.
///
/// ```
/// use taglog::HumanDiff;
///
/// assert_eq!(HumanDiff(250).to_string(), "250ms");
/// assert_eq!(HumanDiff(90_000).to_string(), "2m");
/// assert_eq!(HumanDiff(-500).to_string(), "-500ms");
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HumanDiff(pub i64);

impl fmt::Display for HumanDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ms = self.0;
        let abs = ms.unsigned_abs();
        for (unit, suffix) in [(DAY, 'd'), (HOUR, 'h'), (MINUTE, 'm'), (SECOND, 's')] {
            if abs >= unit as u64 {
                return write!(f, "{}{suffix}", round_to(ms, unit));
            }
        }
        write!(f, "{ms}ms")
    }
}

/// Format a millisecond delta, see [`HumanDiff`]
pub fn format_diff(ms: i64) -> String {
    HumanDiff(ms).to_string()
}

// Round half toward positive infinity
fn round_to(ms: i64, unit: i64) -> i64 {
    (ms as f64 / unit as f64 + 0.5).floor() as i64
}
