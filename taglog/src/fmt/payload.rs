use std::fmt::Write as _;

use crate::Value;

/// Render a payload the way a browser console would.
///
/// When the first value is a string it is used as a format string for the values after it:
///
/// * `%s` formats the next value as text
/// * `%d` and `%i` format it as an integer, `%f` as a number
/// * `%o` and `%O` format it as an object, quoting strings
/// * `%c` consumes it without output (it holds CSS in a browser)
/// * `%%` is a literal `%`
///
/// A specifier without a value left to consume is printed as is. Values the format string did
/// not consume are appended, separated by spaces.
///
/// ```
/// use taglog::{fmt::format_payload, payload};
///
/// assert_eq!(format_payload(&payload!["took %dms", 12.7, "extra"]), "took 12ms extra");
/// assert_eq!(format_payload(&payload![1, true]), "1 true");
/// ```
pub fn format_payload(payload: &[Value]) -> String {
    let mut out = String::new();
    let mut values = payload.iter();

    if let Some(Value::Str(format)) = payload.first() {
        values.next();
        let mut chars = format.chars().peekable();
        while let Some(c) = chars.next() {
            if c != '%' {
                out.push(c);
                continue;
            }
            match chars.peek().copied() {
                Some('%') => {
                    chars.next();
                    out.push('%');
                }
                Some(spec @ ('s' | 'd' | 'i' | 'f' | 'o' | 'O' | 'c')) => match values.next() {
                    Some(value) => {
                        chars.next();
                        write_spec(&mut out, spec, value);
                    }
                    None => out.push('%'),
                },
                _ => out.push('%'),
            }
        }
    }

    for value in values {
        if !out.is_empty() {
            out.push(' ');
        }
        let _ = write!(out, "{value}");
    }
    out
}

fn write_spec(out: &mut String, spec: char, value: &Value) {
    let _ = match (spec, value) {
        ('c', _) => Ok(()),
        ('d' | 'i', Value::I64(n)) => write!(out, "{n}"),
        ('d' | 'i', Value::U64(n)) => write!(out, "{n}"),
        ('d' | 'i', value) => match as_number(value).filter(|n| n.is_finite()) {
            Some(n) => write!(out, "{}", n.trunc() as i64),
            None => write!(out, "NaN"),
        },
        ('f', value) => match as_number(value) {
            Some(n) => write!(out, "{n}"),
            None => write!(out, "NaN"),
        },
        ('o' | 'O', Value::Str(s)) => write!(out, "{s:?}"),
        _ => write!(out, "{value}"),
    };
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Null => Some(0.0),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::I64(n) => Some(*n as f64),
        Value::U64(n) => Some(*n as f64),
        Value::F64(n) => Some(*n),
        Value::Str(s) => s.trim().parse().ok(),
        Value::Debug(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use snapbox::{assert_data_eq, str};

    use super::format_payload;
    use crate::{Value, payload};

    #[test]
    fn substitutes_specifiers() {
        assert_data_eq!(
            format_payload(&payload!["%s=%d (%f) %o %i%%", "x", -3.9, 1.5, "quoted", 7u8]),
            str![[r#"x=-3 (1.5) "quoted" 7%"#]]
        );
    }

    #[test]
    fn css_values_are_swallowed() {
        assert_data_eq!(format_payload(&payload!["%cred", "color:red"]), str!["red"]);
    }

    #[test]
    fn leftover_values_are_appended() {
        assert_data_eq!(
            format_payload(&payload!["took %dms", 12, "extra", Value::debug(&[1, 2])]),
            str!["took 12ms extra [1, 2]"]
        );
    }

    #[test]
    fn missing_values_leave_the_specifier() {
        assert_data_eq!(format_payload(&payload!["%s and %s", "one"]), str!["one and %s"]);
    }

    #[test]
    fn non_numbers_are_nan() {
        let payload = payload!["%d %f", "abc", Value::debug("x")];
        assert_data_eq!(format_payload(&payload), str!["NaN NaN"]);
    }

    #[test]
    fn unknown_specifiers_are_literal() {
        assert_data_eq!(format_payload(&payload!["100%x", 1]), str!["100%x 1"]);
    }

    #[test]
    fn without_a_format_string() {
        assert_data_eq!(format_payload(&payload![1, None::<i32>, 2.5]), str!["1 null 2.5"]);
        assert_data_eq!(format_payload(&payload![]), str![""]);
    }
}
