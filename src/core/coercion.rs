//! Locale-aware numeric coercion
//!
//! Turns numeric-looking text such as `1.234,56`, `12 345,67` or `10,99`
//! into numbers while leaving date-shaped text and anything malformed
//! untouched. Applied lazily by the scope when a formula reads a value.

use crate::config::NumberFormat;
use crate::types::Value;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

/// Date-like shapes that must reach the date functions as text.
static DATE_LIKE: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // D[D].M[M].YYYY[YY] with optional time
        r"^\d{1,2}\.\d{1,2}\.(\d{4}|\d{2})(\s+\d{1,2}:\d{2}(:\d{2})?)?$",
        // D[D]/M[M]/YYYY or M[M]/D[D]/YYYY with optional time
        r"^\d{1,2}/\d{1,2}/(\d{4}|\d{2})(\s+\d{1,2}:\d{2}(:\d{2})?)?$",
        // YYYY[-/ ]M[M][-/]D[D], ISO timestamps included
        r"^\d{4}[-/ ]\d{1,2}[-/]\d{1,2}",
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

static NUMERIC_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?[\d\s.,\u{00A0}\u{202F}]+$").expect("valid numeric regex"));

pub fn looks_like_date(s: &str) -> bool {
    let trimmed = s.trim();
    DATE_LIKE.iter().any(|re| re.is_match(trimmed))
}

/// Coerce a value read from the context. Only text can change.
pub fn coerce<'a>(value: Value<'a>, format: &NumberFormat) -> Value<'a> {
    match value {
        Value::Text(s) => match coerce_str(&s, format) {
            Some(n) => Value::Number(n),
            None => Value::Text(s),
        },
        other => other,
    }
}

/// Numeric reading of `s`, or `None` when the text must stay text.
pub fn coerce_str(s: &str, format: &NumberFormat) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() || !trimmed.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    if looks_like_date(trimmed) {
        trace!(value = trimmed, "date-shaped text left uncoerced");
        return None;
    }
    if !NUMERIC_CLASS.is_match(trimmed) {
        return None;
    }

    let result = unformat(trimmed, format).filter(|n| n.is_finite());
    trace!(value = trimmed, ?result, "numeric coercion");
    result
}

/// One run of digits followed by the separator that ends it (if any).
#[derive(Debug)]
struct Group<'s> {
    digits: &'s str,
    sep: Option<char>,
}

fn split_groups(body: &str) -> Option<Vec<Group<'_>>> {
    let mut groups = Vec::new();
    let mut start = 0;
    let mut chars = body.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if c.is_ascii_digit() {
            continue;
        }
        let sep = if c.is_whitespace() { ' ' } else { c };
        let digits = &body[start..i];
        // Runs of whitespace collapse into one grouping separator.
        let mut end = i + c.len_utf8();
        if sep == ' ' {
            while let Some(&(j, next)) = chars.peek() {
                if !next.is_whitespace() {
                    break;
                }
                end = j + next.len_utf8();
                chars.next();
            }
        }
        groups.push(Group {
            digits,
            sep: Some(sep),
        });
        start = end;
    }
    groups.push(Group {
        digits: &body[start..],
        sep: None,
    });

    // Two separators in a row, or a separator with nothing on either side.
    let inner_empty = groups
        .iter()
        .enumerate()
        .any(|(i, g)| g.digits.is_empty() && i != 0 && i != groups.len() - 1);
    if inner_empty {
        return None;
    }
    Some(groups)
}

fn unformat(trimmed: &str, format: &NumberFormat) -> Option<f64> {
    let (negative, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, trimmed),
    };
    let groups = split_groups(body)?;
    let seps: Vec<char> = groups.iter().filter_map(|g| g.sep).collect();

    let dots = seps.iter().filter(|&&c| c == '.').count();
    let commas = seps.iter().filter(|&&c| c == ',').count();
    let has_space = seps.contains(&' ');

    let decimal = if dots > 0 && commas > 0 {
        // Right-most punctuation mark is the decimal separator.
        seps.iter().rev().copied().find(|c| *c != ' ')
    } else if dots + commas == 0 {
        None
    } else {
        let mark = if dots > 0 { '.' } else { ',' };
        let count = dots.max(commas);
        if count > 1 {
            None
        } else if has_space {
            Some(mark)
        } else {
            let following = groups
                .iter()
                .position(|g| g.sep == Some(mark))
                .and_then(|i| groups.get(i + 1))
                .map(|g| g.digits.len());
            if mark == format.thousands && following == Some(3) {
                None
            } else {
                Some(mark)
            }
        }
    };

    // Everything before the decimal mark is integer groups; the decimal mark
    // must be the last separator and occur once.
    let decimal_index = match decimal {
        Some(mark) => {
            let positions: Vec<usize> = groups
                .iter()
                .enumerate()
                .filter(|(_, g)| g.sep == Some(mark))
                .map(|(i, _)| i)
                .collect();
            if positions.len() != 1 || positions[0] != groups.len() - 2 {
                return None;
            }
            Some(positions[0])
        }
        None => None,
    };

    let integer_groups = match decimal_index {
        Some(i) => &groups[..=i],
        None => &groups[..],
    };
    let fraction = decimal_index.map(|i| groups[i + 1].digits).unwrap_or("");

    if integer_groups.len() > 1 {
        let first = integer_groups[0].digits.len();
        if first == 0 || first > 3 {
            return None;
        }
        if integer_groups[1..].iter().any(|g| g.digits.len() != 3) {
            return None;
        }
        // Grouping separators must all be the same character.
        let grouping: Vec<char> = integer_groups[..integer_groups.len() - 1]
            .iter()
            .filter_map(|g| g.sep)
            .collect();
        if grouping.windows(2).any(|w| w[0] != w[1] && w[0] != ' ' && w[1] != ' ') {
            return None;
        }
    } else if integer_groups[0].digits.is_empty() && decimal.is_none() {
        return None;
    }

    let integer: String = integer_groups.iter().map(|g| g.digits).collect();
    if integer.is_empty() && fraction.is_empty() {
        return None;
    }

    let mut canonical = String::with_capacity(integer.len() + fraction.len() + 3);
    if negative {
        canonical.push('-');
    }
    canonical.push_str(if integer.is_empty() { "0" } else { &integer });
    if !fraction.is_empty() {
        canonical.push('.');
        canonical.push_str(fraction);
    }
    canonical.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eu(s: &str) -> Option<f64> {
        coerce_str(s, &NumberFormat::EUROPEAN)
    }

    #[test]
    fn test_european_grouping_and_decimal() {
        assert_eq!(eu("1.234,56"), Some(1234.56));
        assert_eq!(eu("1.234.567,89"), Some(1234567.89));
        assert_eq!(eu("1.000,00"), Some(1000.0));
        assert_eq!(eu("500,44"), Some(500.44));
        assert_eq!(eu("10,99"), Some(10.99));
    }

    #[test]
    fn test_space_thousands() {
        assert_eq!(eu("12 345,67"), Some(12345.67));
        assert_eq!(eu("2 345,67"), Some(2345.67));
        assert_eq!(eu("1 000 000"), Some(1_000_000.0));
        assert_eq!(eu("1\u{00A0}234,5"), Some(1234.5));
    }

    #[test]
    fn test_us_formatted_text() {
        assert_eq!(eu("1,234.56"), Some(1234.56));
        assert_eq!(eu("1,234,567"), Some(1_234_567.0));
        assert_eq!(eu("3.5"), Some(3.5));
    }

    #[test]
    fn test_single_dot_followed_by_three_digits_is_grouping() {
        assert_eq!(eu("1.234"), Some(1234.0));
        assert_eq!(coerce_str("1.234", &NumberFormat::US), Some(1.234));
        assert_eq!(coerce_str("1,234", &NumberFormat::US), Some(1234.0));
    }

    #[test]
    fn test_plain_and_negative() {
        assert_eq!(eu("5"), Some(5.0));
        assert_eq!(eu("  42  "), Some(42.0));
        assert_eq!(eu("-1.234,5"), Some(-1234.5));
        assert_eq!(eu(",5"), Some(0.5));
    }

    #[test]
    fn test_date_shapes_are_left_alone() {
        assert!(looks_like_date("30.09.2025"));
        assert!(looks_like_date("30.09.2025 11:34"));
        assert!(looks_like_date("06/15/2025"));
        assert!(looks_like_date("2025/09/30"));
        assert!(looks_like_date("2025-09-26T10:30:00Z"));
        assert_eq!(eu("30.09.2025"), None);
        assert_eq!(eu("15/06/2025"), None);
    }

    #[test]
    fn test_malformed_text_is_left_alone() {
        assert_eq!(eu(""), None);
        assert_eq!(eu("abc"), None);
        assert_eq!(eu("1.2.3"), None);
        assert_eq!(eu("1..2"), None);
        assert_eq!(eu("12,34,5"), None);
        assert_eq!(eu("1.234,56,7"), None);
        assert_eq!(eu("-"), None);
        assert_eq!(eu("5 apples"), None);
    }

    #[test]
    fn test_coerce_value() {
        let fmt = NumberFormat::EUROPEAN;
        assert_eq!(coerce(Value::Text("1.234,56".to_string()), &fmt), Value::Number(1234.56));
        assert_eq!(coerce(Value::Number(7.0), &fmt), Value::Number(7.0));
        assert_eq!(coerce(Value::Boolean(true), &fmt), Value::Boolean(true));
        assert_eq!(
            coerce(Value::Text("30.09.2025".to_string()), &fmt),
            Value::Text("30.09.2025".to_string())
        );
    }

    #[test]
    fn test_recoercing_is_noop() {
        let fmt = NumberFormat::EUROPEAN;
        let once = coerce(Value::Text("12 345,67".to_string()), &fmt);
        let twice = coerce(once.clone(), &fmt);
        assert_eq!(once, twice);
    }
}
