//! Text helpers used by the String strategy
//!
//! Numeric parsing reads the longest leading numeric prefix and yields zero
//! when there is none, so coercing arbitrary text never fails. Integer
//! parsing wraps on overflow.

/// Parse the leading integer of `text` as an `i32`
pub fn parse_int(text: &str) -> i32 {
    let (negative, digits) = split_sign(text.trim_start());
    let value = leading_digits(digits).fold(0i32, |acc, d| {
        acc.wrapping_mul(10).wrapping_add(i32::from(d))
    });
    if negative {
        value.wrapping_neg()
    } else {
        value
    }
}

/// Parse the leading integer of `text` as an `i64`
pub fn parse_int64(text: &str) -> i64 {
    let (negative, digits) = split_sign(text.trim_start());
    let value = leading_digits(digits).fold(0i64, |acc, d| {
        acc.wrapping_mul(10).wrapping_add(i64::from(d))
    });
    if negative {
        value.wrapping_neg()
    } else {
        value
    }
}

/// Parse the leading decimal number (with optional fraction and exponent)
pub fn parse_double(text: &str) -> f64 {
    let trimmed = text.trim_start();
    let bytes = trimmed.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'-' | b'+')) {
        end += 1;
    }

    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        end += 1 + frac_digits;
    }

    if int_digits == 0 && frac_digits == 0 {
        return 0.0;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'-' | b'+')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(&bytes[exp_end..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    trimmed[..end].parse().unwrap_or(0.0)
}

/// Trimmed, case-insensitive comparison against an ASCII keyword
pub fn equals_ignore_case_trimmed(text: &str, keyword: &str) -> bool {
    text.trim().eq_ignore_ascii_case(keyword)
}

/// Locale-free text for a double
///
/// Integral values print without a fractional part (`5.0` -> `"5"`); very
/// large or very small magnitudes use exponent notation.
pub fn format_double(value: f64) -> String {
    let magnitude = value.abs();
    if value.is_finite() && value != 0.0 && !(1e-5..1e15).contains(&magnitude) {
        format!("{:e}", value)
    } else {
        format!("{}", value)
    }
}

fn split_sign(text: &str) -> (bool, &[u8]) {
    let bytes = text.as_bytes();
    match bytes.first() {
        Some(b'-') => (true, &bytes[1..]),
        Some(b'+') => (false, &bytes[1..]),
        _ => (false, bytes),
    }
}

fn leading_digits(bytes: &[u8]) -> impl Iterator<Item = u8> + '_ {
    bytes
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .map(|b| b - b'0')
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int("42"), 42);
        assert_eq!(parse_int("  -17abc"), -17);
        assert_eq!(parse_int("+8"), 8);
        assert_eq!(parse_int("3.9"), 3);
        assert_eq!(parse_int("abc"), 0);
        assert_eq!(parse_int(""), 0);
        assert_eq!(parse_int("-"), 0);
        assert_eq!(parse_int("2147483647"), i32::MAX);
        assert_eq!(parse_int("-2147483648"), i32::MIN);
    }

    #[test]
    fn test_parse_int64() {
        assert_eq!(parse_int64("9223372036854775807"), i64::MAX);
        assert_eq!(parse_int64("-9223372036854775808"), i64::MIN);
        assert_eq!(parse_int64("\t12 apples"), 12);
        assert_eq!(parse_int64("x12"), 0);
    }

    #[test]
    fn test_parse_double() {
        assert_eq!(parse_double("3.5"), 3.5);
        assert_eq!(parse_double(" -0.25xyz"), -0.25);
        assert_eq!(parse_double(".5"), 0.5);
        assert_eq!(parse_double("5."), 5.0);
        assert_eq!(parse_double("1e3"), 1000.0);
        assert_eq!(parse_double("2.5E-1"), 0.25);
        assert_eq!(parse_double("7e"), 7.0);
        assert_eq!(parse_double("7e+"), 7.0);
        assert_eq!(parse_double("."), 0.0);
        assert_eq!(parse_double("hello"), 0.0);
        assert_eq!(parse_double(""), 0.0);
    }

    #[test]
    fn test_equals_ignore_case_trimmed() {
        assert!(equals_ignore_case_trimmed("  TRUE ", "true"));
        assert!(equals_ignore_case_trimmed("Yes", "yes"));
        assert!(!equals_ignore_case_trimmed("yess", "yes"));
    }

    #[test]
    fn test_format_double() {
        assert_eq!(format_double(5.0), "5");
        assert_eq!(format_double(-2.5), "-2.5");
        assert_eq!(format_double(0.1), "0.1");
        assert_eq!(format_double(0.0), "0");
        assert_eq!(format_double(1e300), "1e300");
        assert_eq!(format_double(1.5e-7), "1.5e-7");
        assert_eq!(parse_double(&format_double(1e300)), 1e300);
    }
}
