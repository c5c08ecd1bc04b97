// src/quantity.rs

use regex::Regex;
use std::sync::LazyLock;

static ALL_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+$").unwrap());

/// Parse an ordered quantity written with either `.` or `,` as the decimal point.
///
/// Every `.` is first turned into `,` and every `,` back into `.`, so a single
/// separator of either kind reads as the decimal point. Thousands separators
/// are not understood: `"1.234"` is 1.234.
///
/// Missing, blank or unparsable input gives 0, as do values outside the
/// non-negative finite range. Callers cannot tell "0" from "garbage".
pub fn parse_quantity(raw: Option<&str>) -> f64 {
    let Some(raw) = raw else {
        return 0.0;
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return 0.0;
    }

    let normalised = raw.replace('.', ",").replace(',', ".");
    // credit lines ("-4") read as 0 rather than netting against the total
    match normalised.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => v,
        _ => 0.0,
    }
}

/// True for a non-empty string made only of ASCII decimal digits.
pub(crate) fn is_digits(raw: &str) -> bool {
    ALL_DIGITS.is_match(raw)
}

/// Parse a units-per-box cell. Anything that is not a positive whole number gives 1.
pub fn parse_units(raw: &str) -> u32 {
    if !is_digits(raw) {
        return 1;
    }
    match raw.parse::<u32>() {
        Ok(0) | Err(_) => 1,
        Ok(n) => n,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comma_and_dot_are_both_decimal_points() {
        assert_eq!(parse_quantity(Some("12,5")), 12.5);
        assert_eq!(parse_quantity(Some("12.5")), 12.5);
        assert_eq!(parse_quantity(Some("3")), 3.0);
    }

    #[test]
    fn test_no_thousands_separator() {
        assert_eq!(parse_quantity(Some("1.234")), 1.234);
        assert_eq!(parse_quantity(Some("1,234")), 1.234);
        // two separators no longer form a number
        assert_eq!(parse_quantity(Some("1.234,5")), 0.0);
    }

    #[test]
    fn test_missing_or_garbage_is_zero() {
        assert_eq!(parse_quantity(None), 0.0);
        assert_eq!(parse_quantity(Some("")), 0.0);
        assert_eq!(parse_quantity(Some("   ")), 0.0);
        assert_eq!(parse_quantity(Some("abc")), 0.0);
        assert_eq!(parse_quantity(Some("12 pcs")), 0.0);
        assert_eq!(parse_quantity(Some("-4")), 0.0);
        assert_eq!(parse_quantity(Some("inf")), 0.0);
        assert_eq!(parse_quantity(Some("NaN")), 0.0);
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        assert_eq!(parse_quantity(Some(" 7,25 ")), 7.25);
    }

    #[test]
    fn test_units() {
        assert_eq!(parse_units("12"), 12);
        assert_eq!(parse_units(""), 1);
        assert_eq!(parse_units("x12"), 1);
        assert_eq!(parse_units("1.5"), 1);
        assert_eq!(parse_units("0"), 1);
        assert_eq!(parse_units("99999999999"), 1);
    }

    #[test]
    fn test_only_ascii_digits_count() {
        // Arabic-Indic digits are not read as a count
        assert!(!is_digits("\u{661}\u{662}"));
        assert_eq!(parse_units("\u{661}\u{662}"), 1);
        assert!(is_digits("0042"));
        assert_eq!(parse_units("0042"), 42);
    }
}
