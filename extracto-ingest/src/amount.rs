//! Locale-ambiguous amount parsing ("1.234,56", "1,234.56", "-800,00 €", ...).
//!
//! The separator roles are decided by position, not by count: when both `,` and `.`
//! appear the rightmost one is the decimal separator.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

static LEADING_FLOAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").expect("valid float regex")
});

static WHOLE_FLOAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?$").expect("valid float regex")
});

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("empty amount")]
    Empty,
    #[error("invalid amount: '{0}'")]
    Invalid(String),
}

/// Parse a statement amount. Anything unreadable becomes `0.0`.
pub fn parse_amount(raw: &str) -> f64 {
    let normalized = normalize(raw);
    LEADING_FLOAT
        .find(&normalized)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Like [`parse_amount`] but the whole cell must be a number.
pub fn parse_amount_strict(raw: &str) -> Result<f64, AmountError> {
    let normalized = normalize(raw);
    if normalized.is_empty() {
        return Err(AmountError::Empty);
    }
    if !WHOLE_FLOAT.is_match(&normalized) {
        return Err(AmountError::Invalid(raw.to_string()));
    }
    normalized
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| AmountError::Invalid(raw.to_string()))
}

/// Strip currency symbols and whitespace, then rewrite separators so that `.` is the
/// only decimal point and no grouping separators remain.
fn normalize(raw: &str) -> String {
    let s: String = raw
        .chars()
        .filter(|c| !matches!(c, '€' | '$' | '£') && !c.is_whitespace())
        .collect();

    match (s.rfind(','), s.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => s.replace('.', "").replacen(',', ".", 1),
        (Some(_), Some(_)) => s.replace(',', ""),
        (Some(_), None) => decimal_or_grouping(&s, ','),
        (None, Some(_)) => decimal_or_grouping(&s, '.'),
        (None, None) => s,
    }
}

/// A lone separator followed by at most two digits is a decimal separator; anything
/// else is thousands grouping.
fn decimal_or_grouping(s: &str, sep: char) -> String {
    let parts: Vec<&str> = s.split(sep).collect();
    if parts.len() == 2 && parts[1].chars().count() <= 2 {
        s.replace(sep, ".")
    } else {
        s.replace(sep, "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_european_and_us_grouping() {
        assert_eq!(parse_amount("1.234,56"), 1234.56);
        assert_eq!(parse_amount("1,234.56"), 1234.56);
        assert_eq!(parse_amount("12.345.678,90"), 12345678.9);
        assert_eq!(parse_amount("12,345,678.90"), 12345678.9);
    }

    #[test]
    fn test_single_separator() {
        assert_eq!(parse_amount("1234,56"), 1234.56);
        assert_eq!(parse_amount("1234.56"), 1234.56);
        assert_eq!(parse_amount("12,5"), 12.5);
        assert_eq!(parse_amount("1.234"), 1234.0);
        assert_eq!(parse_amount("1,234"), 1234.0);
        assert_eq!(parse_amount("1.234.567"), 1234567.0);
    }

    #[test]
    fn test_currency_signs_and_spaces() {
        assert_eq!(parse_amount("-800,00 €"), -800.0);
        assert_eq!(parse_amount("€ 1 234,50"), 1234.5);
        assert_eq!(parse_amount("$99.99"), 99.99);
        assert_eq!(parse_amount("£-5"), -5.0);
        assert_eq!(parse_amount("1\u{a0}500,00"), 1500.0);
    }

    #[test]
    fn test_unreadable_is_zero() {
        assert_eq!(parse_amount(""), 0.0);
        assert_eq!(parse_amount("   "), 0.0);
        assert_eq!(parse_amount("n/a"), 0.0);
        assert_eq!(parse_amount("-"), 0.0);
        assert_eq!(parse_amount("inf"), 0.0);
        assert_eq!(parse_amount("(75,25)"), 0.0);
    }

    #[test]
    fn test_leading_number_is_kept() {
        // lenient prefix parsing
        assert_eq!(parse_amount("7 uds"), 7.0);
        assert_eq!(parse_amount("12abc"), 12.0);
    }

    #[test]
    fn test_strict_accepts_numbers() {
        assert_eq!(parse_amount_strict("1.234,56"), Ok(1234.56));
        assert_eq!(parse_amount_strict("-800,00 €"), Ok(-800.0));
    }

    #[test]
    fn test_strict_rejects_garbage() {
        assert_eq!(parse_amount_strict(""), Err(AmountError::Empty));
        assert_eq!(parse_amount_strict("€ "), Err(AmountError::Empty));
        assert_eq!(
            parse_amount_strict("12abc"),
            Err(AmountError::Invalid("12abc".to_string()))
        );
        assert!(parse_amount_strict("nan").is_err());
    }
}
