//! EUR display formatting (es-ES conventions)

/// Format an amount the way the es-ES locale renders EUR currency:
/// decimal comma, `.` grouping only from five integer digits up, and a
/// non-breaking space before the euro sign.
///
/// `format_eur(1234.56)` gives `"1234,56 €"`, `format_eur(-12345.6)` gives `"-12.345,60 €"`.
pub fn format_eur(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let frac = cents % 100;

    let whole = if whole.len() >= 5 { group_thousands(&whole) } else { whole };
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };

    format!("{sign}{whole},{frac:02}\u{a0}€")
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_four_digit_amounts_are_not_grouped() {
        assert_eq!(format_eur(1234.56), "1234,56\u{a0}€");
    }

    #[test]
    fn test_five_digit_amounts_are_grouped() {
        assert_eq!(format_eur(12345.6), "12.345,60\u{a0}€");
        assert_eq!(format_eur(1234567.0), "1.234.567,00\u{a0}€");
    }

    #[test]
    fn test_negative_and_zero() {
        assert_eq!(format_eur(-800.0), "-800,00\u{a0}€");
        assert_eq!(format_eur(0.0), "0,00\u{a0}€");
        assert_eq!(format_eur(-0.001), "0,00\u{a0}€");
    }
}
