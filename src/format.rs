//! Display Formatting
//!
//! One fixed convention: US dollars, en-US grouping, two decimals.

use crate::coerce::finite_or_zero;

/// Format as `$1,234.56`. Negative amounts render as `-$5.00`.
///
/// Rounds half away from zero on the shortest decimal form of the value, so
/// `18.215` renders as `$18.22` even though its binary value sits just below.
pub fn format_currency(amount: f64) -> String {
    let amount = finite_or_zero(amount);
    let sign = if amount < 0.0 { "-" } else { "" };
    let (whole, cents) = round_to_cents(amount.abs());
    format!("{sign}${}.{cents}", group_thousands(&whole))
}

pub fn format_hours(hours: f64) -> String {
    format!("{:.2}", finite_or_zero(hours))
}

pub fn format_percent(rate: f64) -> String {
    format!("{}%", finite_or_zero(rate))
}

fn round_to_cents(value: f64) -> (String, String) {
    let repr = value.to_string();
    let (int_part, frac_part) = repr.split_once('.').unwrap_or((repr.as_str(), ""));

    let mut digits: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes().chain(std::iter::repeat(b'0')).take(2))
        .map(|b| b - b'0')
        .collect();

    let round_up = frac_part.as_bytes().get(2).is_some_and(|&d| d >= b'5');
    if round_up {
        let mut carried = true;
        for digit in digits.iter_mut().rev() {
            if *digit == 9 {
                *digit = 0;
            } else {
                *digit += 1;
                carried = false;
                break;
            }
        }
        if carried {
            digits.insert(0, 1);
        }
    }

    let split = digits.len() - 2;
    let render = |ds: &[u8]| ds.iter().map(|d| char::from(b'0' + d)).collect::<String>();
    (render(&digits[..split]), render(&digits[split..]))
}

fn group_thousands(whole: &str) -> String {
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_basic() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(5.0), "$5.00");
        assert_eq!(format_currency(3.93), "$3.93");
        assert_eq!(format_currency(19.65), "$19.65");
    }

    #[test]
    fn test_currency_rounding() {
        assert_eq!(format_currency(14.2545), "$14.25");
        assert_eq!(format_currency(181.7645), "$181.76");
        assert_eq!(format_currency(18.215), "$18.22");
        assert_eq!(format_currency(0.995), "$1.00");
        assert_eq!(format_currency(999.999), "$1,000.00");
    }

    #[test]
    fn test_currency_grouping() {
        assert_eq!(format_currency(1234.5), "$1,234.50");
        assert_eq!(format_currency(1234567.891), "$1,234,567.89");
        assert_eq!(format_currency(100000.0), "$100,000.00");
    }

    #[test]
    fn test_currency_negative_and_nan() {
        assert_eq!(format_currency(-5.0), "-$5.00");
        assert_eq!(format_currency(f64::NAN), "$0.00");
    }

    #[test]
    fn test_hours_and_percent() {
        assert_eq!(format_hours(4.0), "4.00");
        assert_eq!(format_hours(2.5), "2.50");
        assert_eq!(format_percent(13.0), "13%");
        assert_eq!(format_percent(7.5), "7.5%");
    }
}
