//! Display formatting for the headline value, snapshot delta and percent change.
//!
//! Grouping follows en-US conventions (`,` thousands, `.` decimal point) and
//! rounding is half away from zero. All functions are total: NaN and infinite
//! inputs degrade to their documented defaults.

use rust_decimal::{Decimal, RoundingStrategy, prelude::FromPrimitive};

/// Headline market cap: grouped integer, clamped to zero.
pub fn format_headline(n: f64) -> String {
    let n = if n.is_finite() { n.max(0.0) } else { 0.0 };
    format_grouped(n, 0, 0)
}

/// Absolute snapshot delta with adaptive precision so tiny moves stay visible.
pub fn format_delta(n: f64) -> String {
    let abs = n.abs();
    if !abs.is_finite() || abs == 0.0 {
        return "0.0000".to_string();
    }

    if abs < 1.0 {
        format_grouped(abs, 4, 6)
    } else if abs < 1000.0 {
        format_grouped(abs, 2, 2)
    } else {
        format_grouped(abs, 0, 0)
    }
}

/// Absolute percent change with adaptive precision (no grouping).
pub fn format_percent(p: f64) -> String {
    let ap = p.abs();
    if !ap.is_finite() || ap == 0.0 {
        return "0.00".to_string();
    }

    let dp = if ap < 0.01 {
        4
    } else if ap < 1.0 {
        3
    } else {
        2
    };
    fixed(ap, dp)
}

/// Shortened address: first and last six characters around an ellipsis.
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 12 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 6..].iter().collect();
    format!("{head}…{tail}")
}

/// Compact threshold label used on milestone pills, e.g. 250K, 1.5M.
pub fn format_compact(n: f64) -> String {
    let abs = n.abs();
    let (scaled, suffix) = if abs >= 1_000_000_000.0 {
        (abs / 1_000_000_000.0, "B")
    } else if abs >= 1_000_000.0 {
        (abs / 1_000_000.0, "M")
    } else if abs >= 1_000.0 {
        (abs / 1_000.0, "K")
    } else {
        (abs, "")
    };
    let text = fixed(scaled, 2);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    format!("{text}{suffix}")
}

/// Non-negative `n` rounded to at most `max_frac` digits, padded to at least
/// `min_frac`, with grouped integer digits.
fn format_grouped(n: f64, min_frac: u32, max_frac: u32) -> String {
    let rounded = match round(n, max_frac) {
        Some(d) => d.normalize().to_string(),
        None => format!("{:.*}", max_frac as usize, n),
    };

    let (int_part, frac_part) = match rounded.split_once('.') {
        Some((i, f)) => (i.to_string(), f.trim_end_matches('0').to_string()),
        None => (rounded, String::new()),
    };

    let mut frac = frac_part;
    while (frac.len() as u32) < min_frac {
        frac.push('0');
    }

    let grouped = group_thousands(&int_part);
    if frac.is_empty() {
        grouped
    } else {
        format!("{grouped}.{frac}")
    }
}

/// Exactly `dp` fractional digits, no grouping.
///
/// Rounds the exact binary value of `n`, so 1.005 (stored just below the
/// midpoint) gives "1.00".
fn fixed(n: f64, dp: u32) -> String {
    match Decimal::from_f64_retain(n) {
        Some(d) => {
            let mut d = d.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
            d.rescale(dp);
            d.to_string()
        }
        None => format!("{:.*}", dp as usize, n),
    }
}

/// Rounds the shortest decimal representation of `n`.
fn round(n: f64, dp: u32) -> Option<Decimal> {
    Decimal::from_f64(n)
        .map(|d| d.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero))
}

fn group_thousands(digits: &str) -> String {
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };

    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3 + 1);
    out.push_str(sign);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fraction_digits(s: &str) -> usize {
        s.split_once('.').map(|(_, f)| f.len()).unwrap_or(0)
    }

    #[test]
    fn test_headline() {
        assert_eq!(format_headline(0.0), "0");
        assert_eq!(format_headline(999.4), "999");
        assert_eq!(format_headline(1234567.5), "1,234,568");
        assert_eq!(format_headline(-50.0), "0");
        assert_eq!(format_headline(f64::NAN), "0");
        assert_eq!(format_headline(f64::INFINITY), "0");
    }

    #[test]
    fn test_delta_zero() {
        assert_eq!(format_delta(0.0), "0.0000");
        assert_eq!(format_delta(-0.0), "0.0000");
        assert_eq!(format_delta(f64::NAN), "0.0000");
    }

    #[test]
    fn test_delta_sub_unit() {
        let s = format_delta(0.5);
        assert_eq!(s, "0.5000");
        assert!((4..=6).contains(&fraction_digits(&s)));

        assert_eq!(format_delta(0.1234567), "0.123457");
        assert_eq!(format_delta(-0.00012), "0.00012");
        assert_eq!(format_delta(0.9999996), "1.0000");
    }

    #[test]
    fn test_delta_two_decimals() {
        assert_eq!(format_delta(500.0), "500.00");
        assert_eq!(format_delta(-12.3456), "12.35");
        assert_eq!(format_delta(999.994), "999.99");
    }

    #[test]
    fn test_delta_integer() {
        let s = format_delta(1500.0);
        assert_eq!(s, "1,500");
        assert_eq!(fraction_digits(&s), 0);
        assert_eq!(format_delta(-2_500_000.6), "2,500,001");
    }

    #[test]
    fn test_percent() {
        assert_eq!(format_percent(0.0), "0.00");
        assert_eq!(format_percent(f64::NAN), "0.00");
        assert_eq!(format_percent(f64::NEG_INFINITY), "0.00");
        assert_eq!(format_percent(0.005), "0.0050");
        assert_eq!(format_percent(0.5), "0.500");
        assert_eq!(format_percent(5.0), "5.00");
        assert_eq!(format_percent(-33.3333), "33.33");
        assert_eq!(format_percent(0.125), "0.125");
        assert_eq!(format_percent(2.125), "2.13");
    }

    #[test]
    fn test_percent_rounds_binary_value() {
        // Stored just below the midpoint
        assert_eq!(format_percent(1.005), "1.00");
        assert_eq!(format_percent(1.255), "1.25");
        assert_eq!(format_percent(0.1235), "0.123");

        // Grouped paths round the shortest decimal instead
        assert_eq!(format_delta(1.005), "1.01");
    }

    #[test]
    fn test_short_address() {
        assert_eq!(short_address("AbCdEf1234567890XyZpump"), "AbCdEf…yZpump");
        assert_eq!(short_address("short"), "short");
    }

    #[test]
    fn test_compact() {
        assert_eq!(format_compact(50_000.0), "50K");
        assert_eq!(format_compact(1_500_000.0), "1.5M");
        assert_eq!(format_compact(2_000_000_000.0), "2B");
        assert_eq!(format_compact(750.0), "750");
    }
}
