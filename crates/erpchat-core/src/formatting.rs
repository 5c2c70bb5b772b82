//! Formatting utilities for tool output
//!
//! Currency and count formatting shared by all registry tools so that
//! textual results are uniform across the catalogue.

/// Currency symbol used in all monetary output
pub const CURRENCY_SYMBOL: &str = "$";

/// Format a monetary amount with the fixed currency symbol and
/// thousands separators, e.g. `1234567.5` -> `$1,234,567.50`.
pub fn fmt_money(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let frac = cents % 100;
    let grouped = group_digits(whole);
    if negative {
        format!("-{}{}.{:02}", CURRENCY_SYMBOL, grouped, frac)
    } else {
        format!("{}{}.{:02}", CURRENCY_SYMBOL, grouped, frac)
    }
}

/// Format an integer count with group separators, e.g. `12345` -> `12,345`.
pub fn fmt_count(count: u64) -> String {
    group_digits(count)
}

fn group_digits(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut groups = Vec::new();
    while value > 0 {
        groups.push((value % 1000) as u16);
        value /= 1000;
    }
    let mut out = String::new();
    for (i, group) in groups.iter().rev().enumerate() {
        if i == 0 {
            out.push_str(&group.to_string());
        } else {
            out.push_str(&format!(",{:03}", group));
        }
    }
    out
}

/// Truncate a string to max length, adding "..." if truncated
pub fn truncate_str(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        format!("{}...", &s[..max.saturating_sub(3)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_money_groups_thousands() {
        assert_eq!(fmt_money(25000.0), "$25,000.00");
        assert_eq!(fmt_money(1234567.5), "$1,234,567.50");
    }

    #[test]
    fn test_fmt_money_small_and_zero() {
        assert_eq!(fmt_money(0.0), "$0.00");
        assert_eq!(fmt_money(999.99), "$999.99");
    }

    #[test]
    fn test_fmt_money_negative() {
        assert_eq!(fmt_money(-1500.25), "-$1,500.25");
    }

    #[test]
    fn test_fmt_count() {
        assert_eq!(fmt_count(0), "0");
        assert_eq!(fmt_count(42), "42");
        assert_eq!(fmt_count(12345), "12,345");
        assert_eq!(fmt_count(1000000), "1,000,000");
    }

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("short", 10), "short");
        assert_eq!(truncate_str("this is a long string", 10), "this is...");
    }
}
