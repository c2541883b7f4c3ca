//! Brazilian-locale value coercion.
//!
//! Spreadsheet exports use `.` for thousands and `,` for decimals
//! ("R$ 1.234,56"). Every function here is total: unreadable input
//! becomes zero (or the fallback date), never an error.

use chrono::NaiveDate;

/// Name given to rows whose campaign cell is missing or blank.
pub const UNNAMED_CAMPAIGN: &str = "Campanha sem nome";

/// "R$ 1.234,56" -> 1234.56
pub fn parse_currency(raw: &str) -> f64 {
    let cleaned: String = raw
        .replace("R$", "")
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '.')
        .collect();
    cleaned.replace(',', ".").parse().unwrap_or(0.0)
}

/// Keeps digits only, so "1.234" -> 1234. Separators of any kind vanish.
pub fn parse_count(raw: &str) -> i64 {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

/// Plain decimal without currency symbol: "1.234,5" -> 1234.5
pub fn parse_decimal(raw: &str) -> f64 {
    raw.trim().replace('.', "").replace(',', ".").parse().unwrap_or(0.0)
}

/// `DD/MM/YYYY` -> date. ISO dates pass through; anything else is `fallback`.
pub fn parse_date(raw: &str, fallback: NaiveDate) -> NaiveDate {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .unwrap_or(fallback)
}

pub fn clean_campaign_name(raw: &str) -> String {
    let name = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if name.is_empty() {
        UNNAMED_CAMPAIGN.to_string()
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // -------------------------------------------------------------------------
    // CURRENCY
    // -------------------------------------------------------------------------

    #[test]
    fn test_currency_with_symbol_and_thousands() {
        assert_eq!(parse_currency("R$ 1.234,56"), 1234.56);
    }

    #[test]
    fn test_currency_without_symbol() {
        assert_eq!(parse_currency("500,00"), 500.0);
    }

    #[test]
    fn test_currency_non_breaking_space() {
        assert_eq!(parse_currency("R$\u{a0}2.000,10"), 2000.10);
    }

    #[test]
    fn test_currency_large_value() {
        assert_eq!(parse_currency("R$ 1.250.000,00"), 1_250_000.0);
    }

    #[test]
    fn test_currency_empty_is_zero() {
        assert_eq!(parse_currency(""), 0.0);
        assert_eq!(parse_currency("   "), 0.0);
    }

    #[test]
    fn test_currency_garbage_is_zero() {
        assert_eq!(parse_currency("n/d"), 0.0);
    }

    #[test]
    fn test_currency_negative_passes_through() {
        assert_eq!(parse_currency("-R$ 10,50"), -10.5);
    }

    // -------------------------------------------------------------------------
    // COUNTS
    // -------------------------------------------------------------------------

    #[test]
    fn test_count_thousands_separator() {
        assert_eq!(parse_count("1.234"), 1234);
    }

    #[test]
    fn test_count_plain() {
        assert_eq!(parse_count("10000"), 10000);
    }

    #[test]
    fn test_count_drops_decimal_part_digits() {
        // Only digits are kept, a decimal comma is not special.
        assert_eq!(parse_count("12,5"), 125);
    }

    #[test]
    fn test_count_empty_is_zero() {
        assert_eq!(parse_count(""), 0);
        assert_eq!(parse_count("-"), 0);
    }

    // -------------------------------------------------------------------------
    // DECIMALS
    // -------------------------------------------------------------------------

    #[test]
    fn test_decimal_comma() {
        assert_eq!(parse_decimal("1,85"), 1.85);
    }

    #[test]
    fn test_decimal_thousands_and_comma() {
        assert_eq!(parse_decimal("1.234,5"), 1234.5);
    }

    #[test]
    fn test_decimal_empty_is_zero() {
        assert_eq!(parse_decimal(""), 0.0);
    }

    // -------------------------------------------------------------------------
    // DATES
    // -------------------------------------------------------------------------

    #[test]
    fn test_date_brazilian_format() {
        assert_eq!(parse_date("05/03/2024", day(2000, 1, 1)), day(2024, 3, 5));
    }

    #[test]
    fn test_date_iso_passes_through() {
        assert_eq!(parse_date("2024-03-05", day(2000, 1, 1)), day(2024, 3, 5));
    }

    #[test]
    fn test_date_missing_uses_fallback() {
        let today = day(2026, 10, 18);
        assert_eq!(parse_date("", today), today);
    }

    #[test]
    fn test_date_impossible_uses_fallback() {
        let today = day(2026, 10, 18);
        assert_eq!(parse_date("31/02/2024", today), today);
    }

    // -------------------------------------------------------------------------
    // CAMPAIGN NAMES
    // -------------------------------------------------------------------------

    #[test]
    fn test_campaign_name_collapses_whitespace() {
        assert_eq!(clean_campaign_name("  Black   Friday\t2024 "), "Black Friday 2024");
    }

    #[test]
    fn test_campaign_name_placeholder() {
        assert_eq!(clean_campaign_name("   "), UNNAMED_CAMPAIGN);
    }
}
