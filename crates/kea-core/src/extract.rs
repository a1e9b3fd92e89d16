//! Field extraction and value normalization
//!
//! Pure helpers shared by every parsing strategy: alias-based column lookup,
//! tolerant amount parsing, and date normalization with an observable
//! today-fallback so batch warnings can surface it.

use chrono::NaiveDate;

use crate::models::RawRow;

/// Find the best-matching raw value for a list of column-name aliases.
///
/// Tries, in order: exact key match, case-insensitive key match, substring
/// match in either direction. Returns the first non-empty value found, or
/// an empty string so callers can test truthiness uniformly.
pub fn extract_field(row: &RawRow, aliases: &[String]) -> String {
    // Exact key match
    for alias in aliases {
        if let Some(value) = row.get(alias) {
            if !value.trim().is_empty() {
                return value.trim().to_string();
            }
        }
    }

    // Case-insensitive key match
    for alias in aliases {
        let alias_lower = alias.to_lowercase();
        for (header, value) in &row.cells {
            if header.to_lowercase() == alias_lower && !value.trim().is_empty() {
                return value.trim().to_string();
            }
        }
    }

    // Substring match, alias in key or key in alias
    for alias in aliases {
        let alias_lower = alias.to_lowercase();
        for (header, value) in &row.cells {
            let header_lower = header.to_lowercase();
            if (header_lower.contains(&alias_lower) || alias_lower.contains(&header_lower))
                && !header_lower.is_empty()
                && !value.trim().is_empty()
            {
                return value.trim().to_string();
            }
        }
    }

    String::new()
}

/// Parse an amount string, handling currency symbols, thousands separators,
/// and parenthesis-wrapped accounting negatives.
///
/// Returns 0.0 for unparseable input: statement exports routinely contain
/// blank amount cells that must not abort the batch.
pub fn parse_amount(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    // Accounting notation: (123.45) means -123.45
    let (body, parenthesised) = if trimmed.starts_with('(') && trimmed.ends_with(')') {
        (&trimmed[1..trimmed.len() - 1], true)
    } else {
        (trimmed, false)
    };

    let cleaned: String = body
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-' || *c == '+')
        .collect();

    match cleaned.parse::<f64>() {
        Ok(value) if parenthesised => -value.abs(),
        Ok(value) => value,
        Err(_) => 0.0,
    }
}

/// A normalized date plus whether the today-fallback fired.
///
/// Silent fallback to "today" is a correctness hazard for financial data,
/// so the flag must reach the batch warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedDate {
    pub date: NaiveDate,
    pub fell_back_to_today: bool,
}

/// Normalize a raw date string to a calendar date.
///
/// Tries, in order: ISO, DD/MM/YYYY, MM/DD/YYYY, 2-digit-year variants
/// (years > 50 are 19xx, else 20xx), compact DDMMYYYY/YYYYMMDD. Constructed
/// dates are validated by chrono, which rejects impossible days like 31 Feb.
pub fn normalize_date(raw: &str) -> NormalizedDate {
    if let Some(date) = parse_date(raw) {
        return NormalizedDate {
            date,
            fell_back_to_today: false,
        };
    }

    NormalizedDate {
        date: chrono::Local::now().date_naive(),
        fell_back_to_today: true,
    }
}

/// Parse a date string in the formats bank exports actually use.
/// Returns None when nothing matches.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    // ISO first: locale-agnostic and unambiguous
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y/%m/%d") {
        return Some(date);
    }

    // Separator-delimited day/month orderings. NZ exports are DD/MM, so
    // that ordering is tried before MM/DD.
    let parts: Vec<&str> = s.split(['/', '-', '.']).collect();
    if parts.len() == 3 {
        if let (Ok(a), Ok(b), Ok(c)) = (
            parts[0].parse::<u32>(),
            parts[1].parse::<u32>(),
            parts[2].parse::<i32>(),
        ) {
            let year = expand_year(c, parts[2].len());
            // DD/MM/YYYY
            if let Some(date) = NaiveDate::from_ymd_opt(year, b, a) {
                return Some(date);
            }
            // MM/DD/YYYY
            if let Some(date) = NaiveDate::from_ymd_opt(year, a, b) {
                return Some(date);
            }
        }
    }

    // Compact 8-digit forms
    if s.len() == 8 && s.chars().all(|c| c.is_ascii_digit()) {
        let first_four: i32 = s[0..4].parse().ok()?;
        // YYYYMMDD when the prefix looks like a year
        if (1900..=2100).contains(&first_four) {
            let month: u32 = s[4..6].parse().ok()?;
            let day: u32 = s[6..8].parse().ok()?;
            if let Some(date) = NaiveDate::from_ymd_opt(first_four, month, day) {
                return Some(date);
            }
        }
        // DDMMYYYY
        let day: u32 = s[0..2].parse().ok()?;
        let month: u32 = s[2..4].parse().ok()?;
        let year: i32 = s[4..8].parse().ok()?;
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(date);
        }
    }

    None
}

/// Expand a possibly 2-digit year: > 50 means 19xx, else 20xx
fn expand_year(year: i32, digits: usize) -> i32 {
    if digits <= 2 {
        if year > 50 {
            1900 + year
        } else {
            2000 + year
        }
    } else {
        year
    }
}

/// Shape heuristic: does this cell look like a date?
pub fn looks_like_date(value: &str) -> bool {
    parse_date(value).is_some()
}

/// Shape heuristic: does this cell look like a monetary number?
pub fn looks_like_number(value: &str) -> bool {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return false;
    }
    let body = trimmed
        .trim_start_matches(['$', '-', '+', '('])
        .trim_end_matches(')');
    let mut saw_digit = false;
    for c in body.chars() {
        match c {
            '0'..='9' => saw_digit = true,
            '.' | ',' => {}
            _ => return false,
        }
    }
    saw_digit
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[(&str, &str)]) -> RawRow {
        RawRow::new(
            "test.csv",
            cells
                .iter()
                .map(|(h, v)| (h.to_string(), v.to_string()))
                .collect(),
        )
    }

    fn aliases(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_extract_exact_match() {
        let r = row(&[("Date", "15/05/2024"), ("Amount", "-22.40")]);
        assert_eq!(extract_field(&r, &aliases(&["Amount"])), "-22.40");
    }

    #[test]
    fn test_extract_case_insensitive() {
        let r = row(&[("DATE", "15/05/2024")]);
        assert_eq!(extract_field(&r, &aliases(&["Date"])), "15/05/2024");
    }

    #[test]
    fn test_extract_substring_both_directions() {
        let r = row(&[("Transaction Date", "2024-01-01")]);
        assert_eq!(extract_field(&r, &aliases(&["Date"])), "2024-01-01");

        let r = row(&[("Amt", "5.00")]);
        assert_eq!(extract_field(&r, &aliases(&["Amount Amt"])), "5.00");
    }

    #[test]
    fn test_extract_prefers_first_alias() {
        let r = row(&[("Memo", "memo text"), ("Payee", "payee text")]);
        assert_eq!(
            extract_field(&r, &aliases(&["Payee", "Memo"])),
            "payee text"
        );
    }

    #[test]
    fn test_extract_skips_empty_and_returns_empty_string() {
        let r = row(&[("Amount", ""), ("Value", "10.00")]);
        assert_eq!(extract_field(&r, &aliases(&["Amount", "Value"])), "10.00");
        assert_eq!(extract_field(&r, &aliases(&["Balance"])), "");
    }

    #[test]
    fn test_parse_amount_currency_and_separators() {
        assert_eq!(parse_amount("$1,234.56"), 1234.56);
        assert_eq!(parse_amount("NZ$ 99.00"), 99.00);
        assert_eq!(parse_amount("-123.45"), -123.45);
        assert_eq!(parse_amount(" 2 500.00 "), 2500.00);
    }

    #[test]
    fn test_parse_amount_accounting_negatives() {
        // Parenthesis-wrapped values are negative, full stop.
        assert_eq!(parse_amount("(100.00)"), -100.00);
        assert_eq!(parse_amount("($1,000.50)"), -1000.50);
    }

    #[test]
    fn test_parse_amount_unparseable_is_zero() {
        assert_eq!(parse_amount(""), 0.0);
        assert_eq!(parse_amount("n/a"), 0.0);
        assert_eq!(parse_amount("pending"), 0.0);
    }

    #[test]
    fn test_parse_date_orderings() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 15).unwrap();
        assert_eq!(parse_date("2024-05-15"), Some(expected));
        assert_eq!(parse_date("15/05/2024"), Some(expected));
        assert_eq!(parse_date("15-05-2024"), Some(expected));
        // Unambiguous MM/DD (day > 12 forces the swap)
        assert_eq!(
            parse_date("05/15/2024"),
            Some(NaiveDate::from_ymd_opt(2024, 5, 15).unwrap())
        );
    }

    #[test]
    fn test_parse_date_two_digit_years() {
        assert_eq!(
            parse_date("15/05/24"),
            Some(NaiveDate::from_ymd_opt(2024, 5, 15).unwrap())
        );
        assert_eq!(
            parse_date("15/05/98"),
            Some(NaiveDate::from_ymd_opt(1998, 5, 15).unwrap())
        );
    }

    #[test]
    fn test_parse_date_compact_forms() {
        assert_eq!(
            parse_date("20240515"),
            Some(NaiveDate::from_ymd_opt(2024, 5, 15).unwrap())
        );
        assert_eq!(
            parse_date("15052024"),
            Some(NaiveDate::from_ymd_opt(2024, 5, 15).unwrap())
        );
    }

    #[test]
    fn test_parse_date_rejects_impossible_days() {
        assert_eq!(parse_date("31/02/2024"), None);
        assert_eq!(parse_date("2024-02-31"), None);
    }

    #[test]
    fn test_normalize_date_flags_today_fallback() {
        let good = normalize_date("15/05/2024");
        assert!(!good.fell_back_to_today);

        let bad = normalize_date("last Tuesday");
        assert!(bad.fell_back_to_today);
        assert_eq!(bad.date, chrono::Local::now().date_naive());
    }

    #[test]
    fn test_shape_heuristics() {
        assert!(looks_like_date("15/05/2024"));
        assert!(!looks_like_date("Uber Eats"));
        assert!(looks_like_number("-22.40"));
        assert!(looks_like_number("$1,234.56"));
        assert!(looks_like_number("(50.00)"));
        assert!(!looks_like_number("Gas Station"));
        assert!(!looks_like_number("12-3141-0012345-000"));
    }
}
