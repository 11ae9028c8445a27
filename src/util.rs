// Utility helpers for cell cleaning, keyword matching and number formatting.
//
// Export cells are messy (stray whitespace, empty strings standing in for
// nulls), so the rest of the code goes through these helpers instead of
// touching raw strings directly.
use num_format::{Locale, ToFormattedString};

/// Normalize a raw CSV cell.
///
/// - Empty cells become `None`, the way a spreadsheet export encodes nulls.
/// - Everything else is kept verbatim; callers trim when they need to.
pub fn clean_cell(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Trimmed, non-empty view of an optional cell.
pub fn non_blank(s: Option<&str>) -> Option<&str> {
    let s = s?.trim();
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Substring match of any keyword. `haystack` is expected to be lowercased
/// already; keywords are lowercased here so configured lists may use any case.
pub fn contains_any<S: AsRef<str>>(haystack: &str, keywords: &[S]) -> bool {
    keywords
        .iter()
        .any(|k| haystack.contains(k.as_ref().to_lowercase().as_str()))
}

/// `part / whole * 100`, or 0 when there is nothing to divide by.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals with locale-aware thousands separators (`1,234.50`).
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}
