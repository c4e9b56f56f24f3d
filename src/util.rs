// Utility helpers for parsing and display formatting.
//
// All the forgiving text-to-value coercion lives here so the pipeline
// modules can work with clean typed values. A failed coercion is always
// `None`, never a default — callers decide whether to count or skip.
use chrono::NaiveDate;
use num_format::{Locale, ToFormattedString};

/// Parse a string-like value into `f64` while being forgiving about the
/// formatting quirks of spreadsheet exports.
///
/// - Trims whitespace.
/// - Strips thousands separators (`","`) and a trailing `원` / `%` marker.
/// - Rejects values containing ASCII letters (free text, not numbers).
/// - Returns `None` for anything that cannot be parsed.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    let s = s.trim_end_matches('원').trim_end_matches('%').trim();
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok()
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%m/%d/%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parse a date from any of the formats seen in the source spreadsheets.
///
/// Plain dates are tried first, then datetime forms whose time component
/// is discarded.
pub fn parse_date_multi(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    None
}

/// Round to two decimal places (growth rates, percentages).
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Format a floating-point value with a fixed number of decimals and
/// locale-aware thousands separators (e.g. `1,234,567.89`).
pub fn format_number(n: f64, decimals: usize) -> String {
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if decimals > 0 {
        res.push('.');
        res.push_str(frac_part.unwrap_or("0"));
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

/// Thousands-separated integer formatting for counts in console messages.
pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

const WEEK_ORDINALS: &[&str] = &["첫째", "둘째", "셋째", "넷째", "다섯째"];

/// Korean label for a week within a month, e.g. `11월 첫째주`.
///
/// `relative` is the offset from the month's earliest ISO week; weeks past
/// the fifth fall back to the absolute ISO week number.
pub fn week_label(month: u32, relative: i64, absolute_week: u32) -> String {
    if (0..WEEK_ORDINALS.len() as i64).contains(&relative) {
        format!("{}월 {}주", month, WEEK_ORDINALS[relative as usize])
    } else {
        format!("{}월 {}주", month, absolute_week)
    }
}
