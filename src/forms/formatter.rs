//! Display formatting for field values
//!
//! Pure transforms from raw input to display strings. Malformed input is
//! returned unchanged, so callers must not assume the output differs from
//! the input. `parse_numeric` is the inverse for numeric formats.

use crate::forms::{FormattingRule, FormattingType};
use chrono::NaiveDate;

/// Input patterns accepted when reformatting a date value
const DATE_INPUT_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d.%m.%Y"];

/// Default display pattern for date formatting
const DEFAULT_DATE_FORMAT: &str = "%m/%d/%Y";

/// Extract the numeric value from a possibly formatted string
///
/// Strips currency symbols, grouping separators, percent signs, and
/// surrounding text; returns None when no number remains.
pub fn parse_numeric(display: &str) -> Option<f64> {
    let cleaned: String = display
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

/// Apply a formatting rule to a raw value
pub fn format_value(raw: &str, rule: &FormattingRule) -> String {
    match rule.ty {
        FormattingType::Currency => format_currency(raw, rule),
        FormattingType::Percentage => format_percentage(raw, rule),
        FormattingType::Phone => format_phone(raw),
        FormattingType::Date => format_date(raw, rule),
        FormattingType::Number => format_number(raw, rule),
    }
}

fn format_currency(raw: &str, rule: &FormattingRule) -> String {
    let Some(n) = parse_numeric(raw) else {
        return raw.to_string();
    };
    let symbol = rule.symbol.as_deref().unwrap_or("$");
    let decimals = rule.decimals.unwrap_or(2);
    let sep = rule.thousands_separator.unwrap_or(',');
    let sign = if n < 0.0 { "-" } else { "" };
    format!("{sign}{symbol}{}", group_digits(n.abs(), decimals, Some(sep)))
}

fn format_percentage(raw: &str, rule: &FormattingRule) -> String {
    let Some(n) = parse_numeric(raw) else {
        return raw.to_string();
    };
    match rule.decimals {
        Some(d) => format!("{n:.prec$}%", prec = d as usize),
        None => format!("{}%", trim_number(n)),
    }
}

fn format_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() == 10 {
        format!("({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..])
    } else {
        raw.to_string()
    }
}

fn format_date(raw: &str, rule: &FormattingRule) -> String {
    let trimmed = raw.trim();
    let parsed = DATE_INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok());
    match parsed {
        Some(date) => {
            let pattern = rule.date_format.as_deref().unwrap_or(DEFAULT_DATE_FORMAT);
            date.format(pattern).to_string()
        }
        None => raw.to_string(),
    }
}

fn format_number(raw: &str, rule: &FormattingRule) -> String {
    let Some(n) = parse_numeric(raw) else {
        return raw.to_string();
    };
    let prefix = rule.prefix.as_deref().unwrap_or("");
    let suffix = rule.suffix.as_deref().unwrap_or("");
    let sign = if n < 0.0 { "-" } else { "" };
    let body = match rule.decimals {
        Some(d) => group_digits(n.abs(), d, rule.thousands_separator),
        None => {
            let plain = trim_number(n.abs());
            match rule.thousands_separator {
                Some(sep) => group_integer_part(&plain, sep),
                None => plain,
            }
        }
    };
    format!("{prefix}{sign}{body}{suffix}")
}

/// Render a non-negative number with fixed decimals and grouped thousands
fn group_digits(n: f64, decimals: u8, sep: Option<char>) -> String {
    let fixed = format!("{n:.prec$}", prec = decimals as usize);
    match sep {
        Some(sep) => group_integer_part(&fixed, sep),
        None => fixed,
    }
}

/// Insert a separator every three digits of the integer part
fn group_integer_part(number: &str, sep: char) -> String {
    let (int_part, frac_part) = match number.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (number, None),
    };
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(sep);
        }
        grouped.push(c);
    }
    match frac_part {
        Some(f) => format!("{grouped}.{f}"),
        None => grouped,
    }
}

/// Render without a trailing ".0" for whole values
fn trim_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}
