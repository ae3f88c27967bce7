//! Custom template filters: `currency`, `percentage`, `date`.
//!
//! Context values arrive pre-formatted as strings, so the numeric filters
//! strip thousands separators before parsing.

use chrono::NaiveDate;
use minijinja::Value;

use super::format::group_thousands;

/// Numeric view of a filter argument; `None` when it cannot be read as a number.
fn as_number(value: &Value) -> Option<f64> {
    if let Some(s) = value.as_str() {
        return s.trim().replace(',', "").parse::<f64>().ok();
    }
    if value.is_number() {
        return f64::try_from(value.clone()).ok();
    }
    None
}

/// `{{ balance | currency }}` → `RM 12,500.00`.
pub fn currency(symbol: &str, value: &Value) -> String {
    let amount = as_number(value).filter(|v| v.is_finite()).unwrap_or(0.0);
    format!("{} {}", symbol, group_thousands(amount, 2))
}

/// `{{ ratio | percentage }}` → `85.5%`.
pub fn percentage(value: &Value) -> String {
    match as_number(value).filter(|v| v.is_finite()) {
        Some(v) => format!("{:.1}%", v),
        None => "0.0%".to_string(),
    }
}

/// `{{ opened | date }}` turns `2024-03-15` into `15/03/2024`; anything
/// else passes through unchanged.
pub fn date(value: &Value) -> String {
    let text = match value.as_str() {
        Some(s) => s.to_string(),
        None => value.to_string(),
    };
    match NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d") {
        Ok(d) => d.format("%d/%m/%Y").to_string(),
        Err(_) => text,
    }
}
