//! Name-driven value formatting for template contexts.

use credit_core::FieldValue;

/// Names rendered as a one-decimal percentage figure.
const RATIO_FIELDS: &[&str] = &["creditutilizationratio", "utilization"];
const RATIO_MARKERS: &[&str] = &["ratio", "percentage", "rate"];

/// Names rendered as money: two decimals, thousands separators.
const MONEY_FIELDS: &[&str] = &["balance", "limit"];
const MONEY_MARKERS: &[&str] = &["amount", "value", "overdue", "outstanding"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberStyle {
    Ratio,
    Money,
    Plain,
}

/// Decide how a numeric value named `name` is displayed.
pub fn number_style(name: &str) -> NumberStyle {
    let lower = name.to_ascii_lowercase();
    if RATIO_FIELDS.contains(&lower.as_str()) || RATIO_MARKERS.iter().any(|m| lower.contains(m)) {
        NumberStyle::Ratio
    } else if MONEY_FIELDS.contains(&lower.as_str()) || MONEY_MARKERS.iter().any(|m| lower.contains(m)) {
        NumberStyle::Money
    } else {
        NumberStyle::Plain
    }
}

/// Format one context value for interpolation.
pub fn format_value(name: &str, value: &FieldValue) -> String {
    match value {
        FieldValue::Bool(b) => b.to_string(),
        FieldValue::Text(s) => s.clone(),
        FieldValue::Int(i) => match number_style(name) {
            NumberStyle::Ratio => format!("{:.1}", *i as f64),
            NumberStyle::Money => group_thousands(*i as f64, 2),
            NumberStyle::Plain => i.to_string(),
        },
        FieldValue::Float(f) => match number_style(name) {
            NumberStyle::Ratio => format!("{:.1}", f),
            NumberStyle::Money => group_thousands(*f, 2),
            NumberStyle::Plain => format!("{:.2}", f),
        },
    }
}

/// `1234567.891` with 2 decimals → `"1,234,567.89"`.
pub fn group_thousands(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(fixed.len() + int_part.len() / 3 + 1);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }

    // Avoid "-0.00" for values that round to zero.
    let is_zero = fixed.chars().all(|c| c == '0' || c == '.');
    if value.is_sign_negative() && !is_zero {
        format!("-{}", grouped)
    } else {
        grouped
    }
}
