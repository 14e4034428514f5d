use crate::services::views::Tone;
use chrono::{DateTime, NaiveDateTime};
use tracing::warn;

pub const NEUTRAL_MONEY: &str = "$0.00";
pub const NEUTRAL_PERCENT: &str = "0.00";
pub const NEUTRAL_TIME: &str = "--:--:--";

const NAIVE_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// en-US currency: `$1,234.56`, `-$12.00`.
pub fn format_money(value: f64) -> String {
    if !value.is_finite() {
        warn!(value, "money value is not finite; showing neutral");
        return NEUTRAL_MONEY.to_string();
    }
    let fixed = format!("{:.2}", value.abs());
    let grouped = group_decimal(&fixed);
    if value < 0.0 && fixed != "0.00" {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

/// Two decimals with grouping, no percent sign: `1,234.50`.
pub fn format_percent(value: f64) -> String {
    if !value.is_finite() {
        warn!(value, "percent value is not finite; showing neutral");
        return NEUTRAL_PERCENT.to_string();
    }
    let fixed = format!("{:.2}", value.abs());
    let grouped = group_decimal(&fixed);
    if value < 0.0 && fixed != "0.00" {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Share quantities: integers print bare, fractions keep up to four decimals.
pub fn format_quantity(value: f64) -> String {
    if !value.is_finite() {
        warn!(value, "quantity is not finite; showing zero");
        return "0".to_string();
    }
    let fixed = format!("{value:.4}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}

/// `HH:MM:SS` from RFC 3339, ISO-8601 without offset or `YYYY-MM-DD HH:MM:SS`.
pub fn format_timestamp(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.format("%H:%M:%S").to_string();
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, fmt) {
            return parsed.format("%H:%M:%S").to_string();
        }
    }
    warn!(raw, "unrecognised timestamp; showing neutral");
    NEUTRAL_TIME.to_string()
}

/// Fill ratio for a P/L gauge: `min(|pct|, 100) / 100`.
pub fn gauge_ratio(pct: f64) -> f64 {
    if !pct.is_finite() {
        return 0.0;
    }
    pct.abs().min(100.0) / 100.0
}

pub fn tone(value: f64) -> Tone {
    if !value.is_finite() {
        Tone::Neutral
    } else if value >= 0.0 {
        Tone::Positive
    } else {
        Tone::Negative
    }
}

fn group_decimal(fixed: &str) -> String {
    match fixed.split_once('.') {
        Some((int, frac)) => format!("{}.{}", group_thousands(int), frac),
        None => group_thousands(fixed),
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
