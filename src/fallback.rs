//! Collapsing optional values into display strings.
//!
//! Total functions: every input, including absent ones, renders to some
//! string. [`MISSING`] stands for "no value".

use crate::decode::Location;

/// Rendered in place of an absent or blank value.
pub const MISSING: &str = "-";

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// `primary` if non-blank, else `fallback` if non-blank, else [`MISSING`].
pub fn pick_string(primary: Option<&str>, fallback: Option<&str>) -> String {
    non_blank(primary)
        .or_else(|| non_blank(fallback))
        .unwrap_or(MISSING)
        .to_string()
}

/// Real-time over scheduled time; the value is passed through verbatim.
pub fn pick_time(actual: Option<&str>, planned: Option<&str>) -> String {
    pick_string(actual, planned)
}

/// A single optional text value.
pub fn render_text(value: Option<&str>) -> String {
    pick_string(value, None)
}

/// Renders a delay given in seconds.
///
/// Whole minutes render as `+2m` / `-1m`, anything else as signed seconds
/// (`+90s`). Zero is `0m`. Never rounds.
pub fn render_delay(seconds: Option<i64>) -> String {
    match seconds {
        None => MISSING.to_string(),
        Some(0) => "0m".to_string(),
        Some(s) if s % 60 == 0 => format!("{:+}m", s / 60),
        Some(s) => format!("{s:+}s"),
    }
}

/// Six decimal places regardless of magnitude.
pub fn render_float(value: Option<f64>) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| format!("{v:.6}"))
}

pub fn render_int(value: Option<u64>) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| v.to_string())
}

/// Display name of a location, its id when the name is blank.
pub fn location_label(location: Option<&Location>) -> String {
    match location {
        None => MISSING.to_string(),
        Some(loc) => pick_string(loc.name.as_deref(), loc.id.as_deref()),
    }
}
