//! Unit normalisation heuristics for lengths and percentages.

use std::sync::LazyLock;

use regex::Regex;

static RE_MILLIMETRES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*mm").unwrap());
static RE_METRES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*m\b").unwrap());
static RE_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)").unwrap());
static RE_PERCENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*%").unwrap());

/// Read a length in metres from free text.
///
/// Precedence: a millimetre value (divided by 1000), then a metre value, then
/// a bare number assumed to be metres. The first pattern that matches wins.
pub fn normalize_to_metres(text: &str) -> Option<f64> {
    let lower = text.to_lowercase();
    if let Some(mm) = first_number(&RE_MILLIMETRES, &lower) {
        return Some(mm / 1000.0);
    }
    first_number(&RE_METRES, &lower).or_else(|| first_number(&RE_NUMBER, &lower))
}

/// A length only when it carries an explicit `mm` or `m` unit.
pub fn explicit_metres(text: &str) -> Option<f64> {
    let lower = text.to_lowercase();
    if let Some(mm) = first_number(&RE_MILLIMETRES, &lower) {
        return Some(mm / 1000.0);
    }
    first_number(&RE_METRES, &lower)
}

/// First `<n>%` in the text.
pub fn percent(text: &str) -> Option<f64> {
    first_number(&RE_PERCENT, text)
}

/// Convert a captured number and its `mm`/`m` suffix to metres.
pub fn to_metres(number: &str, unit: &str) -> Option<f64> {
    let value: f64 = number.parse().ok()?;
    if unit.eq_ignore_ascii_case("mm") {
        Some(value / 1000.0)
    } else {
        Some(value)
    }
}

/// Shortest decimal form of a value: `5.5`, `0.9`, `60`.
pub fn format_number(value: f64) -> String {
    format!("{}", value)
}

fn first_number(re: &Regex, text: &str) -> Option<f64> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
