//! Cell-level cleaning primitives.
//! Locale-tolerant number parsing and day-first date parsing.

use chrono::NaiveDate;

/// Date formats tried in order. Day precedes month in every ambiguous
/// format; the ISO form is unambiguous and accepted last.
const DATE_FORMATS: &[&str] = &["%d.%m.%Y", "%d/%m/%Y", "%d-%m-%Y", "%Y-%m-%d"];

/// Parse a raw numeric cell into an f64.
///
/// Strips all whitespace (including non-breaking spaces) and currency
/// symbols, then resolves separator ambiguity: when both `,` and `.` are
/// present the rightmost one is the decimal separator, a lone comma is a
/// decimal comma, repeated commas are thousands separators.
///
/// Returns `None` for anything that still fails to parse, so a bad cell
/// becomes a missing value instead of an error.
pub fn parse_number(raw: &str) -> Option<f64> {
    let stripped: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '$')
        .collect();

    if stripped.is_empty() {
        return None;
    }

    let normalized = match (stripped.rfind(','), stripped.rfind('.')) {
        // "1,234.56" - comma is a thousands separator
        (Some(comma), Some(point)) if point > comma => stripped.replace(',', ""),
        // "1.234,56" - European notation
        (Some(_), Some(_)) => stripped.replace('.', "").replace(',', "."),
        // "1,234,567" - commas can only be thousands separators
        (Some(_), None) if stripped.matches(',').count() > 1 => stripped.replace(',', ""),
        // "1234,56" - decimal comma
        (Some(_), None) => stripped.replace(',', "."),
        _ => stripped,
    };

    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a raw date cell with day-first interpretation, so `03.04.2026`
/// reads as April 3rd. Unparsable values become `None`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}
