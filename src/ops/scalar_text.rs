//! Text forms of scalar values as typed into the editor.
//!
//! An array of scalars is edited as a block with one element per line. Lines
//! are read back with [`parse_scalar_line`]; blank lines are dropped, so an
//! empty-string element cannot survive a round trip through the block.

use serde_json::Number;

use crate::model::value::JsonValue;

/// Parse a number as typed: integers stay integers, anything else must be a
/// finite float. Empty or non-numeric input yields `None`.
pub fn parse_number(text: &str) -> Option<Number> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(n) = text.parse::<i64>() {
        return Some(n.into());
    }
    if let Ok(n) = text.parse::<u64>() {
        return Some(n.into());
    }
    // Rust also accepts "inf" and "NaN"; JSON has no spelling for them
    text.parse::<f64>().ok().and_then(Number::from_f64)
}

/// Interpret one line of a scalar block: `true`/`false`, then a number, then
/// any JSON literal (so objects and arrays can be typed inline), and finally
/// the raw text as a string.
pub fn parse_scalar_line(line: &str) -> JsonValue {
    match line {
        "true" => return JsonValue::Bool(true),
        "false" => return JsonValue::Bool(false),
        _ => {}
    }
    if let Some(n) = parse_number(line) {
        return JsonValue::Number(n);
    }
    serde_json::from_str::<JsonValue>(line).unwrap_or_else(|_| JsonValue::String(line.to_string()))
}

/// Parse a whole block into the array elements it describes. Lines are
/// trimmed and blank lines dropped.
pub fn parse_scalar_lines(text: &str) -> Vec<JsonValue> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(parse_scalar_line)
        .collect()
}

/// Text shown for a scalar inside a block: strings raw, everything else as
/// JSON.
pub fn scalar_to_line(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn format_scalar_lines(items: &[JsonValue]) -> String {
    items
        .iter()
        .map(scalar_to_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// True for a non-empty array made only of scalars; those are edited as a
/// text block rather than element by element.
pub fn is_scalar_list(items: &[JsonValue]) -> bool {
    !items.is_empty() && items.iter().all(JsonValue::is_scalar)
}
