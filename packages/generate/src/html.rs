//! Escaping helpers for HTML text and inline `<script>` data.

use serde::Serialize;

/// Escapes HTML special characters in text content and attribute values.
#[must_use]
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Serializes `value` as JSON that is safe to inline in a `<script>` block.
///
/// `<` only appears inside JSON strings, where the `<` escape is
/// equivalent, so no value can close the script element early.
///
/// # Errors
///
/// Returns the `serde_json` error if `value` cannot be serialized.
pub fn script_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    Ok(serde_json::to_string(value)?
        .replace('<', "\\u003c")
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029"))
}
