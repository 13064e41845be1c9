use std::collections::HashMap;

/// Parse an application/x-www-form-urlencoded body.
///
/// Handles `+`-as-space and percent decoding. Multiple values for the same
/// key are not supported (only the last is kept).
pub fn parse_form(body: &[u8]) -> HashMap<String, String> {
    let raw = String::from_utf8_lossy(body);
    let mut fields = HashMap::new();

    for pair in raw.split('&') {
        if pair.is_empty() {
            continue;
        }
        match pair.split_once('=') {
            Some((key, value)) => {
                fields.insert(decode_component(key), decode_component(value));
            }
            None => {
                // Flag field without value
                fields.insert(decode_component(pair), String::new());
            }
        }
    }

    fields
}

fn decode_component(component: &str) -> String {
    let spaced = component.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

/// Get a trimmed text field; empty or missing fields come back as None.
pub fn get_text(fields: &HashMap<String, String>, key: &str) -> Option<String> {
    fields
        .get(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Get a checkbox-style flag field (present with any value counts as set).
pub fn get_flag(fields: &HashMap<String, String>, key: &str) -> bool {
    fields.contains_key(key)
}
