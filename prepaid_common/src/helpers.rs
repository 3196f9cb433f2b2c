use std::time::Duration;

use log::warn;

use crate::CURRENCY_CODE_LEN;

/// Parse a boolean flag from a string value, or return the given default value otherwise.
pub fn parse_boolean_flag(value: Option<String>, default: bool) -> bool {
    let value = match value {
        Some(v) => v,
        None => return default,
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

/// Parse a whole number of seconds into a [`Duration`]. Zero, negative and garbage values fall back to the default.
pub fn parse_seconds(name: &str, value: Option<String>, default: Duration) -> Duration {
    let Some(value) = value else { return default };
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Duration::from_secs(secs),
        _ => {
            warn!("🪛️ {value} is not a valid number of seconds for {name}. Using the default, {default:?}, instead.");
            default
        },
    }
}

/// Returns the upper-cased currency code if `code` looks like an ISO-4217 code, i.e. exactly three ASCII letters.
pub fn normalize_currency_code(code: &str) -> Option<String> {
    let code = code.trim();
    (code.len() == CURRENCY_CODE_LEN && code.bytes().all(|b| b.is_ascii_alphabetic()))
        .then(|| code.to_ascii_uppercase())
}
