//! Phone number validation for bulk upserts.

use regex::Regex;
use std::sync::OnceLock;

/// Accepted phone format: optional leading `+`, then 10 to 15 digits.
pub const PHONE_PATTERN: &str = r"^\+?[0-9]{10,15}$";

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(PHONE_PATTERN).expect("Invalid phone regex"))
}

/// Returns true if `phone` matches [`PHONE_PATTERN`].
pub fn is_valid_phone(phone: &str) -> bool {
    phone_regex().is_match(phone)
}

/// Escape `%`, `_` and `\` so user input matches literally inside a LIKE
/// pattern declared with `ESCAPE '\'`.
pub fn escape_like(pattern: &str) -> String {
    let mut escaped = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
