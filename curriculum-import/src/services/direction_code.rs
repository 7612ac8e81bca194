//! Direction code extraction
//!
//! Direction cells often carry the code inline: `"09.03.04 Программная
//! инженерия"`. The code prefix is split off the name; it fills the code
//! only when the dedicated code cell is empty.

use once_cell::sync::Lazy;
use regex::Regex;

static CODE_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^(\d{2}\.\d{2}\.\d{2})\s+(.+)$").unwrap());

/// Split `raw_name` into `(code, name)`, preferring a non-empty `raw_code`
///
/// Absent inputs become empty strings; outputs are trimmed.
pub fn extract(raw_code: Option<&str>, raw_name: Option<&str>) -> (String, String) {
    let code = raw_code.map(str::trim).unwrap_or_default();
    let name = raw_name.map(str::trim).unwrap_or_default();

    match CODE_PREFIX.captures(name) {
        Some(caps) => {
            let rest = caps[2].trim().to_string();
            let code = if code.is_empty() {
                caps[1].to_string()
            } else {
                code.to_string()
            };
            (code, rest)
        }
        None => (code.to_string(), name.to_string()),
    }
}
