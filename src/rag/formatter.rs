//! Rewrites model markdown into display HTML

use once_cell::sync::Lazy;
use regex::Regex;

static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("valid bold regex"));
static BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*(.*?)\n").expect("valid bullet regex"));

/// Convert `**bold**` spans and `*bullet` lines into HTML
///
/// Bold runs first. A bullet only matches when a newline follows it, so a
/// bullet on the very last line of `raw` is left as-is.
#[must_use]
pub fn format_response(raw: &str) -> String {
    let bolded = BOLD.replace_all(raw, "<b>${1}</b>");
    BULLET
        .replace_all(&bolded, "<ul><li>${1}</li></ul>")
        .into_owned()
}
