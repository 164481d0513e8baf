use once_cell::sync::Lazy;
use regex::Regex;

static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("bold pattern is valid"));
static ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*(.*?)\*").expect("italic pattern is valid"));

/// Converts `**x**` to `<strong>x</strong>` and then `*x*` to `<em>x</em>`.
///
/// The bold pass must run first or `**x**` would be read as two italic spans.
/// Nothing else is touched: no escaping, no other markdown. Spans do not cross newlines.
pub fn markdown_to_html(text: &str) -> String {
    let bolded = BOLD.replace_all(text, "<strong>$1</strong>");
    ITALIC.replace_all(&bolded, "<em>$1</em>").into_owned()
}
