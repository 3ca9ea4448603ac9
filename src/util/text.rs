use std::sync::LazyLock;

use regex::Regex;

/// A tag-like span or a named/numeric character reference.
static HTML_MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<.+>|&#?[A-Za-z0-9]+;").expect("valid regex"));

/// Heuristically decides whether an RSS `<description>` carries HTML.
///
/// RSS does not say whether a description is markup or plain text, so this
/// looks for anything resembling a tag (`<…>` on one line) or an entity
/// reference such as `&hellip;` or `&#8230;`. Bare `<` or `&` characters
/// are not enough.
///
/// # Examples
///
/// ```
/// use feedparse::util::looks_like_html;
///
/// assert!(looks_like_html("<p>Hello</p>"));
/// assert!(looks_like_html("Wait&hellip;"));
/// assert!(!looks_like_html("1 < 2, 3 < 4."));
/// assert!(!looks_like_html("Fish & chips"));
/// ```
pub fn looks_like_html(text: &str) -> bool {
    HTML_MARKUP.is_match(text)
}

/// Parses the integer prefix of an attribute value, in the lenient way feed
/// producers expect.
///
/// Leading whitespace and a `+` sign are skipped, then decimal digits are
/// read until the first non-digit. Anything without a digit prefix,
/// including negative numbers, yields `0`. Values above `u64::MAX`
/// saturate.
///
/// Used for enclosure lengths and rssCloud ports, both of which show up in
/// the wild as `"1234 "`, `"80abc"` or an empty string.
///
/// # Examples
///
/// ```
/// use feedparse::util::leading_integer;
///
/// assert_eq!(leading_integer("443"), 443);
/// assert_eq!(leading_integer(" 12345 bytes"), 12345);
/// assert_eq!(leading_integer(""), 0);
/// assert_eq!(leading_integer("-1"), 0);
/// ```
pub fn leading_integer(value: &str) -> u64 {
    let trimmed = value.trim_start();
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
    digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0u64, |acc, digit| {
            acc.saturating_mul(10).saturating_add(u64::from(digit - b'0'))
        })
}
