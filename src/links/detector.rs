use regex::Regex;
use std::sync::LazyLock;

static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://[\w0-9@:%._+~#=()?&/\-]+").expect("URL regex should compile")
});

/// Prefix of every line we send into a channel: `url|<i>): `.
static ECHO_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^url\|\d+\): ").expect("echo regex should compile"));

/// Format a title the way it is sent into a channel. [`detect_urls`] skips
/// any text starting with this shape.
pub fn echo_line(index: usize, title: &str) -> String {
    format!("url|{index}): {title}")
}

/// Whether `text` is one of our own sent title lines.
pub fn is_echo(text: &str) -> bool {
    ECHO_REGEX.is_match(text)
}

/// Detect HTTP/HTTPS URLs in text. Returns every match in order of
/// appearance, duplicates included.
pub fn detect_urls(text: &str) -> Vec<String> {
    if is_echo(text) {
        return Vec::new();
    }

    URL_REGEX
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}
