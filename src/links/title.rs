use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;

use super::torrent::TorrentResolver;
use super::types::FetchedDocument;

/// Title of every page on the torrent index, whatever the torrent.
pub const TPB_BANNER: &str = "The Pirate Bay - The galaxy's most resilient bittorrent site";

/// Appended to a title cut at `maxlength` characters.
pub const ELLIPSIS: char = '…';

// First <title> element only; attributes are ignored and nested markup is
// deliberately not handled.
static TITLE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<title ?[^<>]*>([^<>]*)</title>").expect("title regex should compile")
});

/// Extract the raw, entity-decoded and whitespace-collapsed page title.
pub fn parse_title(html: &str) -> Option<String> {
    let Some(captures) = TITLE_REGEX.captures(html) else {
        tracing::debug!("no <title> found");
        return None;
    };
    let raw = captures.get(1).map_or("", |m| m.as_str());
    let decoded = html_escape::decode_html_entities(raw);
    Some(collapse_whitespace(&decoded))
}

/// Collapse whitespace runs into one ASCII space and trim both ends.
pub fn collapse_whitespace(text: &str) -> String {
    let mut collapsed = String::with_capacity(text.len());
    let mut previous: Option<char> = None;
    for c in text.chars() {
        if !c.is_whitespace() {
            collapsed.push(c);
        } else if previous.is_some_and(|p| !p.is_whitespace()) {
            collapsed.push(' ');
        }
        previous = Some(c);
    }
    collapsed.trim().to_string()
}

/// Cut `title` to `max_chars` characters, marking the cut with an ellipsis.
pub fn truncate_title(title: &str, max_chars: usize) -> String {
    if title.chars().count() <= max_chars {
        title.to_string()
    } else {
        let mut truncated: String = title.chars().take(max_chars).collect();
        truncated.push(ELLIPSIS);
        truncated
    }
}

/// Turns fetched documents into titles, with the torrent-page override.
#[derive(Debug, Clone)]
pub struct TitleExtractor {
    torrents: TorrentResolver,
}

impl TitleExtractor {
    pub fn new(torrents: TorrentResolver) -> Self {
        Self { torrents }
    }

    pub async fn extract(&self, doc: &FetchedDocument, timeout: Duration) -> Option<String> {
        let title = parse_title(&doc.body)?;
        if !title.starts_with(TPB_BANNER) {
            return Some(title);
        }

        match self.torrents.resolve(&doc.url, timeout).await {
            Some(torrent) => Some(format!("TPB torrent: {}", torrent.name)),
            None => Some(title),
        }
    }
}
