use serde::{Deserialize, Serialize};
use std::fmt;

/// Wildcard accepted in either field of a pattern.
pub const WILDCARD: &str = "*";

/// A (server, channel) pair identifying one conversation context.
///
/// Comparison is case-insensitive (Unicode lowercase) on both fields; `*`
/// in a pattern matches any value in that position.
#[derive(Debug, Clone, Eq)]
pub struct ServerChannel {
    pub server: String,
    pub channel: String,
}

impl ServerChannel {
    pub fn new(server: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            channel: channel.into(),
        }
    }

    /// Parse one `server,channel` entry. Only the first two comma-separated
    /// fields are significant.
    pub fn parse(entry: &str) -> Option<Self> {
        let mut fields = entry.split(',');
        let server = fields.next()?.trim();
        let channel = fields.next()?.trim();
        if server.is_empty() || channel.is_empty() {
            return None;
        }
        Some(Self::new(server, channel))
    }

    /// Whether this pattern matches `candidate`, field by field.
    pub fn matches(&self, candidate: &ServerChannel) -> bool {
        field_matches(&self.server, &candidate.server)
            && field_matches(&self.channel, &candidate.channel)
    }
}

fn field_matches(pattern: &str, value: &str) -> bool {
    pattern == WILDCARD || same_name(pattern, value)
}

fn same_name(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

impl PartialEq for ServerChannel {
    fn eq(&self, other: &Self) -> bool {
        same_name(&self.server, &other.server) && same_name(&self.channel, &other.channel)
    }
}

impl fmt::Display for ServerChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.server, self.channel)
    }
}

/// True iff any pattern in `list` matches `candidate`. An empty list never matches.
pub fn matches(candidate: &ServerChannel, list: &[ServerChannel]) -> bool {
    list.iter().any(|pattern| pattern.matches(candidate))
}

/// A `|`-separated allow-list of `server,channel` patterns.
///
/// Stored in config as the raw pipe-separated string so that the option
/// store round-trips what the user typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ServerChannelList {
    entries: Vec<ServerChannel>,
}

impl ServerChannelList {
    /// Parse a pipe-separated list. Malformed entries are skipped.
    pub fn parse(raw: &str) -> Self {
        let mut entries = Vec::new();
        for entry in raw.split('|') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            match ServerChannel::parse(entry) {
                Some(sc) => entries.push(sc),
                None => {
                    tracing::warn!(entry, "ignoring malformed server,channel entry");
                }
            }
        }
        Self { entries }
    }

    /// The `*,*` list that matches everything.
    pub fn any() -> Self {
        Self {
            entries: vec![ServerChannel::new(WILDCARD, WILDCARD)],
        }
    }

    pub fn matches(&self, candidate: &ServerChannel) -> bool {
        matches(candidate, &self.entries)
    }

    pub fn entries(&self) -> &[ServerChannel] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<String> for ServerChannelList {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<ServerChannelList> for String {
    fn from(list: ServerChannelList) -> Self {
        list.to_string()
    }
}

impl fmt::Display for ServerChannelList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .entries
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("|");
        f.write_str(&joined)
    }
}
