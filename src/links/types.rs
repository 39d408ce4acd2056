use url::Url;

use super::policy::ServerChannel;

/// One chat message, inbound or outbound.
///
/// An empty `nick` marks a message we sent ourselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub server: String,
    pub channel: String,
    pub nick: String,
    pub text: String,
}

impl IncomingMessage {
    pub fn new(
        server: impl Into<String>,
        channel: impl Into<String>,
        nick: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            server: server.into(),
            channel: channel.into(),
            nick: nick.into(),
            text: text.into(),
        }
    }

    /// A message we sent ourselves.
    pub fn outbound(
        server: impl Into<String>,
        channel: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self::new(server, channel, String::new(), text)
    }

    pub fn is_self_originated(&self) -> bool {
        self.nick.is_empty()
    }

    pub fn server_channel(&self) -> ServerChannel {
        ServerChannel::new(&self.server, &self.channel)
    }
}

/// An HTML response body, capped at the configured byte limit.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    pub url: Url,
    pub body: String,
}

/// Outcome of a successful HTTP exchange.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Html(FetchedDocument),
    NotHtml { content_type: Option<String> },
}

impl FetchOutcome {
    pub fn into_document(self) -> Option<FetchedDocument> {
        match self {
            Self::Html(doc) => Some(doc),
            Self::NotHtml { .. } => None,
        }
    }
}

/// Canonical torrent metadata from the index API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Torrent {
    pub id: u64,
    pub name: String,
}
