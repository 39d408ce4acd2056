use futures_util::stream::{self, StreamExt};
use std::time::Duration;

use super::buffer::UrlBuffer;
use super::dispatch::dispatch;
use crate::config::{Config, Options};
use crate::error::Result;
use crate::host::Host;
use crate::links::{
    DocumentFetcher, IncomingMessage, TitleExtractor, TorrentResolver, detect_urls, truncate_title,
};

/// Per-message fetch → parse → route pipeline.
pub struct Pipeline {
    fetcher: DocumentFetcher,
    titles: TitleExtractor,
    url_buffer: UrlBuffer,
}

impl Pipeline {
    /// Build a pipeline for `config`, rejecting settings it cannot run with.
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        let fetcher = DocumentFetcher::new()?;
        Ok(Self::with_fetcher(fetcher, &config.torrent_api))
    }

    pub fn with_fetcher(fetcher: DocumentFetcher, torrent_api: &str) -> Self {
        let torrents = TorrentResolver::new(fetcher.client().clone(), torrent_api);
        Self {
            fetcher,
            titles: TitleExtractor::new(torrents),
            url_buffer: UrlBuffer::new(),
        }
    }

    pub fn url_buffer(&self) -> &UrlBuffer {
        &self.url_buffer
    }

    /// Handle one chat message and return one optional title per URL found,
    /// in URL order. Never fails: per-URL problems become `None`.
    pub async fn handle(
        &self,
        host: &dyn Host,
        config: &Config,
        message: &IncomingMessage,
    ) -> Vec<Option<String>> {
        let options = &config.options;
        let srvchan = message.server_channel();

        if !options.serverchans.matches(&srvchan) {
            tracing::debug!(
                server = %message.server,
                channel = %message.channel,
                "ignoring message from unlisted channel"
            );
            return Vec::new();
        }

        let urls = detect_urls(&message.text);
        if urls.is_empty() {
            return Vec::new();
        }

        let titles = self
            .fetch_titles(&urls, options, config.parallel_fetches)
            .await;

        if options.urlbuffer {
            let speaker = if message.is_self_originated() {
                host.own_nick(&message.server)
                    .unwrap_or_else(|| "*".to_string())
            } else {
                message.nick.clone()
            };
            self.url_buffer.print(
                host,
                &format!(
                    "<{speaker}@{}/{}>\t{}",
                    message.server, message.channel, message.text
                ),
            );
        }

        let force_send = options.sendfromme && message.is_self_originated();
        dispatch(host, &self.url_buffer, options, &srvchan, &titles, force_send).await;

        titles
    }

    /// Titles for `urls`, fetched at most `parallel` at a time and returned
    /// in the order of `urls`.
    pub async fn fetch_titles(
        &self,
        urls: &[String],
        options: &Options,
        parallel: usize,
    ) -> Vec<Option<String>> {
        stream::iter(urls)
            .map(|url| self.title_for(url, options))
            .buffered(parallel.max(1))
            .collect()
            .await
    }

    /// Fetch one URL and extract its truncated title.
    pub async fn title_for(&self, url: &str, options: &Options) -> Option<String> {
        tracing::debug!(url, "fetching title");
        let doc = match self.fetcher.fetch(url, options).await {
            Ok(outcome) => outcome.into_document()?,
            Err(e) => {
                tracing::warn!(url, error = %e, "cannot fetch title");
                return None;
            }
        };

        let title = self
            .titles
            .extract(&doc, Duration::from_secs(options.timeout))
            .await?;
        // An empty <title> prints nothing rather than a bare "1:\t" line.
        if title.is_empty() {
            return None;
        }

        let title = truncate_title(&title, options.maxlength);
        tracing::debug!(url, title = %title, "found title");
        Some(title)
    }
}
