use std::borrow::Cow;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use url::Url;

use super::types::{FetchOutcome, FetchedDocument};
use crate::config::Options;
use crate::error::FetchError;

/// Identifying user agent sent with every request.
pub const USER_AGENT: &str = concat!("Mozilla/5.0 (Rust) urltitel/", env!("CARGO_PKG_VERSION"));

/// Retrieves HTML documents under size and time bounds.
#[derive(Debug, Clone)]
pub struct DocumentFetcher {
    client: reqwest::Client,
}

impl DocumentFetcher {
    pub fn new() -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Fetch `raw_url`, making up to [`Options::attempts`] attempts.
    ///
    /// Only HTML responses yield a body, truncated to `maxdownload` bytes.
    pub async fn fetch(&self, raw_url: &str, options: &Options) -> Result<FetchOutcome, FetchError> {
        let url = normalize_url(raw_url, options.http_rewrite)?;
        let timeout = Duration::from_secs(options.timeout);
        let attempts = options.attempts();

        let mut attempt = 1;
        loop {
            match self.fetch_once(&url, timeout, options.maxdownload).await {
                Ok(outcome) => return Ok(outcome),
                Err(e) if e.is_retryable() && attempt < attempts => {
                    tracing::warn!(url = %url, attempt, attempts, error = %e, "fetch failed, retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_once(
        &self,
        url: &Url,
        timeout: Duration,
        max_bytes: usize,
    ) -> Result<FetchOutcome, FetchError> {
        let response = self
            .client
            .get(url.as_str())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url.as_str(), &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let is_html = content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("html"));
        if !is_html {
            tracing::debug!(url = %url, content_type = ?content_type, "not an HTML document");
            return Ok(FetchOutcome::NotHtml { content_type });
        }

        tracing::debug!(url = %url, max_bytes, "got an HTML document");
        let bytes = read_capped(response, max_bytes)
            .await
            .map_err(|e| FetchError::from_reqwest(url.as_str(), &e))?;

        Ok(FetchOutcome::Html(FetchedDocument {
            url: url.clone(),
            body: decode_capped(bytes, max_bytes),
        }))
    }
}

/// Decode a capped body as UTF-8 without growing it past `max_bytes`.
///
/// A character cut in half by the cap is dropped. Invalid bytes elsewhere
/// become U+FFFD, and the text is then cut back to a char boundary within
/// `max_bytes`.
fn decode_capped(mut bytes: Vec<u8>, max_bytes: usize) -> String {
    if let Err(e) = std::str::from_utf8(&bytes)
        && e.error_len().is_none()
    {
        bytes.truncate(e.valid_up_to());
    }

    let mut text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    };
    if text.len() > max_bytes {
        let mut cut = max_bytes;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        text.truncate(cut);
    }
    text
}

/// Read at most `max_bytes` of the body, then drop the connection.
async fn read_capped(
    mut response: reqwest::Response,
    max_bytes: usize,
) -> Result<Vec<u8>, reqwest::Error> {
    let mut body = Vec::with_capacity(max_bytes.min(64 * 1024));
    while body.len() < max_bytes {
        let Some(chunk) = response.chunk().await? else {
            break;
        };
        let remaining = max_bytes - body.len();
        body.extend_from_slice(&chunk[..chunk.len().min(remaining)]);
    }
    Ok(body)
}

/// Turn a URL as typed in chat into a request target.
///
/// `http` is upgraded to `https` when `http_rewrite` is set. Authority and
/// path are percent-encoded unless they already contain a `%`.
pub fn normalize_url(raw: &str, http_rewrite: bool) -> Result<Url, FetchError> {
    let invalid = |message: &str| FetchError::InvalidUrl {
        url: raw.to_string(),
        message: message.to_string(),
    };

    let (scheme, rest) = raw
        .split_once("://")
        .ok_or_else(|| invalid("missing scheme"))?;
    let scheme = if http_rewrite && scheme.eq_ignore_ascii_case("http") {
        "https"
    } else {
        scheme
    };

    let path_start = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let (authority, tail) = rest.split_at(path_start);
    let suffix_start = tail.find(['?', '#']).unwrap_or(tail.len());
    let (path, suffix) = tail.split_at(suffix_start);

    let target = format!(
        "{scheme}://{}{}{suffix}",
        encode_component(authority),
        encode_component(path)
    );
    Url::parse(&target).map_err(|e| invalid(&e.to_string()))
}

fn encode_component(component: &str) -> Cow<'_, str> {
    if component.contains('%') || component.chars().all(|c| c.is_ascii_graphic()) {
        return Cow::Borrowed(component);
    }

    let mut encoded = String::with_capacity(component.len() * 3);
    let mut buf = [0_u8; 4];
    for c in component.chars() {
        if c.is_ascii_graphic() {
            encoded.push(c);
        } else {
            encoded.push_str(&urlencoding::encode(c.encode_utf8(&mut buf)));
        }
    }
    Cow::Owned(encoded)
}
