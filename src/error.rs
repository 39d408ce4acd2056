use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `urltitel`.
///
/// Each subsystem defines its own error variant. Library callers can match on
/// these to decide recovery strategy; the binary continues to use
/// `anyhow::Result` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum UrltitelError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Document fetch ──────────────────────────────────────────────────
    #[error("fetch: {0}")]
    Fetch(#[from] FetchError),

    // ── Secondary metadata lookup ───────────────────────────────────────
    #[error("metadata: {0}")]
    Metadata(#[from] MetadataError),

    // ── Transport / Host ────────────────────────────────────────────────
    #[error("transport: {0}")]
    Transport(#[from] TransportError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("unknown option: {0}")]
    UnknownOption(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Fetch errors ────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid url {url}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("timed out while fetching {url}")]
    Timeout { url: String },

    #[error("cannot fetch {url}: {message}")]
    Network { url: String, message: String },

    #[error("cannot fetch {url}: HTTP {status}")]
    Status { url: String, status: u16 },
}

impl FetchError {
    /// Whether another attempt may succeed. Malformed URLs never will.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::InvalidUrl { .. })
    }

    pub(crate) fn from_reqwest(url: &str, err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else if let Some(status) = err.status() {
            Self::Status {
                url: url.to_string(),
                status: status.as_u16(),
            }
        } else {
            Self::Network {
                url: url.to_string(),
                message: err.to_string(),
            }
        }
    }
}

// ─── Metadata lookup errors ──────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("metadata request for id {id} failed: {message}")]
    Request { id: u64, message: String },

    #[error("metadata response for id {id} could not be decoded: {message}")]
    Decode { id: u64, message: String },

    #[error("no metadata for id {id}")]
    NotFound { id: u64 },
}

// ─── Transport errors ───────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("network {network} connection failed: {message}")]
    Connection { network: String, message: String },

    #[error("network {network} send failed: {message}")]
    Send { network: String, message: String },

    #[error("network {network} is not connected")]
    NotConnected { network: String },
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, UrltitelError>;
