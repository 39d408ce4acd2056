//! Seams between the title pipeline and whatever carries the conversation.
//!
//! The pipeline never talks to a network or a terminal directly. It resolves
//! targets, sends, prints and logs through a [`Host`], which the binary
//! implements on top of IRC connections and the console.

pub mod console;
pub mod file_buffer;

use async_trait::async_trait;
use std::sync::Arc;

use crate::links::ServerChannel;

pub use console::ConsoleHost;
pub use file_buffer::FileLogBuffer;

/// A live output location, as resolved by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub server: String,
    pub channel: String,
}

impl Target {
    pub fn new(server: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            channel: channel.into(),
        }
    }
}

/// Output primitives and identity provided by the host.
#[async_trait]
pub trait Host: Send + Sync {
    /// Current output target for a conversation, `None` if it is gone
    /// (channel parted, connection lost).
    fn resolve_target(&self, srvchan: &ServerChannel) -> Option<Target>;

    /// Transmit `text` into the conversation.
    async fn send(&self, target: &Target, text: &str) -> anyhow::Result<()>;

    /// Show `line` to the local operator only.
    async fn print(&self, target: &Target, line: &str) -> anyhow::Result<()>;

    /// Our own nickname on `server`.
    fn own_nick(&self, server: &str) -> Option<String>;

    /// Create the URL log buffer.
    fn open_log_buffer(&self) -> anyhow::Result<Arc<dyn LogBuffer>>;
}

/// Append-only output pane owned by the host.
///
/// The host may invalidate a buffer at any time; holders check
/// [`LogBuffer::is_open`] and ask the host for a new one.
pub trait LogBuffer: Send + Sync {
    fn is_open(&self) -> bool;

    fn print(&self, line: &str) -> anyhow::Result<()>;

    fn close(&self);
}
