use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

use super::{FileLogBuffer, Host, LogBuffer, Target};
use crate::links::ServerChannel;

/// Host for one-off runs from the terminal: every conversation resolves,
/// displayed lines go to stdout and sent lines are shown with a `>>` marker.
pub struct ConsoleHost {
    nick: String,
    log_path: PathBuf,
}

impl ConsoleHost {
    pub fn new(nick: impl Into<String>, log_path: PathBuf) -> Self {
        Self {
            nick: nick.into(),
            log_path,
        }
    }
}

#[async_trait]
impl Host for ConsoleHost {
    fn resolve_target(&self, srvchan: &ServerChannel) -> Option<Target> {
        Some(Target::new(&srvchan.server, &srvchan.channel))
    }

    async fn send(&self, target: &Target, text: &str) -> anyhow::Result<()> {
        println!("{}/{} >> {text}", target.server, target.channel);
        Ok(())
    }

    async fn print(&self, target: &Target, line: &str) -> anyhow::Result<()> {
        println!("{}/{}\t{line}", target.server, target.channel);
        Ok(())
    }

    fn own_nick(&self, _server: &str) -> Option<String> {
        Some(self.nick.clone())
    }

    fn open_log_buffer(&self) -> anyhow::Result<Arc<dyn LogBuffer>> {
        Ok(Arc::new(FileLogBuffer::open(&self.log_path)?))
    }
}
