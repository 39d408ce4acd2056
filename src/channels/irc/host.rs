use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

use super::connection::IrcConnection;
use crate::error::TransportError;
use crate::host::{FileLogBuffer, Host, LogBuffer, Target};
use crate::links::ServerChannel;

/// [`Host`] backed by a set of IRC connections.
///
/// Sent lines go out as PRIVMSGs; displayed lines are local-only and are
/// printed to stdout with their network and channel.
pub struct IrcHost {
    connections: Vec<Arc<IrcConnection>>,
    log_path: PathBuf,
}

impl IrcHost {
    pub fn new(connections: Vec<Arc<IrcConnection>>, log_path: PathBuf) -> Self {
        Self {
            connections,
            log_path,
        }
    }

    fn connection(&self, network: &str) -> Option<&Arc<IrcConnection>> {
        self.connections
            .iter()
            .find(|conn| conn.name().eq_ignore_ascii_case(network))
    }
}

#[async_trait]
impl Host for IrcHost {
    fn resolve_target(&self, srvchan: &ServerChannel) -> Option<Target> {
        let conn = self.connection(&srvchan.server)?;
        let channel = conn.resolve(&srvchan.channel)?;
        Some(Target::new(conn.name(), channel))
    }

    async fn send(&self, target: &Target, text: &str) -> anyhow::Result<()> {
        let conn = self
            .connection(&target.server)
            .ok_or_else(|| TransportError::NotConnected {
                network: target.server.clone(),
            })?;
        conn.send_privmsg(&target.channel, text).await
    }

    async fn print(&self, target: &Target, line: &str) -> anyhow::Result<()> {
        println!("{}/{}\t{line}", target.server, target.channel);
        Ok(())
    }

    fn own_nick(&self, server: &str) -> Option<String> {
        self.connection(server)?.current_nick()
    }

    fn open_log_buffer(&self) -> anyhow::Result<Arc<dyn LogBuffer>> {
        Ok(Arc::new(FileLogBuffer::open(&self.log_path)?))
    }
}
