use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::{Mutex, mpsc};

// Use tokio_rustls's re-export of rustls types
use tokio_rustls::rustls;

use super::auth::encode_sasl_plain;
use super::message::{privmsg_payload_limit, split_message};
use super::parse::{IrcMessage, is_channel_name};
use crate::config::NetworkConfig;
use crate::error::TransportError;
use crate::links::IncomingMessage;

/// Read timeout for IRC. If no data arrives within this duration, the
/// connection is considered dead. IRC servers typically PING every 60-120s.
const READ_TIMEOUT: Duration = Duration::from_secs(300);

const INITIAL_BACKOFF: Duration = Duration::from_secs(2);
const MAX_BACKOFF: Duration = Duration::from_secs(300);

/// A session that lasted this long resets the reconnect backoff.
const STABLE_SESSION: Duration = Duration::from_secs(60);

trait IrcStream: AsyncRead + AsyncWrite + Unpin + Send {}
impl<T: AsyncRead + AsyncWrite + Unpin + Send> IrcStream for T {}

type WriteHalf = tokio::io::WriteHalf<Box<dyn IrcStream>>;

#[derive(Debug, Default)]
struct SessionState {
    registered: bool,
    nick: String,
    /// Joined channels, keyed by lowercase name.
    joined: HashMap<String, String>,
    sasl_pending: bool,
}

/// One IRC network connection.
///
/// Forwards every PRIVMSG it sees (and every PRIVMSG it sends, with an
/// empty nick) to the event queue, and tracks which channels are joined so
/// that output targets can be resolved.
pub struct IrcConnection {
    network: NetworkConfig,
    username: String,
    events: mpsc::UnboundedSender<IncomingMessage>,
    /// Write half of the current session, if connected.
    writer: Mutex<Option<WriteHalf>>,
    state: StdMutex<SessionState>,
}

impl IrcConnection {
    pub fn new(network: NetworkConfig, events: mpsc::UnboundedSender<IncomingMessage>) -> Self {
        let username = network
            .username
            .clone()
            .unwrap_or_else(|| network.nickname.clone());
        Self {
            network,
            username,
            events,
            writer: Mutex::new(None),
            state: StdMutex::new(SessionState::default()),
        }
    }

    /// Network name, the `server` half of `server,channel` patterns.
    pub fn name(&self) -> &str {
        &self.network.name
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Our nickname, once registered.
    pub fn current_nick(&self) -> Option<String> {
        let state = self.state();
        state.registered.then(|| state.nick.clone())
    }

    /// Canonical name of `target` if we can currently talk to it: a joined
    /// channel, or any nick while registered.
    pub fn resolve(&self, target: &str) -> Option<String> {
        let state = self.state();
        if !state.registered {
            return None;
        }
        if is_channel_name(target) {
            state.joined.get(&target.to_lowercase()).cloned()
        } else {
            Some(target.to_string())
        }
    }

    /// Send `text` to `target`, one PRIVMSG per line, and echo the first
    /// sent line to the event queue as an outbound message.
    ///
    /// Continuation lines are not echoed: only the first carries the
    /// `url|N): ` marker, so a URL in a later piece of a long title would
    /// otherwise be fetched again.
    pub async fn send_privmsg(&self, target: &str, text: &str) -> anyhow::Result<()> {
        let mut guard = self.writer.lock().await;
        let writer = guard.as_mut().ok_or_else(|| TransportError::NotConnected {
            network: self.network.name.clone(),
        })?;

        let chunks = split_message(text, privmsg_payload_limit(target));
        for (i, chunk) in chunks.into_iter().filter(|c| !c.is_empty()).enumerate() {
            send_raw(writer, &format!("PRIVMSG {target} :{chunk}"))
                .await
                .map_err(|e| TransportError::Send {
                    network: self.network.name.clone(),
                    message: e.to_string(),
                })?;
            if i == 0 {
                let _ = self
                    .events
                    .send(IncomingMessage::outbound(&self.network.name, target, chunk));
            }
        }
        Ok(())
    }

    #[cfg(test)]
    pub(super) async fn attach<S>(&self, stream: S)
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let boxed: Box<dyn IrcStream> = Box::new(stream);
        let (_, writer) = tokio::io::split(boxed);
        *self.writer.lock().await = Some(writer);
    }

    /// Say goodbye to the server, if connected.
    pub async fn quit(&self, reason: &str) {
        let mut guard = self.writer.lock().await;
        if let Some(writer) = guard.as_mut() {
            let _ = send_raw(writer, &format!("QUIT :{reason}")).await;
        }
        *guard = None;
    }

    /// Keep the connection up forever, reconnecting with exponential backoff.
    pub async fn run(&self) {
        let mut backoff = INITIAL_BACKOFF;
        loop {
            let started = Instant::now();
            match self.session().await {
                Ok(()) => tracing::info!(network = %self.network.name, "IRC connection closed"),
                Err(e) => {
                    tracing::warn!(network = %self.network.name, error = %e, "IRC connection failed");
                }
            }
            self.reset().await;

            if started.elapsed() >= STABLE_SESSION {
                backoff = INITIAL_BACKOFF;
            }
            tracing::info!(network = %self.network.name, delay = ?backoff, "IRC reconnecting");
            tokio::time::sleep(backoff).await;
            backoff = (backoff * 2).min(MAX_BACKOFF);
        }
    }

    async fn reset(&self) {
        *self.writer.lock().await = None;
        *self.state() = SessionState::default();
    }

    /// Open a plain or TLS connection to the server.
    async fn connect(&self) -> anyhow::Result<Box<dyn IrcStream>> {
        let addr = format!("{}:{}", self.network.server, self.network.port);
        let tcp = tokio::net::TcpStream::connect(&addr)
            .await
            .map_err(|e| TransportError::Connection {
                network: self.network.name.clone(),
                message: format!("{addr}: {e}"),
            })?;

        if !self.network.tls {
            return Ok(Box::new(tcp));
        }

        let root_store: rustls::RootCertStore =
            webpki_roots::TLS_SERVER_ROOTS.iter().cloned().collect();
        let tls_config = rustls::ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();
        let connector = tokio_rustls::TlsConnector::from(Arc::new(tls_config));
        let domain = rustls::pki_types::ServerName::try_from(self.network.server.clone())?;
        let tls = connector.connect(domain, tcp).await?;

        Ok(Box::new(tls))
    }

    /// One connection lifetime: register, then read until the link drops.
    async fn session(&self) -> anyhow::Result<()> {
        let nick = self.network.nickname.clone();
        tracing::info!(
            network = %self.network.name,
            "IRC connecting to {}:{} as {nick}",
            self.network.server,
            self.network.port
        );

        let stream = self.connect().await?;
        let (reader, mut writer) = tokio::io::split(stream);

        let sasl = self.network.sasl_password.is_some();
        if sasl {
            send_raw(&mut writer, "CAP REQ :sasl").await?;
        }
        if let Some(ref pass) = self.network.server_password {
            send_raw(&mut writer, &format!("PASS {pass}")).await?;
        }
        send_raw(&mut writer, &format!("NICK {nick}")).await?;
        send_raw(
            &mut writer,
            &format!("USER {} 0 * :urltitel", self.username),
        )
        .await?;

        *self.writer.lock().await = Some(writer);
        {
            let mut state = self.state();
            state.nick = nick;
            state.sasl_pending = sasl;
        }

        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let n = tokio::time::timeout(READ_TIMEOUT, reader.read_until(b'\n', &mut buf))
                .await
                .map_err(|_| {
                    anyhow::anyhow!("IRC read timed out (no data for {READ_TIMEOUT:?})")
                })??;
            if n == 0 {
                return Ok(());
            }

            let line = String::from_utf8_lossy(&buf);
            if let Some(msg) = IrcMessage::parse(&line) {
                self.handle_line(&msg).await?;
            }
        }
    }

    /// React to one server line.
    #[allow(clippy::too_many_lines)]
    pub(super) async fn handle_line(&self, msg: &IrcMessage) -> anyhow::Result<()> {
        match msg.command.as_str() {
            "PING" => {
                self.write_line(&format!("PONG :{}", msg.param(0))).await?;
            }

            // CAP responses for SASL
            "CAP" => {
                if !self.state().sasl_pending || !msg.params.iter().any(|p| p.contains("sasl")) {
                    return Ok(());
                }
                if msg.params.iter().any(|p| p == "ACK") {
                    self.write_line("AUTHENTICATE PLAIN").await?;
                } else if msg.params.iter().any(|p| p == "NAK") {
                    tracing::warn!(
                        network = %self.network.name,
                        "IRC server does not support SASL, continuing without it"
                    );
                    self.state().sasl_pending = false;
                    self.write_line("CAP END").await?;
                }
            }

            "AUTHENTICATE" => {
                let reply = {
                    let state = self.state();
                    (state.sasl_pending && msg.param(0) == "+").then(|| {
                        encode_sasl_plain(
                            &state.nick,
                            self.network.sasl_password.as_deref().unwrap_or(""),
                        )
                    })
                };
                if let Some(encoded) = reply {
                    self.write_line(&format!("AUTHENTICATE {encoded}")).await?;
                }
            }

            // RPL_SASLSUCCESS
            "903" => {
                self.state().sasl_pending = false;
                self.write_line("CAP END").await?;
            }

            // SASL failure
            "904" | "905" | "906" | "907" => {
                tracing::warn!(network = %self.network.name, "IRC SASL authentication failed ({})", msg.command);
                self.state().sasl_pending = false;
                self.write_line("CAP END").await?;
            }

            // RPL_WELCOME: registration complete, the first param is our nick
            "001" => {
                let nick = {
                    let mut state = self.state();
                    state.registered = true;
                    if !msg.param(0).is_empty() {
                        state.nick = msg.param(0).to_string();
                    }
                    state.nick.clone()
                };
                tracing::info!(network = %self.network.name, "IRC registered as {nick}");

                if let Some(ref pass) = self.network.nickserv_password {
                    self.write_line(&format!("PRIVMSG NickServ :IDENTIFY {pass}"))
                        .await?;
                }
                for channel in &self.network.channels {
                    self.write_line(&format!("JOIN {channel}")).await?;
                }
            }

            // ERR_NICKNAMEINUSE
            "433" => {
                let alt = {
                    let mut state = self.state();
                    if state.registered {
                        return Ok(());
                    }
                    let alt = format!("{}_", state.nick);
                    tracing::warn!(network = %self.network.name, "IRC nickname {} is in use, trying {alt}", state.nick);
                    state.nick.clone_from(&alt);
                    alt
                };
                self.write_line(&format!("NICK {alt}")).await?;
            }

            "NICK" => {
                let mut state = self.state();
                if msg.nick().is_some_and(|n| n.eq_ignore_ascii_case(&state.nick)) {
                    state.nick = msg.param(0).to_string();
                }
            }

            "JOIN" => {
                let mut state = self.state();
                if msg.nick().is_some_and(|n| n.eq_ignore_ascii_case(&state.nick)) {
                    let channel = msg.param(0).to_string();
                    tracing::debug!(network = %self.network.name, channel = %channel, "joined");
                    state.joined.insert(channel.to_lowercase(), channel);
                }
            }

            "PART" => {
                let mut state = self.state();
                if msg.nick().is_some_and(|n| n.eq_ignore_ascii_case(&state.nick)) {
                    state.joined.remove(&msg.param(0).to_lowercase());
                }
            }

            "KICK" => {
                let mut state = self.state();
                if msg.param(1).eq_ignore_ascii_case(&state.nick) {
                    tracing::warn!(network = %self.network.name, channel = msg.param(0), "kicked");
                    state.joined.remove(&msg.param(0).to_lowercase());
                }
            }

            "PRIVMSG" => {
                if !self.state().registered {
                    return Ok(());
                }

                let target = msg.param(0);
                let text = msg.param(1);
                let sender = msg.nick().unwrap_or("unknown");

                // Skip messages from NickServ/ChanServ
                if sender.eq_ignore_ascii_case("NickServ") || sender.eq_ignore_ascii_case("ChanServ")
                {
                    return Ok(());
                }

                // A private message belongs to the conversation with its sender
                let channel = if is_channel_name(target) { target } else { sender };
                let message = IncomingMessage::new(&self.network.name, channel, sender, text);
                if self.events.send(message).is_err() {
                    anyhow::bail!("event queue closed");
                }
            }

            "ERROR" => {
                anyhow::bail!("IRC server closed the link: {}", msg.param(0));
            }

            // ERR_PASSWDMISMATCH
            "464" => {
                anyhow::bail!("IRC password mismatch");
            }

            _ => {}
        }
        Ok(())
    }

    async fn write_line(&self, line: &str) -> anyhow::Result<()> {
        let mut guard = self.writer.lock().await;
        if let Some(writer) = guard.as_mut() {
            send_raw(writer, line).await?;
        }
        Ok(())
    }
}

/// Send a raw IRC line (appends \r\n).
async fn send_raw<W: AsyncWrite + Unpin>(writer: &mut W, line: &str) -> anyhow::Result<()> {
    let data = format!("{line}\r\n");
    writer.write_all(data.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}
