use anyhow::{Context, Result};
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::options::Options;
use crate::error::ConfigError;

/// Default metadata API queried for torrent description pages.
pub const DEFAULT_TORRENT_API: &str = "https://apibay.org/t.php";

const URL_BUFFER_FILE: &str = "urlbuffer.log";

// ── Top-level config ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory - computed from home, not serialized
    #[serde(skip)]
    pub data_dir: PathBuf,
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Base URL of the torrent metadata API, queried as `?id=<n>`.
    #[serde(default = "default_torrent_api")]
    pub torrent_api: String,

    /// How many URLs of one message are fetched at the same time.
    #[serde(default = "default_parallel_fetches")]
    pub parallel_fetches: usize,

    /// Where the URL buffer is written. Defaults to `urlbuffer.log` in the data directory.
    #[serde(default)]
    pub url_buffer_path: Option<PathBuf>,

    #[serde(default)]
    pub options: Options,

    #[serde(default)]
    pub networks: Vec<NetworkConfig>,
}

fn default_torrent_api() -> String {
    DEFAULT_TORRENT_API.into()
}

fn default_parallel_fetches() -> usize {
    1
}

impl Default for Config {
    fn default() -> Self {
        let home =
            UserDirs::new().map_or_else(|| PathBuf::from("."), |u| u.home_dir().to_path_buf());
        let data_dir = home.join(".urltitel");

        Self {
            config_path: data_dir.join("config.toml"),
            data_dir,
            options: Options::default(),
            torrent_api: default_torrent_api(),
            parallel_fetches: default_parallel_fetches(),
            url_buffer_path: None,
            networks: Vec::new(),
        }
    }
}

// ── IRC networks ──────────────────────────────────────────────────

/// One IRC network to connect to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Name used as the `server` half of `server,channel` patterns
    pub name: String,
    /// IRC server hostname
    pub server: String,
    /// IRC server port (default: 6697 for TLS)
    #[serde(default = "default_irc_port")]
    pub port: u16,
    /// Connect over TLS (default: true)
    #[serde(default = "default_true")]
    pub tls: bool,
    /// Bot nickname
    pub nickname: String,
    /// Username (defaults to nickname if not set)
    pub username: Option<String>,
    /// Channels to join on connect
    #[serde(default)]
    pub channels: Vec<String>,
    /// Server password (for bouncers like ZNC)
    pub server_password: Option<String>,
    /// `NickServ` IDENTIFY password
    pub nickserv_password: Option<String>,
    /// SASL PLAIN password (`IRCv3`)
    pub sasl_password: Option<String>,
}

fn default_irc_port() -> u16 {
    6697
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load `~/.urltitel/config.toml`, seeding it with defaults on first run.
    pub fn load_or_init() -> Result<Self> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .context("Could not find home directory")?;
        let data_dir = home.join(".urltitel");
        Self::load_or_init_at(&data_dir.join("config.toml"))
    }

    /// Load the config at `config_path`, writing defaults there if it does not exist.
    pub fn load_or_init_at(config_path: &Path) -> Result<Self> {
        let data_dir = config_path
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

        if !data_dir.exists() {
            fs::create_dir_all(&data_dir).context("Failed to create config directory")?;
        }

        if config_path.exists() {
            Self::load_from(config_path)
        } else {
            let config = Self {
                config_path: config_path.to_path_buf(),
                data_dir,
                ..Self::default()
            };
            config.validate()?;
            config.save()?;
            Ok(config)
        }
    }

    /// Read and validate an existing config file.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(config_path).with_context(|| {
            format!("Failed to read config file {}", config_path.display())
        })?;
        let mut config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::Load(format!("{}: {e}", config_path.display())))?;
        // Set computed paths that are skipped during serialization
        config.config_path = config_path.to_path_buf();
        config.data_dir = config_path
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.options.timeout == 0 {
            return Err(ConfigError::Validation("timeout must be at least 1 second".into()));
        }
        if self.options.maxdownload == 0 {
            return Err(ConfigError::Validation("maxdownload must be positive".into()));
        }
        if self.parallel_fetches == 0 {
            return Err(ConfigError::Validation(
                "parallel_fetches must be at least 1".into(),
            ));
        }
        url::Url::parse(&self.torrent_api).map_err(|e| {
            ConfigError::Validation(format!("torrent_api {:?} is not a URL: {e}", self.torrent_api))
        })?;

        let mut seen = std::collections::HashSet::new();
        for network in &self.networks {
            if network.name.trim().is_empty() || network.name.contains([',', '|']) {
                return Err(ConfigError::Validation(format!(
                    "network name {:?} must be non-empty and contain no ',' or '|'",
                    network.name
                )));
            }
            if !seen.insert(network.name.to_ascii_lowercase()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate network name {:?}",
                    network.name
                )));
            }
            if network.nickname.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "network {} has no nickname",
                    network.name
                )));
            }
        }
        Ok(())
    }

    /// Resolved location of the URL buffer file.
    pub fn url_buffer_file(&self) -> PathBuf {
        self.url_buffer_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join(URL_BUFFER_FILE))
    }

    pub fn save(&self) -> Result<()> {
        let toml_str = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&self.config_path, toml_str).context("Failed to write config file")?;
        Ok(())
    }
}
