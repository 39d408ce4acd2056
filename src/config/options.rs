use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::links::ServerChannelList;

/// The user-facing option store.
///
/// Every option can be read and written as a string through [`Options::get`]
/// and [`Options::set`], using the same spellings as the config file
/// (`on`/`off` for switches, pipe-separated `server,channel` lists).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Seconds to wait for each HTTP request.
    #[serde(with = "number")]
    pub timeout: u64,
    /// Make a second attempt when the first fetch fails.
    #[serde(with = "switch")]
    pub retry: bool,
    /// Maximum title length in characters before truncation.
    #[serde(with = "number")]
    pub maxlength: usize,
    /// Maximum number of body bytes read from an HTML response.
    #[serde(with = "number")]
    pub maxdownload: usize,
    /// Server/channel pairs whose messages are parsed.
    pub serverchans: ServerChannelList,
    /// Server/channel pairs that get titles sent into the channel.
    pub replyto: ServerChannelList,
    /// Always send titles for URLs we posted ourselves.
    #[serde(with = "switch")]
    pub sendfromme: bool,
    /// Collect URLs and titles in the URL buffer.
    #[serde(with = "switch")]
    pub urlbuffer: bool,
    /// Fetch `http://` URLs over `https://`.
    #[serde(with = "switch")]
    pub http_rewrite: bool,
    /// Show debug messages.
    #[serde(with = "switch")]
    pub debug: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            timeout: 3,
            retry: false,
            maxlength: 200,
            maxdownload: 262_144,
            serverchans: ServerChannelList::any(),
            replyto: ServerChannelList::default(),
            sendfromme: false,
            urlbuffer: false,
            http_rewrite: true,
            debug: false,
        }
    }
}

/// Name, default value and description of every option.
pub const OPTION_DESCRIPTIONS: &[(&str, &str, &str)] = &[
    ("timeout", "3", "Maximum time to wait to fetch URL."),
    ("retry", "off", "Retry fetching URL if it fails the first time."),
    ("maxlength", "200", "Maximum length of title."),
    ("maxdownload", "262144", "Maximum size (Bytes) to fetch from URL."),
    (
        "serverchans",
        "*,*",
        "\"|\" separated list of server,#channel to parse. for instance: \"server0,#channel1|server0,#channel2\"",
    ),
    (
        "replyto",
        "",
        "\"|\" separated list of server,#channel for which instead of displaying locally a message we send it to the channel.",
    ),
    ("sendfromme", "off", "Always send titles for URLs sent by ourself."),
    ("urlbuffer", "off", "Create a buffer to collect the URLs with their titles."),
    ("http_rewrite", "on", "Fetch http:// URLs over https://."),
    ("debug", "off", "Show debug messages."),
];

impl Options {
    /// Number of fetch attempts per URL.
    pub fn attempts(&self) -> usize {
        if self.retry { 2 } else { 1 }
    }

    /// Read an option as its string form.
    pub fn get(&self, name: &str) -> Result<String, ConfigError> {
        let value = match name {
            "timeout" => self.timeout.to_string(),
            "retry" => switch::render(self.retry).to_string(),
            "maxlength" => self.maxlength.to_string(),
            "maxdownload" => self.maxdownload.to_string(),
            "serverchans" => self.serverchans.to_string(),
            "replyto" => self.replyto.to_string(),
            "sendfromme" => switch::render(self.sendfromme).to_string(),
            "urlbuffer" => switch::render(self.urlbuffer).to_string(),
            "http_rewrite" => switch::render(self.http_rewrite).to_string(),
            "debug" => switch::render(self.debug).to_string(),
            other => return Err(ConfigError::UnknownOption(other.to_string())),
        };
        Ok(value)
    }

    /// Write an option from its string form, validating the value.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), ConfigError> {
        match name {
            "timeout" => self.timeout = parse_number(name, value)?,
            "retry" => self.retry = parse_switch(name, value)?,
            "maxlength" => self.maxlength = parse_number(name, value)?,
            "maxdownload" => self.maxdownload = parse_number(name, value)?,
            "serverchans" => self.serverchans = ServerChannelList::parse(value),
            "replyto" => self.replyto = ServerChannelList::parse(value),
            "sendfromme" => self.sendfromme = parse_switch(name, value)?,
            "urlbuffer" => self.urlbuffer = parse_switch(name, value)?,
            "http_rewrite" => self.http_rewrite = parse_switch(name, value)?,
            "debug" => self.debug = parse_switch(name, value)?,
            other => return Err(ConfigError::UnknownOption(other.to_string())),
        }
        Ok(())
    }

    /// Names of the options whose value differs between `self` and `other`.
    pub fn changed(&self, other: &Options) -> Vec<&'static str> {
        OPTION_DESCRIPTIONS
            .iter()
            .map(|(name, _, _)| *name)
            .filter(|name| self.get(name).ok() != other.get(name).ok())
            .collect()
    }

    /// `(name, current value, description with default)` rows for display.
    pub fn describe(&self) -> Vec<(&'static str, String, String)> {
        OPTION_DESCRIPTIONS
            .iter()
            .map(|(name, default, desc)| {
                let value = self.get(name).unwrap_or_default();
                (*name, value, format!("{desc} (default: {default})"))
            })
            .collect()
    }
}

fn parse_switch(name: &str, value: &str) -> Result<bool, ConfigError> {
    switch::parse(value).ok_or_else(|| {
        ConfigError::Validation(format!("{name} must be \"on\" or \"off\", got {value:?}"))
    })
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| {
        ConfigError::Validation(format!("{name} must be a non-negative integer, got {value:?}"))
    })
}

/// `on`/`off` switches, also accepting TOML booleans.
mod switch {
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn parse(value: &str) -> Option<bool> {
        match value.trim().to_ascii_lowercase().as_str() {
            "on" | "true" | "yes" | "1" => Some(true),
            "off" | "false" | "no" | "0" => Some(false),
            _ => None,
        }
    }

    pub(super) fn render(value: bool) -> &'static str {
        if value { "on" } else { "off" }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Text(String),
    }

    pub(super) fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(render(*value))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Bool(b) => Ok(b),
            Raw::Text(s) => parse(&s)
                .ok_or_else(|| serde::de::Error::custom(format!("expected on/off, got {s:?}"))),
        }
    }
}

/// Numbers written either as TOML integers or as quoted strings.
mod number {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::fmt::Display;
    use std::str::FromStr;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(u64),
        Text(String),
    }

    pub(super) fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        value.serialize(serializer)
    }

    pub(super) fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: FromStr + TryFrom<u64>,
        <T as FromStr>::Err: Display,
        D: Deserializer<'de>,
    {
        match Raw::deserialize(deserializer)? {
            Raw::Int(n) => T::try_from(n)
                .map_err(|_| serde::de::Error::custom(format!("{n} is out of range"))),
            Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
        }
    }
}
