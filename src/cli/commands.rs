use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// `urltitel` - Announces the titles of web pages linked in IRC channels.
#[derive(Parser, Debug)]
#[command(name = "urltitel")]
#[command(version)]
#[command(about = "Fetch and announce the titles of URLs posted in chat.", long_about = None)]
pub struct Cli {
    /// Config file to use instead of ~/.urltitel/config.toml
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log at debug level regardless of the `debug` option
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Connect to every configured network and announce titles until Ctrl-C
    Run,

    /// Push one chat line through the pipeline and print what would be shown
    Check {
        /// Message text
        text: String,

        /// Server (network) name the message appears on
        #[arg(long, default_value = "console")]
        server: String,

        /// Channel the message appears in
        #[arg(long, default_value = "#console")]
        channel: String,

        /// Speaker nick; an empty nick marks the line as our own
        #[arg(long, default_value = "someone")]
        nick: String,
    },

    /// Read or change options
    Config {
        #[command(subcommand)]
        config_command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show every option with its current value
    List,
    /// Print the value of one option
    Get {
        /// Option name
        name: String,
    },
    /// Change one option and save the config file
    Set {
        /// Option name
        name: String,
        /// New value (`on`/`off`, a number, or `server,channel|...`)
        value: String,
    },
}
