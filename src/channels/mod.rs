//! Chat transports that feed the title pipeline.

pub mod irc;

pub use irc::{IrcConnection, IrcHost};
