mod auth;
mod connection;
mod host;
mod message;
mod parse;

pub use connection::IrcConnection;
pub use host::IrcHost;
