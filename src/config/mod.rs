pub mod hot_reload;
pub mod options;
pub mod schema;

pub use hot_reload::ConfigHandle;
pub use options::{OPTION_DESCRIPTIONS, Options};
pub use schema::{Config, DEFAULT_TORRENT_API, NetworkConfig};
