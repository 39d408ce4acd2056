pub mod detector;
pub mod fetcher;
pub mod policy;
pub mod title;
pub mod torrent;
pub mod types;

pub use detector::{detect_urls, echo_line, is_echo};
pub use fetcher::{DocumentFetcher, USER_AGENT, normalize_url};
pub use policy::{ServerChannel, ServerChannelList};
pub use title::{TitleExtractor, parse_title, truncate_title};
pub use torrent::TorrentResolver;
pub use types::{FetchOutcome, FetchedDocument, IncomingMessage, Torrent};
