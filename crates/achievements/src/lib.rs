//! Achievement acquisition for a Steam title.
//!
//! Two untrusted public sources are supported: the SteamDB stats page and
//! the Steam Community achievements page. Both are normalized into the
//! same [`Achievement`] record shape, persisted as a JSON array, and
//! their icons fetched through a deduplicated, bounded worker pool.

mod acquire;
mod download;
mod error;
mod parse;
mod types;

pub use acquire::{Acquisition, COMMUNITY_BASE, STEAMDB_BASE, Source};
pub use download::{DEFAULT_CDN_BASE, DownloadReport, IconDownloader, POOL_SIZE};
pub use error::{FetchError, ParseError};
pub use parse::{parse_steamcommunity, parse_steamdb};
pub use types::Achievement;
