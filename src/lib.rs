//! Automation of a signed-in YouTube account through the site's own web
//! endpoints: clearing playlists, Watch Later, Favorites and watch history,
//! removing single entries, and toggling search history recording.

pub mod client;
pub mod error;
pub mod headers;
pub mod initial;
pub mod iterator;
pub mod login;
pub mod parsing;
pub mod path;
pub mod session;
pub mod session_persistence;
pub mod r#trait;
pub mod types;
pub mod ytcfg;

pub use client::{YouTubeClient, WATCH_LATER_ID};
pub use error::YouTubeError;
pub use iterator::{
    AsyncPaginatedIterator, ContinuationKind, ContinuationPager, HistoryEntries, PlaylistEntries,
};
pub use path::PathError;
pub use r#trait::YouTubeAccount;
#[cfg(feature = "mock")]
pub use r#trait::MockYouTubeAccount;
pub use session::{Cookie, CookieJar};
pub use session_persistence::CookiePersistence;
pub use types::{ClientConfig, ContinuationCursor, HistoryEntry, PlaylistEntry};
pub use ytcfg::{PageConfig, ServiceContext};

pub type Result<T> = std::result::Result<T, YouTubeError>;
