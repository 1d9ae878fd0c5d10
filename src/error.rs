use thiserror::Error;

use crate::path::PathError;

/// Error types for YouTube account operations.
///
/// Every failure surfaces to the direct caller. Nothing is retried internally;
/// the only local recoveries are the "history already empty" and "no matching
/// entry" cases handled by the individual operations.
///
/// # Error Handling Examples
///
/// ```rust,no_run
/// use youtube_unofficial::{YouTubeClient, YouTubeError};
///
/// #[tokio::main]
/// async fn main() {
///     let mut client = YouTubeClient::new(Box::new(http_client::native::NativeClient::new()));
///
///     match client.clear_watch_history().await {
///         Ok(()) => println!("History cleared"),
///         Err(YouTubeError::Auth(msg)) => eprintln!("Log in first: {}", msg),
///         Err(YouTubeError::UnexpectedResult(msg)) => eprintln!("Rejected: {}", msg),
///         Err(e) => eprintln!("Other error: {}", e),
///     }
/// }
/// ```
#[derive(Error, Debug)]
pub enum YouTubeError {
    /// HTTP/network related errors.
    ///
    /// Connection failures, timeouts, redirect loops and non-success status
    /// codes from the transport.
    #[error("HTTP error: {0}")]
    Http(String),

    /// An operation requiring a logged-in session was called without one.
    #[error("Authentication required: {0}")]
    Auth(String),

    /// An expected structural element of a page is absent.
    ///
    /// Raised for a missing `ytcfg` block, a missing initial-data assignment or
    /// a missing required token. Usually means the session is logged out or the
    /// site layout changed.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A dotted-path lookup into page state failed.
    #[error("Lookup failed: {0}")]
    Lookup(#[from] PathError),

    /// The server accepted the request but did not report success.
    #[error("Unexpected result: {0}")]
    UnexpectedResult(String),

    /// A response body could not be decoded into the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// File system I/O errors (cookie jar, debug dumps).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl YouTubeError {
    /// The error returned by every operation invoked before [`login`](crate::YouTubeClient::login).
    pub(crate) fn login_required() -> Self {
        YouTubeError::Auth("This method requires a call to login() first".to_string())
    }
}
