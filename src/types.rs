//! Data types for YouTube account state and client configuration.
//!
//! This module contains the items yielded by the playlist and history pagers,
//! the continuation cursor they walk, and the client configuration.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

use crate::path::{path_opt, path_str};
use crate::Result;

// ================================================================================================
// PAGINATED ITEMS
// ================================================================================================

/// Render a text object (`{"runs": [...]}` or `{"simpleText": "..."}`) as plain text.
pub fn text_of(node: &Value) -> Option<String> {
    if let Ok(Some(Value::String(text))) = path_opt("simpleText", node) {
        return Some(text.clone());
    }
    if let Ok(Some(Value::Array(runs))) = path_opt("runs", node) {
        let joined: String = runs
            .iter()
            .filter_map(|run| path_str("text", run).ok())
            .collect();
        return Some(joined.trim().replace('\n', " - "));
    }
    None
}

/// A video in a playlist.
///
/// `set_video_id` identifies this playlist membership and is what removal
/// needs; it is unique within the playlist only. `video_id` is the public id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    pub set_video_id: String,
    pub video_id: String,
    pub title: Option<String>,
    /// The full `playlistVideoRenderer` object as rendered by the site.
    pub renderer: Value,
}

impl PlaylistEntry {
    /// Build an entry from one rendered playlist item.
    ///
    /// Returns `Ok(None)` for items that are not videos (continuation
    /// placeholders, notices).
    pub fn from_item(item: &Value) -> Result<Option<Self>> {
        let Some(renderer) = path_opt("playlistVideoRenderer", item)? else {
            return Ok(None);
        };

        let set_video_id = path_str("setVideoId", renderer)?.to_string();
        let video_id = match path_opt("videoId", renderer)? {
            Some(Value::String(id)) => id.clone(),
            _ => path_str("navigationEndpoint.watchEndpoint.videoId", renderer)?.to_string(),
        };
        let title = path_opt("title", renderer)?.and_then(text_of);

        Ok(Some(Self {
            set_video_id,
            video_id,
            title,
            renderer: renderer.clone(),
        }))
    }
}

/// A video in the watch history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub video_id: String,
    pub title: Option<String>,
    /// Service endpoint that removes this entry from history, when the page
    /// offers one.
    pub removal_endpoint: Option<Value>,
}

impl HistoryEntry {
    const REMOVAL_ENDPOINT: &'static str =
        "menu.menuRenderer.topLevelButtons.0.buttonRenderer.serviceEndpoint";

    /// Build an entry from one rendered history item.
    ///
    /// Returns `Ok(None)` for anything that is not a `videoRenderer`
    /// (shelves, date headers).
    pub fn from_item(item: &Value) -> Result<Option<Self>> {
        let Some(renderer) = path_opt("videoRenderer", item)? else {
            return Ok(None);
        };

        Ok(Some(Self {
            video_id: path_str("videoId", renderer)?.to_string(),
            title: path_opt("title", renderer)?.and_then(text_of),
            removal_endpoint: path_opt(Self::REMOVAL_ENDPOINT, renderer)?.cloned(),
        }))
    }
}

// ================================================================================================
// CONTINUATION
// ================================================================================================

/// Server-issued pointer to the next batch of a paginated collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContinuationCursor {
    pub continuation: String,
    pub click_tracking_params: String,
}

impl ContinuationCursor {
    /// Read a cursor out of a collection container.
    ///
    /// Two shapes are recognised, in order: the legacy
    /// `continuations.0.nextContinuationData` object and a trailing
    /// `continuationItemRenderer` item. Returns `Ok(None)` when neither is
    /// present, which marks the end of the collection.
    pub fn from_container(container: &Value) -> Result<Option<Self>> {
        if let Some(next) = path_opt("continuations.0.nextContinuationData", container)? {
            return Ok(Some(Self {
                continuation: path_str("continuation", next)?.to_string(),
                click_tracking_params: path_str("clickTrackingParams", next)?.to_string(),
            }));
        }

        if let Some(Value::Array(items)) = path_opt("contents", container)? {
            if let Some(last) = items.last() {
                if let Some(endpoint) =
                    path_opt("continuationItemRenderer.continuationEndpoint", last)?
                {
                    return Ok(Some(Self {
                        continuation: path_str("continuationCommand.token", endpoint)?
                            .to_string(),
                        click_tracking_params: path_opt("clickTrackingParams", endpoint)?
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .to_string(),
                    }));
                }
            }
        }

        Ok(None)
    }

    /// Query parameters carried by a continuation request.
    pub fn query_pairs(&self) -> [(&'static str, &str); 3] {
        [
            ("ctoken", self.continuation.as_str()),
            ("continuation", self.continuation.as_str()),
            ("itct", self.click_tracking_params.as_str()),
        ]
    }
}

/// Whether a rendered item is a continuation placeholder rather than content.
pub fn is_continuation_item(item: &Value) -> bool {
    matches!(path_opt("continuationItemRenderer", item), Ok(Some(_)))
}

// ================================================================================================
// CONFIGURATION
// ================================================================================================

/// Environment variable that enables saving every fetched body to disk.
pub const DEBUG_SAVE_RESPONSES_ENV: &str = "YOUTUBE_DEBUG_SAVE_RESPONSES";

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Origin of the site, without a trailing slash.
    pub base_url: String,
    /// Where the cookie jar is persisted after a successful login.
    pub cookie_path: Option<PathBuf>,
    /// Save every fetched response under `debug_responses/`.
    pub debug_save_responses: bool,
    /// Maximum number of redirects followed for a page fetch.
    pub max_redirects: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.youtube.com".to_string(),
            cookie_path: None,
            debug_save_responses: std::env::var(DEBUG_SAVE_RESPONSES_ENV).is_ok(),
            max_redirects: 5,
        }
    }
}

impl ClientConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the client at a different origin
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Persist cookies at `path`
    pub fn with_cookie_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cookie_path = Some(path.into());
        self
    }

    /// Enable/disable saving fetched responses for debugging
    pub fn with_debug_save_responses(mut self, enabled: bool) -> Self {
        self.debug_save_responses = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_playlist_entry_falls_back_to_watch_endpoint() {
        let item = json!({
            "playlistVideoRenderer": {
                "setVideoId": "SET1",
                "navigationEndpoint": {"watchEndpoint": {"videoId": "vid1"}},
                "title": {"runs": [{"text": "Part "}, {"text": "One"}]}
            }
        });
        let entry = PlaylistEntry::from_item(&item).unwrap().unwrap();
        assert_eq!(entry.set_video_id, "SET1");
        assert_eq!(entry.video_id, "vid1");
        assert_eq!(entry.title.as_deref(), Some("Part One"));
    }

    #[test]
    fn test_non_video_items_are_skipped() {
        let item = json!({"continuationItemRenderer": {}});
        assert!(PlaylistEntry::from_item(&item).unwrap().is_none());
        assert!(HistoryEntry::from_item(&item).unwrap().is_none());
        assert!(is_continuation_item(&item));
    }

    #[test]
    fn test_history_entry_keeps_removal_endpoint() {
        let item = json!({
            "videoRenderer": {
                "videoId": "abc",
                "title": {"simpleText": "A video"},
                "menu": {"menuRenderer": {"topLevelButtons": [
                    {"buttonRenderer": {"serviceEndpoint": {"feedbackEndpoint": {"feedbackToken": "t"}}}}
                ]}}
            }
        });
        let entry = HistoryEntry::from_item(&item).unwrap().unwrap();
        assert_eq!(entry.video_id, "abc");
        assert_eq!(entry.title.as_deref(), Some("A video"));
        assert_eq!(
            entry.removal_endpoint.unwrap()["feedbackEndpoint"]["feedbackToken"],
            "t"
        );
    }

    #[test]
    fn test_cursor_shapes() {
        let legacy = json!({
            "contents": [],
            "continuations": [{"nextContinuationData": {"continuation": "C1", "clickTrackingParams": "T1"}}]
        });
        let cursor = ContinuationCursor::from_container(&legacy).unwrap().unwrap();
        assert_eq!(cursor.continuation, "C1");
        assert_eq!(cursor.click_tracking_params, "T1");

        let item_based = json!({
            "contents": [
                {"playlistVideoRenderer": {}},
                {"continuationItemRenderer": {"continuationEndpoint": {
                    "clickTrackingParams": "T2",
                    "continuationCommand": {"token": "C2"}
                }}}
            ]
        });
        let cursor = ContinuationCursor::from_container(&item_based)
            .unwrap()
            .unwrap();
        assert_eq!(cursor.continuation, "C2");

        assert!(ContinuationCursor::from_container(&json!({"contents": []}))
            .unwrap()
            .is_none());
    }
}
