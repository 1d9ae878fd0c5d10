//! Extraction of the server-rendered view model (`ytInitialData`).

use serde_json::Value;

use crate::parsing::{after_marker, leading_json_object, script_bodies};
use crate::{Result, YouTubeError};

const INITIAL_DATA: &str = "ytInitialData";
const INITIAL_GUIDE_DATA: &str = "ytInitialGuideData";

/// Assignment shapes the site has used for its bootstrap globals, most
/// specific first.
fn assignment_markers(name: &str) -> [String; 4] {
    [
        format!("window[\"{name}\"] = "),
        format!("window['{name}'] = "),
        format!("var {name} = "),
        format!("{name} = "),
    ]
}

/// Find the JSON object assigned to the global `name` in any inline script.
pub fn find_assigned_object(html: &str, name: &str) -> Result<Value> {
    let scripts = script_bodies(html);
    let markers = assignment_markers(name);

    for marker in &markers {
        for script in &scripts {
            for candidate in after_marker(script, marker) {
                if let Some(parsed) = leading_json_object(candidate) {
                    log::debug!("Found {name} via `{}`", marker.trim_end());
                    return Ok(parsed?);
                }
            }
        }
    }

    log::debug!("No assignment to {name} found in {} scripts", scripts.len());
    Err(YouTubeError::NotFound(name.to_string()))
}

/// The page's initial view model (playlists, history, feeds).
pub fn initial_data(html: &str) -> Result<Value> {
    find_assigned_object(html, INITIAL_DATA)
}

/// The left-navigation guide model.
pub fn initial_guide_data(html: &str) -> Result<Value> {
    find_assigned_object(html, INITIAL_GUIDE_DATA)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_bracket_assignment() {
        let html = r#"<script>window["ytInitialData"] = {"contents": {"a": 1}};
            window["ytInitialPlayerResponse"] = null;</script>"#;
        let data = initial_data(html).unwrap();
        assert_eq!(data["contents"]["a"], 1);
    }

    #[test]
    fn test_var_assignment() {
        let html = r#"<script>var ytInitialData = {"b": [1, 2]};</script>"#;
        assert_eq!(initial_data(html).unwrap()["b"][1], 2);
    }

    #[test]
    fn test_guide_and_data_are_distinct() {
        let html = r#"<script>window["ytInitialData"] = {"which": "data"};</script>
            <script>window["ytInitialGuideData"] = {"which": "guide"};</script>"#;
        assert_eq!(initial_data(html).unwrap()["which"], "data");
        assert_eq!(initial_guide_data(html).unwrap()["which"], "guide");
    }

    #[test]
    fn test_absent_assignment_is_not_found() {
        let html = r#"<script>var somethingElse = {};</script>"#;
        let err = initial_guide_data(html).unwrap_err();
        assert!(matches!(err, YouTubeError::NotFound(ref n) if n == "ytInitialGuideData"));
    }

    #[test]
    fn test_non_object_assignment_is_skipped() {
        let html = r#"<script>ytInitialData = null; var ytInitialData = {"ok": true};</script>"#;
        assert_eq!(initial_data(html).unwrap()["ok"], true);
    }
}
