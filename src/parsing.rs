//! HTML parsing utilities for YouTube pages.
//!
//! YouTube renders almost nothing as markup. The interesting data lives in
//! JSON literals assigned from inline `<script>` elements, so the helpers here
//! only find script bodies and pull a JSON value out of them.

use scraper::{Html, Selector};
use serde_json::Value;

/// Collect the text of every inline `<script>` element in page order.
pub fn script_bodies(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let script_selector = Selector::parse("script").unwrap();

    let bodies: Vec<String> = document
        .select(&script_selector)
        .map(|script| script.text().collect::<String>())
        .filter(|text| !text.trim().is_empty())
        .collect();

    log::trace!("Found {} inline scripts", bodies.len());
    bodies
}

/// Parse the JSON value that starts at the beginning of `text`.
///
/// Anything after the value (`);`, `;var x = ...`) is ignored. Returns `None`
/// when `text` does not start with an object literal.
pub fn leading_json_object(text: &str) -> Option<serde_json::Result<Value>> {
    let text = text.trim_start();
    if !text.starts_with('{') {
        return None;
    }
    serde_json::Deserializer::from_str(text)
        .into_iter::<Value>()
        .next()
}

/// Every position in `script` right after an occurrence of `marker`.
pub fn after_marker<'a>(script: &'a str, marker: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    script
        .match_indices(marker)
        .map(move |(index, _)| &script[index + marker.len()..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_bodies_skips_empty_and_external_scripts() {
        let html = r#"<html><head>
            <script src="/s/player.js"></script>
            <script>var a = 1;</script>
            </head><body><script>var b = 2;</script></body></html>"#;

        let bodies = script_bodies(html);
        assert_eq!(bodies, vec!["var a = 1;".to_string(), "var b = 2;".to_string()]);
    }

    #[test]
    fn test_leading_json_object_ignores_trailing_code() {
        let value = leading_json_object(r#" {"a": {"b": "};"}});window.x = 1;"#)
            .unwrap()
            .unwrap();
        assert_eq!(value["a"]["b"], "};");
        assert!(leading_json_object("\"string\"").is_none());
        assert!(leading_json_object("{\"broken\": ").unwrap().is_err());
    }

    #[test]
    fn test_after_marker_yields_every_occurrence() {
        let found: Vec<_> = after_marker("x(1) x(2)", "x(").collect();
        assert_eq!(found, vec!["1) x(2)", "2)"]);
    }
}
