//! Extraction of the page runtime configuration (`ytcfg`).
//!
//! Every YouTube page bootstraps its scripts with one or more
//! `ytcfg.set({...})` calls. The merged object carries the short-lived tokens
//! needed for any follow-up AJAX request, so it has to be re-read from every
//! page that is fetched.

use serde_json::{json, Map, Value};

use crate::headers::USER_AGENT;
use crate::parsing::{after_marker, leading_json_object, script_bodies};
use crate::{Result, YouTubeError};

const YTCFG_MARKER: &str = "ytcfg.set(";

/// Keys every usable page configuration must contain.
pub const REQUIRED_KEYS: [&str; 4] = [
    "EVENT_ID",
    "XSRF_TOKEN",
    "INNERTUBE_API_KEY",
    "INNERTUBE_CONTEXT_CLIENT_VERSION",
];

/// The merged `ytcfg` object of a single page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageConfig {
    values: Map<String, Value>,
}

impl PageConfig {
    /// Wrap an already-parsed configuration object, checking required keys.
    pub fn from_map(values: Map<String, Value>) -> Result<Self> {
        if let Some(missing) = REQUIRED_KEYS.iter().find(|key| !values.contains_key(**key)) {
            return Err(YouTubeError::NotFound(format!("ytcfg key {missing}")));
        }
        Ok(Self { values })
    }

    /// Raw value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Value for `key` rendered as a string.
    ///
    /// Numbers and booleans are stringified; a missing key or a null value is
    /// a [`YouTubeError::NotFound`].
    pub fn get_str(&self, key: &str) -> Result<String> {
        match self.values.get(key) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Null) | None => Err(YouTubeError::NotFound(format!("ytcfg key {key}"))),
            Some(other) => Ok(other.to_string()),
        }
    }

    fn get_opt(&self, key: &str) -> Option<String> {
        self.get_str(key).ok()
    }

    /// Client screen nonce sent as `csn` with service requests.
    pub fn event_id(&self) -> Result<String> {
        self.get_str("EVENT_ID")
    }

    /// Session (CSRF) token sent as `session_token`.
    pub fn xsrf_token(&self) -> Result<String> {
        self.get_str("XSRF_TOKEN")
    }

    pub fn api_key(&self) -> Result<String> {
        self.get_str("INNERTUBE_API_KEY")
    }

    pub fn client_version(&self) -> Result<String> {
        self.get_str("INNERTUBE_CONTEXT_CLIENT_VERSION")
    }

    pub fn delegated_session_id(&self) -> Result<String> {
        self.get_str("DELEGATED_SESSION_ID")
    }

    /// Whether the page was rendered for a signed-in user.
    pub fn is_logged_in(&self) -> bool {
        matches!(self.values.get("LOGGED_IN"), Some(Value::Bool(true)))
    }

    /// Headers that make a follow-up request look like it came from `page_url`.
    pub fn ajax_headers(&self, page_url: &str) -> Result<Vec<(String, String)>> {
        let identity = match self.get_opt("ID_TOKEN") {
            Some(token) => token,
            None => self.xsrf_token()?,
        };

        let mut headers = vec![
            ("X-YouTube-Client-Name".to_string(), "1".to_string()),
            ("X-YouTube-Client-Version".to_string(), self.client_version()?),
            ("X-YouTube-Identity-Token".to_string(), identity),
        ];
        for (key, header) in [
            ("PAGE_CL", "X-YouTube-Page-CL"),
            ("PAGE_BUILD_LABEL", "X-YouTube-Page-Label"),
            ("VARIANTS_CHECKSUM", "X-YouTube-Variants-Checksum"),
        ] {
            if let Some(value) = self.get_opt(key) {
                headers.push((header.to_string(), value));
            }
        }
        headers.push(("X-SPF-Previous".to_string(), page_url.to_string()));
        headers.push(("X-SPF-Referer".to_string(), page_url.to_string()));
        headers.push(("Referer".to_string(), page_url.to_string()));
        Ok(headers)
    }

    /// The `context.client` object expected by `youtubei` endpoints.
    pub fn context_client_body(&self) -> Result<Value> {
        Ok(json!({
            "browserName": "Chrome",
            "browserVersion": "138.0.0.0",
            "clientName": "WEB",
            "clientVersion": self.client_version()?,
            "gl": self.get_opt("INNERTUBE_CONTEXT_GL").unwrap_or_else(|| "US".to_string()),
            "hl": self.get_opt("INNERTUBE_CONTEXT_HL").unwrap_or_else(|| "en".to_string()),
            "osName": "X11",
            "userAgent": USER_AGENT,
            "utcOffsetMinutes": 0,
            "visitorData": self.get_opt("VISITOR_DATA").unwrap_or_default(),
        }))
    }
}

/// Tokens and headers for `service_ajax` mutations issued from one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceContext {
    /// Client screen nonce (`EVENT_ID`).
    pub csn: String,
    /// Session (CSRF) token (`XSRF_TOKEN`).
    pub session_token: String,
    pub headers: Vec<(String, String)>,
}

impl ServiceContext {
    /// Derive the mutation context for requests made from `page_url`.
    pub fn from_config(config: &PageConfig, page_url: &str) -> Result<Self> {
        Ok(Self {
            csn: config.event_id()?,
            session_token: config.xsrf_token()?,
            headers: config.ajax_headers(page_url)?,
        })
    }

    /// Form body for a `service_ajax` call carrying the JSON action `sej`.
    pub fn form(&self, sej: &Value) -> Vec<(&'static str, String)> {
        vec![
            ("sej", sej.to_string()),
            ("csn", self.csn.clone()),
            ("session_token", self.session_token.clone()),
        ]
    }
}

/// Find and merge every `ytcfg.set({...})` object in `html`.
///
/// Later calls override earlier keys, as they do in the browser.
pub fn find_ytcfg(html: &str) -> Result<PageConfig> {
    let mut merged = Map::new();
    let mut found = 0usize;

    for script in script_bodies(html) {
        for candidate in after_marker(&script, YTCFG_MARKER) {
            // ytcfg.set("KEY", value) form carries nothing we need
            let Some(parsed) = leading_json_object(candidate) else {
                continue;
            };
            if let Value::Object(object) = parsed? {
                found += 1;
                merged.extend(object);
            }
        }
    }

    if found == 0 {
        log::debug!("No ytcfg.set() call found in page");
        return Err(YouTubeError::NotFound("ytcfg".to_string()));
    }
    log::debug!("Merged {found} ytcfg objects ({} keys)", merged.len());
    PageConfig::from_map(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(scripts: &[&str]) -> String {
        let mut html = String::from("<html><head>");
        for script in scripts {
            html.push_str("<script>");
            html.push_str(script);
            html.push_str("</script>");
        }
        html.push_str("</head><body></body></html>");
        html
    }

    const CFG: &str = r#"ytcfg.set({"EVENT_ID":"ev1","XSRF_TOKEN":"xsrf==","INNERTUBE_API_KEY":"key","INNERTUBE_CONTEXT_CLIENT_VERSION":"2.2020","PAGE_CL":321,"LOGGED_IN":true}); window.ytcfg.set("MSG", 1);"#;

    #[test]
    fn test_find_ytcfg_returns_required_tokens() {
        let cfg = find_ytcfg(&page(&[CFG])).unwrap();
        for key in REQUIRED_KEYS {
            assert!(cfg.get(key).is_some(), "missing {key}");
        }
        assert_eq!(cfg.event_id().unwrap(), "ev1");
        assert_eq!(cfg.xsrf_token().unwrap(), "xsrf==");
        assert!(cfg.is_logged_in());
    }

    #[test]
    fn test_later_calls_override_earlier_keys() {
        let html = page(&[CFG, r#"ytcfg.set({"EVENT_ID":"ev2","ID_TOKEN":"id"});"#]);
        let cfg = find_ytcfg(&html).unwrap();
        assert_eq!(cfg.event_id().unwrap(), "ev2");
        assert_eq!(cfg.api_key().unwrap(), "key");
    }

    #[test]
    fn test_missing_ytcfg_is_not_found() {
        let err = find_ytcfg(&page(&["var foo = {};"])).unwrap_err();
        assert!(matches!(err, YouTubeError::NotFound(ref what) if what == "ytcfg"));
    }

    #[test]
    fn test_missing_required_key_is_not_found() {
        let err = find_ytcfg(&page(&[r#"ytcfg.set({"EVENT_ID":"ev1"});"#])).unwrap_err();
        assert!(matches!(err, YouTubeError::NotFound(ref what) if what.contains("XSRF_TOKEN")));
    }

    #[test]
    fn test_ajax_headers_carry_token_and_referer() {
        let cfg = find_ytcfg(&page(&[CFG])).unwrap();
        let headers = cfg
            .ajax_headers("https://www.youtube.com/feed/history")
            .unwrap();
        let get = |name: &str| {
            headers
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str())
        };

        assert_eq!(get("X-YouTube-Identity-Token"), Some("xsrf=="));
        assert_eq!(get("X-YouTube-Page-CL"), Some("321"));
        assert_eq!(get("X-YouTube-Variants-Checksum"), None);
        assert_eq!(
            get("X-SPF-Previous"),
            Some("https://www.youtube.com/feed/history")
        );
        assert_eq!(get("Referer"), Some("https://www.youtube.com/feed/history"));
    }
}
