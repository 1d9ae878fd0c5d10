#![allow(dead_code)]
use async_trait::async_trait;
use http_client::{Error, HttpClient, Request, Response};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use youtube_unofficial::{CookieJar, YouTubeClient};

pub const COOKIES: &str = "# Netscape HTTP Cookie File\n\
.youtube.com\tTRUE\t/\tTRUE\t4102444800\tSAPISID\tsapisid-value\n\
.youtube.com\tTRUE\t/\tTRUE\t4102444800\tSID\tsid-value\n";

/// A request as seen by [`ScriptedClient`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub url: String,
    pub body: String,
    pub cookie: Option<String>,
    pub headers: Vec<(String, String)>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn path(&self) -> String {
        let url: http_types::Url = self.url.parse().unwrap();
        url.path().to_string()
    }

    pub fn query(&self, key: &str) -> Option<String> {
        let url: http_types::Url = self.url.parse().unwrap();
        url.query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    /// Decoded value of a form field in the body.
    pub fn form(&self, key: &str) -> Option<String> {
        self.body.split('&').find_map(|pair| {
            let (k, v) = pair.split_once('=')?;
            (k == key).then(|| urlencoding::decode(v).unwrap().into_owned())
        })
    }

    pub fn form_json(&self, key: &str) -> Value {
        serde_json::from_str(&self.form(key).unwrap()).unwrap()
    }
}

#[derive(Debug)]
pub struct Scripted {
    pub status: u16,
    pub body: String,
    pub headers: Vec<(String, String)>,
}

/// HTTP client replaying a fixed queue of responses and recording requests.
#[derive(Debug, Clone, Default)]
pub struct ScriptedClient {
    responses: Arc<Mutex<VecDeque<Scripted>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, status: u16, body: impl Into<String>) -> &Self {
        self.responses.lock().unwrap().push_back(Scripted {
            status,
            body: body.into(),
            headers: Vec::new(),
        });
        self
    }

    pub fn push_html(&self, html: String) -> &Self {
        self.push(200, html)
    }

    pub fn push_json(&self, value: Value) -> &Self {
        self.push(200, value.to_string())
    }

    pub fn push_with_headers(&self, status: u16, body: &str, headers: &[(&str, &str)]) -> &Self {
        self.responses.lock().unwrap().push_back(Scripted {
            status,
            body: body.to_string(),
            headers: headers
                .iter()
                .map(|(n, v)| (n.to_string(), v.to_string()))
                .collect(),
        });
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpClient for ScriptedClient {
    async fn send(&self, mut req: Request) -> Result<Response, Error> {
        let body = req.body_string().await.unwrap_or_default();
        let headers = req
            .iter()
            .map(|(name, values)| (name.as_str().to_string(), values.last().as_str().to_string()))
            .collect();
        self.requests.lock().unwrap().push(RecordedRequest {
            method: req.method().to_string(),
            url: req.url().to_string(),
            body,
            cookie: req.header("Cookie").map(|v| v.last().as_str().to_string()),
            headers,
        });

        let scripted = self.responses.lock().unwrap().pop_front();
        let Some(scripted) = scripted else {
            return Err(Error::from_str(
                500,
                format!("unexpected request {}", req.url()),
            ));
        };

        let mut response = Response::new(scripted.status);
        for (name, value) in &scripted.headers {
            response.append_header(name.as_str(), value.as_str());
        }
        response.set_body(scripted.body);
        Ok(response)
    }
}

// ================================================================================================
// PAGE FIXTURES
// ================================================================================================

pub fn ytcfg(logged_in: bool) -> Value {
    json!({
        "EVENT_ID": "event-1",
        "XSRF_TOKEN": "xsrf-1",
        "INNERTUBE_API_KEY": "api-key",
        "INNERTUBE_CONTEXT_CLIENT_VERSION": "2.20200101",
        "DELEGATED_SESSION_ID": "delegated",
        "LOGGED_IN": logged_in
    })
}

/// A page carrying a `ytcfg` block and optional bootstrap globals.
pub fn page(cfg: &Value, initial: Option<&Value>, guide: Option<&Value>) -> String {
    let mut html = String::from("<html><head>");
    html.push_str(&format!("<script>ytcfg.set({cfg});</script>"));
    if let Some(data) = initial {
        html.push_str(&format!("<script>window[\"ytInitialData\"] = {data};</script>"));
    }
    if let Some(data) = guide {
        html.push_str(&format!(
            "<script>var ytInitialGuideData = {data};\nvar other = 1;</script>"
        ));
    }
    html.push_str("</head><body></body></html>");
    html
}

pub fn home_page() -> String {
    page(&ytcfg(true), None, None)
}

pub fn playlist_item(set_video_id: &str, video_id: &str) -> Value {
    json!({"playlistVideoRenderer": {
        "setVideoId": set_video_id,
        "videoId": video_id,
        "title": {"runs": [{"text": format!("Video {video_id}")}]}
    }})
}

pub fn next_continuation(token: &str) -> Value {
    json!([{"nextContinuationData": {"continuation": token, "clickTrackingParams": format!("itct-{token}")}}])
}

/// Playlist page whose first batch is `items`, continued by `continuation`.
pub fn playlist_page(items: Vec<Value>, continuation: Option<&str>) -> String {
    let mut list = json!({"contents": items});
    if let Some(token) = continuation {
        list["continuations"] = next_continuation(token);
    }
    let data = json!({"contents": {"twoColumnBrowseResultsRenderer": {"tabs": [
        {"tabRenderer": {"content": {"sectionListRenderer": {"contents": [
            {"itemSectionRenderer": {"contents": [{"playlistVideoListRenderer": list}]}}
        ]}}}}
    ]}}});
    page(&ytcfg(true), Some(&data), None)
}

/// An empty playlist: the site renders no `playlistVideoListRenderer` at all.
pub fn empty_playlist_page() -> String {
    let data = json!({"contents": {"twoColumnBrowseResultsRenderer": {"tabs": [
        {"tabRenderer": {"content": {"sectionListRenderer": {"contents": [
            {"itemSectionRenderer": {"contents": [{"messageRenderer": {}}]}}
        ]}}}}
    ]}}});
    page(&ytcfg(true), Some(&data), None)
}

/// `browse_ajax` response continuing a playlist.
pub fn playlist_continuation(items: Vec<Value>, continuation: Option<&str>) -> Value {
    let mut list = json!({"contents": items});
    if let Some(token) = continuation {
        list["continuations"] = next_continuation(token);
    }
    json!([
        {"page": "browse"},
        {"response": {"continuationContents": {"playlistVideoListContinuation": list}},
         "xsrf_token": "xsrf-rotated"}
    ])
}

pub fn history_item(video_id: &str) -> Value {
    json!({"videoRenderer": {
        "videoId": video_id,
        "title": {"simpleText": format!("Watched {video_id}")},
        "menu": {"menuRenderer": {"topLevelButtons": [
            {"buttonRenderer": {"serviceEndpoint": {
                "clickTrackingParams": "ct",
                "feedbackEndpoint": {"feedbackToken": format!("remove-{video_id}")}
            }}}
        ]}}
    }})
}

fn history_sections(items: Vec<Value>, continuation: Option<&str>) -> Value {
    let mut sections = json!({"contents": [{"itemSectionRenderer": {"contents": items}}]});
    if let Some(token) = continuation {
        sections["continuations"] = next_continuation(token);
    }
    sections
}

pub fn history_page(items: Vec<Value>, continuation: Option<&str>) -> String {
    let data = json!({"contents": {"twoColumnBrowseResultsRenderer": {"tabs": [
        {"tabRenderer": {"content": {"sectionListRenderer": history_sections(items, continuation)}}}
    ]}}});
    page(&ytcfg(true), Some(&data), None)
}

pub fn history_continuation(items: Vec<Value>, continuation: Option<&str>) -> Value {
    json!([
        {"page": "browse"},
        {"response": {"continuationContents": {
            "sectionListContinuation": history_sections(items, continuation)
        }}, "xsrf_token": "xsrf-rotated"}
    ])
}

/// History page whose feed actions do or do not offer "Clear all watch history".
pub fn clear_history_page(with_button: bool) -> String {
    let mut actions = vec![json!({"searchBoxRenderer": {}}), json!({"buttonRenderer": {}})];
    if with_button {
        actions.push(json!({"buttonRenderer": {"navigationEndpoint": {"confirmDialogEndpoint": {
            "content": {"confirmDialogRenderer": {"confirmButton": {"buttonRenderer": {
                "serviceEndpoint": {
                    "clickTrackingParams": "ct",
                    "feedbackEndpoint": {"feedbackToken": "clear-all"}
                }
            }}}}
        }}}}));
    }
    let data = json!({"contents": {"twoColumnBrowseResultsRenderer": {
        "secondaryContents": {"browseFeedActionsRenderer": {"contents": actions}}
    }}});
    page(&ytcfg(true), Some(&data), None)
}

pub fn search_history_page() -> String {
    let data = json!({"contents": {"twoColumnBrowseResultsRenderer": {
        "secondaryContents": {"browseFeedActionsRenderer": {"contents": [
            {}, {},
            {"buttonRenderer": {"navigationEndpoint": {"confirmDialogEndpoint": {
                "content": {"confirmDialogRenderer": {"confirmEndpoint": {
                    "clickTrackingParams": "ct-search",
                    "commandMetadata": {"webCommandMetadata": {
                        "apiUrl": "/youtubei/v1/feedback"
                    }},
                    "feedbackEndpoint": {"feedbackToken": "pause-token"}
                }}}
            }}}}
        ]}}
    }}});
    page(&ytcfg(true), Some(&data), None)
}

pub fn guide_page(favorites_id: &str) -> String {
    let guide = json!({"items": [
        {"guideSectionRenderer": {"items": [
            {"guideEntryRenderer": {
                "icon": {"iconType": "WHAT_TO_WATCH"},
                "entryData": {"guideEntryData": {"guideEntryId": "home"}}
            }},
            {"guideEntryRenderer": {
                "icon": {"iconType": "LIKES_PLAYLIST"},
                "entryData": {"guideEntryData": {"guideEntryId": favorites_id}}
            }}
        ]}}
    ]});
    page(&ytcfg(true), None, Some(&guide))
}

pub fn service_response(code: &str) -> Value {
    json!({"code": code, "data": {}})
}

// ================================================================================================
// CLIENTS
// ================================================================================================

/// A client over `http` holding the test cookie jar, not yet logged in.
pub fn client_with_cookies(http: &ScriptedClient) -> YouTubeClient {
    YouTubeClient::new(Box::new(http.clone())).with_cookies(CookieJar::from_netscape(COOKIES))
}

/// A logged-in client. Consumes one scripted response for the login check.
pub async fn logged_in_client(http: &ScriptedClient) -> YouTubeClient {
    http.push_html(home_page());
    let mut client = client_with_cookies(http);
    client.login().await.expect("login should succeed");
    client
}
