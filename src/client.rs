use crate::headers::{add_ajax_headers, add_cookies, add_extra_headers, add_page_headers};
use crate::initial::{initial_data, initial_guide_data};
use crate::iterator::{
    AsyncPaginatedIterator, ContinuationKind, ContinuationPager, Entries, HistoryEntries,
    PlaylistEntries,
};
use crate::path::{path, path_bool, path_opt, path_str};
use crate::session::CookieJar;
use crate::session_persistence::CookiePersistence;
use crate::types::ClientConfig;
use crate::ytcfg::{find_ytcfg, ServiceContext};
use crate::{Result, YouTubeError};
use http_client::{HttpClient, Request, Response};
use http_types::{Method, Url};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

pub const HISTORY_PATH: &str = "/feed/history";
pub const SEARCH_HISTORY_PATH: &str = "/feed/history/search_history";
pub const SERVICE_AJAX_PATH: &str = "/service_ajax";
pub const BROWSE_AJAX_PATH: &str = "/browse_ajax";

/// Playlist id of "Watch Later".
pub const WATCH_LATER_ID: &str = "WL";

const SUCCESS_CODE: &str = "SUCCESS";
const FAVORITES_ICON: &str = "LIKES_PLAYLIST";
const CLEAR_HISTORY_ENDPOINT: &str = "contents.twoColumnBrowseResultsRenderer.secondaryContents.\
     browseFeedActionsRenderer.contents.2.buttonRenderer.navigationEndpoint.\
     confirmDialogEndpoint.content.confirmDialogRenderer.confirmButton.buttonRenderer.\
     serviceEndpoint";
const SEARCH_HISTORY_CONFIRM_ENDPOINT: &str = "contents.twoColumnBrowseResultsRenderer.\
     secondaryContents.browseFeedActionsRenderer.contents.2.buttonRenderer.navigationEndpoint.\
     confirmDialogEndpoint.content.confirmDialogRenderer.confirmEndpoint";

/// Body of an AJAX request.
pub(crate) enum RequestBody {
    Empty,
    Form(Vec<(&'static str, String)>),
    Json(Value),
}

/// Main client for managing a YouTube account through its web interface.
///
/// The client owns the cookie jar of one browser session and drives the
/// site's private AJAX endpoints the way its own page scripts do.
///
/// # Examples
///
/// ```rust,no_run
/// use youtube_unofficial::{ClientConfig, Result, YouTubeClient};
///
/// #[tokio::main]
/// async fn main() -> Result<()> {
///     let http_client = http_client::native::NativeClient::new();
///     let config = ClientConfig::new().with_cookie_path("/home/me/.config/ytch-cookies.txt");
///     let mut client = YouTubeClient::from_cookie_file(Box::new(http_client), config)?;
///
///     client.login().await?;
///     client.clear_watch_later().await?;
///     Ok(())
/// }
/// ```
pub struct YouTubeClient {
    client: Box<dyn HttpClient>,
    config: ClientConfig,
    cookies: CookieJar,
    logged_in: bool,
    favorites_playlist_id: Option<String>,
}

impl YouTubeClient {
    /// Create a new [`YouTubeClient`] with the default configuration and an
    /// empty cookie jar.
    pub fn new(client: Box<dyn HttpClient>) -> Self {
        Self::with_config(client, ClientConfig::default())
    }

    /// Create a new [`YouTubeClient`] with a custom base URL.
    ///
    /// This is useful for testing against a local server.
    pub fn with_base_url(client: Box<dyn HttpClient>, base_url: String) -> Self {
        Self::with_config(client, ClientConfig::default().with_base_url(base_url))
    }

    pub fn with_config(client: Box<dyn HttpClient>, config: ClientConfig) -> Self {
        Self {
            client,
            config,
            cookies: CookieJar::new(),
            logged_in: false,
            favorites_playlist_id: None,
        }
    }

    /// Create a client whose cookie jar is loaded from disk.
    ///
    /// Uses `config.cookie_path`, or [`CookiePersistence::default_path`] when
    /// unset. A missing file is created empty.
    pub fn from_cookie_file(client: Box<dyn HttpClient>, mut config: ClientConfig) -> Result<Self> {
        let cookie_path = match config.cookie_path.take() {
            Some(path) => path,
            None => CookiePersistence::default_path()?,
        };
        let cookies = CookiePersistence::load(&cookie_path)?;
        config.cookie_path = Some(cookie_path);
        Ok(Self::with_config(client, config).with_cookies(cookies))
    }

    /// Replace the cookie jar.
    pub fn with_cookies(mut self, cookies: CookieJar) -> Self {
        self.cookies = cookies;
        self
    }

    pub fn cookies(&self) -> &CookieJar {
        &self.cookies
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Write the cookie jar to its configured path, if any.
    pub fn save_cookies(&self) -> Result<()> {
        match &self.config.cookie_path {
            Some(path) => CookiePersistence::save(&self.cookies, path),
            None => Ok(()),
        }
    }

    pub(crate) fn set_logged_in(&mut self, logged_in: bool) {
        self.logged_in = logged_in;
    }

    /// Check if the client holds a validated signed-in session.
    ///
    /// Returns `true` once [`login`](Self::login) has succeeded.
    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    pub(crate) fn require_login(&self) -> Result<()> {
        if self.logged_in {
            Ok(())
        } else {
            Err(YouTubeError::login_required())
        }
    }

    // ============================================================================================
    // HTTP
    // ============================================================================================

    /// Absolute URL on the site for `path_and_query`.
    pub(crate) fn url(&self, path_and_query: &str) -> Result<Url> {
        let raw = self.page_url(path_and_query);
        raw.parse::<Url>()
            .map_err(|e| YouTubeError::Http(format!("Invalid URL {raw}: {e}")))
    }

    fn page_url(&self, path_and_query: &str) -> String {
        format!("{}{}", self.config.base_url, path_and_query)
    }

    fn playlist_url(&self, playlist_id: &str) -> String {
        self.page_url(&format!("/playlist?list={}", urlencoding::encode(playlist_id)))
    }

    /// Send a request with the session's cookies and keep any cookies it sets.
    async fn send(&mut self, mut request: Request) -> Result<Response> {
        let host = request.url().host_str().unwrap_or_default().to_string();
        add_cookies(&mut request, &self.cookies.header_for(&host));

        let response = self
            .client
            .send(request)
            .await
            .map_err(|e| YouTubeError::Http(e.to_string()))?;

        if let Some(set_cookies) = response.header("set-cookie") {
            self.cookies
                .store_set_cookies(set_cookies.iter().map(|value| value.as_str()), &host);
        }
        Ok(response)
    }

    /// Fetch a page as a browser navigation would, following redirects.
    pub async fn fetch_page(&mut self, url: &str) -> Result<String> {
        let mut current = url
            .parse::<Url>()
            .map_err(|e| YouTubeError::Http(format!("Invalid URL {url}: {e}")))?;

        for _ in 0..=self.config.max_redirects {
            let mut request = Request::new(Method::Get, current.clone());
            add_page_headers(&mut request);
            let mut response = self.send(request).await?;

            if response.status().is_redirection() {
                let location = response
                    .header("location")
                    .and_then(|values| values.get(0))
                    .map(|value| value.as_str().to_string())
                    .ok_or_else(|| {
                        YouTubeError::Http(format!("Redirect from {current} without location"))
                    })?;
                let next = current
                    .join(&location)
                    .map_err(|e| YouTubeError::Http(format!("Bad redirect {location}: {e}")))?;
                log::debug!("Following redirect from {current} to {next}");
                current = next;
                continue;
            }

            return self.read_body(current.as_str(), &mut response).await;
        }

        Err(YouTubeError::Http("Too many redirects".to_string()))
    }

    /// Issue an AJAX request and decode its JSON response.
    pub(crate) async fn request_json(
        &mut self,
        method: Method,
        url: Url,
        headers: &[(String, String)],
        body: RequestBody,
    ) -> Result<Value> {
        log::debug!("{method} {}", url.path());
        let mut request = Request::new(method, url.clone());
        add_ajax_headers(&mut request);
        add_extra_headers(&mut request, headers);

        match body {
            RequestBody::Empty => {}
            RequestBody::Form(fields) => {
                let _ = request.insert_header(
                    "Content-Type",
                    "application/x-www-form-urlencoded;charset=UTF-8",
                );
                request.set_body(encode_form(&fields));
            }
            RequestBody::Json(value) => {
                let _ = request.insert_header("Content-Type", "application/json");
                request.set_body(value.to_string());
            }
        }

        let mut response = self.send(request).await?;
        let body = self.read_body(url.as_str(), &mut response).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn read_body(&self, url: &str, response: &mut Response) -> Result<String> {
        let status = response.status();
        let body = response
            .body_string()
            .await
            .map_err(|e| YouTubeError::Http(e.to_string()))?;

        if self.config.debug_save_responses {
            self.save_debug_response(url, status.into(), &body);
        }

        if !status.is_success() {
            return Err(YouTubeError::Http(format!("{url} returned HTTP {status}")));
        }
        Ok(body)
    }

    /// Save response to debug directory (optional debug feature)
    fn save_debug_response(&self, url: &str, status_code: u16, body: &str) {
        if let Err(e) = self.try_save_debug_response(url, status_code, body) {
            log::warn!("Failed to save debug response: {e}");
        }
    }

    fn try_save_debug_response(&self, url: &str, status_code: u16, body: &str) -> Result<()> {
        let debug_dir = Path::new("debug_responses");
        if !debug_dir.exists() {
            fs::create_dir_all(debug_dir)?;
        }

        let url_path = url.strip_prefix(&self.config.base_url).unwrap_or(url);
        let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S_%3f");
        let safe_path = url_path.replace(['/', '?', '&', '=', '%', '+'], "_");

        let file_path = debug_dir.join(format!("{timestamp}_{safe_path}_status{status_code}.txt"));
        fs::write(&file_path, body)?;

        log::debug!("Saved HTTP response to {file_path:?} (status: {status_code}, url: {url_path})");
        Ok(())
    }

    /// POST a `service_ajax` mutation and require a `SUCCESS` code.
    async fn service_call(
        &mut self,
        endpoint_kind: &str,
        sej: &Value,
        context: &ServiceContext,
    ) -> Result<Value> {
        let mut url = self.url(SERVICE_AJAX_PATH)?;
        url.query_pairs_mut().append_pair("name", endpoint_kind);

        let response = self
            .request_json(
                Method::Post,
                url,
                &context.headers,
                RequestBody::Form(context.form(sej)),
            )
            .await?;
        ensure_success(&response, endpoint_kind)?;
        Ok(response)
    }

    // ============================================================================================
    // COLLECTIONS
    // ============================================================================================

    /// Raw rendered items of a playlist.
    pub fn playlist_items(&mut self, playlist_id: &str) -> Result<ContinuationPager<'_>> {
        self.require_login()?;
        let url = self.playlist_url(playlist_id);
        Ok(ContinuationPager::new(self, ContinuationKind::Playlist, url))
    }

    /// Create an iterator over the entries of a playlist.
    ///
    /// Use [`WATCH_LATER_ID`] for Watch Later.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use youtube_unofficial::{AsyncPaginatedIterator, YouTubeClient};
    /// # tokio_test::block_on(async {
    /// let mut client = YouTubeClient::new(Box::new(http_client::native::NativeClient::new()));
    /// client.login().await?;
    ///
    /// let mut entries = client.playlist_entries("WL")?;
    /// while let Some(entry) = entries.next().await? {
    ///     println!("{} {:?}", entry.video_id, entry.title);
    /// }
    /// # Ok::<(), youtube_unofficial::YouTubeError>(())
    /// # });
    /// ```
    pub fn playlist_entries(&mut self, playlist_id: &str) -> Result<PlaylistEntries<'_>> {
        Ok(Entries::playlist(self.playlist_items(playlist_id)?))
    }

    /// Raw rendered items of the watch history.
    pub fn history_items(&mut self) -> Result<ContinuationPager<'_>> {
        self.require_login()?;
        let url = self.page_url(HISTORY_PATH);
        Ok(ContinuationPager::new(self, ContinuationKind::History, url))
    }

    /// Create an iterator over watch history entries, most recent first.
    pub fn history_entries(&mut self) -> Result<HistoryEntries<'_>> {
        Ok(Entries::history(self.history_items()?))
    }

    // ============================================================================================
    // PLAYLISTS
    // ============================================================================================

    /// Remove one membership from a playlist.
    ///
    /// `set_video_id` is the playlist membership id, NOT the video id. When
    /// `context` is `None` the playlist page is fetched to obtain fresh tokens.
    pub async fn remove_set_video_id_from_playlist(
        &mut self,
        playlist_id: &str,
        set_video_id: &str,
        context: Option<&ServiceContext>,
    ) -> Result<()> {
        self.require_login()?;

        let fetched;
        let context = match context {
            Some(context) => context,
            None => {
                let page_url = self.playlist_url(playlist_id);
                let html = self.fetch_page(&page_url).await?;
                fetched = ServiceContext::from_config(&find_ytcfg(&html)?, &page_url)?;
                &fetched
            }
        };

        let sej = json!({
            "clickTrackingParams": "",
            "commandMetadata": {
                "webCommandMetadata": {"url": SERVICE_AJAX_PATH, "sendPost": true}
            },
            "playlistEditEndpoint": {
                "playlistId": playlist_id,
                "actions": [{"setVideoId": set_video_id, "action": "ACTION_REMOVE_VIDEO"}],
                "params": "CAE%3D",
                "clientActions": [{
                    "playlistRemoveVideosAction": {"setVideoIds": [set_video_id]}
                }]
            }
        });

        log::debug!("Deleting from playlist {playlist_id}: set_video_id = {set_video_id}");
        self.service_call("playlistEditEndpoint", &sej, context)
            .await
            .map_err(|e| match e {
                YouTubeError::UnexpectedResult(_) => YouTubeError::UnexpectedResult(format!(
                    "Failed to delete {set_video_id} from playlist {playlist_id}"
                )),
                other => other,
            })?;
        Ok(())
    }

    /// Remove every video from a playlist, returning how many were removed.
    pub async fn clear_playlist(&mut self, playlist_id: &str) -> Result<usize> {
        self.require_login()?;

        let (set_video_ids, context) = {
            let mut entries = self.playlist_entries(playlist_id)?;
            let mut ids = Vec::new();
            while let Some(entry) = entries.next().await? {
                ids.push(entry.set_video_id);
            }
            if ids.is_empty() {
                log::info!("Playlist {playlist_id} is already empty");
                return Ok(0);
            }
            (ids, entries.service_context()?)
        };

        for set_video_id in &set_video_ids {
            self.remove_set_video_id_from_playlist(playlist_id, set_video_id, Some(&context))
                .await?;
        }
        log::info!("Removed {} videos from playlist {playlist_id}", set_video_ids.len());
        Ok(set_video_ids.len())
    }

    /// Remove every video from Watch Later.
    pub async fn clear_watch_later(&mut self) -> Result<usize> {
        self.clear_playlist(WATCH_LATER_ID).await
    }

    /// Remove a video from a playlist by its public video id.
    ///
    /// Returns `false` without error when the video is not in the playlist.
    /// The scan stops at the first match.
    pub async fn remove_video_id_from_playlist(
        &mut self,
        playlist_id: &str,
        video_id: &str,
    ) -> Result<bool> {
        self.require_login()?;

        let found = {
            let mut entries = self.playlist_entries(playlist_id)?;
            let mut found = None;
            while let Some(entry) = entries.next().await? {
                if entry.video_id == video_id {
                    found = Some((entry.set_video_id, entries.service_context()?));
                    break;
                }
            }
            found
        };

        let Some((set_video_id, context)) = found else {
            log::debug!("Video {video_id} is not in playlist {playlist_id}");
            return Ok(false);
        };
        self.remove_set_video_id_from_playlist(playlist_id, &set_video_id, Some(&context))
            .await?;
        Ok(true)
    }

    // ============================================================================================
    // FAVORITES
    // ============================================================================================

    /// Get the id of the Favorites (liked videos) playlist.
    ///
    /// The id is read from the navigation guide the first time and cached for
    /// the lifetime of the client.
    pub async fn favorites_playlist_id(&mut self) -> Result<String> {
        self.require_login()?;
        if let Some(id) = &self.favorites_playlist_id {
            return Ok(id.clone());
        }

        let html = self.fetch_page(&self.page_url("/")).await?;
        let guide = initial_guide_data(&html)?;
        let id = find_favorites_in_guide(&guide)?.ok_or_else(|| {
            YouTubeError::Lookup(crate::path::PathError::KeyNotFound {
                path: "guide".to_string(),
                segment: FAVORITES_ICON.to_string(),
            })
        })?;

        log::debug!("Got favorites playlist id: {id}");
        self.favorites_playlist_id = Some(id.clone());
        Ok(id)
    }

    /// Remove every video from the Favorites playlist.
    pub async fn clear_favorites(&mut self) -> Result<usize> {
        self.require_login()?;
        let playlist_id = self.favorites_playlist_id().await?;
        self.clear_playlist(&playlist_id).await
    }

    /// Remove a video from Favorites by video id.
    pub async fn remove_video_id_from_favorites(&mut self, video_id: &str) -> Result<bool> {
        self.require_login()?;
        let playlist_id = self.favorites_playlist_id().await?;
        self.remove_video_id_from_playlist(&playlist_id, video_id)
            .await
    }

    // ============================================================================================
    // HISTORY
    // ============================================================================================

    /// Clear the watch history.
    ///
    /// When the page offers no clear button the history is taken to be empty
    /// already and nothing is sent.
    pub async fn clear_watch_history(&mut self) -> Result<()> {
        self.require_login()?;

        let page_url = self.page_url(HISTORY_PATH);
        let html = self.fetch_page(&page_url).await?;
        let context = ServiceContext::from_config(&find_ytcfg(&html)?, &page_url)?;
        let data = initial_data(&html)?;

        let endpoint = match path(CLEAR_HISTORY_ENDPOINT, &data) {
            Ok(endpoint) => endpoint,
            Err(e) if e.is_lookup() => {
                log::debug!("Clear button is likely disabled, history is likely empty ({e})");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        self.service_call("feedbackEndpoint", endpoint, &context)
            .await?;
        log::info!("Successfully cleared history");
        Ok(())
    }

    /// Delete a watch history entry by video id.
    ///
    /// Returns `false` when no history entry has that id. Only the first
    /// (most recent) match is removed.
    pub async fn remove_video_id_from_history(&mut self, video_id: &str) -> Result<bool> {
        self.require_login()?;

        let found = {
            let mut entries = self.history_entries()?;
            let mut found = None;
            while let Some(entry) = entries.next().await? {
                if entry.video_id == video_id {
                    found = Some((entry, entries.service_context()?));
                    break;
                }
            }
            found
        };

        let Some((entry, context)) = found else {
            log::debug!("Video {video_id} not found in history");
            return Ok(false);
        };
        let endpoint = entry.removal_endpoint.ok_or_else(|| {
            YouTubeError::NotFound(format!("removal endpoint for history entry {video_id}"))
        })?;

        self.service_call("feedbackEndpoint", &endpoint, &context)
            .await?;
        log::info!("Removed {video_id} from history");
        Ok(true)
    }

    /// Pause search history if it is recording, resume it if paused.
    ///
    /// Returns whether the server processed the toggle.
    pub async fn pause_resume_search_history(&mut self) -> Result<bool> {
        self.require_login()?;

        let html = self.fetch_page(&self.page_url(SEARCH_HISTORY_PATH)).await?;
        let ytcfg = find_ytcfg(&html)?;
        let data = initial_data(&html)?;

        let info = path(SEARCH_HISTORY_CONFIRM_ENDPOINT, &data)?;
        let api_url = path_str("commandMetadata.webCommandMetadata.apiUrl", info)?;
        let click_tracking = path_str("clickTrackingParams", info)?;
        let feedback_token = path_str("feedbackEndpoint.feedbackToken", info)?;

        let mut url = self.url(api_url)?;
        url.query_pairs_mut().append_pair("key", &ytcfg.api_key()?);

        let origin = self.config.base_url.clone();
        let headers = vec![
            ("Authorization".to_string(), self.authorization_header()?),
            ("X-Goog-AuthUser".to_string(), "0".to_string()),
            ("X-Origin".to_string(), origin.clone()),
            ("Origin".to_string(), origin),
        ];
        let body = json!({
            "context": {
                "clickTracking": {"clickTrackingParams": click_tracking},
                "client": ytcfg.context_client_body()?,
                "request": {"consistencyTokenJars": [], "internalExperimentFlags": []},
                "user": {"onBehalfOfUser": ytcfg.delegated_session_id()?}
            },
            "feedbackTokens": [feedback_token],
            "isFeedbackTokenUnencrypted": false,
            "shouldMerge": false
        });

        let response = self
            .request_json(Method::Post, url, &headers, RequestBody::Json(body))
            .await?;
        let processed = path_bool("feedbackResponses.0.isProcessed", &response)?;
        log::info!("Search history toggle processed: {processed}");
        Ok(processed)
    }

    /// `SAPISIDHASH` authorization for the current time.
    fn authorization_header(&self) -> Result<String> {
        let sapisid = self
            .cookies
            .first_of(&["SAPISID", "__Secure-3PAPISID"])
            .ok_or_else(|| YouTubeError::Auth("No SAPISID cookie in the session".to_string()))?;
        let now = chrono::Utc::now().timestamp();
        Ok(crate::headers::sapisid_hash(now, sapisid, &self.config.base_url))
    }
}

/// Encode form fields as `application/x-www-form-urlencoded`.
fn encode_form(fields: &[(&str, String)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Require a `service_ajax` response to carry `"code": "SUCCESS"`.
fn ensure_success(response: &Value, action: &str) -> Result<()> {
    let code = path_opt("code", response)?
        .and_then(Value::as_str)
        .unwrap_or("<missing>");
    if code == SUCCESS_CODE {
        Ok(())
    } else {
        Err(YouTubeError::UnexpectedResult(format!(
            "{action} returned code {code}"
        )))
    }
}

/// Guide entry id of `item` if it is the Favorites entry.
fn favorites_entry_id(item: &Value) -> Result<Option<String>> {
    let Some(entry) = path_opt("guideEntryRenderer", item)? else {
        return Ok(None);
    };
    match path_opt("icon.iconType", entry)?.and_then(Value::as_str) {
        Some(FAVORITES_ICON) => Ok(Some(
            path_str("entryData.guideEntryData.guideEntryId", entry)?.to_string(),
        )),
        _ => Ok(None),
    }
}

/// Scan one list of guide items: plain entries first, then the entries
/// hidden inside collapsible ones.
fn check_section_items(items: &[Value]) -> Result<Option<String>> {
    for item in items {
        if let Some(id) = favorites_entry_id(item)? {
            return Ok(Some(id));
        }
    }
    for item in items {
        if let Some(Value::Array(expandable)) =
            path_opt("guideCollapsibleEntryRenderer.expandableItems", item)?
        {
            for e_item in expandable {
                if let Some(id) = favorites_entry_id(e_item)? {
                    return Ok(Some(id));
                }
            }
        }
    }
    Ok(None)
}

/// Find the Favorites playlist id in the guide model.
///
/// Strategies, in order: entries directly in a guide section, then entries in
/// a section's collapsible sub-section (`guideCollapsibleSectionEntryRenderer`).
pub fn find_favorites_in_guide(guide: &Value) -> Result<Option<String>> {
    let empty = Vec::new();
    let sections: Vec<&Vec<Value>> = match path_opt("items", guide)? {
        Some(Value::Array(sections)) => sections
            .iter()
            .map(|section| match path_opt("guideSectionRenderer.items", section) {
                Ok(Some(Value::Array(items))) => items,
                _ => &empty,
            })
            .collect(),
        _ => Vec::new(),
    };

    for items in &sections {
        if let Some(id) = check_section_items(items)? {
            return Ok(Some(id));
        }
    }

    for items in &sections {
        for item in items.iter() {
            if let Some(Value::Array(section_items)) =
                path_opt("guideCollapsibleSectionEntryRenderer.sectionItems", item)?
            {
                if let Some(id) = check_section_items(section_items)? {
                    return Ok(Some(id));
                }
            }
        }
    }
    Ok(None)
}
