use crate::client::{RequestBody, YouTubeClient, BROWSE_AJAX_PATH};
use crate::initial::initial_data;
use crate::path::{path, path_default, path_opt};
use crate::types::{is_continuation_item, ContinuationCursor, HistoryEntry, PlaylistEntry};
use crate::ytcfg::{find_ytcfg, PageConfig, ServiceContext};
use crate::{Result, YouTubeError};

use async_trait::async_trait;
use http_types::Method;
use serde_json::Value;
use std::collections::{HashSet, VecDeque};

static EMPTY_LIST: Value = Value::Array(Vec::new());

/// Async iterator trait for paginated YouTube collections.
///
/// This trait provides a common interface for walking collections that the
/// site renders incrementally, such as playlists and watch history. Each call
/// to [`next`](Self::next) issues at most one continuation request.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait(?Send)]
pub trait AsyncPaginatedIterator<T> {
    /// Fetch the next item from the iterator.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(item))` - Next item in the sequence
    /// - `Ok(None)` - No more items available
    /// - `Err(...)` - Network or decoding error; the sequence is aborted
    async fn next(&mut self) -> Result<Option<T>>;

    /// Collect all remaining items into a Vec.
    ///
    /// **Warning**: This fetches every remaining batch. Watch history in
    /// particular can span hundreds of requests; prefer [`take`](Self::take)
    /// when only the first items are needed.
    async fn collect_all(&mut self) -> Result<Vec<T>> {
        let mut items = Vec::new();
        while let Some(item) = self.next().await? {
            items.push(item);
        }
        Ok(items)
    }

    /// Take up to n items from the iterator.
    ///
    /// # Arguments
    ///
    /// * `n` - Maximum number of items to collect
    async fn take(&mut self, n: usize) -> Result<Vec<T>> {
        let mut items = Vec::new();
        for _ in 0..n {
            match self.next().await? {
                Some(item) => items.push(item),
                None => break,
            }
        }
        Ok(items)
    }

    /// Number of batches received so far, the server-rendered first batch
    /// included.
    fn current_page(&self) -> u32;
}

/// How a paginated collection is laid out and continued.
///
/// The two collections the site paginates differ in where the first batch
/// sits, which envelope key wraps later batches, and how the continuation
/// request is authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContinuationKind {
    /// Items of a playlist page (`playlistVideoListRenderer`).
    Playlist,
    /// Sections of the watch history page (`sectionListRenderer`).
    History,
}

impl ContinuationKind {
    /// Location of the collection container in the page's initial data.
    pub fn container_path(self) -> &'static str {
        match self {
            ContinuationKind::Playlist => {
                "contents.twoColumnBrowseResultsRenderer.tabs.0.tabRenderer.content.\
                 sectionListRenderer.contents.0.itemSectionRenderer.contents.0.\
                 playlistVideoListRenderer"
            }
            ContinuationKind::History => {
                "contents.twoColumnBrowseResultsRenderer.tabs.0.tabRenderer.content.\
                 sectionListRenderer"
            }
        }
    }

    /// Key under `continuationContents` holding a continued batch.
    pub fn envelope_key(self) -> &'static str {
        match self {
            ContinuationKind::Playlist => "playlistVideoListContinuation",
            ContinuationKind::History => "sectionListContinuation",
        }
    }

    /// History continuations are POSTs carrying the session token, which the
    /// server rotates with every response.
    fn posts_session_token(self) -> bool {
        matches!(self, ContinuationKind::History)
    }

    /// Items of one batch, in rendering order, without continuation
    /// placeholders.
    ///
    /// A missing `contents` key is an empty batch.
    fn batch_items(self, container: &Value) -> Result<Vec<Value>> {
        let contents = path_default("contents", container, &EMPTY_LIST)?;
        let contents = contents.as_array().map(Vec::as_slice).unwrap_or_default();

        match self {
            ContinuationKind::Playlist => Ok(contents
                .iter()
                .filter(|item| !is_continuation_item(item))
                .cloned()
                .collect()),
            ContinuationKind::History => {
                let mut items = Vec::new();
                for section in contents.iter().filter(|s| !is_continuation_item(s)) {
                    let section_items = path("itemSectionRenderer.contents", section)?;
                    if let Value::Array(section_items) = section_items {
                        items.extend(section_items.iter().cloned());
                    }
                }
                Ok(items)
            }
        }
    }
}

enum PagerState {
    /// Nothing requested yet.
    Unstarted,
    /// Server-rendered first batch, not yet handed out.
    Initial {
        batch: Vec<Value>,
        cursor: Option<ContinuationCursor>,
    },
    /// Buffered batch being handed out; `cursor` points at the next one.
    Yielding { cursor: Option<ContinuationCursor> },
    /// A request is outstanding. Observed only if that request was abandoned.
    Fetching,
    Done,
}

/// Lazy walker over a cursor-paginated collection.
///
/// The first call to [`next`](AsyncPaginatedIterator::next) fetches the
/// collection page and hands out its server-rendered items; further batches
/// are requested from `browse_ajax` only once the buffered ones are used up.
/// The walk is forward-only, a cursor is sent at most once, and an error ends
/// it (items already handed out stay valid).
pub struct ContinuationPager<'a> {
    client: &'a mut YouTubeClient,
    kind: ContinuationKind,
    page_url: String,
    state: PagerState,
    buffer: VecDeque<Value>,
    config: Option<PageConfig>,
    headers: Vec<(String, String)>,
    session_token: Option<String>,
    seen_cursors: HashSet<String>,
    batches: u32,
}

impl<'a> ContinuationPager<'a> {
    /// Create a pager over the collection rendered at `page_url`.
    ///
    /// This is typically called via [`YouTubeClient::playlist_items`] or
    /// [`YouTubeClient::history_items`]. No request is made until the first
    /// item is asked for.
    pub fn new(client: &'a mut YouTubeClient, kind: ContinuationKind, page_url: String) -> Self {
        Self {
            client,
            kind,
            page_url,
            state: PagerState::Unstarted,
            buffer: VecDeque::new(),
            config: None,
            headers: Vec::new(),
            session_token: None,
            seen_cursors: HashSet::new(),
            batches: 0,
        }
    }

    pub fn kind(&self) -> ContinuationKind {
        self.kind
    }

    /// Configuration of the collection page, once it has been fetched.
    pub fn page_config(&self) -> Option<&PageConfig> {
        self.config.as_ref()
    }

    /// Mutation context derived from the collection page.
    ///
    /// Fails with [`YouTubeError::NotFound`] before the first item has been
    /// requested.
    pub fn service_context(&self) -> Result<ServiceContext> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| YouTubeError::NotFound("collection page not fetched yet".to_string()))?;
        ServiceContext::from_config(config, &self.page_url)
    }

    async fn load_initial(&mut self) -> Result<(Vec<Value>, Option<ContinuationCursor>)> {
        log::debug!("Fetching {:?} page {}", self.kind, self.page_url);
        let html = self.client.fetch_page(&self.page_url).await?;

        let config = find_ytcfg(&html)?;
        self.headers = config.ajax_headers(&self.page_url)?;
        self.session_token = Some(config.xsrf_token()?);
        self.config = Some(config);

        let data = initial_data(&html)?;
        // an empty collection is rendered without its container
        let Some(container) = path_opt(self.kind.container_path(), &data)? else {
            log::debug!("No {:?} container on {}, collection is empty", self.kind, self.page_url);
            return Ok((Vec::new(), None));
        };
        let batch = self.kind.batch_items(container)?;
        let cursor = ContinuationCursor::from_container(container)?;
        Ok((batch, cursor))
    }

    async fn fetch_continuation(
        &mut self,
        cursor: &ContinuationCursor,
    ) -> Result<(Vec<Value>, Option<ContinuationCursor>)> {
        let mut url = self.client.url(BROWSE_AJAX_PATH)?;
        url.query_pairs_mut().extend_pairs(cursor.query_pairs());

        let (method, body) = if self.kind.posts_session_token() {
            let token = self.session_token.clone().unwrap_or_default();
            (Method::Post, RequestBody::Form(vec![("session_token", token)]))
        } else {
            (Method::Get, RequestBody::Empty)
        };

        let response = self
            .client
            .request_json(method, url, &self.headers, body)
            .await?;

        let envelope = path("1.response", &response).map_err(|e| {
            YouTubeError::Decode(serde::de::Error::custom(format!(
                "unexpected browse_ajax response: {e}"
            )))
        })?;

        if self.kind.posts_session_token() {
            if let Some(Value::String(token)) = path_opt("1.xsrf_token", &response)? {
                self.session_token = Some(token.clone());
            }
        }

        let envelope_path = format!("continuationContents.{}", self.kind.envelope_key());
        let Some(container) = path_opt(&envelope_path, envelope)? else {
            log::debug!("No {envelope_path} in response, end of {:?}", self.kind);
            return Ok((Vec::new(), None));
        };

        let batch = self.kind.batch_items(container)?;
        let next = ContinuationCursor::from_container(container)?;
        Ok((batch, next))
    }
}

#[async_trait(?Send)]
impl AsyncPaginatedIterator<Value> for ContinuationPager<'_> {
    async fn next(&mut self) -> Result<Option<Value>> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Ok(Some(item));
            }

            match std::mem::replace(&mut self.state, PagerState::Done) {
                PagerState::Unstarted => {
                    self.state = PagerState::Fetching;
                    match self.load_initial().await {
                        Ok((batch, cursor)) => self.state = PagerState::Initial { batch, cursor },
                        Err(e) => {
                            self.state = PagerState::Done;
                            return Err(e);
                        }
                    }
                }
                PagerState::Initial { batch, cursor } => {
                    self.batches += 1;
                    log::debug!(
                        "First {:?} batch: {} items, continuation: {}",
                        self.kind,
                        batch.len(),
                        cursor.is_some()
                    );
                    self.buffer.extend(batch);
                    self.state = PagerState::Yielding { cursor };
                }
                PagerState::Yielding {
                    cursor: Some(cursor),
                } => {
                    if !self.seen_cursors.insert(cursor.continuation.clone()) {
                        log::warn!("Continuation cursor repeated, stopping {:?}", self.kind);
                        return Ok(None);
                    }

                    self.state = PagerState::Fetching;
                    match self.fetch_continuation(&cursor).await {
                        Ok((batch, next)) => {
                            self.batches += 1;
                            log::debug!(
                                "{:?} batch {}: {} items, continuation: {}",
                                self.kind,
                                self.batches,
                                batch.len(),
                                next.is_some()
                            );
                            self.buffer.extend(batch);
                            self.state = PagerState::Yielding { cursor: next };
                        }
                        Err(e) => {
                            self.state = PagerState::Done;
                            return Err(e);
                        }
                    }
                }
                PagerState::Yielding { cursor: None } | PagerState::Done => return Ok(None),
                PagerState::Fetching => {
                    log::debug!("Previous {:?} request was abandoned, stopping", self.kind);
                    return Ok(None);
                }
            }
        }
    }

    fn current_page(&self) -> u32 {
        self.batches
    }
}

/// Typed view over a [`ContinuationPager`].
///
/// Items the parser does not recognise (shelves, notices) are skipped.
pub struct Entries<'a, T> {
    pager: ContinuationPager<'a>,
    parse: fn(&Value) -> Result<Option<T>>,
}

/// Entries of a playlist, in playlist order.
pub type PlaylistEntries<'a> = Entries<'a, PlaylistEntry>;

/// Entries of the watch history, most recent first.
pub type HistoryEntries<'a> = Entries<'a, HistoryEntry>;

impl<'a> Entries<'a, PlaylistEntry> {
    pub fn playlist(pager: ContinuationPager<'a>) -> Self {
        Self {
            pager,
            parse: PlaylistEntry::from_item,
        }
    }
}

impl<'a> Entries<'a, HistoryEntry> {
    pub fn history(pager: ContinuationPager<'a>) -> Self {
        Self {
            pager,
            parse: HistoryEntry::from_item,
        }
    }
}

impl<T> Entries<'_, T> {
    /// See [`ContinuationPager::service_context`].
    pub fn service_context(&self) -> Result<ServiceContext> {
        self.pager.service_context()
    }
}

#[async_trait(?Send)]
impl<T> AsyncPaginatedIterator<T> for Entries<'_, T> {
    async fn next(&mut self) -> Result<Option<T>> {
        while let Some(item) = self.pager.next().await? {
            if let Some(entry) = (self.parse)(&item)? {
                return Ok(Some(entry));
            }
        }
        Ok(None)
    }

    fn current_page(&self) -> u32 {
        self.pager.current_page()
    }
}
