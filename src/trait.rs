use crate::client::{YouTubeClient, WATCH_LATER_ID};
use crate::{Result, YouTubeError};
use async_trait::async_trait;

/// Trait for account operations that can be mocked for testing.
///
/// This trait abstracts the mutating operations of [`YouTubeClient`] so code
/// built on top of them can be tested without a network.
///
/// # Mocking Support
///
/// When the `mock` feature is enabled, this crate provides `MockYouTubeAccount`
/// that implements this trait using the `mockall` library.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait(?Send)]
pub trait YouTubeAccount {
    /// Validate the cookie session.
    async fn login(&mut self) -> Result<()>;

    /// Check if the client holds a validated session.
    fn is_logged_in(&self) -> bool;

    /// Remove every video from a playlist, returning how many were removed.
    async fn clear_playlist(&mut self, playlist_id: &str) -> Result<usize>;

    /// Remove one membership from a playlist by its set-video id.
    async fn remove_set_video_id_from_playlist(
        &mut self,
        playlist_id: &str,
        set_video_id: &str,
    ) -> Result<()>;

    /// Remove a video from a playlist by video id.
    async fn remove_video_id_from_playlist(
        &mut self,
        playlist_id: &str,
        video_id: &str,
    ) -> Result<bool>;

    /// Id of the Favorites playlist.
    async fn favorites_playlist_id(&mut self) -> Result<String>;

    async fn clear_watch_history(&mut self) -> Result<()>;

    async fn remove_video_id_from_history(&mut self, video_id: &str) -> Result<bool>;

    async fn pause_resume_search_history(&mut self) -> Result<bool>;

    /// Remove every video from Watch Later.
    async fn clear_watch_later(&mut self) -> Result<usize> {
        self.clear_playlist(WATCH_LATER_ID).await
    }

    /// Remove every video from Favorites.
    async fn clear_favorites(&mut self) -> Result<usize> {
        if !self.is_logged_in() {
            return Err(YouTubeError::login_required());
        }
        let playlist_id = self.favorites_playlist_id().await?;
        self.clear_playlist(&playlist_id).await
    }

    /// Remove a video from Favorites by video id.
    async fn remove_video_id_from_favorites(&mut self, video_id: &str) -> Result<bool> {
        if !self.is_logged_in() {
            return Err(YouTubeError::login_required());
        }
        let playlist_id = self.favorites_playlist_id().await?;
        self.remove_video_id_from_playlist(&playlist_id, video_id)
            .await
    }
}

#[async_trait(?Send)]
impl YouTubeAccount for YouTubeClient {
    async fn login(&mut self) -> Result<()> {
        YouTubeClient::login(self).await
    }

    fn is_logged_in(&self) -> bool {
        YouTubeClient::is_logged_in(self)
    }

    async fn clear_playlist(&mut self, playlist_id: &str) -> Result<usize> {
        YouTubeClient::clear_playlist(self, playlist_id).await
    }

    async fn remove_set_video_id_from_playlist(
        &mut self,
        playlist_id: &str,
        set_video_id: &str,
    ) -> Result<()> {
        YouTubeClient::remove_set_video_id_from_playlist(self, playlist_id, set_video_id, None)
            .await
    }

    async fn remove_video_id_from_playlist(
        &mut self,
        playlist_id: &str,
        video_id: &str,
    ) -> Result<bool> {
        YouTubeClient::remove_video_id_from_playlist(self, playlist_id, video_id).await
    }

    async fn favorites_playlist_id(&mut self) -> Result<String> {
        YouTubeClient::favorites_playlist_id(self).await
    }

    async fn clear_watch_history(&mut self) -> Result<()> {
        YouTubeClient::clear_watch_history(self).await
    }

    async fn remove_video_id_from_history(&mut self, video_id: &str) -> Result<bool> {
        YouTubeClient::remove_video_id_from_history(self, video_id).await
    }

    async fn pause_resume_search_history(&mut self) -> Result<bool> {
        YouTubeClient::pause_resume_search_history(self).await
    }
}
