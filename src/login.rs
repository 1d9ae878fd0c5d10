use crate::client::YouTubeClient;
use crate::ytcfg::find_ytcfg;
use crate::{Result, YouTubeError};

impl YouTubeClient {
    /// Validate the session held in the cookie jar.
    ///
    /// Fetches the home page and checks that it was rendered for a signed-in
    /// user. On success the client is marked logged in and the cookie jar
    /// (including anything refreshed by the fetch) is written back to its
    /// configured path.
    ///
    /// # Returns
    ///
    /// Returns [`YouTubeError::Auth`] when the cookies do not carry a
    /// signed-in session.
    pub async fn login(&mut self) -> Result<()> {
        if self.cookies().is_empty() {
            self.set_logged_in(false);
            return Err(YouTubeError::Auth(
                "Cookie jar is empty; export cookies from a signed-in browser session".to_string(),
            ));
        }

        let home = format!("{}/", self.base_url());
        let html = self.fetch_page(&home).await?;
        let ytcfg = find_ytcfg(&html)?;

        if !ytcfg.is_logged_in() {
            self.set_logged_in(false);
            log::warn!("Home page was rendered for a signed-out session");
            return Err(YouTubeError::Auth(
                "Cookies do not belong to a signed-in session".to_string(),
            ));
        }

        log::info!("Session validated, {} cookies in jar", self.cookies().len());
        self.set_logged_in(true);
        self.save_cookies()?;
        Ok(())
    }
}
