use crate::session::CookieJar;
use crate::{Result, YouTubeError};
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the cookie jar inside the user's configuration directory.
pub const DEFAULT_COOKIE_FILE: &str = "ytch-cookies.txt";

/// Environment variable overriding the cookie jar location.
pub const COOKIES_PATH_ENV: &str = "YOUTUBE_UNOFFICIAL_COOKIES";

/// Cookie jar persistence in a browser-compatible `cookies.txt` file.
///
/// The jar lives at `~/.config/ytch-cookies.txt` by default (or the
/// platform's equivalent configuration directory), so a file exported from a
/// browser session can be dropped in place and used directly.
pub struct CookiePersistence;

impl CookiePersistence {
    /// Get the default cookie jar path.
    ///
    /// Honours `YOUTUBE_UNOFFICIAL_COOKIES` when set, otherwise returns a path
    /// inside the configuration directory.
    pub fn default_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(COOKIES_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }
        let config_dir = dirs::config_dir().ok_or_else(|| {
            YouTubeError::NotFound("Cannot determine configuration directory".to_string())
        })?;
        Ok(config_dir.join(DEFAULT_COOKIE_FILE))
    }

    /// Load the cookie jar at `path`.
    ///
    /// A missing file is created empty. A file that cannot be decoded as text
    /// yields an empty jar rather than an error; unparseable lines inside a
    /// readable file are skipped.
    pub fn load(path: &Path) -> Result<CookieJar> {
        log::debug!("Initialising cookie jar at {}", path.display());

        if !path.exists() {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            fs::write(path, "")?;
            log::debug!("Cookie file {} does not yet exist, created it", path.display());
            return Ok(CookieJar::new());
        }

        let bytes = fs::read(path)?;
        let jar = match String::from_utf8(bytes) {
            Ok(content) => CookieJar::from_netscape(&content),
            Err(e) => {
                log::warn!(
                    "Cookie file {} is not valid text ({e}), starting with an empty jar",
                    path.display()
                );
                CookieJar::new()
            }
        };

        log::debug!("Loaded {} cookies from {}", jar.len(), path.display());
        Ok(jar)
    }

    /// Save the cookie jar to `path`, creating parent directories.
    pub fn save(jar: &CookieJar, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, jar.to_netscape())?;
        log::debug!("Saved {} cookies to {}", jar.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("youtube-unofficial-test-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_missing_file_is_created_empty() {
        let path = temp_path("missing/cookies.txt");
        let _ = fs::remove_file(&path);

        let jar = CookiePersistence::load(&path).unwrap();
        assert!(jar.is_empty());
        assert!(path.exists());
    }

    #[test]
    fn test_corrupt_file_falls_back_to_empty_jar() {
        let path = temp_path("corrupt.txt");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, [0xff, 0xfe, 0x00, 0x81]).unwrap();

        let jar = CookiePersistence::load(&path).unwrap();
        assert!(jar.is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let path = temp_path("saved/cookies.txt");
        let mut jar = CookieJar::new();
        jar.store_set_cookies(["SAPISID=xyz; Domain=.youtube.com"], "www.youtube.com");

        CookiePersistence::save(&jar, &path).unwrap();
        let loaded = CookiePersistence::load(&path).unwrap();
        assert_eq!(loaded.get("SAPISID"), Some("xyz"));
    }

    #[test]
    fn test_default_path_file_name() {
        if std::env::var(COOKIES_PATH_ENV).is_ok() || dirs::config_dir().is_none() {
            return;
        }
        let path = CookiePersistence::default_path().unwrap();
        assert!(path.ends_with(DEFAULT_COOKIE_FILE));
    }
}
