use std::path::PathBuf;
use youtube_unofficial::{ClientConfig, YouTubeClient};

/// Build a client from the cookie jar and validate its session.
///
/// Uses `cookies` when given, otherwise the default jar location.
pub async fn load_client(
    cookies: Option<PathBuf>,
) -> Result<YouTubeClient, Box<dyn std::error::Error>> {
    let mut config = ClientConfig::new();
    if let Some(path) = cookies {
        config = config.with_cookie_path(path);
    }

    let http_client = http_client::native::NativeClient::new();
    let mut client = YouTubeClient::from_cookie_file(Box::new(http_client), config)?;

    log::debug!("Validating session ({} cookies)", client.cookies().len());
    client.login().await?;
    Ok(client)
}

/// Print one JSON line to stdout
pub fn output_json<T: serde::Serialize>(value: &T) {
    if let Ok(json) = serde_json::to_string(value) {
        println!("{json}");
    } else {
        log::error!("Failed to serialize output to JSON");
    }
}
