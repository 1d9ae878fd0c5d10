use super::utils::output_json;
use serde::Serialize;
use youtube_unofficial::{AsyncPaginatedIterator, YouTubeClient};

/// One listed video (JSON output to stdout)
#[derive(Debug, Serialize)]
struct ListedVideo<'a> {
    index: usize,
    video_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    set_video_id: Option<&'a str>,
    title: Option<&'a str>,
}

/// Print the entries of a playlist, one JSON object per line
pub async fn handle_list_playlist(
    client: &mut YouTubeClient,
    playlist_id: &str,
    limit: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut entries = client.playlist_entries(playlist_id)?;
    let mut index = 0;

    while let Some(entry) = entries.next().await? {
        output_json(&ListedVideo {
            index,
            video_id: &entry.video_id,
            set_video_id: Some(&entry.set_video_id),
            title: entry.title.as_deref(),
        });
        index += 1;
        if limit > 0 && index >= limit {
            break;
        }
    }

    log::info!("Listed {index} entries of {playlist_id} ({} batches)", entries.current_page());
    Ok(())
}

/// Print watch history entries, most recent first
pub async fn handle_list_history(
    client: &mut YouTubeClient,
    limit: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut entries = client.history_entries()?;
    let mut index = 0;

    while let Some(entry) = entries.next().await? {
        output_json(&ListedVideo {
            index,
            video_id: &entry.video_id,
            set_video_id: None,
            title: entry.title.as_deref(),
        });
        index += 1;
        if limit > 0 && index >= limit {
            break;
        }
    }

    log::info!("Listed {index} history entries ({} batches)", entries.current_page());
    Ok(())
}
