pub mod list;
pub mod utils;

use clap::Subcommand;
use youtube_unofficial::YouTubeClient;

#[derive(Subcommand)]
pub enum Commands {
    /// Clear the watch history
    ClearHistory,

    /// Remove every video from Watch Later
    ClearWatchLater,

    /// Remove every video from Favorites (liked videos)
    ClearFavorites,

    /// Remove every video from a playlist
    ///
    /// Usage examples:
    /// # Empty a playlist by id
    /// youtube-unofficial clear-playlist PLxxxxxxxxxxxxxxxx
    ClearPlaylist {
        /// Playlist id
        playlist_id: String,
    },

    /// Remove a video from a playlist
    RemoveFromPlaylist {
        /// Playlist id
        playlist_id: String,

        /// Video id to remove
        video_id: String,

        /// Treat VIDEO_ID as a set-video id (the playlist membership id)
        #[arg(long)]
        set_video_id: bool,
    },

    /// Remove a video from Watch Later
    RemoveFromWatchLater {
        /// Video id to remove
        video_id: String,
    },

    /// Remove a video from Favorites
    RemoveFromFavorites {
        /// Video id to remove
        video_id: String,
    },

    /// Remove a video from the watch history
    RemoveFromHistory {
        /// Video id to remove
        video_id: String,
    },

    /// Pause search history if it is recording, resume it if paused
    ToggleSearchHistory,

    /// List the videos of a playlist as JSON lines
    ListPlaylist {
        /// Playlist id (WL for Watch Later)
        playlist_id: String,

        /// Maximum number of entries to show (0 for no limit)
        #[arg(long, default_value = "0")]
        limit: usize,
    },

    /// List the watch history as JSON lines
    ListHistory {
        /// Maximum number of entries to show (0 for no limit)
        #[arg(long, default_value = "0")]
        limit: usize,
    },

    /// Print the id of the Favorites playlist
    FavoritesId,
}

/// Execute the given command with the provided client
pub async fn execute_command(
    command: Commands,
    client: &mut YouTubeClient,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::ClearHistory => {
            client.clear_watch_history().await?;
            println!("✅ Watch history cleared");
        }

        Commands::ClearWatchLater => {
            let removed = client.clear_watch_later().await?;
            println!("✅ Removed {removed} videos from Watch Later");
        }

        Commands::ClearFavorites => {
            let removed = client.clear_favorites().await?;
            println!("✅ Removed {removed} videos from Favorites");
        }

        Commands::ClearPlaylist { playlist_id } => {
            let removed = client.clear_playlist(&playlist_id).await?;
            println!("✅ Removed {removed} videos from {playlist_id}");
        }

        Commands::RemoveFromPlaylist {
            playlist_id,
            video_id,
            set_video_id,
        } => {
            if set_video_id {
                client
                    .remove_set_video_id_from_playlist(&playlist_id, &video_id, None)
                    .await?;
                println!("✅ Removed {video_id} from {playlist_id}");
            } else {
                report_removal(
                    client
                        .remove_video_id_from_playlist(&playlist_id, &video_id)
                        .await?,
                    &video_id,
                    &playlist_id,
                );
            }
        }

        Commands::RemoveFromWatchLater { video_id } => {
            let removed = client
                .remove_video_id_from_playlist(youtube_unofficial::WATCH_LATER_ID, &video_id)
                .await?;
            report_removal(removed, &video_id, "Watch Later");
        }

        Commands::RemoveFromFavorites { video_id } => {
            let removed = client.remove_video_id_from_favorites(&video_id).await?;
            report_removal(removed, &video_id, "Favorites");
        }

        Commands::RemoveFromHistory { video_id } => {
            let removed = client.remove_video_id_from_history(&video_id).await?;
            report_removal(removed, &video_id, "history");
        }

        Commands::ToggleSearchHistory => {
            if client.pause_resume_search_history().await? {
                println!("✅ Search history toggled");
            } else {
                return Err("Search history toggle was not processed".into());
            }
        }

        Commands::ListPlaylist { playlist_id, limit } => {
            list::handle_list_playlist(client, &playlist_id, limit).await?;
        }

        Commands::ListHistory { limit } => {
            list::handle_list_history(client, limit).await?;
        }

        Commands::FavoritesId => {
            println!("{}", client.favorites_playlist_id().await?);
        }
    }

    Ok(())
}

fn report_removal(removed: bool, video_id: &str, from: &str) {
    if removed {
        println!("✅ Removed {video_id} from {from}");
    } else {
        println!("ℹ️  {video_id} is not in {from}");
    }
}
