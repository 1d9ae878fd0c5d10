mod commands;

use clap::Parser;
use commands::{execute_command, utils::load_client, Commands};
use std::path::PathBuf;

/// Manage a signed-in YouTube account from the command line
#[derive(Parser)]
#[command(
    name = "youtube-unofficial",
    about = "Manage a signed-in YouTube account from the command line",
    long_about = None
)]
struct Cli {
    /// Show detailed debug information
    #[arg(long, global = true)]
    verbose: bool,

    /// Netscape cookies.txt exported from a signed-in browser session
    /// (defaults to $YOUTUBE_UNOFFICIAL_COOKIES or ~/.config/ytch-cookies.txt)
    #[arg(long, global = true)]
    cookies: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let mut client = match load_client(args.cookies).await {
        Ok(client) => client,
        Err(e) => {
            eprintln!("❌ Failed to log in: {e}");
            eprintln!();
            eprintln!("Export cookies for youtube.com from a signed-in browser to");
            eprintln!("~/.config/ytch-cookies.txt or pass --cookies <path>.");
            std::process::exit(1);
        }
    };

    if let Err(e) = execute_command(args.command, &mut client).await {
        eprintln!("❌ Command failed: {e}");
        std::process::exit(1);
    }

    Ok(())
}
