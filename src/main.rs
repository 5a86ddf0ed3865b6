mod app;
mod config;
mod input;
mod lyrics;
mod player;
mod tui;

use anyhow::Context;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "lyra", version, about = "Terminal lyrics viewer synced to the host player")]
struct Cli {
    /// Override config file path.
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the interactive TUI (default).
    Tui,
    /// Fetch lyrics for a song and print them to stdout (headless).
    Fetch { artist: String, title: String },
    /// Inspect or clear the song cache.
    Cache {
        #[command(subcommand)]
        cmd: CacheCommand,
    },
}

#[derive(Debug, Subcommand)]
enum CacheCommand {
    /// List cached songs.
    List,
    /// Print the number of cached songs.
    Count,
    /// Delete every cached song.
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref()).context("load config")?;

    match cli.command.unwrap_or(Command::Tui) {
        Command::Tui => {
            let mut terminal = tui::TerminalGuard::enter().context("init terminal")?;
            let mut app = app::App::new(cfg);
            app.run(terminal.terminal_mut()).await?;
        }
        Command::Fetch { artist, title } => {
            let (service, _) = app::build_service(&cfg);
            let song = service
                .fetch(&artist, &title)
                .await
                .with_context(|| format!("fetch lyrics for {artist} - {title}"))?;
            print_song(&song);
        }
        Command::Cache { cmd } => {
            let (service, _) = app::build_service(&cfg);
            match cmd {
                CacheCommand::List => {
                    for entry in service.list_cached() {
                        println!("{} - {}", entry.artist, entry.title);
                    }
                }
                CacheCommand::Count => {
                    println!("{}", service.cached_count());
                }
                CacheCommand::Clear => {
                    service.clear_cache().context("clear cache")?;
                    println!("Cache cleared.");
                }
            }
        }
    }

    Ok(())
}

fn print_song(song: &lyrics::Song) {
    if song.has_synced {
        for line in &song.synced_lines {
            let minutes = (line.timestamp / 60.0) as u32;
            let seconds = line.timestamp % 60.0;
            println!("[{:02}:{:05.2}] {}", minutes, seconds, line.text);
        }
    } else {
        println!("{}", song.lyrics);
    }
}
