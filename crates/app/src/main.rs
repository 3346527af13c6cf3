//! dsa-tracker: a local checklist for working through DSA practice questions.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use services::{Clock, NoticeLevel, TrackerServices};
use tracker_core::curriculum::Route;

mod commands;
mod config;

use commands::edit::Edit;
use commands::transfer::FormatArg;

#[derive(Parser)]
#[command(name = "dsa-tracker")]
#[command(about = "Track progress through DSA practice questions", long_about = None)]
#[command(version)]
struct Cli {
    /// SQLite database (path, sqlite:<path> or sqlite://<path>)
    #[arg(long = "db", env = "TRACKER_DB_URL", default_value = config::DEFAULT_DB_URL, global = true)]
    db_url: String,

    /// Upper bound in seconds for a single storage operation
    #[arg(long, env = "TRACKER_STORE_TIMEOUT_SECS", default_value_t = 5, global = true)]
    timeout_secs: u64,

    /// Log level when RUST_LOG is not set
    #[arg(long, env = "TRACKER_LOG", default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List topics with their progress
    List,

    /// Show the questions of a topic
    Show {
        /// Topic slug or route (e.g. graph, /bst); `/` lists topics, `about` explains the app
        topic: String,
    },

    /// Mark a question done
    Done {
        topic: String,
        /// Question number, starting at 1
        number: usize,
        /// Mark it not done instead
        #[arg(long)]
        undo: bool,
    },

    /// Bookmark a question
    Bookmark {
        topic: String,
        number: usize,
        /// Remove the bookmark instead
        #[arg(long)]
        remove: bool,
    },

    /// Set or clear the note on a question
    Note {
        topic: String,
        number: usize,
        /// Note text
        text: Option<String>,
        /// Remove the note
        #[arg(long)]
        clear: bool,
    },

    /// List bookmarked questions across all topics
    Bookmarks,

    /// Export stored progress
    Export {
        #[arg(long, short, value_enum, default_value = "report")]
        format: FormatArg,

        /// Output file (prints to stdout if omitted)
        #[arg(long, short)]
        out: Option<PathBuf>,
    },

    /// Replace all progress with a JSON export
    Import { file: PathBuf },

    /// Delete all progress and restore the default question list
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

async fn run(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let db_url = config::normalize_sqlite_url(&cli.db_url, &cwd)?;
    let store_config = config::store_config(cli.timeout_secs)?;

    config::prepare_sqlite_file(&db_url)?;
    tracing::debug!(%db_url, "opening progress store");
    let services = TrackerServices::new_sqlite(&db_url, store_config, Clock::system()).await?;
    let coordinator = services.coordinator();

    match cli.command {
        Commands::List => {
            let snapshot = commands::loaded(&coordinator).await?;
            println!("{}", commands::view::topic_list(&snapshot));
        }

        Commands::Show { topic } => match commands::resolve_route(&topic)? {
            Route::Home => {
                let snapshot = commands::loaded(&coordinator).await?;
                println!("{}", commands::view::topic_list(&snapshot));
            }
            Route::About => println!("{}", commands::view::ABOUT),
            Route::Topic(position) => {
                let snapshot = commands::loaded(&coordinator).await?;
                println!("{}", commands::view::show_topic(&snapshot, position)?);
            }
        },

        Commands::Done { topic, number, undo } => {
            let position = commands::resolve_topic(&topic)?;
            let msg = commands::edit::execute(&coordinator, position, number, Edit::Done(!undo))
                .await?;
            println!("{}", msg.green());
        }

        Commands::Bookmark {
            topic,
            number,
            remove,
        } => {
            let position = commands::resolve_topic(&topic)?;
            let msg =
                commands::edit::execute(&coordinator, position, number, Edit::Bookmark(!remove))
                    .await?;
            println!("{}", msg.green());
        }

        Commands::Note {
            topic,
            number,
            text,
            clear,
        } => {
            let position = commands::resolve_topic(&topic)?;
            let edit = Edit::note(text, clear)?;
            let msg = commands::edit::execute(&coordinator, position, number, edit).await?;
            println!("{}", msg.green());
        }

        Commands::Bookmarks => {
            let snapshot = commands::loaded(&coordinator).await?;
            println!("{}", commands::view::bookmarks(&snapshot));
        }

        Commands::Export { format, out } => {
            match commands::transfer::export(&services, format, out.as_deref()).await? {
                Some(rendered) => println!("{rendered}"),
                None => {
                    if let Some(path) = out {
                        println!("{} {}", "Exported to".green(), path.display());
                    }
                }
            }
        }

        Commands::Import { file } => {
            commands::transfer::import(&coordinator, &file).await?;
            let progress = coordinator.snapshot().progress();
            println!(
                "{} {}/{} done, {} bookmarked",
                "Imported:".green(),
                progress.done,
                progress.total,
                progress.bookmarked
            );
        }

        Commands::Reset { yes } => {
            if commands::transfer::reset(&coordinator, yes).await? {
                println!("{}", "Progress reset.".green());
            } else {
                println!("Aborted.");
            }
        }
    }

    if let Some(notice) = coordinator.snapshot().notice() {
        if notice.level == NoticeLevel::Error {
            eprintln!("{} {}", "warning:".yellow(), notice.message);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    config::init_logging(&cli.log_level);

    if let Err(err) = run(cli).await {
        eprintln!("{} {err:#}", "error:".red());
        std::process::exit(2);
    }
}
