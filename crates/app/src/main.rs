//! Terminal quiz player.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use quiz_core::model::{LessonId, Mode};
use services::AppServices;
use tracing_subscriber::EnvFilter;

mod config;
mod play;
mod render;

use config::AppConfig;

/// Multiple-choice lessons with XP, levels, and streaks.
#[derive(Parser, Debug)]
#[command(name = "quiz")]
#[command(version, about, long_about = None)]
struct Cli {
    /// SQLite database holding stats and history
    #[arg(
        long,
        env = "QUIZ_DB_URL",
        default_value = "sqlite://quiz.sqlite3",
        global = true
    )]
    db: String,

    /// JSON lesson file (defaults to the built-in lessons)
    #[arg(long, env = "QUIZ_LESSONS", value_name = "FILE", global = true)]
    lessons: Option<PathBuf>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play a lesson
    Play {
        /// Lesson id (defaults to the first lesson not yet completed)
        lesson: Option<String>,

        /// learn, fun, speedrun or challenge
        #[arg(short, long, default_value_t = Mode::Learn)]
        mode: Mode,

        /// Shuffle question order
        #[arg(long)]
        shuffle: bool,

        /// Delay before auto-advancing in fun, speedrun and challenge modes
        #[arg(long, value_name = "MS")]
        auto_advance_ms: Option<u64>,
    },
    /// List available lessons
    Lessons,
    /// Show player stats
    Stats {
        /// Forget all stats
        #[arg(long)]
        reset: bool,
    },
    /// Show recent runs
    History {
        /// Only runs of this lesson
        #[arg(long)]
        lesson: Option<String>,

        #[arg(short = 'n', long, default_value_t = 10)]
        limit: u32,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (warn)
    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = AppConfig::new(&cli.db, cli.lessons);
    if let Command::Play {
        shuffle,
        auto_advance_ms,
        ..
    } = &cli.command
    {
        config.shuffle = *shuffle;
        config.auto_advance = auto_advance_ms.map(Duration::from_millis);
    }
    tracing::debug!(db = %config.db_url, lessons = ?config.lessons, "configuration resolved");

    let services = config.build_services().await?;

    match cli.command {
        Command::Play { lesson, mode, .. } => {
            let lesson_id = match lesson {
                Some(id) => LessonId::new(id),
                None => next_lesson(&services).await?,
            };
            play::play(&services, &lesson_id, mode).await
        }
        Command::Lessons => {
            let stats = services.stats().load().await?;
            for lesson in services.catalog().lessons() {
                println!(
                    "{}",
                    render::lesson_line(lesson, stats.has_completed(lesson.id()))
                );
            }
            Ok(())
        }
        Command::Stats { reset } => {
            if reset {
                services.stats().reset().await?;
                println!("Stats reset.");
            }
            println!("{}", render::stats(&services.stats().overview().await?));
            Ok(())
        }
        Command::History { lesson, limit } => {
            let lesson = lesson.map(LessonId::new);
            let rows = services.history(lesson.as_ref(), limit).await?;
            if rows.is_empty() {
                println!("No runs yet.");
            }
            for row in rows {
                println!("{}", render::history_line(row.id, &row.summary));
            }
            Ok(())
        }
    }
}

/// First lesson not completed yet, or the first lesson once all are done.
async fn next_lesson(services: &AppServices) -> anyhow::Result<LessonId> {
    let stats = services.stats().load().await?;
    let catalog = services.catalog();
    let lesson = catalog
        .lessons()
        .iter()
        .find(|lesson| !stats.has_completed(lesson.id()))
        .or_else(|| catalog.lessons().first())
        .ok_or_else(|| anyhow::anyhow!("no lessons available"))?;
    Ok(lesson.id().clone())
}
