use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdout};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use quiz_core::model::AreaKey;
use services::loader::{load_bank, load_catalog};
use services::sessions::prune_saved;
use services::{
    DirectorySource, HttpSource, QuestionSource, QuizEngine, QuizError, Screen, SessionRng,
    SessionStart,
};
use storage::{ProgressStore, Storage};

mod config;
mod keys;
mod render;

use config::{Overrides, QuizConfig};
use keys::Command;

#[derive(Parser)]
#[command(name = "quiz", version, about = "Study quizzes in the terminal")]
struct Cli {
    /// Config file (default: ./quiz.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Fetch assets over HTTP from this base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Read assets from this directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Name of the area catalog file
    #[arg(long, global = true)]
    areas_file: Option<String>,

    /// SQLite database url or path
    #[arg(long = "db", global = true)]
    db_url: Option<String>,

    /// Seed for reproducible shuffles
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Take quizzes interactively (default)
    Play,
    /// List areas with their saved progress
    Areas,
    /// Forget the saved session of one area
    Reset {
        /// Area short name
        area: String,
    },
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<()> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let Some(path) = db_url.strip_prefix("sqlite://") else {
        bail!("invalid database url: {db_url}");
    };
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        bail!("invalid database url: {db_url}");
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)
            .with_context(|| format!("cannot create {}", path.display()))?;
    }

    Ok(())
}

fn build_source(config: &QuizConfig) -> Result<Arc<dyn QuestionSource>> {
    Ok(match &config.base_url {
        Some(url) => Arc::new(HttpSource::new(url, config.areas_file.clone())?),
        None => Arc::new(DirectorySource::new(
            config.data_dir.clone(),
            config.areas_file.clone(),
        )),
    })
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = QuizConfig::load(cli.config.as_deref())?;
    config.apply_env(|key| std::env::var(key).ok())?;
    config.apply_overrides(Overrides {
        base_url: cli.base_url,
        data_dir: cli.data_dir,
        areas_file: cli.areas_file,
        db_url: cli.db_url,
        seed: cli.seed,
    });

    // Open + migrate SQLite at startup. Keep this in the binary glue.
    let db_url = normalize_sqlite_url(config.db_url.clone());
    prepare_sqlite_file(&db_url)?;
    let storage = Storage::sqlite(&db_url)
        .await
        .with_context(|| format!("cannot open {db_url}"))?;
    let source = build_source(&config)?;

    match cli.command.unwrap_or(Commands::Play) {
        Commands::Play => play(source, storage, config.seed).await,
        Commands::Areas => list_areas(source.as_ref(), storage).await,
        Commands::Reset { area } => {
            let area = AreaKey::new(area);
            ProgressStore::new(storage.kv).reset(&area).await?;
            info!(%area, "saved session cleared");
            Ok(())
        }
    }
}

async fn list_areas(source: &dyn QuestionSource, storage: Storage) -> Result<()> {
    let catalog = load_catalog(source).await?;
    let progress = ProgressStore::new(storage.kv);
    for (n, area) in catalog.areas().iter().enumerate() {
        let saved = progress.load(area.key()).await?;
        let saved = match load_bank(source, area).await {
            Ok(bank) => prune_saved(&bank, &saved).unwrap_or(saved),
            Err(err) => {
                warn!(%err, "counting saved progress without the question bank");
                saved
            }
        };
        let counts = saved
            .status
            .as_ref()
            .map(|status| status.counts(status.indices().collect::<Vec<_>>()))
            .unwrap_or_default();
        println!(
            "{:>2}. {:<32} {:<16} {:<12} {} correct, {} wrong, {} pending",
            n + 1,
            area.name(),
            area.quiz_type().label(),
            area.key(),
            counts.correct,
            counts.fail,
            counts.pending
        );
    }
    Ok(())
}

async fn say(stdout: &mut Stdout, text: &str) -> Result<()> {
    stdout.write_all(text.as_bytes()).await?;
    stdout.flush().await?;
    Ok(())
}

async fn play(
    source: Arc<dyn QuestionSource>,
    storage: Storage,
    seed: Option<u64>,
) -> Result<()> {
    let rng = seed.map_or_else(SessionRng::from_entropy, SessionRng::seeded);
    let mut engine = QuizEngine::new(source, storage.kv).with_rng(rng);
    if let Some(seed) = engine.seed() {
        info!(seed, "using fixed seed");
    }
    engine.load_catalog().await?;
    engine.restore_last_area().await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    loop {
        let mut text = String::new();
        render::render(&engine, &mut text)?;
        text.push_str("> ");
        say(&mut stdout, &text).await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let options = engine.question_view().map_or(0, |view| view.options.len());
        let Some(command) = keys::parse(&line, engine.screen(), options) else {
            say(&mut stdout, "? unknown key\n").await?;
            continue;
        };
        if command == Command::Quit {
            break;
        }
        match dispatch(&mut engine, command).await {
            Ok(Some(notice)) => say(&mut stdout, &format!("{notice}\n")).await?,
            Ok(None) => {}
            Err(QuizError::Storage(err)) => return Err(err.into()),
            Err(err) => say(&mut stdout, &format!("! {err}\n")).await?,
        }
    }
    Ok(())
}

fn started(start: SessionStart) -> Option<&'static str> {
    match start {
        SessionStart::Started { .. } => None,
        SessionStart::Empty => Some("No questions selected."),
    }
}

async fn dispatch(
    engine: &mut QuizEngine,
    command: Command,
) -> Result<Option<&'static str>, QuizError> {
    let on_sections = matches!(engine.screen(), Screen::SectionPicker { .. });
    match command {
        Command::SelectArea(position) => engine.select_area_at(position).await?,
        Command::Retry => engine.retry_load().await?,
        Command::StartAll => return engine.start_all().await.map(started),
        Command::OpenSections => engine.open_section_picker().await?,
        Command::OpenQuestions => engine.open_question_picker()?,
        Command::ToggleShuffleQuestions => {
            let on = engine.prefs().is_some_and(|prefs| prefs.questions);
            engine.set_shuffle_questions(!on).await?;
        }
        Command::ToggleShuffleAnswers => {
            let on = engine.prefs().is_some_and(|prefs| prefs.answers);
            engine.set_shuffle_answers(!on).await?;
        }
        Command::Toggle(entry) if on_sections => {
            let name = render::picker_sections(engine).get(entry - 1).cloned();
            if let Some(name) = name {
                engine.toggle_section(&name)?;
            }
        }
        Command::Toggle(entry) => {
            let index = render::picker_questions(engine)
                .get(entry - 1)
                .map(|question| question.index());
            if let Some(index) = index {
                engine.toggle_question(index)?;
            }
        }
        Command::SelectAll => engine.select_all_sections()?,
        Command::ClearPicker if on_sections => engine.clear_sections()?,
        Command::ClearPicker => engine.clear_questions()?,
        Command::StartPicked if on_sections => {
            return engine.start_sections().await.map(started);
        }
        Command::StartPicked => return engine.start_questions().await.map(started),
        Command::CancelPicker => engine.cancel_picker()?,
        Command::Answer(choice) => {
            engine.answer(choice).await?;
        }
        Command::ShowStatus => engine.show_status()?,
        Command::Continue => engine.continue_session().await?,
        Command::OpenQuestion(position) => engine.open_question(position - 1).await?,
        Command::Restart => engine.restart().await?,
        Command::ChangeArea => engine.change_area().await?,
        Command::Quit => {}
    }
    Ok(None)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(Cli::parse()).await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err:#}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_urls_become_absolute() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:".into()), "sqlite::memory:");
        assert_eq!(
            normalize_sqlite_url("sqlite:///tmp/q.db".into()),
            "sqlite:///tmp/q.db"
        );
        assert_eq!(normalize_sqlite_url("/var/q.db".into()), "sqlite:///var/q.db");
        assert!(normalize_sqlite_url("sqlite:rel.db".into()).ends_with("/rel.db"));
    }

    #[test]
    fn memory_database_needs_no_file() {
        prepare_sqlite_file("sqlite::memory:").unwrap();
        assert!(prepare_sqlite_file("postgres://x").is_err());
        assert!(prepare_sqlite_file("sqlite://").is_err());
    }

    #[test]
    fn cli_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["quiz", "areas", "--seed", "3", "--db", "sqlite::memory:"])
            .unwrap();
        assert!(matches!(cli.command, Some(Commands::Areas)));
        assert_eq!(cli.seed, Some(3));
        assert_eq!(cli.db_url.as_deref(), Some("sqlite::memory:"));
    }
}
