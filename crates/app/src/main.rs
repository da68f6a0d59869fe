use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use flagquiz_core::model::{ItemId, QuizSettings, QuizSettingsDraft};
use rand::SeedableRng;
use rand::rngs::StdRng;
use services::{
    AnswerChoice, Clock, FocusEvent, FocusSink, MasteryProgress, MasteryStore, Notification,
    NotificationSink, QuizError, QuizSession, QuizSettingsService, TimerEvent, TurnStart,
    load_catalog_file,
};
use storage::repository::Storage;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidWeightCap { raw: String },
    InvalidSeed { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidWeightCap { raw } => write!(f, "invalid --weight-cap value: {raw}"),
            ArgsError::InvalidSeed { raw } => write!(f, "invalid --seed value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--db <sqlite_url>] [--catalog <json>] [--weight-cap <n>] [--seed <n>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:flagquiz.sqlite3");
    eprintln!("  --catalog crates/app/assets/countries.json");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  FLAGQUIZ_DB_URL, FLAGQUIZ_CATALOG, RUST_LOG");
}

fn print_commands() {
    println!("Type a country name and press Enter to answer.");
    println!("  ?                show the answer (no credit this turn)");
    println!("  :select <name>   choose without submitting");
    println!("  :check           submit the current choice");
    println!("  :peek [name]     look up a country (no credit this turn)");
    println!("  :skip            new random country");
    println!("  :progress        show progress");
    println!("  :list            list countries, memorized ones marked");
    println!("  :reset           forget all progress");
    println!("  :quit            exit");
}

struct Args {
    db_url: String,
    catalog_path: PathBuf,
    weight_cap: Option<f64>,
    seed: Option<u64>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("FLAGQUIZ_DB_URL")
            .ok()
            .map_or_else(|| normalize_sqlite_url("flagquiz.sqlite3".into()), normalize_sqlite_url);
        let mut catalog_path = std::env::var("FLAGQUIZ_CATALOG").map_or_else(
            |_| PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/countries.json")),
            PathBuf::from,
        );
        let mut weight_cap = None;
        let mut seed = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--catalog" => {
                    catalog_path = PathBuf::from(require_value(args, "--catalog")?);
                }
                "--weight-cap" => {
                    let value = require_value(args, "--weight-cap")?;
                    let parsed: f64 = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidWeightCap { raw: value.clone() })?;
                    weight_cap = Some(parsed);
                }
                "--seed" => {
                    let value = require_value(args, "--seed")?;
                    let parsed: u64 = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidSeed { raw: value.clone() })?;
                    seed = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            catalog_path,
            weight_cap,
            seed,
        })
    }
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
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// File behind a normalized `sqlite://` URL, query string removed.
fn sqlite_file_path(db_url: &str) -> Option<&std::path::Path> {
    let rest = db_url.strip_prefix("sqlite://")?;
    let path = rest.split_once('?').map_or(rest, |(path, _)| path);
    (!path.is_empty()).then(|| std::path::Path::new(path))
}

/// Creates the database file and its directory so sqlx can open it.
fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }
    let path = sqlite_file_path(db_url).ok_or_else(|| ArgsError::InvalidDbUrl {
        raw: db_url.to_string(),
    })?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    // Append mode never truncates an existing quiz database.
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    tracing::debug!(path = %path.display(), "sqlite file ready");
    Ok(())
}

//
// ─── CONSOLE COLLABORATORS ─────────────────────────────────────────────────────
//

/// Prints focus changes and toasts to stdout.
struct Console;

impl FocusSink for Console {
    fn focus(&self, event: &FocusEvent) {
        println!(
            "  [globe] centered on {:.1}, {:.1}",
            event.coordinates.lat(),
            event.coordinates.lng()
        );
    }
}

impl NotificationSink for Console {
    fn notify(&self, notification: &Notification) {
        match notification {
            Notification::Outcome(outcome) => println!("  >> {}", outcome.label()),
            Notification::Message(text) => println!("  (i) {text}"),
            Notification::MessageExpired => {}
            Notification::AllMastered => println!("  ** Every country memorized! Use :reset to start over."),
            Notification::PersistenceFailed => {
                println!("  !! progress could not be saved; it is kept for this run only");
            }
        }
    }
}

fn print_progress(progress: &MasteryProgress) {
    println!(
        "{} of {} flags memorized, {:.2}% of world population",
        progress.mastered,
        progress.total,
        progress.weight_percent()
    );
}

fn print_choices(choices: &[AnswerChoice]) {
    for choice in choices {
        let mark = if choice.mastered { "✔" } else { " " };
        println!("  {mark} {}", choice.id);
    }
}

fn announce(start: &TurnStart) {
    if let TurnStart::Started(_) = start {
        println!("Which country is this? (? for a hint)");
    }
}

//
// ─── COMMANDS ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Answer(String),
    Select(String),
    Check,
    Hint,
    Peek(Option<String>),
    Skip,
    Progress,
    List,
    Reset,
    Help,
    Quit,
}

impl Command {
    fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let (head, rest) = match line.split_once(' ') {
            Some((head, rest)) => (head, Some(rest.trim().to_string())),
            None => (line, None),
        };
        let cmd = match head {
            "?" => Self::Hint,
            ":select" => Self::Select(rest.unwrap_or_default()),
            ":check" => Self::Check,
            ":peek" => Self::Peek(rest.filter(|name| !name.is_empty())),
            ":skip" => Self::Skip,
            ":progress" => Self::Progress,
            ":list" => Self::List,
            ":reset" => Self::Reset,
            ":help" => Self::Help,
            ":quit" | ":q" => Self::Quit,
            _ => Self::Answer(line.to_string()),
        };
        Some(cmd)
    }
}

fn parse_item(name: &str) -> Result<ItemId, QuizError> {
    ItemId::new(name).map_err(|_| QuizError::UnknownItem(name.to_string()))
}

/// Returns false when the user asked to quit.
async fn handle(session: &mut QuizSession, command: Command) -> Result<bool, QuizError> {
    match command {
        Command::Answer(name) => {
            let id = parse_item(&name)?;
            session.arm_key_submit()?;
            session.select_candidate(&id).await?;
        }
        Command::Select(name) => {
            let id = parse_item(&name)?;
            session.select_candidate(&id).await?;
        }
        Command::Check => {
            session.submit_selected().await?;
        }
        Command::Hint => {
            session.request_hint()?;
        }
        Command::Peek(name) => match name {
            Some(name) => {
                let id = parse_item(&name)?;
                session.peek(&id)?;
                println!("  [peek] {id}");
            }
            None => session.peek_selected()?,
        },
        Command::Skip => announce(&session.start_turn()),
        Command::Progress => print_progress(&session.progress()),
        Command::List => print_choices(&session.answer_choices()),
        Command::Reset => {
            announce(&session.reset().await);
            print_progress(&session.progress());
        }
        Command::Help => print_commands(),
        Command::Quit => return Ok(false),
    }
    Ok(true)
}

async fn load_settings(
    service: &QuizSettingsService,
    weight_cap: Option<f64>,
) -> Result<QuizSettings, Box<dyn std::error::Error>> {
    let current = service.load().await?;
    let Some(cap) = weight_cap else {
        return Ok(current);
    };
    let saved = service
        .save(QuizSettingsDraft {
            weight_cap: Some(cap),
            advance_delay_ms: Some(current.advance_delay_ms()),
            message_duration_ms: Some(current.message_duration_ms()),
            exhaustion: Some(current.exhaustion()),
        })
        .await?;
    Ok(saved)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let args = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Database file must exist before sqlx opens it.
    prepare_sqlite_file(&args.db_url)?;
    let storage = Storage::sqlite(&args.db_url).await?;

    let settings_service = QuizSettingsService::new(Arc::clone(&storage.settings));
    let settings = load_settings(&settings_service, args.weight_cap).await?;
    let catalog = Arc::new(load_catalog_file(&args.catalog_path)?);
    tracing::info!(
        db = %args.db_url,
        catalog = %args.catalog_path.display(),
        items = catalog.len(),
        "flag quiz ready"
    );

    let console = Arc::new(Console);
    let mut session = QuizSession::open(
        catalog,
        MasteryStore::new(Arc::clone(&storage.mastery)),
        settings,
    )
    .await?
    .with_focus_sink(console.clone())
    .with_notification_sink(console);
    if let Some(seed) = args.seed {
        session = session.with_rng(StdRng::seed_from_u64(seed));
    }

    print_commands();
    print_progress(&session.progress());
    announce(&session.start_turn());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let deadline = session.next_deadline();
        let timer = async move {
            match deadline {
                Some(deadline) => {
                    let wait = deadline.remaining(Clock::default_clock().now());
                    tokio::time::sleep(wait.to_std().unwrap_or_default()).await;
                }
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let Some(command) = Command::parse(&line) else { continue };
                match handle(&mut session, command).await {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(QuizError::NoSelection) => {}
                    Err(err) => tracing::warn!(error = %err, "command rejected"),
                }
            }
            () = timer => {
                for event in session.poll_timers() {
                    if let TimerEvent::Advanced(start) = event {
                        announce(&start);
                    }
                }
            }
        }
    }

    print_progress(&session.progress());
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        tracing::error!(error = %err, "flag quiz stopped");
        std::process::exit(2);
    }
}
