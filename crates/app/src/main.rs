use std::fmt;
use std::sync::Arc;

use rand::rng;
use rand::seq::SliceRandom;

use progress_core::Clock;
use progress_core::model::{
    AssignmentId, GameId, GameThresholds, ItemAnswered, ItemId, StudentId, TrackerConfigDraft,
};
use services::{
    AssignmentContext, CompletionTracker, ProgressStoreService, TrackerSubscription,
    tracker_channel,
};
use storage::repository::{
    AssignmentGame, AssignmentRecord, InMemoryProgressRepository, ProgressRepository,
};
use storage::sqlite::SqliteRepository;
use ui::vm::progress_fmt;
use ui::{ModalChoice, ModalVm, Navigator};

mod telemetry;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidGame { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidGame { raw } => write!(f, "invalid --game value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
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

struct Args {
    /// `None` runs against the in-memory repository.
    db_url: Option<String>,
    game: GameId,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--db <sqlite_url>] [--game <slug>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  in-memory storage, --game memory-game");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  LOG_LEVEL, LOG_FORMAT (pretty|json)");
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = None;
        let mut game = GameId::new("memory-game")
            .map_err(|_| ArgsError::InvalidGame { raw: "memory-game".into() })?;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = Some(normalize_sqlite_url(value));
                }
                "--game" => {
                    let value = require_value(args, "--game")?;
                    game = GameId::new(&value)
                        .map_err(|_| ArgsError::InvalidGame { raw: value })?;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self { db_url, game })
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
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> std::io::Result<()> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }
    if let Some(path) = db_url.strip_prefix("sqlite://") {
        let path = std::path::Path::new(path);
        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::File::create(path)?;
        }
    }
    Ok(())
}

/// Navigation target for the demo: there is no router here, so "navigating"
/// just logs where a real host would go.
struct LoggingNavigator;

impl Navigator for LoggingNavigator {
    fn go_to_assignment(&self, assignment_id: AssignmentId) {
        tracing::info!(%assignment_id, "navigating to assignment overview");
    }
}

const WORDS: &[&str] = &[
    "rot", "blau", "gelb", "gruen", "schwarz", "weiss", "orange", "lila", "braun", "rosa",
    "grau", "gold",
];

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let args = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let clock = Clock::default_clock();
    let repository: Arc<dyn ProgressRepository> = match &args.db_url {
        Some(db_url) => {
            prepare_sqlite_file(db_url)?;
            let sqlite = SqliteRepository::connect(db_url).await?;
            sqlite.migrate().await?;
            Arc::new(sqlite)
        }
        None => Arc::new(InMemoryProgressRepository::new()),
    };
    let store = ProgressStoreService::new(clock, repository);

    // One assignment, two games, platform-standard thresholds.
    let thresholds = GameThresholds::standard()?;
    let assignment_id = AssignmentId::random();
    let student_id = StudentId::random();
    let other_game = if args.game.as_str() == "hangman" {
        GameId::new("memory-game")?
    } else {
        GameId::new("hangman")?
    };
    store
        .repository()
        .upsert_assignment(&AssignmentRecord {
            id: assignment_id,
            name: "Demo assignment".to_string(),
            games: vec![
                AssignmentGame {
                    game_id: args.game.clone(),
                    items_required: thresholds.items_required(&args.game),
                },
                AssignmentGame {
                    items_required: thresholds.items_required(&other_game),
                    game_id: other_game,
                },
            ],
        })
        .await?;
    tracing::info!(%assignment_id, game_id = %args.game, "seeded demo assignment");

    let context = AssignmentContext {
        assignment_id,
        student_id,
        game_id: args.game.clone(),
    };
    let tracker = CompletionTracker::new(
        Arc::new(store.clone()),
        Some(context),
        TrackerConfigDraft::new().validate()?,
    );
    let (events, subscription, tracker_loop) = tracker_channel(tracker);
    let TrackerSubscription {
        mut status,
        mut signals,
    } = subscription;
    let loop_handle = tokio::spawn(tracker_loop.run());

    // Observe the status watch the way a progress header would.
    let status_handle = tokio::spawn(async move {
        while status.changed().await.is_ok() {
            if let Some(current) = *status.borrow_and_update() {
                tracing::info!(
                    game = %progress_fmt::game_progress(&current),
                    assignment = %progress_fmt::assignment_progress(&current),
                    "progress updated"
                );
            }
        }
    });

    let mut vm = ModalVm::new(Some(assignment_id));
    vm.present_intro();
    tracing::info!(modal = ?vm.active(), "session opened");
    vm.choose(ModalChoice::KeepPlaying, &LoggingNavigator);

    // Play through a shuffled word list until the game completes.
    let mut words: Vec<&str> = WORDS.to_vec();
    words.shuffle(&mut rng());
    for word in words.iter().take(thresholds.items_required(&args.game) as usize) {
        let item_id = ItemId::new(*word)?;
        store
            .record_correct_item(assignment_id, student_id, &args.game, &item_id)
            .await?;
        events.emit(ItemAnswered::correct(item_id));
    }

    if let Some(signal) = signals.recv().await {
        vm.on_signal(signal);
        tracing::info!(modal = ?vm.active(), "completion modal shown");
        vm.choose(ModalChoice::BackToAssignment, &LoggingNavigator);
    }

    drop(events);
    loop_handle.await?;
    status_handle.await?;

    // A second game session, abandoned part-way through, to show the exit
    // confirmation path.
    let hangman = GameId::new("hangman")?;
    let mut exit_tracker = CompletionTracker::new(
        Arc::new(store.clone()),
        Some(AssignmentContext {
            assignment_id,
            student_id,
            game_id: hangman.clone(),
        }),
        TrackerConfigDraft::new().validate()?,
    );
    exit_tracker.initialize().await;
    for word in ["brot", "milch", "kaese"] {
        let item_id = ItemId::new(word)?;
        store
            .record_correct_item(assignment_id, student_id, &hangman, &item_id)
            .await?;
        exit_tracker.on_item_answered(ItemAnswered::correct(item_id)).await;
    }

    let mut exit_vm = ModalVm::new(Some(assignment_id));
    exit_vm.apply_exit_decision(exit_tracker.request_exit());
    tracing::info!(modal = ?exit_vm.active(), "exit requested mid-game");
    if let Some(current) = exit_tracker.status() {
        tracing::info!(
            remaining = %progress_fmt::remaining_label(current.items_remaining()),
            "abandoning would lose progress"
        );
    }
    exit_vm.choose(ModalChoice::ExitAnyway, &LoggingNavigator);

    Ok(())
}

#[tokio::main]
async fn main() {
    telemetry::init_tracing();
    if let Err(error) = run().await {
        tracing::error!(%error, "demo failed");
        std::process::exit(1);
    }
}
