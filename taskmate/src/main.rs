//! `TaskMate`: local task list with a work/break interval timer.
//!
//! Tasks and the theme preference live in a JSON document under the
//! platform data directory. Configuration via CLI flags, environment
//! variables, or config file (`~/.config/taskmate/config.toml`).
//!
//! ```bash
//! cargo run --bin taskmate -- add "Buy milk" --due 2026-11-02 --priority high
//! cargo run --bin taskmate -- list --status pending --sort due-date
//! cargo run --bin taskmate -- toggle 3f2a
//! cargo run --bin taskmate -- timer --ticks 5
//! ```

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tokio::sync::mpsc;
use tracing_appender::non_blocking::WorkerGuard;

use taskmate::app::{App, AppError};
use taskmate::config::{AppConfig, CliArgs, Command, ConfigError};
use taskmate::reminder::ReminderScheduler;
use taskmate::storage::FileStore;
use taskmate::tasks::{SortOrder, StatusFilter, parse_tags, select};
use taskmate::timer::TimerError;
use taskmate_proto::reminder::Reminder;
use taskmate_proto::task::{Task, TaskDraft, TaskPatch};

/// Number of id characters shown in listings.
const SHORT_ID_LEN: usize = 8;

/// Errors reported by the binary before exiting with status 1.
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    App(#[from] AppError),
    #[error(transparent)]
    Timer(#[from] TimerError),
    #[error("waiting for Ctrl-C failed: {0}")]
    Signal(#[from] std::io::Error),
    #[error("nothing to change; pass at least one field")]
    EmptyEdit,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = CliArgs::parse();

    // Logs go to a file; stdout is reserved for command output.
    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    tracing::info!("taskmate starting");
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize file-based logging.
///
/// Returns a [`WorkerGuard`] that must be held until shutdown to ensure all
/// buffered log entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("taskmate.log");
    let log_path = file_path.unwrap_or(&default_path);

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

async fn run(cli: CliArgs) -> Result<(), CliError> {
    let config = AppConfig::load(&cli)?;
    let mut app = App::open(&config).await?;

    let command = cli.command.unwrap_or(Command::List {
        status: StatusFilter::All,
        sort: SortOrder::Insertion,
    });

    match command {
        Command::List { status, sort } => {
            let shown = select(app.tasks().tasks(), status, sort);
            if shown.is_empty() {
                println!("No tasks.");
            }
            for task in shown {
                println!("{}", format_task(task));
            }
        }
        Command::Add {
            title,
            description,
            due,
            priority,
            tags,
        } => {
            let mut draft = TaskDraft::new(title);
            draft.description = description;
            draft.due_date = due;
            draft.priority = priority;
            draft.tags = tags.as_deref().map(parse_tags);
            let id = app.add_task(draft).await?;
            println!("Added {}", short_id(id.as_str()));
        }
        Command::Edit {
            id,
            title,
            description,
            due,
            clear_due,
            priority,
            tags,
        } => {
            let patch = TaskPatch {
                title,
                description,
                due_date: if clear_due { Some(None) } else { due.map(Some) },
                priority,
                tags: tags.as_deref().map(parse_tags),
                ..TaskPatch::default()
            };
            if patch.is_empty() {
                return Err(CliError::EmptyEdit);
            }
            let id = app.edit_task(&id, patch).await?;
            println!("Updated {}", short_id(id.as_str()));
        }
        Command::Toggle { id } => {
            let (id, completed) = app.toggle_task(&id).await?;
            let state = if completed { "completed" } else { "pending" };
            println!("{} is now {state}", short_id(id.as_str()));
        }
        Command::Delete { id } => {
            let task = app.delete_task(&id).await?;
            println!("Deleted {} {}", short_id(task.id.as_str()), task.title);
        }
        Command::Timer { ticks } => run_timer(&app, ticks).await?,
        Command::Theme { toggle } => {
            let theme = if toggle {
                app.toggle_theme().await?
            } else {
                app.theme()
            };
            println!("{theme}");
        }
    }

    tracing::info!("taskmate exiting");
    Ok(())
}

/// Output produced while the timer command runs.
enum TimerLine {
    Tick(String),
    Reminder(String),
}

/// Runs the interval timer in the foreground, printing every update, until
/// `limit` updates have been printed or Ctrl-C is pressed. Due-date
/// reminders for pending tasks are printed as they fire.
async fn run_timer(app: &App<FileStore>, limit: Option<u32>) -> Result<(), CliError> {
    let (tx, mut rx) = mpsc::unbounded_channel::<TimerLine>();

    let reminder_tx = tx.clone();
    let mut reminders = ReminderScheduler::new(move |r: &Reminder| {
        let _ = reminder_tx.send(TimerLine::Reminder(format!("{} ({})", r.title, r.message)));
    });
    let scheduled = app.schedule_reminders(&mut reminders)?;
    tracing::debug!(scheduled, "reminders armed for timer run");

    let timer = app.timer();
    let subscription = timer.on_tick(move |time| {
        let _ = tx.send(TimerLine::Tick(time.to_string()));
    });
    println!("{}", timer.display());
    timer.start()?;

    let mut updates = 0u32;
    loop {
        tokio::select! {
            line = rx.recv() => match line {
                Some(TimerLine::Tick(time)) => {
                    println!("{time}");
                    updates += 1;
                    if limit.is_some_and(|n| updates >= n) {
                        break;
                    }
                }
                Some(TimerLine::Reminder(text)) => println!("Reminder: {text}"),
                None => break,
            },
            signal = tokio::signal::ctrl_c() => {
                signal?;
                break;
            }
        }
    }

    subscription.unsubscribe();
    timer.reset();
    Ok(())
}

fn short_id(id: &str) -> &str {
    id.get(..SHORT_ID_LEN).unwrap_or(id)
}

fn format_task(task: &Task) -> String {
    let mark = if task.completed { "x" } else { " " };
    let mut line = format!(
        "{}  [{mark}] {}  ({})",
        short_id(task.id.as_str()),
        task.title,
        task.priority
    );
    if let Some(due) = task.due_date {
        line.push_str(&format!("  due {due}"));
    }
    if !task.tags.is_empty() {
        line.push_str(&format!("  #{}", task.tags.join(" #")));
    }
    if !task.subtasks.is_empty() {
        let done = task.subtasks.iter().filter(|s| s.is_completed()).count();
        line.push_str(&format!("  [{done}/{}]", task.subtasks.len()));
    }
    line
}
