pub mod commands;
pub mod db;
pub mod paths;

use clap::{Args, Parser, Subcommand};
use difficulty_core::RunOptions;
use paths::AppPaths;
use serde::Serialize;
use std::io::{IsTerminal, Write};
use std::future::Future;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Assign five-level difficulty tags to flashcards from their review history.
#[derive(Debug, Parser)]
#[command(name = "difficulty-tagger", version)]
pub struct Cli {
    /// Collection database (defaults to the platform data directory).
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Threshold config file (defaults to the platform config directory).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log per-card decisions.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Auto-assign difficulty tags (5 levels).
    Assign(RunArgs),

    /// Remove difficulty tags.
    Remove(RunArgs),

    /// Manage the threshold config.
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Import cards from a JSON file into the collection.
    Import {
        file: PathBuf,
    },

    /// List cards with their statistics and tags.
    List {
        /// Search query; empty lists every card.
        query: Vec<String>,
    },
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Search query, e.g. `deck:French tag:verbs`. Prompted for when omitted.
    /// Put `--` before a query that starts with `-`.
    pub query: Vec<String>,

    /// Target every card without prompting.
    #[arg(long, conflicts_with = "query")]
    pub all: bool,

    /// Report what would change without writing tags.
    #[arg(long)]
    pub dry_run: bool,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write the default thresholds.
    Init {
        #[arg(long)]
        force: bool,
    },
    /// Show the thresholds and the rule order.
    Show,
    /// Set one threshold.
    Set { key: String, value: String },
    /// Restore the default thresholds, keeping unrelated keys.
    Reset,
    /// Print the config file location.
    Path,
}

pub async fn run() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let paths = AppPaths::resolve(cli.db, cli.config);

    match cli.command {
        Command::Assign(args) => {
            let query = resolve_query(&args, "Auto-assign difficulty tags (5 levels)")?;
            let dry_run = args.dry_run;
            let report = run_cancellable(move |cancel| {
                commands::assign::execute(&paths, &query, run_options(dry_run, cancel))
            })
            .await?;
            print_report(&report, args.json, commands::assign::render)?;
            Ok(exit_code(report.failures.is_empty()))
        }
        Command::Remove(args) => {
            let query = resolve_query(&args, "Remove difficulty tags")?;
            let dry_run = args.dry_run;
            let report = run_cancellable(move |cancel| {
                commands::remove::execute(&paths, &query, run_options(dry_run, cancel))
            })
            .await?;
            print_report(&report, args.json, commands::remove::render)?;
            Ok(exit_code(report.failures.is_empty()))
        }
        Command::Config(cmd) => {
            match cmd {
                ConfigCommand::Init { force } => {
                    commands::config::init(&paths.config, force)?;
                    println!("Wrote {}", paths.config.display());
                }
                ConfigCommand::Show => print!("{}", commands::config::show(&paths.config)?),
                ConfigCommand::Set { key, value } => {
                    commands::config::set(&paths.config, &key, &value)?;
                    println!("Settings saved.");
                }
                ConfigCommand::Reset => {
                    commands::config::reset(&paths.config)?;
                    println!("Settings reset to defaults.");
                }
                ConfigCommand::Path => println!("{}", paths.config.display()),
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Import { file } => {
            let count = commands::cards::import(&paths, &file)?;
            println!("Imported {count} cards.");
            Ok(ExitCode::SUCCESS)
        }
        Command::List { query } => {
            let cards = commands::cards::list(&paths, &query.join(" "))?;
            print!("{}", commands::cards::render(&cards));
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run_options(dry_run: bool, cancel: &AtomicBool) -> RunOptions<'_> {
    RunOptions {
        dry_run,
        cancel: Some(cancel),
        progress: Some(&log_progress),
    }
}

fn log_progress(done: usize, total: usize) {
    if done % 500 == 0 || done == total {
        tracing::info!(done, total, "progress");
    }
}

/// Returned when a second interrupt arrives while a job is still running.
#[derive(Debug, thiserror::Error)]
#[error("interrupted again before the current card finished")]
pub struct ForcedExit;

/// Run a blocking batch job. The first Ctrl-C asks it to stop after the
/// current card; a second one exits without waiting.
async fn run_cancellable<T, F>(job: F) -> anyhow::Result<T>
where
    F: FnOnce(&AtomicBool) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    match run_until_interrupted(job, tokio::signal::ctrl_c).await {
        Err(e) if e.is::<ForcedExit>() => {
            tracing::error!("{e}, exiting");
            // The blocking task cannot be joined, and runtime shutdown would wait on it.
            std::process::exit(130)
        }
        other => other,
    }
}

async fn run_until_interrupted<T, F, I, Fut>(job: F, mut interrupt: I) -> anyhow::Result<T>
where
    F: FnOnce(&AtomicBool) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
    I: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    let cancel = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancel);
    let mut handle = tokio::task::spawn_blocking(move || job(&flag));

    tokio::select! {
        joined = &mut handle => return joined?,
        Ok(()) = interrupt() => {
            tracing::warn!("interrupt received, stopping after the current card");
            cancel.store(true, Ordering::Relaxed);
        }
    }

    tokio::select! {
        joined = &mut handle => joined?,
        Ok(()) = interrupt() => Err(ForcedExit.into()),
    }
}

fn resolve_query(args: &RunArgs, title: &str) -> anyhow::Result<String> {
    if !args.query.is_empty() {
        return Ok(args.query.join(" "));
    }
    if args.all || !std::io::stdin().is_terminal() {
        return Ok(String::new());
    }

    let mut stderr = std::io::stderr();
    writeln!(stderr, "{title}")?;
    writeln!(stderr, "Enter a search query to select which cards to use.")?;
    write!(stderr, "Leave empty to target all cards.\n> ")?;
    stderr.flush()?;

    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn print_report<R: Serialize>(report: &R, json: bool, render: fn(&R) -> String) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{}", render(report));
    }
    Ok(())
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_assign() {
        let cli = Cli::try_parse_from([
            "difficulty-tagger",
            "--db",
            "c.db",
            "assign",
            "--dry-run",
            "--",
            "deck:French",
            "-tag:leech",
        ])
        .unwrap();
        match cli.command {
            Command::Assign(args) => {
                assert_eq!(args.query, vec!["deck:French", "-tag:leech"]);
                assert!(args.dry_run);
                assert_eq!(resolve_query(&args, "t").unwrap(), "deck:French -tag:leech");
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert_eq!(cli.db, Some(PathBuf::from("c.db")));
    }

    #[test]
    fn all_flag_selects_everything() {
        let cli = Cli::try_parse_from(["difficulty-tagger", "remove", "--all"]).unwrap();
        match cli.command {
            Command::Remove(args) => assert_eq!(resolve_query(&args, "t").unwrap(), ""),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn config_set_parses() {
        let cli =
            Cli::try_parse_from(["difficulty-tagger", "config", "set", "easy_ivl_min", "30"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Set { ref key, ref value }) if key == "easy_ivl_min" && value == "30"
        ));
    }

    type Interrupt = std::pin::Pin<Box<dyn Future<Output = std::io::Result<()>>>>;

    fn interrupt_once() -> impl FnMut() -> Interrupt {
        let mut calls = 0;
        move || -> Interrupt {
            calls += 1;
            if calls == 1 {
                Box::pin(std::future::ready(Ok(())))
            } else {
                Box::pin(std::future::pending())
            }
        }
    }

    #[tokio::test]
    async fn job_finishes_without_interrupt() {
        let result = run_until_interrupted(|_| Ok(7), std::future::pending).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn first_interrupt_cancels_job() {
        let result = run_until_interrupted(
            |cancel: &AtomicBool| {
                while !cancel.load(Ordering::Relaxed) {
                    std::thread::sleep(std::time::Duration::from_millis(1));
                }
                Ok("stopped")
            },
            interrupt_once(),
        )
        .await;
        assert_eq!(result.unwrap(), "stopped");
    }

    #[tokio::test]
    async fn second_interrupt_abandons_blocked_job() {
        let (release, blocked) = std::sync::mpsc::channel::<()>();
        let result = run_until_interrupted(
            move |_| {
                let _ = blocked.recv();
                Ok(())
            },
            || std::future::ready(Ok(())),
        )
        .await;
        assert!(result.unwrap_err().is::<ForcedExit>());
        drop(release);
    }
}
