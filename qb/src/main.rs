//! Questboard - terminal client for the gamified interview-prep backend
//!
//! CLI entry point: one-shot subcommands or the interactive REPL.

use std::fs;
use std::path::PathBuf;

use clap::{CommandFactory, FromArgMatches};
use colored::Colorize;
use eyre::{Context, Result};
use tracing::{debug, info};

use questboard::cli::{Cli, Command, OutputFormat, PlanArgs, generate_after_help};
use questboard::config::Config;
use questboard::repl;
use questboard::session::QuestSession;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Can't log here yet; the subscriber isn't installed
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("questboard")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Priority: CLI --log-level > config file > INFO
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(log_dir.join("questboard.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cmd = Cli::command().after_help(generate_after_help());
    let cli = Cli::from_arg_matches(&cmd.get_matches())?;

    // Log level first, so the full config load can log
    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    if let Some(server) = cli.server {
        debug!(%server, "main: overriding server base URL");
        config.server.base_url = server;
    }
    info!(base_url = %config.server.base_url, "questboard loaded config");

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Some(Command::Plan {
            role,
            goal,
            job_description,
            hours,
            start_date,
            interview_date,
            use_cal,
            pref_time,
        }) => {
            debug!(?role, hours, %interview_date, use_cal, "main: matched Plan command");
            let args = PlanArgs {
                role,
                goal,
                job_description,
                hours,
                start_date,
                interview_date,
                use_cal,
                pref_time,
            };
            cmd_plan(&config, args).await
        }
        Some(Command::Board { format }) => {
            debug!(?format, "main: matched Board command");
            cmd_board(&config, format).await
        }
        Some(Command::Quiz { index }) => {
            debug!(?index, "main: matched Quiz command");
            cmd_quiz(&config, index).await
        }
        Some(Command::Train { index }) => {
            debug!(?index, "main: matched Train command");
            cmd_train(&config, index).await
        }
        Some(Command::Calendar) => {
            debug!("main: matched Calendar command");
            cmd_calendar(&config).await
        }
        None => {
            debug!("main: no command specified, launching REPL");
            repl::run_interactive(&config).await
        }
    }
}

/// Generate a plan from command-line arguments
async fn cmd_plan(config: &Config, args: PlanArgs) -> Result<()> {
    debug!("cmd_plan: called");
    let today = chrono::Local::now().date_naive();
    let request = args
        .into_request(config.player.role.as_deref(), today)
        .ok_or_else(|| eyre::eyre!("No role given. Pass --role or set player.role in the config file."))?;

    let mut session = repl::open_session(config)?;
    repl::stream_plan(&mut session, request).await?;
    session.settle_prefetch().await;
    Ok(())
}

/// Print the board as text or JSON
async fn cmd_board(config: &Config, format: OutputFormat) -> Result<()> {
    debug!(%format, "cmd_board: called");
    let mut session = repl::open_session(config)?.with_prefetch(false);
    let Some(state) = session.refresh_board().await.context("Failed to load the board")? else {
        println!("No plan yet. Run {} first.", "qb plan".yellow());
        return Ok(());
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(state)?),
        OutputFormat::Text => print!("{}", questboard::render::board(state)),
    }
    Ok(())
}

/// Load the board or explain that there is none
async fn load_board(config: &Config) -> Result<Option<QuestSession>> {
    let mut session = repl::open_session(config)?.with_prefetch(false);
    if !repl::ensure_board(&mut session).await? {
        println!("No plan yet. Run {} first.", "qb plan".yellow());
        return Ok(None);
    }
    Ok(Some(session))
}

async fn cmd_quiz(config: &Config, index: Option<usize>) -> Result<()> {
    debug!(?index, "cmd_quiz: called");
    let Some(mut session) = load_board(config).await? else {
        return Ok(());
    };
    let Some(task_index) = repl::pick_task(&session, index) else {
        println!("Every quest is done or locked.");
        return Ok(());
    };

    let mut rl = repl::new_editor()?;
    repl::play_quiz(&mut session, &mut rl, task_index).await
}

async fn cmd_train(config: &Config, index: Option<usize>) -> Result<()> {
    debug!(?index, "cmd_train: called");
    let Some(mut session) = load_board(config).await? else {
        return Ok(());
    };
    let Some(task_index) = repl::pick_task(&session, index) else {
        println!("Every quest is done or locked.");
        return Ok(());
    };
    repl::show_training(&mut session, task_index).await
}

async fn cmd_calendar(config: &Config) -> Result<()> {
    debug!("cmd_calendar: called");
    let session = repl::open_session(config)?;
    repl::show_calendar(&session).await
}
