//! Interactive front end for questboard
//!
//! The REPL and the one-shot subcommands share the actions below, so a quiz
//! played through `qb quiz 3` behaves exactly like `/quiz 3`.

mod prompt;
mod session;

pub use prompt::{parse_answer, read_quiz_answers, read_setup_form};
pub use session::ReplSession;

use std::io::{self, Write};

use colored::Colorize;
use eyre::{Context, Result};
use rustyline::DefaultEditor;
use tracing::debug;

use crate::api::create_client;
use crate::cache::PrefetchCache;
use crate::config::Config;
use crate::domain::PlanRequest;
use crate::render;
use crate::session::QuestSession;

/// Build a session against the configured server
pub fn open_session(config: &Config) -> Result<QuestSession> {
    debug!(base_url = %config.server.base_url, "open_session: called");
    let api = create_client(&config.server).context("Failed to create API client")?;
    Ok(QuestSession::new(api, PrefetchCache::new())
        .with_prefetch(config.prefetch.enabled)
        .with_role(config.player.role.clone()))
}

/// Run the interactive REPL
pub async fn run_interactive(config: &Config) -> Result<()> {
    let session = open_session(config)?;
    let mut repl = ReplSession::new(session);
    repl.run().await
}

pub fn new_editor() -> Result<DefaultEditor> {
    DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))
}

/// Stream a plan to the terminal, then show the new board
pub async fn stream_plan(session: &mut QuestSession, request: PlanRequest) -> Result<()> {
    debug!(role = %request.role, "stream_plan: called");
    println!();
    let summary = session
        .generate_plan(request, |event| {
            print!("{}", render::stream_event(event));
            let _ = io::stdout().flush();
        })
        .await
        .context("Plan generation failed")?;

    if summary.stream.dropped > 0 {
        println!(
            "{}",
            format!("({} malformed frames skipped)", summary.stream.dropped).dimmed()
        );
    }
    show_board(session);
    Ok(())
}

pub fn show_board(session: &QuestSession) {
    match session.game_state() {
        Some(state) => {
            println!();
            print!("{}", render::board(state));
        }
        None => println!("{}", "No plan yet. Generate one first.".dimmed()),
    }
}

/// Fetch the board if the session has none yet
pub async fn ensure_board(session: &mut QuestSession) -> Result<bool> {
    if session.game_state().is_some() {
        return Ok(true);
    }
    Ok(session.refresh_board().await.context("Failed to load the board")?.is_some())
}

/// Resolve an optional task index to the next actionable task
pub fn pick_task(session: &QuestSession, index: Option<usize>) -> Option<usize> {
    index.or_else(|| session.game_state()?.next_actionable().map(|(i, _)| i))
}

/// Open, answer and submit one quiz, then return to the board
pub async fn play_quiz(session: &mut QuestSession, rl: &mut DefaultEditor, task_index: usize) -> Result<()> {
    debug!(task_index, "play_quiz: called");
    let quiz = session.open_quiz(task_index).await.context("Failed to start quiz")?;
    println!();
    println!("{} {}", "Quiz:".bright_cyan().bold(), quiz.task_name);

    let Some(answers) = read_quiz_answers(rl, &quiz)? else {
        println!("{}", "Quiz abandoned.".dimmed());
        session.close_modal().await.context("Failed to refresh the board")?;
        return Ok(());
    };

    let result = session.submit_quiz(answers).await.context("Failed to submit quiz")?;
    println!();
    print!("{}", render::quiz_result(&result));

    session.close_modal().await.context("Failed to refresh the board")?;
    show_board(session);
    Ok(())
}

/// Show training material for one task
pub async fn show_training(session: &mut QuestSession, task_index: usize) -> Result<()> {
    debug!(task_index, "show_training: called");
    let training = session
        .open_training(task_index)
        .await
        .context("Failed to load training")?;
    let objective = session
        .game_state()
        .and_then(|s| s.task(task_index))
        .map(|t| t.objective.clone())
        .unwrap_or_default();

    println!();
    print!("{}", render::training(&objective, &training));
    session.close_modal().await?;
    Ok(())
}

/// Print the calendar consent URL, if the backend has one
pub async fn show_calendar(session: &QuestSession) -> Result<()> {
    match session.connect_calendar().await.context("Failed to reach calendar")? {
        Some(url) => {
            println!("Open this link to connect Google Calendar:");
            println!("  {}", url.underline());
        }
        None => println!("{}", "Calendar is already connected or unavailable.".dimmed()),
    }
    Ok(())
}
