//! Terminal rendering for the board, quizzes and training
//!
//! Everything returns a `String` so callers decide where it goes.

use colored::{ColoredString, Colorize};

use crate::domain::{GameState, PlayerStats, Question, QuizResult, TaskRecord, TaskStatus, TrainingPayload};
use crate::sse::{EventKind, StreamEvent};

const XP_BAR_WIDTH: usize = 20;

pub fn status_badge(status: TaskStatus) -> ColoredString {
    match status {
        TaskStatus::Locked => "🔒 LOCKED".dimmed(),
        TaskStatus::Active => "🔐 UNLOCKED".bright_yellow(),
        TaskStatus::Done => "✅ DONE".green(),
    }
}

/// `[#####.....]` filled to the current level progress
pub fn xp_bar(stats: &PlayerStats, width: usize) -> String {
    let filled = ((stats.level_progress() * width as f64).round() as usize).min(width);
    format!("[{}{}]", "#".repeat(filled), ".".repeat(width - filled))
}

pub fn player_stats(stats: &PlayerStats) -> String {
    format!(
        "{} {}  {} {}/{} XP  (total {})",
        format!("Level {}", stats.level).bright_cyan().bold(),
        stats.title.bright_white(),
        xp_bar(stats, XP_BAR_WIDTH),
        stats.xp_in_level,
        stats.xp_per_level,
        stats.xp
    )
}

fn task_line(index: usize, task: &TaskRecord, next: Option<usize>) -> String {
    let marker = if next == Some(index) { ">" } else { " " };
    let objective = if task.is_boss() {
        task.objective.red().bold()
    } else {
        match task.status {
            TaskStatus::Done => task.objective.dimmed(),
            _ => task.objective.normal(),
        }
    };

    let mut line = format!("{} {:>3}  {:<14} {}", marker, index, status_badge(task.status), objective);
    if !task.timeline.is_empty() {
        line.push_str(&format!("  {}", format!("({})", task.timeline).dimmed()));
    }
    if !task.rewards.is_empty() {
        line.push_str(&format!("  {}", task.rewards.bright_magenta()));
    }
    line
}

pub fn board(state: &GameState) -> String {
    let mut out = String::new();
    if let Some(role) = &state.role {
        out.push_str(&format!("{} {}\n", "Role:".bright_cyan(), role));
    }
    out.push_str(&player_stats(&state.stats));
    out.push('\n');
    out.push_str(&format!("{}/{} quests done\n\n", state.completed(), state.board.len()));

    if state.board.is_empty() {
        out.push_str(&format!("{}\n", "The board is empty.".dimmed()));
        return out;
    }

    let next = state.next_actionable().map(|(i, _)| i);
    for (index, task) in state.board.iter().enumerate() {
        out.push_str(&task_line(index, task, next));
        out.push('\n');
    }
    out
}

pub fn question(number: usize, question: &Question) -> String {
    let mut out = format!("{} {}\n", format!("Q{}.", number).bright_cyan(), question.prompt);
    for (i, option) in question.options.iter().enumerate() {
        out.push_str(&format!("   {}) {}\n", i + 1, option));
    }
    out
}

pub fn quiz_result(result: &QuizResult) -> String {
    let mut out = String::new();
    let score = format!("{}/{}", result.score, result.total);
    if result.passed {
        out.push_str(&format!("{} Score {}\n", "Quest complete!".green().bold(), score));
    } else {
        out.push_str(&format!("{} Score {}\n", "Quest failed.".red().bold(), score));
        if let Some(lives) = result.lives_left {
            out.push_str(&format!("Lives left: {}\n", lives.max(0)));
        }
        if result.is_exhausted() {
            out.push_str(&format!(
                "{}\n",
                "Out of lives. A fresh set of questions will be generated next time.".yellow()
            ));
        }
    }

    if let Some(review) = &result.quiz_data {
        out.push('\n');
        for (i, q) in review.iter().enumerate() {
            out.push_str(&format!("{} {}\n", format!("Q{}.", i + 1).bright_cyan(), q.prompt));
            if let Some(answer) = q.correct_answer() {
                out.push_str(&format!("   {} {}\n", "Answer:".green(), answer));
            }
            if let Some(why) = &q.justification {
                out.push_str(&format!("   {}\n", why.dimmed()));
            }
        }
    }
    out
}

pub fn training(objective: &str, training: &TrainingPayload) -> String {
    let mut out = format!("{}\n\n{}\n", objective.bright_cyan().bold(), training.explanation);
    if !training.resources.is_empty() {
        out.push_str(&format!("\n{}\n", "Resources:".bright_cyan()));
        for link in &training.resources {
            out.push_str(&format!("  - {}\n", link.underline()));
        }
    }
    out
}

/// Progress output for one plan-stream event; plan chunks are printed as-is
pub fn stream_event(event: &StreamEvent) -> String {
    match &event.kind {
        EventKind::Status => format!("{}\n", format!("... {}", event.payload).dimmed()),
        EventKind::PlanChunk => event.payload.clone(),
        EventKind::Complete => format!("\n{}\n", event.payload.green()),
        EventKind::Error => format!("\n{} {}\n", "Error:".red(), event.payload),
        EventKind::Unknown(_) => String::new(),
    }
}
