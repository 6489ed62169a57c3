//! REPL session management

use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::{debug, warn};

use super::{ensure_board, new_editor, pick_task, play_quiz, show_board, show_calendar, show_training, stream_plan};
use crate::domain::SetupForm;
use crate::session::QuestSession;

/// Interactive REPL session
pub struct ReplSession {
    session: QuestSession,
}

impl ReplSession {
    pub fn new(session: QuestSession) -> Self {
        Self { session }
    }

    /// Run the REPL main loop
    pub async fn run(&mut self) -> Result<()> {
        self.print_welcome();
        let mut rl = new_editor()?;

        match ensure_board(&mut self.session).await {
            Ok(true) => show_board(&self.session),
            Ok(false) => println!("No plan yet. Type {} to set one up.", "/plan".yellow()),
            Err(e) => println!("{} {:#}", "Error:".red(), e),
        }

        loop {
            let readline = rl.readline(&format!("{} ", ">".bright_green()));

            match readline {
                Ok(line) => {
                    let input = line.trim();
                    if input.is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(input);

                    if !input.starts_with('/') {
                        println!("Type {} for available commands", "/help".yellow());
                        continue;
                    }
                    match self.handle_slash_command(&mut rl, input).await {
                        Ok(SlashResult::Continue) => continue,
                        Ok(SlashResult::Quit) => break,
                        Err(e) => {
                            warn!(error = %e, "run: command failed");
                            println!("{} {:#}", "Error:".red(), e);
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(err) => {
                    return Err(eyre::eyre!("Readline error: {}", err));
                }
            }
        }

        self.session.settle_prefetch().await;
        println!("Goodbye!");
        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("{}", "Questboard".bright_cyan().bold());
        if let Some(role) = self.session.role() {
            println!("Role: {}", role);
        }
        println!("Type {} for help, {} to quit", "/help".yellow(), "/quit".yellow());
        println!();
    }

    async fn handle_slash_command(&mut self, rl: &mut DefaultEditor, input: &str) -> Result<SlashResult> {
        let parts: Vec<&str> = input.split_whitespace().collect();
        let cmd = parts.first().copied().unwrap_or("");
        debug!(%cmd, "handle_slash_command: called");

        let index = match parts.get(1).map(|s| s.parse::<usize>()) {
            Some(Ok(i)) => Some(i),
            Some(Err(_)) => {
                println!("{} Task index must be a number", "?".yellow());
                return Ok(SlashResult::Continue);
            }
            None => None,
        };

        match cmd {
            "/help" | "/h" => self.print_help(),
            "/quit" | "/q" | "/exit" => return Ok(SlashResult::Quit),
            "/plan" | "/p" => {
                let form = match self.session.role() {
                    Some(role) => SetupForm::with_role(role),
                    None => SetupForm::new(),
                };
                match super::read_setup_form(rl, form)? {
                    Some(request) => stream_plan(&mut self.session, request).await?,
                    None => println!("{}", "Setup cancelled.".dimmed()),
                }
            }
            "/board" | "/b" => {
                if self.session.refresh_board().await?.is_none() {
                    println!("No plan yet. Type {} to set one up.", "/plan".yellow());
                } else {
                    show_board(&self.session);
                }
            }
            "/quiz" => {
                if !ensure_board(&mut self.session).await? {
                    println!("No plan yet. Type {} to set one up.", "/plan".yellow());
                    return Ok(SlashResult::Continue);
                }
                match pick_task(&self.session, index) {
                    Some(i) => play_quiz(&mut self.session, rl, i).await?,
                    None => println!("{}", "Every quest is done or locked.".dimmed()),
                }
            }
            "/train" => {
                if !ensure_board(&mut self.session).await? {
                    println!("No plan yet. Type {} to set one up.", "/plan".yellow());
                    return Ok(SlashResult::Continue);
                }
                match pick_task(&self.session, index) {
                    Some(i) => show_training(&mut self.session, i).await?,
                    None => println!("{}", "Every quest is done or locked.".dimmed()),
                }
            }
            "/calendar" => show_calendar(&self.session).await?,
            "/cache" => self.print_cache().await,
            _ => {
                println!("{} Unknown command: {}", "?".yellow(), cmd);
                println!("Type {} for available commands", "/help".yellow());
            }
        }
        Ok(SlashResult::Continue)
    }

    fn print_help(&self) {
        println!();
        println!("{}", "Available Commands:".bright_cyan());
        println!("  {:14} Show this help", "/help".yellow());
        println!("  {:14} Exit the REPL", "/quit".yellow());
        println!("  {:14} Fill in the setup form and generate a plan", "/plan".yellow());
        println!("  {:14} Refresh and show the quest board", "/board".yellow());
        println!("  {:14} Take the quiz for a task (default: next quest)", "/quiz [N]".yellow());
        println!("  {:14} Show training for a task (default: next quest)", "/train [N]".yellow());
        println!("  {:14} Connect Google Calendar", "/calendar".yellow());
        println!("  {:14} Show prefetch cache statistics", "/cache".yellow());
        println!();
    }

    async fn print_cache(&self) {
        let stats = self.session.cache().stats().await;
        println!();
        println!("{}", "Prefetch Cache:".bright_cyan());
        println!("  {:10} {}", "quizzes", stats.quizzes);
        println!("  {:10} {}", "trainings", stats.trainings);
        println!("  {:10} {}", "hits", stats.hits);
        println!("  {:10} {}", "misses", stats.misses);
        println!();
    }
}

/// Result of handling a slash command
enum SlashResult {
    Continue,
    Quit,
}
