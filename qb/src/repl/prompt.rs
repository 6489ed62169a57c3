//! Line-oriented prompts: the setup form walk and quiz answers

use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::debug;

use crate::domain::{FormError, PlanRequest, Question, QuizPayload, SetupForm};
use crate::render;

/// Typed on any form field to return to the previous page
const BACK: &str = "<";

/// Read one line; `None` on Ctrl+C or Ctrl+D
pub fn read_line(rl: &mut DefaultEditor, prompt: &str) -> Result<Option<String>> {
    match rl.readline(prompt) {
        Ok(line) => Ok(Some(line)),
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
            println!();
            Ok(None)
        }
        Err(err) => Err(eyre::eyre!("Readline error: {}", err)),
    }
}

fn field_label(field: &str) -> &'static str {
    match field {
        "role" => "Target role",
        "goal" => "Goal",
        "job_description" => "Job description",
        "hours" => "Study hours per day",
        "start_date" => "Start date (YYYY-MM-DD)",
        "interview_date" => "Interview date (YYYY-MM-DD)",
        "use_cal" => "Use Google Calendar (y/n)",
        "pref_time" => "Preferred study hour (0-23)",
        _ => "Value",
    }
}

fn current_value(form: &SetupForm, field: &str) -> Option<String> {
    match field {
        "role" => Some(form.role.clone()).filter(|s| !s.is_empty()),
        "goal" => Some(form.goal.clone()).filter(|s| !s.is_empty()),
        "job_description" => form.job_description.clone(),
        "hours" => form.hours.map(|h| h.to_string()),
        "start_date" => form.start_date.map(|d| d.to_string()),
        "interview_date" => form.interview_date.map(|d| d.to_string()),
        "use_cal" => Some(if form.use_cal { "y" } else { "n" }.to_string()),
        "pref_time" => Some(form.pref_time.to_string()),
        _ => None,
    }
}

enum FieldInput {
    Set,
    Back,
    Cancel,
}

fn read_field(rl: &mut DefaultEditor, form: &mut SetupForm, field: &str) -> Result<FieldInput> {
    loop {
        let prompt = match current_value(form, field) {
            Some(value) => format!("  {} [{}]: ", field_label(field), value),
            None => format!("  {}: ", field_label(field)),
        };
        let Some(line) = read_line(rl, &prompt)? else {
            return Ok(FieldInput::Cancel);
        };

        let input = line.trim();
        if input == BACK {
            return Ok(FieldInput::Back);
        }
        // Blank keeps the current value
        if input.is_empty() {
            return Ok(FieldInput::Set);
        }
        match form.set(field, input) {
            Ok(()) => return Ok(FieldInput::Set),
            Err(e) => println!("  {} {}", "!".red(), e),
        }
    }
}

/// Walk the setup form page by page
///
/// Returns `None` if the user cancels.
pub fn read_setup_form(rl: &mut DefaultEditor, mut form: SetupForm) -> Result<Option<PlanRequest>> {
    debug!("read_setup_form: called");
    println!("{}", format!("Type {} on any field to go back a page.", BACK).dimmed());

    loop {
        let page = form.page();
        println!();
        println!("{}", page.title().bright_cyan().bold());

        let mut back = false;
        for field in page.fields() {
            match read_field(rl, &mut form, field)? {
                FieldInput::Set => {}
                FieldInput::Back => {
                    back = true;
                    break;
                }
                FieldInput::Cancel => return Ok(None),
            }
        }

        if back {
            if let Err(e) = form.back() {
                println!("  {} {}", "!".yellow(), e);
            }
            continue;
        }

        match form.next() {
            Ok(_) => {}
            Err(FormError::LastPage) => match form.finish() {
                Ok(request) => return Ok(Some(request)),
                Err(e) => println!("  {} {}", "!".red(), e),
            },
            Err(e) => println!("  {} {}", "!".red(), e),
        }
    }
}

/// Accept an option number (1-based) or the option text itself
pub fn parse_answer(input: &str, question: &Question) -> Option<String> {
    let input = input.trim();
    if let Ok(n) = input.parse::<usize>() {
        return n.checked_sub(1).and_then(|i| question.options.get(i)).cloned();
    }
    question
        .options
        .iter()
        .find(|option| option.eq_ignore_ascii_case(input))
        .cloned()
}

/// Ask every question in order; `None` if the user abandons the quiz
pub fn read_quiz_answers(rl: &mut DefaultEditor, quiz: &QuizPayload) -> Result<Option<Vec<String>>> {
    debug!(task = %quiz.task_name, questions = quiz.questions.len(), "read_quiz_answers: called");
    let mut answers = Vec::with_capacity(quiz.questions.len());

    for (i, question) in quiz.questions.iter().enumerate() {
        println!();
        print!("{}", render::question(i + 1, question));
        loop {
            let Some(line) = read_line(rl, "  answer> ")? else {
                return Ok(None);
            };
            match parse_answer(&line, question) {
                Some(answer) => {
                    answers.push(answer);
                    break;
                }
                None => println!("  Enter a number from 1 to {}", question.options.len()),
            }
        }
    }
    Ok(Some(answers))
}
