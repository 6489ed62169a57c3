//! CLI command definitions and subcommands

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use crate::domain::{DEFAULT_PREF_TIME, PlanRequest};

/// Questboard - gamified interview prep in the terminal
#[derive(Parser)]
#[command(
    name = "qb",
    about = "Gamified interview-prep quest board client",
    version = env!("GIT_DESCRIBE"),
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Backend base URL, overrides server.base-url
    #[arg(short, long, global = true, value_name = "URL")]
    pub server: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a new study plan, streaming it as it is written
    Plan {
        /// Target role (defaults to player.role from config)
        #[arg(short, long)]
        role: Option<String>,

        /// What you want out of the preparation
        #[arg(short, long, default_value = "")]
        goal: String,

        /// Job description to tailor the plan to
        #[arg(short, long)]
        job_description: Option<String>,

        /// Study hours per day
        #[arg(long)]
        hours: f32,

        /// First study day (YYYY-MM-DD, default today)
        #[arg(long, value_name = "DATE")]
        start_date: Option<NaiveDate>,

        /// Interview day (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        interview_date: NaiveDate,

        /// Schedule study sessions in Google Calendar
        #[arg(long)]
        use_cal: bool,

        /// Preferred study hour, 24-hour clock
        #[arg(long, default_value_t = DEFAULT_PREF_TIME)]
        pref_time: u8,
    },

    /// Show the quest board
    Board {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Take the quiz for a task (default: next actionable quest)
    Quiz {
        /// Task index on the board
        index: Option<usize>,
    },

    /// Show training material for a task (default: next actionable quest)
    Train {
        /// Task index on the board
        index: Option<usize>,
    },

    /// Connect Google Calendar
    Calendar,
}

/// Inputs of `qb plan` before defaults are filled in
#[derive(Debug, Clone)]
pub struct PlanArgs {
    pub role: Option<String>,
    pub goal: String,
    pub job_description: Option<String>,
    pub hours: f32,
    pub start_date: Option<NaiveDate>,
    pub interview_date: NaiveDate,
    pub use_cal: bool,
    pub pref_time: u8,
}

impl PlanArgs {
    /// Fill in the role and start date; validation happens in the session
    pub fn into_request(self, default_role: Option<&str>, today: NaiveDate) -> Option<PlanRequest> {
        debug!(?self.role, ?default_role, "PlanArgs::into_request: called");
        let role = self.role.or_else(|| default_role.map(str::to_string))?;
        Some(PlanRequest {
            role,
            goal: self.goal,
            job_description: self.job_description.filter(|s| !s.trim().is_empty()),
            hours: self.hours,
            start_date: self.start_date.unwrap_or(today),
            interview_date: self.interview_date,
            use_cal: self.use_cal,
            pref_time: self.pref_time,
        })
    }
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    debug!("get_log_path: called");
    let path = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("questboard")
        .join("logs")
        .join("questboard.log");
    debug!(?path, "get_log_path: returning path");
    path
}

/// Generate the after_help text with config locations and the log path
pub fn generate_after_help() -> String {
    debug!("generate_after_help: called");
    let mut help = String::new();

    help.push_str("Config files (first found wins):\n");
    help.push_str("  ./.questboard.yml\n");
    if let Some(dir) = dirs::config_dir() {
        let path = dir.join("questboard").join("questboard.yml");
        let icon = if path.exists() { "\u{2705}" } else { "\u{274C}" };
        help.push_str(&format!("  {} {}\n", icon, path.display()));
    }

    help.push('\n');
    help.push_str("Run without a subcommand for the interactive REPL.\n");
    help.push_str(&format!("Logs are written to: {}\n", get_log_path().display()));

    debug!("generate_after_help: returning help text");
    help
}

/// Output format for the board command
#[derive(Clone, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "OutputFormat::from_str: called");
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text or json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_cli_parse_no_command() {
        let cli = Cli::parse_from(["qb"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_parse_plan() {
        let cli = Cli::parse_from([
            "qb",
            "plan",
            "--role",
            "Engineer",
            "--hours",
            "2.5",
            "--interview-date",
            "2026-11-01",
            "--use-cal",
        ]);
        if let Some(Command::Plan {
            role,
            hours,
            interview_date,
            use_cal,
            pref_time,
            start_date,
            ..
        }) = cli.command
        {
            assert_eq!(role.as_deref(), Some("Engineer"));
            assert_eq!(hours, 2.5);
            assert_eq!(interview_date, date("2026-11-01"));
            assert!(use_cal);
            assert_eq!(pref_time, DEFAULT_PREF_TIME);
            assert!(start_date.is_none());
        } else {
            panic!("Expected Plan command");
        }
    }

    #[test]
    fn test_cli_plan_rejects_bad_date() {
        let result = Cli::try_parse_from(["qb", "plan", "--hours", "2", "--interview-date", "next week"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_quiz_index() {
        let cli = Cli::parse_from(["qb", "quiz", "3"]);
        assert!(matches!(cli.command, Some(Command::Quiz { index: Some(3) })));

        let cli = Cli::parse_from(["qb", "quiz"]);
        assert!(matches!(cli.command, Some(Command::Quiz { index: None })));
    }

    #[test]
    fn test_cli_global_flags() {
        let cli = Cli::parse_from([
            "qb",
            "board",
            "-c",
            "/path/to/config.yml",
            "--server",
            "http://10.0.0.5:9000",
            "-l",
            "debug",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("/path/to/config.yml")));
        assert_eq!(cli.server.as_deref(), Some("http://10.0.0.5:9000"));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_output_format_from_str() {
        assert!(matches!("text".parse::<OutputFormat>(), Ok(OutputFormat::Text)));
        assert!(matches!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json)));
        assert!("table".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_plan_args_fill_defaults() {
        let args = PlanArgs {
            role: None,
            goal: String::new(),
            job_description: Some("  ".to_string()),
            hours: 2.0,
            start_date: None,
            interview_date: date("2026-11-01"),
            use_cal: false,
            pref_time: 9,
        };

        assert!(args.clone().into_request(None, date("2026-10-16")).is_none());

        let request = args.into_request(Some("Nurse"), date("2026-10-16")).unwrap();
        assert_eq!(request.role, "Nurse");
        assert_eq!(request.start_date, date("2026-10-16"));
        assert!(request.job_description.is_none());
        assert!(request.validate().is_ok());
    }
}
