//! Domain types for the quest board
//!
//! Wire types shared by the API client, the prefetch cache and the session:
//! the board snapshot, quizzes, training material and the plan request.

mod board;
mod plan;
mod quiz;
mod training;

pub use board::{GameState, PlayerStats, TaskRecord, TaskStatus, next_actionable};
pub use plan::{CalendarLink, DEFAULT_PREF_TIME, FormError, FormPage, PlanRequest, SetupForm};
pub use quiz::{Question, QuizPayload, QuizResult, QuizSubmission, StartQuizRequest};
pub use training::{TrainRequest, TrainingPayload};
