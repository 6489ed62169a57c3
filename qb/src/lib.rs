//! Questboard - terminal client for a gamified interview-prep backend
//!
//! The backend turns a role and an interview date into a study plan, shown as
//! a board of quests. Each quest unlocks a quiz and some training material.
//! This crate is the client side of that.
//!
//! # Modules
//!
//! - [`sse`] - incremental decoder for the plan's Server-Sent-Events stream
//! - [`cache`] - prefetch cache for quizzes and training
//! - [`session`] - session controller and view state
//! - [`api`] - backend client trait and reqwest implementation
//! - [`domain`] - wire types for the board, quizzes, training and the setup form
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface
//! - [`repl`] - interactive front end

pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod domain;
pub mod render;
pub mod repl;
pub mod session;
pub mod sse;

pub use api::{ClientError, HttpQuestApi, QuestApi, create_client};
pub use cache::{CacheStats, PrefetchCache};
pub use config::Config;
pub use domain::{GameState, PlanRequest, QuizPayload, QuizResult, TaskRecord, TaskStatus, TrainingPayload};
pub use session::{PlanSummary, QuestSession, View};
pub use sse::{DecoderStats, EventKind, EventStream, StreamDecoder, StreamEvent};
