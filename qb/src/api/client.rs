//! QuestApi trait definition

use async_trait::async_trait;
use futures::stream::BoxStream;

use super::ClientError;
use crate::domain::{CalendarLink, GameState, PlanRequest, QuizPayload, QuizResult, TrainingPayload};

/// Raw response body of the plan stream, chunked however the transport likes
pub type ByteStream = BoxStream<'static, Result<Vec<u8>, ClientError>>;

/// Backend collaborator for the quest board
///
/// Each call is a single request; nothing here retries. Retrying is always
/// the user repeating the action that failed.
#[async_trait]
pub trait QuestApi: Send + Sync {
    /// `GET /api/connect_calendar`
    async fn connect_calendar(&self) -> Result<CalendarLink, ClientError>;

    /// `POST /api/generate_plan`, returning the undecoded SSE body
    ///
    /// Errors here mean the stream never opened; failures mid-stream show up
    /// as `Err` items in the returned stream.
    async fn generate_plan(&self, request: &PlanRequest) -> Result<ByteStream, ClientError>;

    /// `GET /api/game_state`
    async fn game_state(&self) -> Result<GameState, ClientError>;

    /// `POST /api/start_quiz`
    async fn start_quiz(&self, task_index: usize, role: &str) -> Result<QuizPayload, ClientError>;

    /// `POST /api/quiz/submit`
    async fn submit_quiz(&self, answers: &[String]) -> Result<QuizResult, ClientError>;

    /// `POST /api/train`
    async fn train(&self, quest: &str) -> Result<TrainingPayload, ClientError>;
}
