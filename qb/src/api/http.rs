//! HTTP implementation of QuestApi over reqwest

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{ByteStream, ClientError, QuestApi};
use crate::config::ServerConfig;
use crate::domain::{
    CalendarLink, GameState, PlanRequest, QuizPayload, QuizResult, QuizSubmission, StartQuizRequest, TrainRequest,
    TrainingPayload,
};

/// Client for the quest backend's `/api` routes
pub struct HttpQuestApi {
    base_url: String,
    http: Client,
    request_timeout: Option<Duration>,
}

impl HttpQuestApi {
    /// Create a client from server configuration
    pub fn from_config(config: &ServerConfig) -> Result<Self, ClientError> {
        debug!(?config, "from_config: called");
        let http = Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .build()
            .map_err(ClientError::Network)?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            request_timeout: config.request_timeout_ms.map(Duration::from_millis),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, route: &str) -> String {
        format!("{}/api/{}", self.base_url, route)
    }

    /// Apply the per-request timeout; the plan stream skips this
    fn bounded(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.request_timeout {
            Some(timeout) => builder.timeout(timeout),
            None => builder,
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        let response = self.bounded(builder).send().await?;
        let response = check_status(response).await?;
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(ClientError::Json)
    }
}

/// Turn a non-success response into `ClientError::ApiError`
async fn check_status(response: Response) -> Result<Response, ClientError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();
    debug!(%status, "check_status: API error");
    Err(ClientError::ApiError {
        status,
        message: error_message(&text),
    })
}

/// Prefer the FastAPI `detail` (or `error`) field over the raw body
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            let field = v.get("detail").or_else(|| v.get("error"))?;
            Some(match field.as_str() {
                Some(s) => s.to_string(),
                None => field.to_string(),
            })
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl QuestApi for HttpQuestApi {
    async fn connect_calendar(&self) -> Result<CalendarLink, ClientError> {
        debug!("connect_calendar: called");
        self.send_json(self.http.get(self.url("connect_calendar"))).await
    }

    async fn generate_plan(&self, request: &PlanRequest) -> Result<ByteStream, ClientError> {
        debug!(role = %request.role, use_cal = request.use_cal, "generate_plan: called");
        let response = self
            .http
            .post(self.url("generate_plan"))
            .header("accept", "text/event-stream")
            .json(request)
            .send()
            .await?;
        let response = check_status(response).await?;

        debug!("generate_plan: stream opened");
        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(ClientError::Network));
        Ok(body.boxed())
    }

    async fn game_state(&self) -> Result<GameState, ClientError> {
        debug!("game_state: called");
        self.send_json(self.http.get(self.url("game_state"))).await
    }

    async fn start_quiz(&self, task_index: usize, role: &str) -> Result<QuizPayload, ClientError> {
        debug!(task_index, %role, "start_quiz: called");
        let body = StartQuizRequest {
            task_index,
            role: role.to_string(),
        };
        self.send_json(self.http.post(self.url("start_quiz")).json(&body)).await
    }

    async fn submit_quiz(&self, answers: &[String]) -> Result<QuizResult, ClientError> {
        debug!(answers = answers.len(), "submit_quiz: called");
        let body = QuizSubmission {
            answers: answers.to_vec(),
        };
        self.send_json(self.http.post(self.url("quiz/submit")).json(&body)).await
    }

    async fn train(&self, quest: &str) -> Result<TrainingPayload, ClientError> {
        debug!(%quest, "train: called");
        let body = TrainRequest {
            quest: quest.to_string(),
        };
        self.send_json(self.http.post(self.url("train")).json(&body)).await
    }
}
