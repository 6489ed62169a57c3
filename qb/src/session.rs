//! Quest session controller
//!
//! Owns everything the front end needs between actions: the API client, the
//! prefetch cache, the player's role, the last board snapshot and which view
//! is showing. One session per front end; nothing here is global.

use std::sync::Arc;

use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::{ClientError, QuestApi};
use crate::cache::PrefetchCache;
use crate::domain::{GameState, PlanRequest, QuizPayload, QuizResult, TrainingPayload};
use crate::sse::{DecoderStats, EventKind, EventStream, StreamEvent};

/// What the front end is currently showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Setup form; also where failed generations land
    Setup,
    /// Plan stream in progress
    Generating,
    /// Quest board
    Board,
    /// Quiz modal for one task
    Quiz { task_index: usize },
    /// Training modal for one task
    Training { task_index: usize },
}

/// What a finished plan generation produced
#[derive(Debug, Clone, Default)]
pub struct PlanSummary {
    /// Concatenated plan chunks
    pub plan: String,

    /// Last status message the server sent
    pub last_status: Option<String>,

    /// Server's closing message, if it sent one
    pub completion: Option<String>,

    /// Decoder counters for the stream
    pub stream: DecoderStats,
}

pub struct QuestSession {
    api: Arc<dyn QuestApi>,
    cache: PrefetchCache,
    prefetch_enabled: bool,
    role: Option<String>,
    state: Option<GameState>,
    view: View,
    prefetches: Vec<JoinHandle<()>>,
}

impl QuestSession {
    pub fn new(api: Arc<dyn QuestApi>, cache: PrefetchCache) -> Self {
        debug!("QuestSession::new: called");
        Self {
            api,
            cache,
            prefetch_enabled: true,
            role: None,
            state: None,
            view: View::Setup,
            prefetches: Vec::new(),
        }
    }

    pub fn with_prefetch(mut self, enabled: bool) -> Self {
        self.prefetch_enabled = enabled;
        self
    }

    pub fn with_role(mut self, role: Option<String>) -> Self {
        self.role = role.filter(|r| !r.trim().is_empty());
        self
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    pub fn game_state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    pub fn cache(&self) -> &PrefetchCache {
        &self.cache
    }

    /// Calendar consent URL, if the backend has one to offer
    pub async fn connect_calendar(&self) -> Result<Option<String>, ClientError> {
        debug!("connect_calendar: called");
        let link = self.api.connect_calendar().await?;
        Ok(link.auth_url.filter(|url| !url.is_empty()))
    }

    /// Stream a new plan, dispatching every event to `on_event` as it arrives
    ///
    /// On success the board is refreshed and the next quest warmed. On any
    /// failure the session falls back to the setup view.
    pub async fn generate_plan<F>(&mut self, request: PlanRequest, mut on_event: F) -> Result<PlanSummary, ClientError>
    where
        F: FnMut(&StreamEvent),
    {
        debug!(role = %request.role, "generate_plan: called");
        request.validate()?;

        self.role = Some(request.role.clone());
        self.state = None;
        self.abort_prefetch();
        self.cache.clear().await;
        self.view = View::Generating;

        let body = match self.api.generate_plan(&request).await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "generate_plan: request failed");
                self.view = View::Setup;
                return Err(e);
            }
        };

        let mut events = EventStream::new(body);
        let mut summary = PlanSummary::default();
        let mut server_error = None;

        while let Some(item) = events.next().await {
            let event = match item {
                Ok(event) => event,
                Err(e) => {
                    warn!(error = %e, "generate_plan: stream failed");
                    self.view = View::Setup;
                    return Err(e);
                }
            };

            match event.kind {
                EventKind::PlanChunk => summary.plan.push_str(&event.payload),
                EventKind::Status => summary.last_status = Some(event.payload.clone()),
                EventKind::Complete => summary.completion = Some(event.payload.clone()),
                EventKind::Error => server_error = Some(event.payload.clone()),
                EventKind::Unknown(_) => {}
            }
            on_event(&event);
        }
        summary.stream = events.stats().clone();
        info!(
            plan_len = summary.plan.len(),
            emitted = summary.stream.emitted,
            dropped = summary.stream.dropped,
            "generate_plan: stream complete"
        );

        if let Some(message) = server_error {
            warn!(%message, "generate_plan: server reported failure");
            self.view = View::Setup;
            return Err(ClientError::PlanFailed(message));
        }

        match self.refresh_board().await {
            Ok(Some(_)) => Ok(summary),
            Ok(None) => {
                self.view = View::Setup;
                Err(ClientError::PlanFailed("server has no board after generation".to_string()))
            }
            Err(e) => {
                self.view = View::Setup;
                Err(e)
            }
        }
    }

    /// Fetch the board and warm the next actionable quest
    ///
    /// Returns `None` when the backend has no plan yet.
    pub async fn refresh_board(&mut self) -> Result<Option<&GameState>, ClientError> {
        debug!("refresh_board: called");
        let state = match self.api.game_state().await {
            Ok(state) => state,
            Err(e) if e.is_not_found() => {
                debug!("refresh_board: no game yet");
                self.state = None;
                self.view = View::Setup;
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        if let Some(role) = state.role.as_ref().filter(|r| !r.is_empty()) {
            self.role = Some(role.clone());
        }
        debug!(tasks = state.board.len(), level = state.stats.level, "refresh_board: board loaded");
        self.state = Some(state);
        self.view = View::Board;
        self.warm_next();
        Ok(self.state.as_ref())
    }

    /// Open the quiz for an actionable task, preferring the cached copy
    pub async fn open_quiz(&mut self, task_index: usize) -> Result<QuizPayload, ClientError> {
        debug!(task_index, "open_quiz: called");
        self.ensure_actionable(task_index)?;
        let role = self
            .role
            .clone()
            .ok_or_else(|| ClientError::InvalidRequest("role is unknown; generate a plan first".to_string()))?;

        let quiz = self
            .cache
            .get_or_fetch_quiz(self.api.as_ref(), task_index, &role)
            .await?;
        self.view = View::Quiz { task_index };
        Ok(quiz)
    }

    /// Submit answers for the open quiz
    ///
    /// Once the retry budget is spent the cached questions are dropped so the
    /// next attempt gets a fresh set. A failed submission closes the quiz.
    pub async fn submit_quiz(&mut self, answers: Vec<String>) -> Result<QuizResult, ClientError> {
        let View::Quiz { task_index } = self.view else {
            return Err(ClientError::InvalidRequest("no quiz is open".to_string()));
        };
        debug!(task_index, answers = answers.len(), "submit_quiz: called");

        let result = match self.api.submit_quiz(&answers).await {
            Ok(result) => result,
            Err(e) => {
                warn!(task_index, error = %e, "submit_quiz: submission failed, back to board");
                self.view = View::Board;
                return Err(e);
            }
        };
        if result.is_exhausted() {
            info!(task_index, "submit_quiz: out of lives, invalidating cached quiz");
            self.cache.invalidate_quiz(task_index).await;
        }
        Ok(result)
    }

    /// Open training for a task, keyed by its objective
    pub async fn open_training(&mut self, task_index: usize) -> Result<TrainingPayload, ClientError> {
        debug!(task_index, "open_training: called");
        let objective = self
            .state
            .as_ref()
            .and_then(|s| s.task(task_index))
            .map(|t| t.objective.clone())
            .ok_or_else(|| ClientError::InvalidRequest(format!("no task at index {}", task_index)))?;

        let training = self.cache.get_or_fetch_training(self.api.as_ref(), &objective).await?;
        self.view = View::Training { task_index };
        Ok(training)
    }

    /// Close the open modal; closing a quiz refreshes the board
    pub async fn close_modal(&mut self) -> Result<(), ClientError> {
        debug!(view = ?self.view, "close_modal: called");
        match self.view {
            View::Quiz { .. } => {
                self.view = View::Board;
                self.refresh_board().await?;
            }
            View::Training { .. } => self.view = View::Board,
            _ => {}
        }
        Ok(())
    }

    /// Wait for outstanding prefetches to land
    pub async fn settle_prefetch(&mut self) {
        debug!(pending = self.prefetches.len(), "settle_prefetch: called");
        for handle in self.prefetches.drain(..) {
            if let Err(e) = handle.await {
                warn!(error = %e, "settle_prefetch: prefetch task panicked");
            }
        }
    }

    /// Cancel prefetches that belong to a board about to be replaced
    fn abort_prefetch(&mut self) {
        debug!(pending = self.prefetches.len(), "abort_prefetch: called");
        for handle in self.prefetches.drain(..) {
            handle.abort();
        }
    }

    fn ensure_actionable(&self, task_index: usize) -> Result<(), ClientError> {
        let task = self
            .state
            .as_ref()
            .and_then(|s| s.task(task_index))
            .ok_or_else(|| ClientError::InvalidRequest(format!("no task at index {}", task_index)))?;
        if !task.status.is_actionable() {
            return Err(ClientError::InvalidRequest(format!(
                "task {} is {}, not available",
                task_index, task.status
            )));
        }
        Ok(())
    }

    /// Warm only the nearest actionable task, never the whole board
    fn warm_next(&mut self) {
        if !self.prefetch_enabled {
            debug!("warm_next: prefetch disabled");
            return;
        }
        self.prefetches.retain(|h| !h.is_finished());

        let Some((index, task)) = self.state.as_ref().and_then(|s| s.next_actionable()) else {
            debug!("warm_next: nothing actionable");
            return;
        };
        let objective = task.objective.clone();
        debug!(index, %objective, "warm_next: warming");

        if let Some(role) = self.role.clone() {
            self.prefetches.push(self.cache.warm(self.api.clone(), index, role));
        } else {
            debug!(index, "warm_next: role unknown, skipping quiz");
        }
        self.prefetches
            .push(self.cache.warm_training(self.api.clone(), objective));
    }
}
