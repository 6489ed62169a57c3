//! Integration tests for the quest session
//!
//! A scripted in-memory backend stands in for the server: it streams a plan,
//! serves the board and grades quizzes the way the real one does (passing
//! completes a quest and unlocks the next, failing costs a life).

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use futures::StreamExt;

use questboard::api::ByteStream;
use questboard::domain::{CalendarLink, PlayerStats, Question};
use questboard::{
    ClientError, GameState, PlanRequest, PrefetchCache, QuestApi, QuestSession, QuizPayload, QuizResult, StreamEvent,
    TaskRecord, TaskStatus, TrainingPayload, View,
};

const LIVES: i32 = 3;

struct FakeBackend {
    plan_chunks: Vec<Vec<u8>>,
    initial_board: Vec<TaskRecord>,
    state: Mutex<Option<GameState>>,
    active_quiz: Mutex<Option<usize>>,
    lives: Mutex<i32>,
    generation: AtomicUsize,
    fail_next_quiz: AtomicBool,
    quiz_fetches: Mutex<Vec<usize>>,
    training_fetches: Mutex<Vec<String>>,
}

impl FakeBackend {
    fn new(plan_chunks: Vec<Vec<u8>>, board: Vec<TaskRecord>) -> Self {
        Self {
            plan_chunks,
            initial_board: board,
            state: Mutex::new(None),
            active_quiz: Mutex::new(None),
            lives: Mutex::new(LIVES),
            generation: AtomicUsize::new(0),
            fail_next_quiz: AtomicBool::new(false),
            quiz_fetches: Mutex::new(Vec::new()),
            training_fetches: Mutex::new(Vec::new()),
        }
    }

    fn quiz_fetches(&self) -> Vec<usize> {
        self.quiz_fetches.lock().unwrap().clone()
    }

    fn training_fetches(&self) -> Vec<String> {
        self.training_fetches.lock().unwrap().clone()
    }

    fn board(&self) -> Vec<TaskRecord> {
        self.state
            .lock()
            .unwrap()
            .as_ref()
            .map(|s| s.board.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl QuestApi for FakeBackend {
    async fn connect_calendar(&self) -> Result<CalendarLink, ClientError> {
        Ok(CalendarLink { auth_url: None })
    }

    async fn generate_plan(&self, request: &PlanRequest) -> Result<ByteStream, ClientError> {
        *self.state.lock().unwrap() = Some(GameState {
            role: Some(request.role.clone()),
            stats: PlayerStats {
                level: 1,
                title: "Novice".to_string(),
                xp: 0,
                xp_in_level: 0,
                xp_per_level: 500,
            },
            board: self.initial_board.clone(),
        });
        let chunks: Vec<Result<Vec<u8>, ClientError>> = self.plan_chunks.iter().cloned().map(Ok).collect();
        Ok(futures::stream::iter(chunks).boxed())
    }

    async fn game_state(&self) -> Result<GameState, ClientError> {
        self.state.lock().unwrap().clone().ok_or_else(|| ClientError::ApiError {
            status: 404,
            message: "Game not initialized. Please generate a plan first.".to_string(),
        })
    }

    async fn start_quiz(&self, task_index: usize, _role: &str) -> Result<QuizPayload, ClientError> {
        self.quiz_fetches.lock().unwrap().push(task_index);
        if self.fail_next_quiz.swap(false, Ordering::SeqCst) {
            return Err(ClientError::ApiError {
                status: 500,
                message: "model overloaded".to_string(),
            });
        }
        let objective = self
            .board()
            .get(task_index)
            .map(|t| t.objective.clone())
            .ok_or_else(|| ClientError::ApiError {
                status: 400,
                message: "Invalid task index.".to_string(),
            })?;

        let generation = self.generation.fetch_add(1, Ordering::SeqCst);
        *self.active_quiz.lock().unwrap() = Some(task_index);
        Ok(QuizPayload {
            task_name: objective.clone(),
            questions: vec![Question::new(
                format!("What matters most about {}? (set {})", objective, generation),
                vec!["correct".to_string(), "wrong".to_string()],
            )],
        })
    }

    async fn submit_quiz(&self, answers: &[String]) -> Result<QuizResult, ClientError> {
        let index = self.active_quiz.lock().unwrap().ok_or_else(|| ClientError::ApiError {
            status: 400,
            message: "No active quiz found.".to_string(),
        })?;

        let passed = !answers.is_empty() && answers.iter().all(|a| a == "correct");
        if passed {
            let mut state = self.state.lock().unwrap();
            if let Some(state) = state.as_mut() {
                state.board[index].status = TaskStatus::Done;
                if let Some(next) = state.board.get_mut(index + 1) {
                    next.status = TaskStatus::Active;
                }
                state.stats.xp += 100;
                state.stats.xp_in_level += 100;
            }
            *self.lives.lock().unwrap() = LIVES;
            return Ok(QuizResult {
                passed: true,
                score: 1,
                total: 1,
                lives_left: None,
                game_over: false,
                quiz_data: None,
            });
        }

        let mut lives = self.lives.lock().unwrap();
        *lives -= 1;
        let left = *lives;
        if left <= 0 {
            *lives = LIVES;
        }
        Ok(QuizResult {
            passed: false,
            score: 0,
            total: 1,
            lives_left: Some(left),
            game_over: left <= 0,
            quiz_data: None,
        })
    }

    async fn train(&self, quest: &str) -> Result<TrainingPayload, ClientError> {
        self.training_fetches.lock().unwrap().push(quest.to_string());
        Ok(TrainingPayload {
            explanation: format!("How to approach {}", quest),
            resources: vec!["https://example.com/study".to_string()],
        })
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn board() -> Vec<TaskRecord> {
    vec![
        TaskRecord::new(TaskStatus::Active, "Arrays").with_timeline("Day 1"),
        TaskRecord::new(TaskStatus::Locked, "Graphs").with_timeline("Day 2"),
        TaskRecord::new(TaskStatus::Locked, "💀 Final Boss").with_timeline("Day 3"),
    ]
}

fn plan_body() -> &'static str {
    "event: status\r\ndata: \"Consulting the oracle\"\r\n\r\n\
     : keep-alive\r\n\r\n\
     event: plan_chunk\r\ndata: \"Day 1: Arrays. \"\r\n\r\n\
     event: plan_chunk\r\ndata: \"Day 2: Graphs – BFS/DFS. \"\r\n\r\n\
     event: complete\r\ndata: \"Plan generated successfully!\"\r\n\r\n"
}

fn byte_chunks(body: &str, size: usize) -> Vec<Vec<u8>> {
    body.as_bytes().chunks(size).map(<[u8]>::to_vec).collect()
}

fn request() -> PlanRequest {
    PlanRequest {
        role: "Backend Engineer".to_string(),
        goal: "Pass the onsite".to_string(),
        job_description: None,
        hours: 2.0,
        start_date: NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
        interview_date: NaiveDate::from_ymd_opt(2026, 10, 30).unwrap(),
        use_cal: false,
        pref_time: 18,
    }
}

async fn planned_session(backend: Arc<FakeBackend>) -> QuestSession {
    let mut session = QuestSession::new(backend, PrefetchCache::new());
    session.generate_plan(request(), |_| {}).await.unwrap();
    session.settle_prefetch().await;
    session
}

// =============================================================================
// Plan Stream Tests
// =============================================================================

#[tokio::test]
async fn test_plan_survives_byte_by_byte_delivery() {
    // One byte per chunk splits the multi-byte dash and every CRLF
    let backend = Arc::new(FakeBackend::new(byte_chunks(plan_body(), 1), board()));
    let mut session = QuestSession::new(backend, PrefetchCache::new());

    let mut events: Vec<StreamEvent> = Vec::new();
    let summary = session
        .generate_plan(request(), |event| events.push(event.clone()))
        .await
        .unwrap();

    assert_eq!(events.len(), 4);
    assert_eq!(events[0], StreamEvent::status("Consulting the oracle"));
    assert_eq!(summary.plan, "Day 1: Arrays. Day 2: Graphs – BFS/DFS. ");
    assert_eq!(summary.last_status.as_deref(), Some("Consulting the oracle"));
    assert_eq!(summary.stream.dropped, 0);
    assert_eq!(summary.stream.ignored, 1);
    assert_eq!(session.view(), View::Board);
}

#[tokio::test]
async fn test_plan_with_malformed_frame_still_completes() {
    let body = "event: plan_chunk\ndata: \"Day 1\"\n\n\
                event: plan_chunk\ndata: {broken\n\n\
                event: plan_chunk\ndata: \" Day 2\"\n\n";
    let backend = Arc::new(FakeBackend::new(byte_chunks(body, 7), board()));
    let mut session = QuestSession::new(backend, PrefetchCache::new());

    let summary = session.generate_plan(request(), |_| {}).await.unwrap();

    assert_eq!(summary.plan, "Day 1 Day 2");
    assert_eq!(summary.stream.dropped, 1);
}

// =============================================================================
// Quest Flow Tests
// =============================================================================

#[tokio::test]
async fn test_full_quest_flow_warms_one_task_at_a_time() {
    let backend = Arc::new(FakeBackend::new(byte_chunks(plan_body(), 16), board()));
    let mut session = planned_session(backend.clone()).await;

    // Only the first actionable task was warmed
    assert_eq!(backend.quiz_fetches(), vec![0]);
    assert_eq!(backend.training_fetches(), vec!["Arrays".to_string()]);

    // Opening it is served from the cache
    let quiz = session.open_quiz(0).await.unwrap();
    assert_eq!(backend.quiz_fetches(), vec![0]);
    assert_eq!(session.cache().stats().await.hits, 1);

    let training = session.open_training(0).await.unwrap();
    assert!(training.explanation.contains("Arrays"));
    assert_eq!(backend.training_fetches().len(), 1);
    session.close_modal().await.unwrap();

    session.open_quiz(0).await.unwrap();
    let answers = vec![quiz.questions[0].options[0].clone()];
    let result = session.submit_quiz(answers).await.unwrap();
    assert!(result.passed);

    // Closing refreshes the board and warms the newly unlocked task
    session.close_modal().await.unwrap();
    session.settle_prefetch().await;

    assert_eq!(session.view(), View::Board);
    let state = session.game_state().unwrap();
    assert_eq!(state.board[0].status, TaskStatus::Done);
    assert_eq!(state.next_actionable().map(|(i, _)| i), Some(1));
    assert_eq!(backend.quiz_fetches(), vec![0, 1]);
    assert_eq!(backend.training_fetches(), vec!["Arrays".to_string(), "Graphs".to_string()]);
}

#[tokio::test]
async fn test_losing_every_life_regenerates_questions() {
    let backend = Arc::new(FakeBackend::new(byte_chunks(plan_body(), 64), board()));
    let mut session = planned_session(backend.clone()).await;

    let first = session.open_quiz(0).await.unwrap();
    for expected_lives in (1..LIVES).rev() {
        let result = session.submit_quiz(vec!["wrong".to_string()]).await.unwrap();
        assert_eq!(result.lives_left, Some(expected_lives));
        session.close_modal().await.unwrap();

        // Lives remain, so the retry reuses the cached questions
        assert_eq!(session.open_quiz(0).await.unwrap(), first);
    }

    let result = session.submit_quiz(vec!["wrong".to_string()]).await.unwrap();
    assert!(result.game_over);
    assert!(!session.cache().contains_quiz(0).await);

    session.close_modal().await.unwrap();
    session.settle_prefetch().await;

    // The board refresh re-warmed task 0 with a fresh set
    let fresh = session.open_quiz(0).await.unwrap();
    assert_ne!(fresh.questions[0].prompt, first.questions[0].prompt);
}

#[tokio::test]
async fn test_failed_prefetch_is_retried_on_demand() {
    let backend = Arc::new(FakeBackend::new(byte_chunks(plan_body(), 64), board()));
    backend.fail_next_quiz.store(true, Ordering::SeqCst);
    let mut session = planned_session(backend.clone()).await;

    assert!(!session.cache().contains_quiz(0).await);

    let quiz = session.open_quiz(0).await.unwrap();
    assert_eq!(quiz.task_name, "Arrays");
    assert_eq!(backend.quiz_fetches(), vec![0, 0]);
}

#[tokio::test]
async fn test_locked_task_cannot_be_opened() {
    let backend = Arc::new(FakeBackend::new(byte_chunks(plan_body(), 64), board()));
    let mut session = planned_session(backend.clone()).await;

    let err = session.open_quiz(2).await.unwrap_err();
    assert!(err.is_local());
    assert_eq!(backend.quiz_fetches(), vec![0]);
}

#[tokio::test]
async fn test_fresh_server_has_no_board() {
    let backend = Arc::new(FakeBackend::new(Vec::new(), board()));
    let mut session = QuestSession::new(backend.clone(), PrefetchCache::new());

    assert!(session.refresh_board().await.unwrap().is_none());
    assert_eq!(session.view(), View::Setup);
    assert!(session.connect_calendar().await.unwrap().is_none());
    assert!(backend.quiz_fetches().is_empty());
}
