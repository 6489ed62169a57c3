//! Quiz payloads and grading results

use serde::{Deserialize, Serialize};

/// One multiple-choice question
///
/// The backend strips `correct_index` and `justification` when a quiz starts
/// and returns them with the graded result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "q", alias = "prompt")]
    pub prompt: String,

    pub options: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_index: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justification: Option<String>,
}

impl Question {
    pub fn new(prompt: impl Into<String>, options: Vec<String>) -> Self {
        Self {
            prompt: prompt.into(),
            options,
            correct_index: None,
            justification: None,
        }
    }

    /// Text of the correct option, when the server revealed it
    pub fn correct_answer(&self) -> Option<&str> {
        self.correct_index
            .and_then(|i| self.options.get(i))
            .map(String::as_str)
    }
}

/// Questions for one task, cached by task index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizPayload {
    #[serde(default)]
    pub task_name: String,

    pub questions: Vec<Question>,
}

/// Body of `POST /api/start_quiz`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartQuizRequest {
    pub task_index: usize,
    pub role: String,
}

/// Body of `POST /api/quiz/submit`; answers are option texts in question order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSubmission {
    pub answers: Vec<String>,
}

/// Graded quiz
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizResult {
    pub passed: bool,
    pub score: u32,
    pub total: u32,

    /// Only present on failure
    #[serde(default)]
    pub lives_left: Option<i32>,

    #[serde(default)]
    pub game_over: bool,

    /// Questions with answers and justifications, for review
    #[serde(default)]
    pub quiz_data: Option<Vec<Question>>,
}

impl QuizResult {
    /// The retry budget for this quiz is spent; its questions must be regenerated
    pub fn is_exhausted(&self) -> bool {
        self.game_over || self.lives_left.is_some_and(|lives| lives <= 0)
    }
}
