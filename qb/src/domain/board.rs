//! Quest board snapshot returned by `GET /api/game_state`

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Lifecycle of a quest: Locked -> Active -> Done
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskStatus {
    Locked,
    Active,
    Done,
}

impl TaskStatus {
    /// Parse the backend's display label ("🔒 LOCKED", "🔐 UNLOCKED", "✅ DONE")
    pub fn from_label(label: &str) -> Self {
        let upper = label.to_uppercase();
        // "UNLOCKED" contains "LOCKED", so test it first
        if upper.contains("DONE") || upper.contains("COMPLETED") {
            Self::Done
        } else if upper.contains("UNLOCKED") || upper.contains("ACTIVE") {
            Self::Active
        } else if upper.contains("LOCKED") {
            Self::Locked
        } else {
            debug!(%label, "TaskStatus::from_label: unrecognized label, treating as active");
            Self::Active
        }
    }

    /// Neither Locked nor Done
    pub fn is_actionable(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Locked => write!(f, "LOCKED"),
            Self::Active => write!(f, "UNLOCKED"),
            Self::Done => write!(f, "DONE"),
        }
    }
}

impl From<String> for TaskStatus {
    fn from(label: String) -> Self {
        Self::from_label(&label)
    }
}

impl From<TaskStatus> for String {
    fn from(status: TaskStatus) -> Self {
        status.to_string()
    }
}

/// One row of the quest board; its position in the board is its task index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    #[serde(rename = "Status", alias = "status")]
    pub status: TaskStatus,

    #[serde(rename = "Timeline", alias = "timeline", default)]
    pub timeline: String,

    #[serde(rename = "Quest Objective", alias = "objective")]
    pub objective: String,

    #[serde(rename = "Rewards", alias = "rewards", default)]
    pub rewards: String,
}

impl TaskRecord {
    pub fn new(status: TaskStatus, objective: impl Into<String>) -> Self {
        Self {
            status,
            timeline: String::new(),
            objective: objective.into(),
            rewards: String::new(),
        }
    }

    pub fn with_timeline(mut self, timeline: impl Into<String>) -> Self {
        self.timeline = timeline.into();
        self
    }

    pub fn with_rewards(mut self, rewards: impl Into<String>) -> Self {
        self.rewards = rewards.into();
        self
    }

    /// Boss battles are rendered by the backend with a skull prefix
    pub fn is_boss(&self) -> bool {
        self.objective.starts_with('💀')
    }
}

/// Player progression computed server-side
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub level: u32,
    pub title: String,
    pub xp: u64,
    pub xp_in_level: u64,
    pub xp_per_level: u64,
}

impl PlayerStats {
    /// Progress through the current level, 0.0..=1.0
    pub fn level_progress(&self) -> f64 {
        if self.xp_per_level == 0 {
            return 0.0;
        }
        (self.xp_in_level as f64 / self.xp_per_level as f64).clamp(0.0, 1.0)
    }
}

/// Full board snapshot; replaced wholesale on every refresh
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    #[serde(default)]
    pub role: Option<String>,

    #[serde(default)]
    pub stats: PlayerStats,

    #[serde(default)]
    pub board: Vec<TaskRecord>,
}

impl GameState {
    pub fn task(&self, index: usize) -> Option<&TaskRecord> {
        self.board.get(index)
    }

    pub fn next_actionable(&self) -> Option<(usize, &TaskRecord)> {
        next_actionable(&self.board)
    }

    pub fn completed(&self) -> usize {
        self.board.iter().filter(|t| t.status == TaskStatus::Done).count()
    }
}

/// First task that is neither Locked nor Done, with its board position
pub fn next_actionable(board: &[TaskRecord]) -> Option<(usize, &TaskRecord)> {
    debug!(tasks = board.len(), "next_actionable: called");
    board.iter().enumerate().find(|(_, task)| task.status.is_actionable())
}
