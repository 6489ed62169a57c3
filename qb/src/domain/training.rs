//! Training material for a single quest

use serde::{Deserialize, Serialize};

/// Explanation plus study links, cached by quest objective
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingPayload {
    pub explanation: String,

    #[serde(default)]
    pub resources: Vec<String>,
}

/// Body of `POST /api/train`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainRequest {
    pub quest: String,
}
