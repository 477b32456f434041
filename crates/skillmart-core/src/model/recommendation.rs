// ── Recommendation display types ──
//
// Scores and reasons come from the recommendation service as-is.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::{Course, EntityId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub course_id: EntityId,
    pub title: Option<String>,
    pub score: f64,
    pub reason: Option<String>,
    pub course: Option<Course>,
}

impl Recommendation {
    /// Title from the populated course, the flat title, or the id.
    pub fn display_title(&self) -> String {
        self.course
            .as_ref()
            .map(|c| c.title.clone())
            .or_else(|| self.title.clone())
            .unwrap_or_else(|| self.course_id.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ModelState {
    Idle,
    Training,
    Completed,
    Failed,
    Unknown,
}

impl ModelState {
    /// Map the service's status strings, which vary between deployments.
    pub fn from_status(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "idle" | "not_started" | "not-started" | "pending" => Self::Idle,
            "training" | "in_progress" | "in-progress" | "running" | "started" => Self::Training,
            "completed" | "complete" | "trained" | "ready" | "success" => Self::Completed,
            "failed" | "error" => Self::Failed,
            _ => Self::Unknown,
        }
    }

    pub fn is_running(self) -> bool {
        self == Self::Training
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingStatus {
    pub state: ModelState,
    pub last_trained_at: Option<DateTime<Utc>>,
    pub progress: Option<f64>,
    pub message: Option<String>,
    pub model_version: Option<String>,
}
