use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interview {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    pub interviewer_id: ObjectId,
    /// Unset for session-style interviews until the first candidate joins.
    pub candidate_id: Option<ObjectId>,
    #[serde(default)]
    pub status: InterviewStatus,
    pub scheduled_time: DateTime,
    /// Minutes.
    pub duration: u32,
    pub started_at: Option<DateTime>,
    pub completed_at: Option<DateTime>,
    pub result: Option<InterviewResult>,
    pub notes: Option<String>,
    #[serde(default)]
    pub logs: Vec<ObjectId>,
    pub invite_token: String,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InterviewStatus {
    #[default]
    Scheduled,
    Ongoing,
    Completed,
    Cancelled,
}

impl InterviewStatus {
    /// scheduled -> ongoing -> completed, and cancelled from either open state.
    pub fn can_transition_to(self, next: InterviewStatus) -> bool {
        use InterviewStatus::*;
        matches!(
            (self, next),
            (Scheduled, Ongoing) | (Ongoing, Completed) | (Scheduled, Cancelled) | (Ongoing, Cancelled)
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InterviewResult {
    Pass,
    Fail,
}

impl Interview {
    pub const COLLECTION: &'static str = "interviews";
    /// Hex characters in an invite token (32 random bytes).
    pub const INVITE_TOKEN_LEN: usize = 64;
}
