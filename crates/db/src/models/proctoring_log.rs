use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// Append-only record of one candidate-side behavioral signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProctoringLog {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub interview_id: ObjectId,
    #[serde(rename = "type")]
    pub event_type: ProctoringEventType,
    pub timestamp: DateTime,
    pub details: String,
    #[serde(default)]
    pub severity: Severity,
    /// Only ever flipped by the review workflow.
    #[serde(default)]
    pub resolved: bool,
    pub created_at: DateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ProctoringEventType {
    TabSwitch,
    MultipleFace,
    MicMuted,
    WindowMinimize,
    AudioDetected,
    VideoDisabled,
}

impl ProctoringEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProctoringEventType::TabSwitch => "tab-switch",
            ProctoringEventType::MultipleFace => "multiple-face",
            ProctoringEventType::MicMuted => "mic-muted",
            ProctoringEventType::WindowMinimize => "window-minimize",
            ProctoringEventType::AudioDetected => "audio-detected",
            ProctoringEventType::VideoDisabled => "video-disabled",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ProctoringLog {
    pub const COLLECTION: &'static str = "proctoring_logs";
    pub const DETAILS_MAX_LEN: usize = 500;
}
