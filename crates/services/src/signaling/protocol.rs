//! Wire vocabulary of the interview socket.
//!
//! Every frame is a JSON object `{"event": "<name>", "data": {...}}`.
//! Inbound frames are decoded in two steps (envelope, then payload) so a
//! bad payload can be attributed to the event it claimed to be.

use chrono::{DateTime, Utc};
use intervue_db::models::{ProctoringEventType, Severity, UserRole};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use validator::Validate;

use crate::auth::Identity;

pub const JOIN_INTERVIEW: &str = "join-interview";
pub const LEAVE_INTERVIEW: &str = "leave-interview";
pub const WEBRTC_SIGNAL: &str = "webrtc-signal";
pub const PROCTORING_EVENT: &str = "proctoring-event";
pub const PING: &str = "ping";

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Invalid frame: {0}")]
    InvalidFrame(#[source] serde_json::Error),
    #[error("Unknown event: {0}")]
    UnknownEvent(String),
    #[error("Malformed {event} payload: {source}")]
    Malformed {
        event: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl ProtocolError {
    /// The event a malformed frame claimed to be, if it got that far.
    pub fn event(&self) -> Option<&'static str> {
        match self {
            ProtocolError::Malformed { event, .. } => Some(*event),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    data: Value,
}

/// A decoded client frame.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    JoinInterview(JoinRequest),
    LeaveInterview,
    WebrtcSignal(SignalMessage),
    ProctoringEvent(ProctoringReport),
    Ping,
}

impl ClientEvent {
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let envelope: Envelope = serde_json::from_str(text).map_err(ProtocolError::InvalidFrame)?;
        match envelope.event.as_str() {
            JOIN_INTERVIEW => payload(JOIN_INTERVIEW, envelope.data).map(ClientEvent::JoinInterview),
            LEAVE_INTERVIEW => Ok(ClientEvent::LeaveInterview),
            WEBRTC_SIGNAL => payload::<SignalMessage>(WEBRTC_SIGNAL, envelope.data)
                .map(|signal| ClientEvent::WebrtcSignal(signal.without_sender_override())),
            PROCTORING_EVENT => {
                payload(PROCTORING_EVENT, envelope.data).map(ClientEvent::ProctoringEvent)
            }
            PING => Ok(ClientEvent::Ping),
            _ => Err(ProtocolError::UnknownEvent(envelope.event)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::JoinInterview(_) => JOIN_INTERVIEW,
            ClientEvent::LeaveInterview => LEAVE_INTERVIEW,
            ClientEvent::WebrtcSignal(_) => WEBRTC_SIGNAL,
            ClientEvent::ProctoringEvent(_) => PROCTORING_EVENT,
            ClientEvent::Ping => PING,
        }
    }
}

fn payload<T: for<'de> Deserialize<'de>>(event: &'static str, data: Value) -> Result<T, ProtocolError> {
    serde_json::from_value(data).map_err(|source| ProtocolError::Malformed { event, source })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    /// Interview id or invite token.
    pub interview_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignalKind {
    Offer,
    Answer,
    IceCandidate,
}

/// A negotiation message. `data` and any extra fields are opaque and
/// forwarded untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalMessage {
    #[serde(rename = "type")]
    pub kind: SignalKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SignalMessage {
    fn without_sender_override(mut self) -> Self {
        self.extra.remove("fromUserId");
        self
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct ProctoringReport {
    #[serde(rename = "type")]
    pub event_type: ProctoringEventType,
    #[validate(length(min = 1, max = 500))]
    pub details: String,
    #[serde(default)]
    pub severity: Option<Severity>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerInfo {
    pub user_id: String,
    pub user_name: String,
    pub user_role: UserRole,
}

impl From<&Identity> for PeerInfo {
    fn from(identity: &Identity) -> Self {
        Self {
            user_id: identity.user_id.to_hex(),
            user_name: identity.name.clone(),
            user_role: identity.role,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerLeft {
    pub user_id: String,
    pub user_name: String,
}

impl From<&Identity> for PeerLeft {
    fn from(identity: &Identity) -> Self {
        Self {
            user_id: identity.user_id.to_hex(),
            user_name: identity.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinedInterview {
    pub interview_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayedSignal {
    #[serde(flatten)]
    pub signal: SignalMessage,
    pub from_user_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProctoringAlert {
    #[serde(rename = "type")]
    pub event_type: ProctoringEventType,
    pub details: String,
    pub severity: Severity,
    pub timestamp: DateTime<Utc>,
    pub candidate_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorNotice {
    pub message: String,
}

/// Server-to-client frames.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    Connected(PeerInfo),
    JoinedInterview(JoinedInterview),
    UserJoined(PeerInfo),
    UserLeft(PeerLeft),
    WebrtcSignal(RelayedSignal),
    ProctoringAlert(ProctoringAlert),
    Error(ErrorNotice),
    Pong,
}

impl ServerEvent {
    pub fn error(message: impl Into<String>) -> Self {
        ServerEvent::Error(ErrorNotice {
            message: message.into(),
        })
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
