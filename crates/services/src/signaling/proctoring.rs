//! Candidate-reported proctoring events: persist, link, then alert the room.

use std::sync::Arc;
use std::time::Duration;

use bson::oid::ObjectId;
use intervue_db::models::UserRole;
use tracing::{debug, info, warn};
use validator::Validate;

use super::protocol::{ProctoringAlert, ProctoringReport, ServerEvent};
use super::registry::{ConnectionId, RoomRegistry};
use crate::store::{InterviewStore, LogStore, NewProctoringLog, with_timeout};

/// What happened to a single report.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    /// The sender is not a candidate in a room.
    Ignored,
    /// The payload failed validation.
    Rejected,
    /// The log could not be written; no alert went out.
    PersistFailed,
    Delivered {
        log_id: ObjectId,
        /// Whether the log was linked onto the interview record.
        linked: bool,
        recipients: usize,
    },
}

pub struct ProctoringPipeline {
    interviews: Arc<dyn InterviewStore>,
    logs: Arc<dyn LogStore>,
    store_timeout: Duration,
}

impl ProctoringPipeline {
    pub fn new(interviews: Arc<dyn InterviewStore>, logs: Arc<dyn LogStore>, store_timeout: Duration) -> Self {
        Self {
            interviews,
            logs,
            store_timeout,
        }
    }

    pub async fn ingest(
        &self,
        registry: &RoomRegistry,
        sender: &ConnectionId,
        report: ProctoringReport,
    ) -> PipelineOutcome {
        let (Some(identity), Some(room_id)) = (registry.identity_of(sender), registry.room_of(sender)) else {
            debug!(%sender, "Proctoring event outside a room ignored");
            return PipelineOutcome::Ignored;
        };
        if identity.role != UserRole::Candidate {
            debug!(%sender, role = %identity.role, "Proctoring event from non-candidate ignored");
            return PipelineOutcome::Ignored;
        }
        if let Err(e) = report.validate() {
            debug!(%sender, error = %e, "Invalid proctoring event dropped");
            return PipelineOutcome::Rejected;
        }

        let new_log = NewProctoringLog {
            interview_id: room_id,
            event_type: report.event_type,
            details: report.details,
            severity: report.severity.unwrap_or_default(),
        };
        let log = match with_timeout(self.store_timeout, self.logs.create(new_log)).await {
            Ok(log) => log,
            Err(e) => {
                warn!(?room_id, error = %e, "Failed to persist proctoring log");
                return PipelineOutcome::PersistFailed;
            }
        };
        let Some(log_id) = log.id else {
            warn!(?room_id, "Persisted proctoring log has no id");
            return PipelineOutcome::PersistFailed;
        };

        let linked = match with_timeout(self.store_timeout, self.interviews.append_log_ref(room_id, log_id)).await {
            Ok(()) => true,
            Err(e) => {
                warn!(?room_id, ?log_id, error = %e, "Failed to link proctoring log to interview");
                false
            }
        };

        let alert = ServerEvent::ProctoringAlert(ProctoringAlert {
            event_type: log.event_type,
            details: log.details,
            severity: log.severity,
            timestamp: log.timestamp.to_chrono(),
            candidate_name: identity.name,
        });

        // Membership may have changed while the writes were in flight.
        let recipients = registry
            .members_of(&room_id, Some(sender))
            .into_iter()
            .filter(|member| member.send(alert.clone()))
            .count();

        info!(
            ?room_id,
            ?log_id,
            event_type = log.event_type.as_str(),
            severity = %log.severity,
            recipients,
            "Proctoring alert delivered"
        );
        PipelineOutcome::Delivered {
            log_id,
            linked,
            recipients,
        }
    }
}
