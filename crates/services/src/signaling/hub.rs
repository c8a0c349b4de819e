use std::sync::Arc;
use std::time::Duration;

use bson::oid::ObjectId;
use intervue_db::models::Interview;
use tracing::{debug, info, warn};

use super::access::{self, Admission};
use super::presence;
use super::proctoring::{PipelineOutcome, ProctoringPipeline};
use super::protocol::{ClientEvent, JoinRequest, PROCTORING_EVENT, PeerInfo, ProtocolError, ServerEvent};
use super::registry::{ConnectionId, JoinOutcome, Outbox, RegistryError, RoomRegistry};
use super::relay::{self, RelayError};
use crate::auth::Identity;
use crate::store::{InterviewStore, LogStore, StoreResult, with_timeout};

pub const INTERVIEW_NOT_FOUND: &str = "Interview not found";
pub const ACCESS_DENIED: &str = "Access denied to this interview";
pub const NOT_IN_ROOM: &str = "Not in an interview room";
pub const JOIN_FAILED: &str = "Failed to join interview";
pub const MALFORMED_MESSAGE: &str = "Malformed message";

/// Routes client events for every connection in the process.
///
/// Frames of one connection are handled one at a time by its socket task;
/// different connections run concurrently against the shared registry.
pub struct SignalingHub {
    registry: RoomRegistry,
    interviews: Arc<dyn InterviewStore>,
    proctoring: ProctoringPipeline,
    store_timeout: Duration,
}

impl SignalingHub {
    pub fn new(interviews: Arc<dyn InterviewStore>, logs: Arc<dyn LogStore>, store_timeout: Duration) -> Self {
        Self {
            registry: RoomRegistry::new(),
            proctoring: ProctoringPipeline::new(interviews.clone(), logs, store_timeout),
            interviews,
            store_timeout,
        }
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    /// Registers an authenticated socket and greets it. The returned guard
    /// runs disconnect cleanup when dropped.
    pub fn connect(self: &Arc<Self>, identity: Identity, outbox: Outbox) -> ConnectionGuard {
        let greeting = ServerEvent::Connected(PeerInfo::from(&identity));
        let user_id = identity.user_id;
        let connection_id = self.registry.register(identity, outbox);
        self.registry.send_to(&connection_id, greeting);
        info!(%connection_id, ?user_id, "Client connected");

        ConnectionGuard {
            hub: Arc::clone(self),
            connection_id,
        }
    }

    /// Decodes and handles one text frame.
    pub async fn handle_text(&self, connection_id: &ConnectionId, text: &str) {
        match ClientEvent::parse(text) {
            Ok(event) => self.handle(connection_id, event).await,
            Err(e @ ProtocolError::Malformed { .. }) if e.event() == Some(PROCTORING_EVENT) => {
                debug!(%connection_id, error = %e, "Malformed proctoring event dropped");
            }
            Err(ProtocolError::UnknownEvent(name)) => {
                debug!(%connection_id, event = %name, "Unknown event ignored");
            }
            Err(e) => {
                debug!(%connection_id, error = %e, "Malformed client frame");
                self.reply_error(connection_id, MALFORMED_MESSAGE);
            }
        }
    }

    pub async fn handle(&self, connection_id: &ConnectionId, event: ClientEvent) {
        debug!(%connection_id, event = event.name(), "Client event");
        match event {
            ClientEvent::JoinInterview(request) => self.join(connection_id, request).await,
            ClientEvent::LeaveInterview => self.leave(connection_id),
            ClientEvent::WebrtcSignal(signal) => {
                if let Err(RelayError::NotInRoom) = relay::relay(&self.registry, connection_id, signal) {
                    self.reply_error(connection_id, NOT_IN_ROOM);
                }
            }
            ClientEvent::ProctoringEvent(report) => {
                let outcome = self.proctoring.ingest(&self.registry, connection_id, report).await;
                if !matches!(outcome, PipelineOutcome::Delivered { .. }) {
                    debug!(%connection_id, ?outcome, "Proctoring event not delivered");
                }
            }
            ClientEvent::Ping => {
                self.registry.send_to(connection_id, ServerEvent::Pong);
            }
        }
    }

    async fn join(&self, connection_id: &ConnectionId, request: JoinRequest) {
        let Some(identity) = self.registry.identity_of(connection_id) else {
            return;
        };

        let interview = match self.resolve_interview(request.interview_id.trim()).await {
            Ok(Some(interview)) => interview,
            Ok(None) => {
                debug!(%connection_id, interview = %request.interview_id, "Join for unknown interview");
                self.reply_error(connection_id, INTERVIEW_NOT_FOUND);
                return;
            }
            Err(e) => {
                warn!(%connection_id, error = %e, "Interview lookup failed");
                self.reply_error(connection_id, JOIN_FAILED);
                return;
            }
        };
        let Some(room_id) = interview.id else {
            warn!(%connection_id, "Interview record without id");
            self.reply_error(connection_id, JOIN_FAILED);
            return;
        };

        let admission = match access::evaluate(&identity, &interview) {
            Admission::BindCandidate => {
                match with_timeout(
                    self.store_timeout,
                    self.interviews.bind_candidate(room_id, identity.user_id),
                )
                .await
                {
                    Ok(true) => {
                        info!(?room_id, user_id = ?identity.user_id, "Candidate bound to interview");
                        Admission::Candidate
                    }
                    Ok(false) => Admission::Denied,
                    Err(e) => {
                        warn!(?room_id, error = %e, "Candidate binding failed");
                        self.reply_error(connection_id, JOIN_FAILED);
                        return;
                    }
                }
            }
            other => other,
        };
        if !admission.is_allowed() {
            warn!(%connection_id, ?room_id, user_id = ?identity.user_id, "Interview access denied");
            self.reply_error(connection_id, ACCESS_DENIED);
            return;
        }

        match self.registry.join(connection_id, room_id) {
            Ok(JoinOutcome::Joined { previous }) => {
                if let Some(departure) = previous {
                    presence::announce_departure(&departure);
                }
                let notified = presence::announce_join(&self.registry, connection_id, room_id, &identity);
                info!(
                    %connection_id,
                    ?room_id,
                    user = %identity.name,
                    role = %identity.role,
                    ?admission,
                    notified,
                    "Joined interview room"
                );
            }
            Ok(JoinOutcome::AlreadyMember) => {
                presence::confirm_join(&self.registry, connection_id, room_id);
            }
            Err(RegistryError::UnknownConnection) => {
                debug!(%connection_id, "Connection closed before join completed");
            }
        }
    }

    fn leave(&self, connection_id: &ConnectionId) {
        if let Some(departure) = self.registry.leave(connection_id) {
            presence::announce_departure(&departure);
            info!(%connection_id, room_id = ?departure.room_id, "Left interview room");
        }
    }

    /// Unregisters a connection and tells its room. Safe to call more than
    /// once; only the first call has an effect.
    pub fn disconnect(&self, connection_id: &ConnectionId) {
        if let Some(departure) = self.registry.unregister(connection_id) {
            presence::announce_departure(&departure);
            debug!(
                %connection_id,
                room_id = ?departure.room_id,
                room_closed = departure.room_closed,
                "Removed from room on disconnect"
            );
        }
    }

    /// An interview id first, then an invite token.
    async fn resolve_interview(&self, key: &str) -> StoreResult<Option<Interview>> {
        if key.is_empty() {
            return Ok(None);
        }
        if let Ok(id) = ObjectId::parse_str(key) {
            if let Some(found) = with_timeout(self.store_timeout, self.interviews.find_by_id(id)).await? {
                return Ok(Some(found));
            }
        }
        with_timeout(self.store_timeout, self.interviews.find_by_invite_token(key)).await
    }

    fn reply_error(&self, connection_id: &ConnectionId, message: &str) {
        self.registry.send_to(connection_id, ServerEvent::error(message));
    }
}

/// Owns a live connection's registration; dropping it disconnects.
pub struct ConnectionGuard {
    hub: Arc<SignalingHub>,
    connection_id: ConnectionId,
}

impl ConnectionGuard {
    pub fn id(&self) -> ConnectionId {
        self.connection_id
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.hub.disconnect(&self.connection_id);
        info!(connection_id = %self.connection_id, "Client disconnected");
    }
}
