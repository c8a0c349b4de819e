use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

use super::protocol::ServerEvent;
use crate::auth::Identity;

pub type ConnectionId = Uuid;

/// Outbound queue of a single socket. Events are written to the wire in
/// the order they are queued.
pub type Outbox = mpsc::UnboundedSender<ServerEvent>;

#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    #[error("Connection is not registered")]
    UnknownConnection,
}

/// A connection's seat in a room.
#[derive(Debug, Clone)]
pub struct RoomMember {
    pub connection_id: ConnectionId,
    pub identity: Identity,
    pub outbox: Outbox,
}

impl RoomMember {
    /// Queues an event; a closed outbox means the socket is already going away.
    pub fn send(&self, event: ServerEvent) -> bool {
        self.outbox.send(event).is_ok()
    }
}

struct Room {
    members: Vec<RoomMember>,
    created_at: DateTime<Utc>,
}

struct Connection {
    identity: Identity,
    outbox: Outbox,
    room: Option<ObjectId>,
}

/// Outcome of a successful join.
#[derive(Debug)]
pub enum JoinOutcome {
    /// Newly admitted. `previous` is set when the connection was moved out
    /// of another room to get here.
    Joined { previous: Option<Departure> },
    /// Already a member of this room; nothing changed.
    AlreadyMember,
}

/// A connection's exit from a room.
#[derive(Debug)]
pub struct Departure {
    pub room_id: ObjectId,
    pub identity: Identity,
    /// Members still in the room after the exit.
    pub remaining: Vec<RoomMember>,
    pub room_closed: bool,
}

/// Room membership for every live connection in this process.
///
/// Lock order is always `connections` before `rooms`.
pub struct RoomRegistry {
    connections: DashMap<ConnectionId, Connection>,
    rooms: DashMap<ObjectId, Room>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            rooms: DashMap::new(),
        }
    }

    pub fn register(&self, identity: Identity, outbox: Outbox) -> ConnectionId {
        let connection_id = Uuid::new_v4();
        self.connections.insert(
            connection_id,
            Connection {
                identity,
                outbox,
                room: None,
            },
        );
        connection_id
    }

    /// Drops the connection and its membership. Returns `None` if it was
    /// not in a room, or was already unregistered.
    pub fn unregister(&self, connection_id: &ConnectionId) -> Option<Departure> {
        let (_, connection) = self.connections.remove(connection_id)?;
        let room_id = connection.room?;
        Some(self.remove_member(room_id, connection_id, connection.identity))
    }

    pub fn join(&self, connection_id: &ConnectionId, room_id: ObjectId) -> Result<JoinOutcome, RegistryError> {
        let mut connection = self
            .connections
            .get_mut(connection_id)
            .ok_or(RegistryError::UnknownConnection)?;

        if connection.room == Some(room_id) {
            return Ok(JoinOutcome::AlreadyMember);
        }

        let previous = connection
            .room
            .take()
            .map(|old| self.remove_member(old, connection_id, connection.identity.clone()));

        let member = RoomMember {
            connection_id: *connection_id,
            identity: connection.identity.clone(),
            outbox: connection.outbox.clone(),
        };
        self.rooms
            .entry(room_id)
            .or_insert_with(|| {
                info!(?room_id, "Room opened");
                Room {
                    members: Vec::new(),
                    created_at: Utc::now(),
                }
            })
            .members
            .push(member);
        connection.room = Some(room_id);

        debug!(%connection_id, ?room_id, "Connection joined room");
        Ok(JoinOutcome::Joined { previous })
    }

    pub fn leave(&self, connection_id: &ConnectionId) -> Option<Departure> {
        let mut connection = self.connections.get_mut(connection_id)?;
        let room_id = connection.room.take()?;
        Some(self.remove_member(room_id, connection_id, connection.identity.clone()))
    }

    /// Current members of a room, optionally without one connection
    /// ("everyone else").
    pub fn members_of(&self, room_id: &ObjectId, excluding: Option<&ConnectionId>) -> Vec<RoomMember> {
        self.rooms
            .get(room_id)
            .map(|room| {
                room.members
                    .iter()
                    .filter(|m| Some(&m.connection_id) != excluding)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn room_of(&self, connection_id: &ConnectionId) -> Option<ObjectId> {
        self.connections.get(connection_id).and_then(|c| c.room)
    }

    pub fn identity_of(&self, connection_id: &ConnectionId) -> Option<Identity> {
        self.connections.get(connection_id).map(|c| c.identity.clone())
    }

    /// Queues an event for a single connection.
    pub fn send_to(&self, connection_id: &ConnectionId, event: ServerEvent) -> bool {
        self.connections
            .get(connection_id)
            .map(|c| c.outbox.send(event).is_ok())
            .unwrap_or(false)
    }

    pub fn room_created_at(&self, room_id: &ObjectId) -> Option<DateTime<Utc>> {
        self.rooms.get(room_id).map(|r| r.created_at)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    fn remove_member(&self, room_id: ObjectId, connection_id: &ConnectionId, identity: Identity) -> Departure {
        let remaining = match self.rooms.get_mut(&room_id) {
            Some(mut room) => {
                room.members.retain(|m| m.connection_id != *connection_id);
                room.members.clone()
            }
            None => Vec::new(),
        };

        let room_closed = self
            .rooms
            .remove_if(&room_id, |_, room| room.members.is_empty())
            .is_some();
        if room_closed {
            info!(?room_id, "Room closed");
        }

        debug!(%connection_id, ?room_id, "Connection left room");
        Departure {
            room_id,
            identity,
            remaining,
            room_closed,
        }
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}
