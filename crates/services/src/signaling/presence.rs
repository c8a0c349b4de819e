//! Join/leave announcements.
//!
//! A joiner is always sent its own `joined-interview` before any existing
//! member hears `user-joined`, so no peer can start negotiating with a
//! connection that does not yet know it is in the room.

use bson::oid::ObjectId;

use super::protocol::{JoinedInterview, PeerInfo, PeerLeft, ServerEvent};
use super::registry::{ConnectionId, Departure, RoomRegistry};
use crate::auth::Identity;

/// Confirms the join to the joiner, then announces it to everyone else.
/// Returns how many existing members were notified.
pub fn announce_join(
    registry: &RoomRegistry,
    connection_id: &ConnectionId,
    room_id: ObjectId,
    identity: &Identity,
) -> usize {
    if !confirm_join(registry, connection_id, room_id) {
        // The joiner's socket is already closing; its disconnect will clean up.
        return 0;
    }

    let announcement = ServerEvent::UserJoined(PeerInfo::from(identity));
    registry
        .members_of(&room_id, Some(connection_id))
        .into_iter()
        .filter(|member| member.send(announcement.clone()))
        .count()
}

pub fn confirm_join(registry: &RoomRegistry, connection_id: &ConnectionId, room_id: ObjectId) -> bool {
    registry.send_to(
        connection_id,
        ServerEvent::JoinedInterview(JoinedInterview {
            interview_id: room_id.to_hex(),
        }),
    )
}

/// Tells the members left behind. Returns how many were notified.
pub fn announce_departure(departure: &Departure) -> usize {
    let notice = ServerEvent::UserLeft(PeerLeft::from(&departure.identity));
    departure
        .remaining
        .iter()
        .filter(|member| member.send(notice.clone()))
        .count()
}
