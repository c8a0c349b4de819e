use thiserror::Error;

use super::protocol::{RelayedSignal, ServerEvent, SignalMessage};
use super::registry::{ConnectionId, RoomRegistry};

#[derive(Debug, Error, PartialEq)]
pub enum RelayError {
    #[error("Not in an interview room")]
    NotInRoom,
}

/// Forwards a negotiation message, untouched apart from the sender tag, to
/// every other member of the sender's room. Returns the number of
/// recipients.
///
/// Holds no state between calls; per-sender ordering follows from each
/// connection's frames being handled one at a time.
pub fn relay(
    registry: &RoomRegistry,
    sender: &ConnectionId,
    signal: SignalMessage,
) -> Result<usize, RelayError> {
    let room_id = registry.room_of(sender).ok_or(RelayError::NotInRoom)?;
    let identity = registry.identity_of(sender).ok_or(RelayError::NotInRoom)?;

    let event = ServerEvent::WebrtcSignal(RelayedSignal {
        signal,
        from_user_id: identity.user_id.to_hex(),
    });

    Ok(registry
        .members_of(&room_id, Some(sender))
        .into_iter()
        .filter(|member| member.send(event.clone()))
        .count())
}
