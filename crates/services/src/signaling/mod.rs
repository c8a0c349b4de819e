//! Real-time interview rooms: membership, negotiation relay and
//! proctoring alerts over a single JSON socket per client.

pub mod access;
pub mod hub;
pub mod presence;
pub mod proctoring;
pub mod protocol;
pub mod registry;
pub mod relay;

pub use hub::{ConnectionGuard, SignalingHub};
pub use protocol::{ClientEvent, ServerEvent};
pub use registry::{ConnectionId, Outbox, RoomRegistry};
