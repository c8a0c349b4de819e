pub mod auth;
pub mod dao;
pub mod signaling;
pub mod store;

pub use auth::{AuthService, Identity, IdentityVerifier};
pub use dao::*;
pub use signaling::{ConnectionGuard, SignalingHub};
pub use store::memory::MemoryStore;
