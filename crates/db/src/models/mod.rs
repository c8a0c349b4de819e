pub mod interview;
pub mod proctoring_log;
pub mod user;

pub use interview::*;
pub use proctoring_log::*;
pub use user::*;
