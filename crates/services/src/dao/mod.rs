pub mod base;
pub mod interview;
pub mod proctoring_log;
pub mod user;

pub use base::BaseDao;
