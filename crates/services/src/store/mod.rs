//! Persistence seams consumed by the signaling core.
//!
//! MongoDB implementations live in [`crate::dao`]; [`memory`] provides
//! in-process stores for tests and `memory://` deployments.

pub mod memory;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use bson::oid::ObjectId;
use intervue_db::models::{Interview, ProctoringEventType, ProctoringLog, Severity, UserRole};
use thiserror::Error;

use crate::dao::base::DaoError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    #[error("Store call timed out after {0:?}")]
    Timeout(Duration),
    #[error("Record not found")]
    NotFound,
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<DaoError> for StoreError {
    fn from(err: DaoError) -> Self {
        match err {
            DaoError::NotFound => StoreError::NotFound,
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}

/// Directory view of a user; never carries credentials.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub id: ObjectId,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

#[derive(Debug, Clone)]
pub struct NewProctoringLog {
    pub interview_id: ObjectId,
    pub event_type: ProctoringEventType,
    pub details: String,
    pub severity: Severity,
}

#[async_trait]
pub trait UserDirectory: Send + Sync + 'static {
    async fn find_by_id(&self, id: ObjectId) -> StoreResult<Option<UserProfile>>;
}

#[async_trait]
pub trait InterviewStore: Send + Sync + 'static {
    async fn find_by_id(&self, id: ObjectId) -> StoreResult<Option<Interview>>;

    async fn find_by_invite_token(&self, token: &str) -> StoreResult<Option<Interview>>;

    /// Binds `user_id` as the candidate if none is bound yet.
    /// Returns `true` when the user is (now) the bound candidate.
    async fn bind_candidate(&self, interview_id: ObjectId, user_id: ObjectId) -> StoreResult<bool>;

    async fn append_log_ref(&self, interview_id: ObjectId, log_id: ObjectId) -> StoreResult<()>;
}

#[async_trait]
pub trait LogStore: Send + Sync + 'static {
    async fn create(&self, log: NewProctoringLog) -> StoreResult<ProctoringLog>;
}

/// Runs a store call with an upper bound so a slow backend cannot pile up work.
pub async fn with_timeout<T, F>(limit: Duration, call: F) -> StoreResult<T>
where
    F: Future<Output = StoreResult<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout(limit)),
    }
}
