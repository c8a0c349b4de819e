use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bson::{oid::ObjectId, DateTime};
use dashmap::DashMap;
use intervue_db::models::{Interview, ProctoringLog, UserRole};
use tracing::debug;

use super::{
    InterviewStore, LogStore, NewProctoringLog, StoreError, StoreResult, UserDirectory,
    UserProfile,
};

/// In-process implementation of every store seam.
///
/// Writes can be made to fail or stall, which is how persistence-failure
/// paths are exercised without a database.
#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<ObjectId, UserProfile>,
    interviews: DashMap<ObjectId, Interview>,
    logs: DashMap<ObjectId, ProctoringLog>,
    fail_log_writes: AtomicBool,
    fail_link_writes: AtomicBool,
    write_delay_ms: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_user(&self, name: &str, email: &str, role: UserRole) -> UserProfile {
        let profile = UserProfile {
            id: ObjectId::new(),
            name: name.to_string(),
            email: email.to_lowercase(),
            role,
        };
        self.users.insert(profile.id, profile.clone());
        profile
    }

    pub fn remove_user(&self, id: &ObjectId) {
        self.users.remove(id);
    }

    pub fn insert_interview(&self, mut interview: Interview) -> Interview {
        let id = *interview.id.get_or_insert_with(ObjectId::new);
        self.interviews.insert(id, interview.clone());
        interview
    }

    pub fn interview(&self, id: &ObjectId) -> Option<Interview> {
        self.interviews.get(id).map(|i| i.clone())
    }

    /// Logs of one interview, newest first.
    pub fn logs_for(&self, interview_id: &ObjectId) -> Vec<ProctoringLog> {
        let mut logs: Vec<ProctoringLog> = self
            .logs
            .iter()
            .filter(|entry| entry.interview_id == *interview_id)
            .map(|entry| entry.value().clone())
            .collect();
        logs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        logs
    }

    pub fn fail_log_writes(&self, fail: bool) {
        self.fail_log_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_link_writes(&self, fail: bool) {
        self.fail_link_writes.store(fail, Ordering::SeqCst);
    }

    /// Every write sleeps this long before applying.
    pub fn set_write_delay(&self, delay: Duration) {
        self.write_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    async fn stall(&self) {
        let ms = self.write_delay_ms.load(Ordering::SeqCst);
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn find_by_id(&self, id: ObjectId) -> StoreResult<Option<UserProfile>> {
        Ok(self.users.get(&id).map(|u| u.clone()))
    }
}

#[async_trait]
impl InterviewStore for MemoryStore {
    async fn find_by_id(&self, id: ObjectId) -> StoreResult<Option<Interview>> {
        Ok(self.interview(&id))
    }

    async fn find_by_invite_token(&self, token: &str) -> StoreResult<Option<Interview>> {
        Ok(self
            .interviews
            .iter()
            .find(|entry| entry.invite_token == token)
            .map(|entry| entry.value().clone()))
    }

    async fn bind_candidate(&self, interview_id: ObjectId, user_id: ObjectId) -> StoreResult<bool> {
        self.stall().await;
        let mut interview = self
            .interviews
            .get_mut(&interview_id)
            .ok_or(StoreError::NotFound)?;

        match interview.candidate_id {
            None => {
                interview.candidate_id = Some(user_id);
                interview.updated_at = DateTime::now();
                debug!(?interview_id, ?user_id, "Candidate bound");
                Ok(true)
            }
            Some(bound) => Ok(bound == user_id),
        }
    }

    async fn append_log_ref(&self, interview_id: ObjectId, log_id: ObjectId) -> StoreResult<()> {
        self.stall().await;
        if self.fail_link_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("interview writes disabled".to_string()));
        }
        let mut interview = self
            .interviews
            .get_mut(&interview_id)
            .ok_or(StoreError::NotFound)?;
        interview.logs.push(log_id);
        interview.updated_at = DateTime::now();
        Ok(())
    }
}

#[async_trait]
impl LogStore for MemoryStore {
    async fn create(&self, log: NewProctoringLog) -> StoreResult<ProctoringLog> {
        self.stall().await;
        if self.fail_log_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("log writes disabled".to_string()));
        }

        let now = DateTime::now();
        let record = ProctoringLog {
            id: Some(ObjectId::new()),
            interview_id: log.interview_id,
            event_type: log.event_type,
            timestamp: now,
            details: log.details,
            severity: log.severity,
            resolved: false,
            created_at: now,
        };
        if let Some(id) = record.id {
            self.logs.insert(id, record.clone());
        }
        Ok(record)
    }
}
