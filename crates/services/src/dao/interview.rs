use async_trait::async_trait;
use bson::{doc, oid::ObjectId, DateTime};
use intervue_db::models::{Interview, InterviewStatus};
use mongodb::Database;
use tracing::debug;

use super::base::BaseDao;
use crate::store::{InterviewStore, StoreError, StoreResult};

pub struct InterviewDao {
    pub base: BaseDao<Interview>,
}

impl InterviewDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Interview::COLLECTION),
        }
    }
}

/// 32 random bytes, hex encoded.
pub fn generate_invite_token() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

/// A scheduled interview with no candidate yet; whoever redeems the invite
/// token first is bound as the candidate.
pub fn new_session_interview(
    title: impl Into<String>,
    interviewer_id: ObjectId,
    scheduled_time: DateTime,
    duration: u32,
) -> Interview {
    let now = DateTime::now();
    Interview {
        id: None,
        title: title.into(),
        interviewer_id,
        candidate_id: None,
        status: InterviewStatus::Scheduled,
        scheduled_time,
        duration,
        started_at: None,
        completed_at: None,
        result: None,
        notes: None,
        logs: Vec::new(),
        invite_token: generate_invite_token(),
        created_at: now,
        updated_at: now,
    }
}

#[async_trait]
impl InterviewStore for InterviewDao {
    async fn find_by_id(&self, id: ObjectId) -> StoreResult<Option<Interview>> {
        Ok(self.base.find_by_id(id).await?)
    }

    async fn find_by_invite_token(&self, token: &str) -> StoreResult<Option<Interview>> {
        Ok(self.base.find_one(doc! { "invite_token": token }).await?)
    }

    async fn bind_candidate(&self, interview_id: ObjectId, user_id: ObjectId) -> StoreResult<bool> {
        // Conditional on the slot being empty so concurrent joiners cannot both win.
        let bound = self
            .base
            .update_one(
                doc! { "_id": interview_id, "candidate_id": null },
                doc! { "$set": { "candidate_id": user_id } },
            )
            .await?;
        if bound {
            debug!(?interview_id, ?user_id, "Candidate bound");
            return Ok(true);
        }

        let current = self
            .base
            .find_by_id(interview_id)
            .await?
            .ok_or(StoreError::NotFound)?;
        Ok(current.candidate_id == Some(user_id))
    }

    async fn append_log_ref(&self, interview_id: ObjectId, log_id: ObjectId) -> StoreResult<()> {
        let matched = self
            .base
            .update_one(doc! { "_id": interview_id }, doc! { "$push": { "logs": log_id } })
            .await?;
        if matched {
            Ok(())
        } else {
            Err(StoreError::NotFound)
        }
    }
}
