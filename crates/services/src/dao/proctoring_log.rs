use async_trait::async_trait;
use bson::DateTime;
use intervue_db::models::ProctoringLog;
use mongodb::Database;

use super::base::BaseDao;
use crate::store::{LogStore, NewProctoringLog, StoreError, StoreResult};

pub struct ProctoringLogDao {
    pub base: BaseDao<ProctoringLog>,
}

impl ProctoringLogDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, ProctoringLog::COLLECTION),
        }
    }
}

#[async_trait]
impl LogStore for ProctoringLogDao {
    async fn create(&self, log: NewProctoringLog) -> StoreResult<ProctoringLog> {
        let now = DateTime::now();
        let mut record = ProctoringLog {
            id: None,
            interview_id: log.interview_id,
            event_type: log.event_type,
            timestamp: now,
            details: log.details,
            severity: log.severity,
            resolved: false,
            created_at: now,
        };

        let id = self.base.insert_one(&record).await.map_err(StoreError::from)?;
        record.id = Some(id);
        Ok(record)
    }
}
