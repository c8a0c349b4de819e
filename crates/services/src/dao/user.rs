use async_trait::async_trait;
use bson::oid::ObjectId;
use intervue_db::models::User;
use mongodb::Database;

use super::base::BaseDao;
use crate::store::{StoreError, StoreResult, UserDirectory, UserProfile};

pub struct UserDao {
    pub base: BaseDao<User>,
}

impl UserDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, User::COLLECTION),
        }
    }
}

fn to_profile(user: User) -> Option<UserProfile> {
    Some(UserProfile {
        id: user.id?,
        name: user.name,
        email: user.email,
        role: user.role,
    })
}

#[async_trait]
impl UserDirectory for UserDao {
    async fn find_by_id(&self, id: ObjectId) -> StoreResult<Option<UserProfile>> {
        let user = self.base.find_by_id(id).await.map_err(StoreError::from)?;
        Ok(user.and_then(to_profile))
    }
}
