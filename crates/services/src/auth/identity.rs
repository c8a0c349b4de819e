use std::sync::Arc;
use std::time::Duration;

use bson::oid::ObjectId;
use intervue_db::models::UserRole;
use tracing::debug;

use super::{AuthError, AuthService};
use crate::store::{UserDirectory, UserProfile, with_timeout};

/// The verified user behind a real-time connection. Fixed for the
/// connection's lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub user_id: ObjectId,
    pub name: String,
    pub role: UserRole,
}

impl From<UserProfile> for Identity {
    fn from(profile: UserProfile) -> Self {
        Self {
            user_id: profile.id,
            name: profile.name,
            role: profile.role,
        }
    }
}

/// Resolves a handshake credential to a directory user.
pub struct IdentityVerifier {
    auth: Arc<AuthService>,
    users: Arc<dyn UserDirectory>,
    lookup_timeout: Duration,
}

impl IdentityVerifier {
    pub fn new(auth: Arc<AuthService>, users: Arc<dyn UserDirectory>, lookup_timeout: Duration) -> Self {
        Self {
            auth,
            users,
            lookup_timeout,
        }
    }

    pub async fn authenticate(&self, token: Option<&str>) -> Result<Identity, AuthError> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;

        let claims = self.auth.verify_access_token(token)?;
        let user_id = ObjectId::parse_str(&claims.sub)
            .map_err(|_| AuthError::InvalidToken("Invalid user ID in token".to_string()))?;

        let profile = with_timeout(self.lookup_timeout, self.users.find_by_id(user_id))
            .await
            .map_err(|e| AuthError::Directory(e.to_string()))?
            .ok_or(AuthError::UserNotFound)?;

        debug!(?user_id, role = %profile.role, "Handshake authenticated");
        Ok(profile.into())
    }
}
