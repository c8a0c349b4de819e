use intervue_config::Settings;
use intervue_services::{
    AuthService, IdentityVerifier, MemoryStore, SignalingHub,
    dao::{interview::InterviewDao, proctoring_log::ProctoringLogDao, user::UserDao},
    store::{InterviewStore, LogStore, UserDirectory},
};
use mongodb::Database;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub auth: Arc<AuthService>,
    pub identity: Arc<IdentityVerifier>,
    pub hub: Arc<SignalingHub>,
}

impl AppState {
    /// State backed by MongoDB.
    pub fn new(db: Database, settings: Settings) -> Self {
        let users = Arc::new(UserDao::new(&db));
        let interviews = Arc::new(InterviewDao::new(&db));
        let logs = Arc::new(ProctoringLogDao::new(&db));
        Self::with_stores(settings, users, interviews, logs)
    }

    /// State backed by a single in-process store.
    pub fn in_memory(settings: Settings, store: Arc<MemoryStore>) -> Self {
        Self::with_stores(settings, store.clone(), store.clone(), store)
    }

    pub fn with_stores(
        settings: Settings,
        users: Arc<dyn UserDirectory>,
        interviews: Arc<dyn InterviewStore>,
        logs: Arc<dyn LogStore>,
    ) -> Self {
        let store_timeout = settings.signaling.store_timeout();
        let auth = Arc::new(AuthService::new(settings.jwt.clone()));
        let identity = Arc::new(IdentityVerifier::new(auth.clone(), users, store_timeout));
        let hub = Arc::new(SignalingHub::new(interviews, logs, store_timeout));

        Self {
            settings,
            auth,
            identity,
            hub,
        }
    }
}
