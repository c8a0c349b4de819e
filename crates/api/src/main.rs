use std::sync::Arc;

use intervue_api::{build_router, state::AppState};
use intervue_config::Settings;
use intervue_db::{connect, indexes::ensure_indexes};
use intervue_services::MemoryStore;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file (silently ignore if missing)
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "intervue_api=debug,intervue_services=debug,intervue_db=debug,tower_http=debug".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::load()?;
    info!("Starting Intervue signaling on {}:{}", settings.app.host, settings.app.port);

    let app_state = if settings.database.is_in_memory() {
        warn!("Using in-memory stores; nothing will be persisted across restarts");
        AppState::in_memory(settings.clone(), Arc::new(MemoryStore::new()))
    } else {
        let db = connect(&settings.database).await?;
        ensure_indexes(&db).await?;
        AppState::new(db, settings.clone())
    };

    let app = build_router(app_state);

    let addr = format!("{}:{}", settings.app.host, settings.app.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
