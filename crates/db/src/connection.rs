use std::time::Duration;

use intervue_config::DatabaseSettings;
use mongodb::{Client, Database, options::ClientOptions};
use tracing::info;

/// Opens a client for the configured database and pings it before handing it out.
pub async fn connect(settings: &DatabaseSettings) -> Result<Database, mongodb::error::Error> {
    let mut client_options = ClientOptions::parse(&settings.url).await?;
    client_options.app_name = Some("intervue".to_string());
    client_options.server_selection_timeout = Some(Duration::from_secs(5));
    client_options.max_pool_size = settings.max_pool_size;
    client_options.min_pool_size = settings.min_pool_size;

    let client = Client::with_options(client_options)?;

    client
        .database("admin")
        .run_command(bson::doc! { "ping": 1 })
        .await?;

    info!(db = %settings.name, "Connected to MongoDB");

    Ok(client.database(&settings.name))
}
