use mongodb::{Database, IndexModel, options::IndexOptions};
use tracing::info;

use crate::models::{Interview, ProctoringLog, User};

pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    // Users
    create_indexes(
        db,
        User::COLLECTION,
        vec![index_unique(bson::doc! { "email": 1 })],
    )
    .await?;

    // Interviews
    create_indexes(
        db,
        Interview::COLLECTION,
        vec![
            index(bson::doc! { "candidate_id": 1, "status": 1 }),
            index(bson::doc! { "interviewer_id": 1, "status": 1 }),
            index_unique(bson::doc! { "invite_token": 1 }),
        ],
    )
    .await?;

    // Proctoring logs
    create_indexes(
        db,
        ProctoringLog::COLLECTION,
        vec![
            index(bson::doc! { "interview_id": 1, "timestamp": -1 }),
            index(bson::doc! { "type": 1, "severity": 1 }),
            index(bson::doc! { "timestamp": -1 }),
        ],
    )
    .await?;

    info!("All indexes ensured");
    Ok(())
}

fn index(keys: bson::Document) -> IndexModel {
    IndexModel::builder().keys(keys).build()
}

fn index_unique(keys: bson::Document) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(true).build())
        .build()
}

async fn create_indexes(
    db: &Database,
    collection: &str,
    indexes: Vec<IndexModel>,
) -> Result<(), mongodb::error::Error> {
    db.collection::<bson::Document>(collection)
        .create_indexes(indexes)
        .await?;
    info!(collection, "Indexes created");
    Ok(())
}
