use log::{debug, error, info, warn};
use std::error::Error;
use tokio::io::{AsyncBufReadExt, BufReader};

use pixel_analytics::{
    config::PostgresConfig,
    store::{Event, EventStore, PostgresEventStore, StoreError},
};

/// Reads one pixel event per line from stdin and stores it.
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let postgres_config = PostgresConfig::new().map_err(|e| {
        error!("Failed to initialize Postgres config: {}", e);
        e
    })?;

    let store = PostgresEventStore::connect(&postgres_config)
        .await
        .map_err(|e| {
            error!("Failed to connect to the event store: {}", e);
            e
        })?;

    store.ensure_schema().await.map_err(|e| {
        error!("Failed to create the events relation: {}", e);
        e
    })?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut inserted = 0;
    let mut skipped = 0;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let event: Event = match serde_json::from_str(line) {
            Ok(event) => event,
            Err(e) => {
                warn!("Skipping malformed event: {}", e);
                skipped += 1;
                continue;
            }
        };

        match store.insert(&event).await {
            Ok(id) => {
                debug!("Inserted {} event with ID: {}", event.name, id);
                inserted += 1;
            }
            Err(StoreError::InvalidEvent(reason)) => {
                warn!("Skipping invalid event: {}", reason);
                skipped += 1;
            }
            Err(e) => {
                error!("Failed to insert event: {}", e);
                return Err(e.into());
            }
        }
    }

    info!("Inserted {} events, skipped {}", inserted, skipped);
    Ok(())
}
