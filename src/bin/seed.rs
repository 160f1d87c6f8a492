use log::{error, info};
use std::error::Error;

use pixel_analytics::{
    config::{PostgresConfig, SeedConfig},
    seed::DummyData,
    store::PostgresEventStore,
};

/// Generates dummy storefront traffic and bulk-loads it into the events
/// relation.
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let seed_config = SeedConfig::new().map_err(|e| {
        error!("Failed to initialize seed config: {}", e);
        e
    })?;

    let dummy_data = DummyData::from_config(&seed_config).map_err(|e| {
        error!("Invalid seed config: {}", e);
        e
    })?;

    let postgres_config = PostgresConfig::new().map_err(|e| {
        error!("Failed to initialize Postgres config: {}", e);
        e
    })?;

    let mut store = PostgresEventStore::connect(&postgres_config)
        .await
        .map_err(|e| {
            error!("Failed to connect to the event store: {}", e);
            e
        })?;

    store.ensure_schema().await.map_err(|e| {
        error!("Failed to create the events relation: {}", e);
        e
    })?;

    let events = dummy_data.generate(&mut rand::thread_rng());
    info!("Generated {} events", events.len());

    let copied = store.copy_events(&events).await.map_err(|e| {
        error!("Failed to load events: {}", e);
        e
    })?;

    info!("Loaded {} events", copied);
    Ok(())
}
