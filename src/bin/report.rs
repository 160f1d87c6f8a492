use log::error;
use std::error::Error;

use pixel_analytics::{
    catalog::Catalog,
    config::{PostgresConfig, ReportConfig, ReportShape},
    query::QuerySpec,
    report,
    store::PostgresEventStore,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let catalog = Catalog::standard();
    catalog.validate().map_err(|e| {
        error!("Invalid catalog: {}", e);
        e
    })?;

    let report_config = ReportConfig::new().map_err(|e| {
        error!("Failed to initialize report config: {}", e);
        e
    })?;

    let dimensions = catalog
        .dimensions_from_keys(&report_config.dimensions)
        .map_err(|e| {
            error!("Failed to resolve REPORT_DIMENSIONS: {}", e);
            e
        })?;

    let measures = catalog
        .measures_from_keys(&report_config.measures)
        .map_err(|e| {
            error!("Failed to resolve REPORT_MEASURES: {}", e);
            e
        })?;

    let spec = QuerySpec::new()
        .dimensions(dimensions)
        .measures(measures)
        .limit(report_config.limit);

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

    let output = match report_config.shape {
        ReportShape::Table => serde_json::to_string_pretty(&report::table(spec, &store).await?)?,
        ReportShape::LineChart => {
            serde_json::to_string_pretty(&report::line_chart(spec, &store).await?)?
        }
        ReportShape::Recent => {
            let events = store
                .recent_events(report_config.recent_limit())
                .await
                .map_err(|e| {
                    error!("Failed to list recent events: {}", e);
                    e
                })?;
            serde_json::to_string_pretty(&events)?
        }
    };

    println!("{}", output);
    Ok(())
}
