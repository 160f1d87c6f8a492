use super::{schema, Event, EventStore, EventSummary, RowStream, StoreError, Value};
use crate::config::PostgresConfig;
use async_trait::async_trait;
use futures::{pin_mut, StreamExt};
use log::{debug, error};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tokio_postgres::binary_copy::BinaryCopyInWriter;
use tokio_postgres::types::Type;
use tokio_postgres::{Client, NoTls, Row};

pub struct PostgresEventStore {
    client: Client,
}

impl PostgresEventStore {
    pub async fn connect(config: &PostgresConfig) -> Result<Self, StoreError> {
        let (client, connection) = tokio_postgres::connect(&config.connection_string(), NoTls)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        // Spawn a task to drive the connection
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!("Connection error: {}", e);
            }
        });

        debug!("Connected to {}:{}/{}", config.host, config.port, config.dbname);
        Ok(PostgresEventStore { client })
    }

    /// Creates the events relation and its indexes when missing.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        self.client
            .batch_execute(schema::CREATE_EVENTS)
            .await
            .map_err(query_error)
    }

    /// Newest events first.
    pub async fn recent_events(&self, limit: u32) -> Result<Vec<EventSummary>, StoreError> {
        let rows = self
            .client
            .query(schema::RECENT_EVENTS, &[&i64::from(limit)])
            .await
            .map_err(query_error)?;

        rows.iter()
            .map(|row| {
                Ok(EventSummary {
                    id: row.try_get("id").map_err(query_error)?,
                    name: row.try_get("name").map_err(query_error)?,
                    value: decimal_to_f64("value", row.try_get("value").map_err(query_error)?)?,
                })
            })
            .collect()
    }

    /// Bulk-loads `events` with a binary COPY inside one transaction and
    /// returns the number of rows written. Nothing is committed unless every
    /// row is accepted.
    pub async fn copy_events(&mut self, events: &[Event]) -> Result<u64, StoreError> {
        let values = events
            .iter()
            .map(|event| {
                event.validate()?;
                Decimal::try_from(event.value).map_err(|e| StoreError::InvalidEvent(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let transaction = self.client.transaction().await.map_err(query_error)?;
        let sink = transaction
            .copy_in(schema::COPY_EVENTS)
            .await
            .map_err(query_error)?;
        let writer = BinaryCopyInWriter::new(sink, schema::COPY_EVENT_TYPES);
        pin_mut!(writer);

        for (event, value) in events.iter().zip(&values) {
            writer
                .as_mut()
                .write(&[
                    &event.account_id,
                    &event.client_id,
                    &event.session_id,
                    &event.name,
                    value,
                    &event.timestamp,
                    &event.page_location,
                    &event.page_title,
                    &event.page_referrer,
                    &event.user_agent,
                    &event.screen_resolution,
                ])
                .await
                .map_err(query_error)?;
        }

        let copied = writer.finish().await.map_err(query_error)?;
        transaction.commit().await.map_err(query_error)?;
        debug!("Copied {} events", copied);
        Ok(copied)
    }
}

#[async_trait]
impl EventStore for PostgresEventStore {
    async fn insert(&self, event: &Event) -> Result<i64, StoreError> {
        event.validate()?;
        let value =
            Decimal::try_from(event.value).map_err(|e| StoreError::InvalidEvent(e.to_string()))?;

        let row = self
            .client
            .query_one(
                schema::INSERT_EVENT,
                &[
                    &event.account_id,
                    &event.client_id,
                    &event.session_id,
                    &event.name,
                    &value,
                    &event.timestamp,
                    &event.page_location,
                    &event.page_title,
                    &event.page_referrer,
                    &event.user_agent,
                    &event.screen_resolution,
                ],
            )
            .await
            .map_err(query_error)?;

        row.try_get(0).map_err(query_error)
    }

    async fn execute(&self, sql: &str) -> Result<RowStream, StoreError> {
        let rows = self
            .client
            .query_raw(sql, Vec::<String>::new())
            .await
            .map_err(query_error)?;

        Ok(Box::pin(rows.map(|row| {
            row.map_err(query_error)
                .and_then(|row| values_from_row(&row))
        })))
    }
}

/// Converts every column of a row into a [`Value`] according to its
/// Postgres type.
fn values_from_row(row: &Row) -> Result<Vec<Value>, StoreError> {
    row.columns()
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            let value = match column.type_() {
                &Type::TEXT | &Type::VARCHAR | &Type::BPCHAR | &Type::NAME => row
                    .try_get::<_, Option<String>>(idx)
                    .map_err(query_error)?
                    .map(Value::Text),
                &Type::INT2 => row
                    .try_get::<_, Option<i16>>(idx)
                    .map_err(query_error)?
                    .map(|v| Value::Int(v.into())),
                &Type::INT4 => row
                    .try_get::<_, Option<i32>>(idx)
                    .map_err(query_error)?
                    .map(|v| Value::Int(v.into())),
                &Type::INT8 => row
                    .try_get::<_, Option<i64>>(idx)
                    .map_err(query_error)?
                    .map(Value::Int),
                &Type::FLOAT4 => row
                    .try_get::<_, Option<f32>>(idx)
                    .map_err(query_error)?
                    .map(|v| Value::Float(v.into())),
                &Type::FLOAT8 => row
                    .try_get::<_, Option<f64>>(idx)
                    .map_err(query_error)?
                    .map(Value::Float),
                &Type::NUMERIC => row
                    .try_get::<_, Option<Decimal>>(idx)
                    .map_err(query_error)?
                    .map(Value::Numeric),
                &Type::BOOL => row
                    .try_get::<_, Option<bool>>(idx)
                    .map_err(query_error)?
                    .map(Value::Bool),
                other => {
                    return Err(StoreError::UnsupportedColumnType {
                        column: column.name().to_string(),
                        type_name: other.name().to_string(),
                    })
                }
            };
            Ok(value.unwrap_or(Value::Null))
        })
        .collect()
}

fn decimal_to_f64(column: &str, value: Decimal) -> Result<f64, StoreError> {
    value.to_f64().ok_or_else(|| StoreError::OutOfRange {
        column: column.to_string(),
        value: value.to_string(),
    })
}

fn query_error(e: tokio_postgres::Error) -> StoreError {
    StoreError::Query(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case::cents(Decimal::new(1225, 2), 12.25)]
    #[case::zero(Decimal::ZERO, 0.0)]
    #[case::negative(Decimal::new(-125, 1), -12.5)]
    fn test_decimal_to_f64(#[case] value: Decimal, #[case] expected: f64) {
        assert_eq!(decimal_to_f64("value", value).unwrap(), expected);
    }

    #[test]
    fn largest_decimal_still_converts() {
        assert!(decimal_to_f64("value", Decimal::MAX).unwrap() > 7.9e28);
    }
}
