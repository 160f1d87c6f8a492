pub mod event;
pub mod memory;
pub mod postgres;
mod schema;

pub use event::{Event, EventSummary};
pub use memory::MemoryEventStore;
pub use postgres::PostgresEventStore;

use async_trait::async_trait;
use futures::Stream;
use rust_decimal::Decimal;
use std::pin::Pin;
use thiserror::Error;

/// Forward-only stream of result rows. Dropping it releases the underlying
/// store cursor.
pub type RowStream = Pin<Box<dyn Stream<Item = Result<Vec<Value>, StoreError>> + Send>>;

/// EventStore persists pixel events and runs report statements against them.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Store one event and return the identifier assigned to it.
    async fn insert(&self, event: &Event) -> Result<i64, StoreError>;

    /// Execute a statement and stream back its rows.
    ///
    /// The statement text is passed through as-is; no parameters are bound.
    async fn execute(&self, sql: &str) -> Result<RowStream, StoreError>;
}

/// A single result cell as returned by the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Numeric(Decimal),
    Text(String),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Numeric(_) => "numeric",
            Value::Text(_) => "text",
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Value::Numeric(value)
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Unsupported type {type_name} for column {column}")]
    UnsupportedColumnType { column: String, type_name: String },

    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    #[error("Value {value} in column {column} does not fit a float")]
    OutOfRange { column: String, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case::text(Value::from("page_view"), "text")]
    #[case::int(Value::from(42_i64), "int")]
    #[case::float(Value::from(1.5), "float")]
    #[case::numeric(Value::from(Decimal::new(1234, 2)), "numeric")]
    #[case::null(Value::Null, "null")]
    fn test_value_type_name(#[case] value: Value, #[case] type_name: &str) {
        assert_eq!(value.type_name(), type_name);
    }
}
