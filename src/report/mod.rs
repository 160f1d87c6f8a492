//! Executing compiled queries and reshaping their rows.
//!
//! A [`ResultCursor`] streams decoded [`Row`]s out of the store. It is then
//! consumed exactly once, either into a [`Table`] or into line chart
//! [`DataSet`]s. Any failure while streaming aborts the whole
//! materialization; partial tables or charts are never returned.

mod chart;
mod cursor;
mod table;

pub use chart::{ChartShape, DataPoint, DataSet};
pub use cursor::ResultCursor;
pub use table::Table;

use crate::query::{QuerySpec, SpecificationError};
use crate::store::{EventStore, StoreError, Value};
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use thiserror::Error;

/// One result row, positionally aligned with the dimensions and measures of
/// the specification that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub dimension_values: Vec<String>,
    pub measure_values: Vec<f64>,
}

impl Row {
    /// Decodes exactly `dimensions` text cells followed by `measures`
    /// numeric cells.
    pub fn decode(
        values: Vec<Value>,
        dimensions: usize,
        measures: usize,
    ) -> Result<Self, DecodeError> {
        let expected = dimensions + measures;
        if values.len() != expected {
            return Err(DecodeError::ColumnCount {
                expected,
                found: values.len(),
            });
        }

        let mut dimension_values = Vec::with_capacity(dimensions);
        let mut measure_values = Vec::with_capacity(measures);

        for (column, value) in values.into_iter().enumerate() {
            if column < dimensions {
                dimension_values.push(decode_text(column, value)?);
            } else {
                measure_values.push(decode_numeric(column, value)?);
            }
        }

        Ok(Row {
            dimension_values,
            measure_values,
        })
    }
}

fn decode_text(column: usize, value: Value) -> Result<String, DecodeError> {
    match value {
        Value::Text(text) => Ok(text),
        other => Err(DecodeError::ExpectedText {
            column,
            found: other.type_name(),
        }),
    }
}

fn decode_numeric(column: usize, value: Value) -> Result<f64, DecodeError> {
    match value {
        Value::Int(v) => Ok(v as f64),
        Value::Float(v) => Ok(v),
        Value::Numeric(v) => v.to_f64().ok_or(DecodeError::ExpectedNumeric {
            column,
            found: "numeric",
        }),
        other => Err(DecodeError::ExpectedNumeric {
            column,
            found: other.type_name(),
        }),
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum DecodeError {
    #[error("Expected {expected} columns per row, found {found}")]
    ColumnCount { expected: usize, found: usize },

    #[error("Column {column} must be text, found {found}")]
    ExpectedText { column: usize, found: &'static str },

    #[error("Column {column} must be numeric, found {found}")]
    ExpectedNumeric { column: usize, found: &'static str },
}

/// Everything that can stop a report from being produced.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error(transparent)]
    Specification(#[from] SpecificationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Compiles, executes and materializes `spec` as a [`Table`].
pub async fn table<'c, S>(spec: QuerySpec<'c>, store: &S) -> Result<Table<'c>, ReportError>
where
    S: EventStore + ?Sized,
{
    spec.compile()?.execute(store).await?.table().await
}

/// Compiles, executes and materializes `spec` as line chart series.
///
/// The chart shape is checked before the store is touched.
pub async fn line_chart<S>(spec: QuerySpec<'_>, store: &S) -> Result<Vec<DataSet>, ReportError>
where
    S: EventStore + ?Sized,
{
    ChartShape::of(&spec)?;
    spec.compile()?.execute(store).await?.line_chart().await
}
