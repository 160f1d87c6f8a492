use super::{ReportError, ResultCursor, Row};
use crate::catalog::{Dimension, Measure};
use serde::Serialize;

/// Every row of a result, with the headers that were requested.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table<'c> {
    pub dimension_headers: Vec<&'c Dimension>,
    pub measure_headers: Vec<&'c Measure>,
    pub rows: Vec<Row>,
}

impl<'c> ResultCursor<'c> {
    /// Drains the cursor into a [`Table`].
    pub async fn table(mut self) -> Result<Table<'c>, ReportError> {
        let mut rows = Vec::new();
        while let Some(row) = self.next_row().await? {
            rows.push(row);
        }

        Ok(Table {
            dimension_headers: self.spec().dimension_list().to_vec(),
            measure_headers: self.spec().measure_list().to_vec(),
            rows,
        })
    }
}
