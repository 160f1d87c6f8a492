use super::{ReportError, Row};
use crate::query::{CompiledQuery, QuerySpec};
use crate::store::{EventStore, RowStream};
use futures::StreamExt;
use log::debug;

impl<'c> CompiledQuery<'c> {
    /// Runs the statement and returns a cursor over its rows.
    pub async fn execute<S>(self, store: &S) -> Result<ResultCursor<'c>, ReportError>
    where
        S: EventStore + ?Sized,
    {
        let (spec, sql) = self.into_parts();
        let rows = store.execute(&sql).await?;
        Ok(ResultCursor::new(spec, rows))
    }
}

/// Pull-based iterator over the rows of one executed query.
///
/// The cursor holds the store's result stream until it is dropped, closed,
/// or consumed by one of the shapers, on success and failure alike.
pub struct ResultCursor<'c> {
    spec: QuerySpec<'c>,
    rows: RowStream,
}

impl<'c> ResultCursor<'c> {
    pub fn new(spec: QuerySpec<'c>, rows: RowStream) -> Self {
        Self { spec, rows }
    }

    pub fn spec(&self) -> &QuerySpec<'c> {
        &self.spec
    }

    /// Next decoded row, or `None` once the stream is exhausted.
    pub async fn next_row(&mut self) -> Result<Option<Row>, ReportError> {
        match self.rows.next().await {
            Some(values) => {
                let row = Row::decode(
                    values?,
                    self.spec.dimension_list().len(),
                    self.spec.measure_list().len(),
                )?;
                Ok(Some(row))
            }
            None => Ok(None),
        }
    }

    /// Releases the cursor without reading the remaining rows.
    pub fn close(self) {}
}

impl Drop for ResultCursor<'_> {
    fn drop(&mut self) {
        debug!("Releasing result cursor");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{DATE, EVENT_COUNT};
    use crate::report::DecodeError;
    use crate::store::{MemoryEventStore, StoreError, Value};

    fn date_counts() -> QuerySpec<'static> {
        QuerySpec::new().dimensions([&DATE]).measures([&EVENT_COUNT])
    }

    #[tokio::test]
    async fn executes_compiled_statement() {
        let store = MemoryEventStore::with_rows([vec![Value::from("2023-01-01"), Value::from(4_i64)]]);
        let compiled = date_counts().compile().unwrap();
        let sql = compiled.sql().to_string();

        let mut cursor = compiled.execute(&store).await.unwrap();
        let row = cursor.next_row().await.unwrap().unwrap();

        assert_eq!(row.dimension_values, vec!["2023-01-01"]);
        assert_eq!(row.measure_values, vec![4.0]);
        assert!(cursor.next_row().await.unwrap().is_none());
        assert_eq!(store.statements(), vec![sql]);
    }

    #[tokio::test]
    async fn close_releases_stream() {
        let store = MemoryEventStore::with_rows([vec![Value::from("2023-01-01"), Value::from(4_i64)]]);
        let cursor = date_counts().compile().unwrap().execute(&store).await.unwrap();
        assert_eq!(store.released_streams(), 0);

        cursor.close();
        assert_eq!(store.released_streams(), 1);
    }

    #[tokio::test]
    async fn surfaces_store_and_decode_errors() {
        let store = MemoryEventStore::with_rows([vec![Value::from("2023-01-01")]]);
        let mut cursor = date_counts().compile().unwrap().execute(&store).await.unwrap();
        assert!(matches!(
            cursor.next_row().await,
            Err(ReportError::Decode(DecodeError::ColumnCount { expected: 2, found: 1 }))
        ));

        let store = MemoryEventStore::new().failing_after(0);
        let mut cursor = date_counts().compile().unwrap().execute(&store).await.unwrap();
        assert!(matches!(
            cursor.next_row().await,
            Err(ReportError::Store(StoreError::Query(_)))
        ));
    }
}
