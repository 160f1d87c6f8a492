use super::{Event, EventStore, RowStream, StoreError, Value};
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};

/// In-memory [`EventStore`] that answers every statement with the same
/// scripted result set.
///
/// Executed statements and inserted events are recorded, and every result
/// stream handed out is counted when it is dropped.
#[derive(Debug, Default)]
pub struct MemoryEventStore {
    rows: Vec<Vec<Value>>,
    fail_after: Option<usize>,
    fail_execute: bool,
    statements: Mutex<Vec<String>>,
    events: Mutex<Vec<Event>>,
    released: Arc<AtomicUsize>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows<R>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = Value>,
    {
        Self {
            rows: rows.into_iter().map(|r| r.into_iter().collect()).collect(),
            ..Self::default()
        }
    }

    /// Make result streams yield at most `rows` rows and then an error.
    pub fn failing_after(self, rows: usize) -> Self {
        Self {
            fail_after: Some(rows),
            ..self
        }
    }

    /// Make every `execute` call fail before a result stream is opened.
    pub fn failing_execute(self) -> Self {
        Self {
            fail_execute: true,
            ..self
        }
    }

    pub fn statements(&self) -> Vec<String> {
        self.statements
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of result streams that have been dropped so far.
    pub fn released_streams(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn insert(&self, event: &Event) -> Result<i64, StoreError> {
        event.validate()?;
        let mut events = self.events.lock().unwrap_or_else(PoisonError::into_inner);
        events.push(event.clone());
        Ok(events.len() as i64)
    }

    async fn execute(&self, sql: &str) -> Result<RowStream, StoreError> {
        self.statements
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(sql.to_string());

        if self.fail_execute {
            return Err(StoreError::Query(format!("statement rejected: {}", sql)));
        }

        let mut results: Vec<Result<Vec<Value>, StoreError>> = self
            .rows
            .iter()
            .take(self.fail_after.unwrap_or(self.rows.len()))
            .cloned()
            .map(Ok)
            .collect();
        if let Some(rows) = self.fail_after {
            results.push(Err(StoreError::Query(format!(
                "result stream aborted after {} rows",
                rows
            ))));
        }

        Ok(Box::pin(ScriptedRows {
            rows: results.into_iter(),
            _release: ReleaseOnDrop(self.released.clone()),
        }))
    }
}

struct ScriptedRows {
    rows: std::vec::IntoIter<Result<Vec<Value>, StoreError>>,
    _release: ReleaseOnDrop,
}

impl Stream for ScriptedRows {
    type Item = Result<Vec<Value>, StoreError>;

    fn poll_next(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Poll::Ready(self.get_mut().rows.next())
    }
}

struct ReleaseOnDrop(Arc<AtomicUsize>);

impl Drop for ReleaseOnDrop {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}
