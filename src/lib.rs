pub mod catalog;
pub mod config;
pub mod query;
pub mod report;
pub mod seed;
pub mod store;

pub use catalog::{Catalog, Dimension, Measure};
pub use query::{CompiledQuery, QuerySpec};
pub use report::{DataSet, ReportError, ResultCursor, Row, Table};
pub use store::{Event, EventStore, MemoryEventStore, PostgresEventStore};
