mod compiler;

pub use compiler::{CompiledQuery, SOURCE_RELATION};

use crate::catalog::{Dimension, Measure};
use std::num::NonZeroU32;
use thiserror::Error;

/// Description of one report request: which catalog dimensions to group by,
/// which measures to aggregate, and an optional row limit.
///
/// Every setter consumes the specification and returns a new one, so a
/// partially built request is never shared. Setting a field twice replaces
/// the earlier value. Nothing is validated until [`QuerySpec::compile`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuerySpec<'c> {
    dimensions: Vec<&'c Dimension>,
    measures: Vec<&'c Measure>,
    limit: Option<NonZeroU32>,
}

impl<'c> QuerySpec<'c> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dimensions<I>(self, dimensions: I) -> Self
    where
        I: IntoIterator<Item = &'c Dimension>,
    {
        Self {
            dimensions: dimensions.into_iter().collect(),
            ..self
        }
    }

    pub fn measures<I>(self, measures: I) -> Self
    where
        I: IntoIterator<Item = &'c Measure>,
    {
        Self {
            measures: measures.into_iter().collect(),
            ..self
        }
    }

    /// A limit of zero removes the limit.
    pub fn limit(self, limit: u32) -> Self {
        Self {
            limit: NonZeroU32::new(limit),
            ..self
        }
    }

    pub fn dimension_list(&self) -> &[&'c Dimension] {
        &self.dimensions
    }

    pub fn measure_list(&self) -> &[&'c Measure] {
        &self.measures
    }

    pub fn row_limit(&self) -> Option<NonZeroU32> {
        self.limit
    }

    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty() && self.measures.is_empty()
    }

    /// Renders the aggregation statement for this specification.
    pub fn compile(self) -> Result<CompiledQuery<'c>, SpecificationError> {
        CompiledQuery::new(self)
    }
}

/// The request itself cannot be answered, independent of any stored data.
#[derive(Error, Debug, PartialEq)]
pub enum SpecificationError {
    #[error("Query specification has no dimensions and no measures")]
    Empty,

    #[error("Result malformed for this data transformation: {0}")]
    MalformedShape(String),
}
