mod validate;

use serde::Serialize;
use std::collections::HashSet;
use thiserror::Error;

/// A named grouping key projected from the events relation.
///
/// Expressions are `&'static str` so an entry can only be declared in code,
/// never assembled from request input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimension {
    key: &'static str,
    label: &'static str,
    #[serde(skip)]
    expression: &'static str,
}

impl Dimension {
    pub const fn new(key: &'static str, label: &'static str, expression: &'static str) -> Self {
        Self {
            key,
            label,
            expression,
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn expression(&self) -> &'static str {
        self.expression
    }
}

/// A named aggregate over the events relation. The expression always
/// contains an aggregate function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Measure {
    key: &'static str,
    label: &'static str,
    #[serde(skip)]
    expression: &'static str,
}

impl Measure {
    pub const fn new(key: &'static str, label: &'static str, expression: &'static str) -> Self {
        Self {
            key,
            label,
            expression,
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn expression(&self) -> &'static str {
        self.expression
    }
}

pub const EVENT_NAME: Dimension = Dimension::new("event_name", "Event Name", "name");
pub const DATE: Dimension = Dimension::new("date", "Date", "TO_CHAR(timestamp, 'YYYY-MM-DD')");
pub const MONTH: Dimension = Dimension::new("month", "Month", "TO_CHAR(timestamp, 'YYYY-MM')");
pub const PAGE_LOCATION: Dimension =
    Dimension::new("page_location", "Page Location", "page_location");
pub const PAGE_TITLE: Dimension = Dimension::new("page_title", "Page Title", "page_title");
pub const PAGE_REFERRER: Dimension =
    Dimension::new("page_referrer", "Page Referrer", "page_referrer");
pub const SCREEN_RESOLUTION: Dimension = Dimension::new(
    "screen_resolution",
    "Screen Resolution",
    "screen_resolution",
);

pub const EVENT_COUNT: Measure = Measure::new("event_count", "Event Count", "COUNT(*)");
pub const EVENT_VALUE: Measure = Measure::new("event_value", "Event Value", "ROUND(SUM(value), 2)");
pub const USERS: Measure = Measure::new("users", "Users", "COUNT(DISTINCT client_id)");
pub const SESSIONS: Measure = Measure::new("sessions", "Sessions", "COUNT(DISTINCT session_id)");

static STANDARD: Catalog = Catalog::new(
    &[
        EVENT_NAME,
        DATE,
        MONTH,
        PAGE_LOCATION,
        PAGE_TITLE,
        PAGE_REFERRER,
        SCREEN_RESOLUTION,
    ],
    &[EVENT_COUNT, EVENT_VALUE, USERS, SESSIONS],
);

/// Fixed registry of every dimension and measure a report may use.
#[derive(Debug)]
pub struct Catalog {
    dimensions: &'static [Dimension],
    measures: &'static [Measure],
}

impl Catalog {
    pub const fn new(dimensions: &'static [Dimension], measures: &'static [Measure]) -> Self {
        Self {
            dimensions,
            measures,
        }
    }

    /// The process-wide catalog of reportable event dimensions and measures.
    pub fn standard() -> &'static Catalog {
        &STANDARD
    }

    pub fn dimensions(&self) -> &'static [Dimension] {
        self.dimensions
    }

    pub fn measures(&self) -> &'static [Measure] {
        self.measures
    }

    pub fn dimension(&self, key: &str) -> Result<&'static Dimension, CatalogError> {
        self.dimensions
            .iter()
            .find(|d| d.key == key)
            .ok_or_else(|| CatalogError::DimensionNotFound(key.to_string()))
    }

    pub fn measure(&self, key: &str) -> Result<&'static Measure, CatalogError> {
        self.measures
            .iter()
            .find(|m| m.key == key)
            .ok_or_else(|| CatalogError::MeasureNotFound(key.to_string()))
    }

    /// Resolves a comma-separated list of dimension keys, keeping the given order.
    pub fn dimensions_from_keys(&self, keys: &str) -> Result<Vec<&'static Dimension>, CatalogError> {
        split_keys(keys).map(|key| self.dimension(key)).collect()
    }

    /// Resolves a comma-separated list of measure keys, keeping the given order.
    pub fn measures_from_keys(&self, keys: &str) -> Result<Vec<&'static Measure>, CatalogError> {
        split_keys(keys).map(|key| self.measure(key)).collect()
    }

    /// Checks that every expression is a bare projection the compiler can
    /// splice into a select list, and that keys are unique.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut seen = HashSet::new();
        for dimension in self.dimensions {
            if !seen.insert(dimension.key) {
                return Err(CatalogError::DuplicateKey(dimension.key.to_string()));
            }
            validate::check_dimension(dimension)?;
        }

        seen.clear();
        for measure in self.measures {
            if !seen.insert(measure.key) {
                return Err(CatalogError::DuplicateKey(measure.key.to_string()));
            }
            validate::check_measure(measure)?;
        }

        Ok(())
    }
}

fn split_keys(keys: &str) -> impl Iterator<Item = &str> {
    keys.split(',').map(str::trim).filter(|k| !k.is_empty())
}

#[derive(Error, Debug, PartialEq)]
pub enum CatalogError {
    #[error("Dimension not found: {0}")]
    DimensionNotFound(String),

    #[error("Measure not found: {0}")]
    MeasureNotFound(String),

    #[error("Duplicate catalog key: {0}")]
    DuplicateKey(String),

    #[error("Invalid expression for {key}: {reason}")]
    InvalidExpression { key: String, reason: String },
}
