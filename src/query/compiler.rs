use super::{QuerySpec, SpecificationError};
use log::debug;

/// The single relation every report reads from.
pub const SOURCE_RELATION: &str = "events";

/// A specification together with the statement rendered from it.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery<'c> {
    spec: QuerySpec<'c>,
    sql: String,
}

impl<'c> CompiledQuery<'c> {
    pub(super) fn new(spec: QuerySpec<'c>) -> Result<Self, SpecificationError> {
        let sql = render(&spec)?;
        debug!("Compiled query: {}", sql);
        Ok(Self { spec, sql })
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn spec(&self) -> &QuerySpec<'c> {
        &self.spec
    }

    pub fn into_parts(self) -> (QuerySpec<'c>, String) {
        (self.spec, self.sql)
    }
}

/// Renders `SELECT [DISTINCT] <dimensions>, <measures> FROM events
/// [GROUP BY 1, .., n] [LIMIT l]`.
///
/// Grouping uses select-list ordinals rather than repeating the dimension
/// expressions. Only catalog expressions are ever written into the text.
fn render(spec: &QuerySpec) -> Result<String, SpecificationError> {
    let (select, group_by) = match (spec.dimensions.len(), spec.measures.len()) {
        (0, 0) => return Err(SpecificationError::Empty),
        // Listing of discrete values, rows must not repeat
        (_, 0) => ("SELECT DISTINCT", None),
        // Grand totals over the whole relation
        (0, _) => ("SELECT", None),
        (dimensions, _) => ("SELECT", Some(dimensions)),
    };

    let columns: Vec<&str> = spec
        .dimensions
        .iter()
        .map(|d| d.expression())
        .chain(spec.measures.iter().map(|m| m.expression()))
        .collect();

    let mut sql = format!("{} {} FROM {}", select, columns.join(", "), SOURCE_RELATION);

    if let Some(dimensions) = group_by {
        let ordinals: Vec<String> = (1..=dimensions).map(|i| i.to_string()).collect();
        sql.push_str(" GROUP BY ");
        sql.push_str(&ordinals.join(", "));
    }

    if let Some(limit) = spec.limit {
        sql.push_str(&format!(" LIMIT {}", limit));
    }

    Ok(sql)
}
