use super::{ReportError, ResultCursor};
use crate::query::{QuerySpec, SpecificationError};
use serde::Serialize;
use std::collections::HashMap;

// These structures serialize the way charts.js expects its object data:
// https://www.chartjs.org/docs/latest/general/data-structures.html#object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataPoint {
    pub x: String,
    pub y: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DataSet {
    pub label: String,
    #[serde(rename = "data")]
    pub points: Vec<DataPoint>,
}

/// The two specification shapes a line chart can be built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartShape {
    /// One dimension on the x axis, one series per measure.
    SeriesPerMeasure,
    /// First dimension on the x axis, one series per distinct value of the
    /// second dimension, single measure on the y axis.
    SeriesPerSecondDimension,
}

impl ChartShape {
    pub fn of(spec: &QuerySpec) -> Result<Self, SpecificationError> {
        match (spec.dimension_list().len(), spec.measure_list().len()) {
            (0, _) | (_, 0) => Err(malformed(
                "a line chart needs at least one dimension and one measure",
            )),
            (1, _) => Ok(ChartShape::SeriesPerMeasure),
            (2, 1) => Ok(ChartShape::SeriesPerSecondDimension),
            (2, _) => Err(malformed(
                "a line chart with two dimensions takes exactly one measure",
            )),
            _ => Err(malformed("a line chart takes at most two dimensions")),
        }
    }
}

fn malformed(reason: &str) -> SpecificationError {
    SpecificationError::MalformedShape(reason.to_string())
}

impl ResultCursor<'_> {
    /// Drains the cursor into line chart series.
    ///
    /// Points keep row arrival order. With two dimensions, series are
    /// created in the order their second-dimension value is first seen;
    /// nothing is sorted.
    pub async fn line_chart(mut self) -> Result<Vec<DataSet>, ReportError> {
        let shape = ChartShape::of(self.spec())?;
        match shape {
            ChartShape::SeriesPerMeasure => {
                let mut datasets: Vec<DataSet> = self
                    .spec()
                    .measure_list()
                    .iter()
                    .map(|measure| DataSet {
                        label: measure.label().to_string(),
                        points: Vec::new(),
                    })
                    .collect();

                while let Some(row) = self.next_row().await? {
                    let x = row.dimension_values.into_iter().next().unwrap_or_default();
                    for (dataset, y) in datasets.iter_mut().zip(row.measure_values) {
                        dataset.points.push(DataPoint { x: x.clone(), y });
                    }
                }

                Ok(datasets)
            }
            ChartShape::SeriesPerSecondDimension => {
                let mut datasets: Vec<DataSet> = Vec::new();
                let mut series_index: HashMap<String, usize> = HashMap::new();

                while let Some(row) = self.next_row().await? {
                    let mut dimensions = row.dimension_values.into_iter();
                    let x = dimensions.next().unwrap_or_default();
                    let series = dimensions.next().unwrap_or_default();
                    let y = row.measure_values.first().copied().unwrap_or_default();

                    let next = datasets.len();
                    let index = *series_index.entry(series.clone()).or_insert(next);
                    if index == next {
                        datasets.push(DataSet {
                            label: series,
                            points: Vec::new(),
                        });
                    }
                    datasets[index].points.push(DataPoint { x, y });
                }

                Ok(datasets)
            }
        }
    }
}
