use crate::models::{IndicatorSeries, SelectedCountry};
use serde::{Deserialize, Serialize};

/// Summary statistics for one country's series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    pub code: String,
    pub name: String,
    pub count: usize,
    pub missing: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    /// Most recent (year, value) with a value.
    pub latest: Option<(i32, f64)>,
}

/// Compute statistics per country, in input (selection) order.
pub fn summarize(fetched: &[(SelectedCountry, IndicatorSeries)]) -> Vec<Summary> {
    fetched
        .iter()
        .map(|(country, series)| {
            let mut vals: Vec<f64> = series
                .observations
                .iter()
                .filter_map(|o| o.value)
                .filter(|v| v.is_finite())
                .collect();
            let missing = series.len() - vals.len();
            vals.sort_by(|a, b| a.total_cmp(b));
            let count = vals.len();
            let mean = if count > 0 {
                Some(vals.iter().copied().sum::<f64>() / count as f64)
            } else {
                None
            };
            let median = if count == 0 {
                None
            } else if count % 2 == 1 {
                Some(vals[count / 2])
            } else {
                Some((vals[count / 2 - 1] + vals[count / 2]) / 2.0)
            };
            Summary {
                code: country.code.clone(),
                name: country.name.clone(),
                count,
                missing,
                min: vals.first().copied(),
                max: vals.last().copied(),
                mean,
                median,
                latest: series.latest(),
            }
        })
        .collect()
}
