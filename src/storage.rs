use crate::models::{Indicator, IndicatorSeries, SelectedCountry};
use anyhow::{Context, Result};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Tidy export row: one observation of one country.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow<'a> {
    pub country_code: &'a str,
    pub country_name: &'a str,
    pub indicator: &'static str,
    pub date: i32,
    pub value: Option<f64>,
}

/// Flatten fetched series into rows, oldest year first within each country.
pub fn rows<'a>(
    indicator: Indicator,
    fetched: &'a [(SelectedCountry, IndicatorSeries)],
) -> Vec<ExportRow<'a>> {
    fetched
        .iter()
        .flat_map(|(country, series)| {
            series.chronological().into_iter().map(move |o| ExportRow {
                country_code: &country.code,
                country_name: &country.name,
                indicator: indicator.key(),
                date: o.date,
                value: o.value,
            })
        })
        .collect()
}

/// Save observations as CSV with header.
pub fn save_csv<P: AsRef<Path>>(
    indicator: Indicator,
    fetched: &[(SelectedCountry, IndicatorSeries)],
    path: P,
) -> Result<()> {
    let path = path.as_ref();
    let mut wtr = WriterBuilder::new()
        .from_path(path)
        .with_context(|| format!("create {}", path.display()))?;
    for row in rows(indicator, fetched) {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save observations as pretty JSON array.
pub fn save_json<P: AsRef<Path>>(
    indicator: Indicator,
    fetched: &[(SelectedCountry, IndicatorSeries)],
    path: P,
) -> Result<()> {
    let path = path.as_ref();
    let mut f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let s = serde_json::to_string_pretty(&rows(indicator, fetched))?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Observation;
    use tempfile::tempdir;

    fn sample() -> Vec<(SelectedCountry, IndicatorSeries)> {
        vec![(
            SelectedCountry::new("DEU", "Germany"),
            IndicatorSeries::new(vec![
                Observation { date: 2021, value: Some(2.0) },
                Observation { date: 2020, value: None },
            ]),
        )]
    }

    #[test]
    fn write_csv_and_json() {
        let dir = tempdir().unwrap();
        let csvp = dir.path().join("x.csv");
        let jsonp = dir.path().join("x.json");
        let data = sample();
        save_csv(Indicator::Gdp, &data, &csvp).unwrap();
        save_json(Indicator::Gdp, &data, &jsonp).unwrap();

        let csv_text = std::fs::read_to_string(&csvp).unwrap();
        let mut lines = csv_text.lines();
        assert_eq!(lines.next(), Some("country_code,country_name,indicator,date,value"));
        assert_eq!(lines.next(), Some("DEU,Germany,gdp,2020,"));
        assert_eq!(lines.next(), Some("DEU,Germany,gdp,2021,2.0"));

        let text = std::fs::read_to_string(&jsonp).unwrap();
        let v: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v.as_array().unwrap().len(), 2);
    }
}
