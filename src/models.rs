use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Economic time-series category served by `/api/data/{indicator}/{code}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Indicator {
    #[default]
    Gdp,
    Inflation,
    Unemployment,
}

impl Indicator {
    pub const ALL: [Indicator; 3] = [Indicator::Gdp, Indicator::Inflation, Indicator::Unemployment];

    /// Path segment used by the data endpoint.
    pub fn key(&self) -> &'static str {
        match self {
            Indicator::Gdp => "gdp",
            Indicator::Inflation => "inflation",
            Indicator::Unemployment => "unemployment",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Indicator::Gdp => "GDP",
            Indicator::Inflation => "Inflation",
            Indicator::Unemployment => "Unemployment",
        }
    }

    pub fn y_axis_label(&self) -> &'static str {
        match self {
            Indicator::Gdp => "GDP (Current US$)",
            Indicator::Inflation => "Inflation (Annual %)",
            Indicator::Unemployment => "Unemployment (%)",
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Indicator {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gdp" => Ok(Indicator::Gdp),
            "inflation" => Ok(Indicator::Inflation),
            "unemployment" => Ok(Indicator::Unemployment),
            other => {
                anyhow::bail!("unknown indicator: {other} (expected gdp, inflation or unemployment)")
            }
        }
    }
}

/// Chart kinds offered by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    /// One line (with markers) per country over time.
    #[default]
    Line,
    /// Grouped bars per year, one bar per country.
    Bar,
    /// Latest value per country as pie slices.
    Pie,
}

impl ChartType {
    pub const ALL: [ChartType; 3] = [ChartType::Line, ChartType::Bar, ChartType::Pie];

    pub fn key(&self) -> &'static str {
        match self {
            ChartType::Line => "line",
            ChartType::Bar => "bar",
            ChartType::Pie => "pie",
        }
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ChartType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "line" => Ok(ChartType::Line),
            "bar" => Ok(ChartType::Bar),
            "pie" => Ok(ChartType::Pie),
            other => anyhow::bail!("unknown chart type: {other} (expected line, bar or pie)"),
        }
    }
}

/// A country chosen for comparison. Identity is the `code`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectedCountry {
    pub code: String,
    pub name: String,
}

impl SelectedCountry {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// One `{date, value}` row of `/api/data/{indicator}/{code}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Some servers encode the year as a string (`"2020"`), others as a number.
    #[serde(deserialize_with = "de_year_from_string_or_number")]
    pub date: i32,
    pub value: Option<f64>,
}

/// Time series for one (indicator, country) pair, in server order (newest first).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndicatorSeries {
    pub observations: Vec<Observation>,
}

impl IndicatorSeries {
    pub fn new(observations: Vec<Observation>) -> Self {
        Self { observations }
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Oldest-first copy, ready for plotting.
    pub fn chronological(&self) -> Vec<Observation> {
        self.observations.iter().rev().copied().collect()
    }

    /// Most recent non-null value. The server lists newest first, so this is the
    /// first non-null row.
    pub fn latest_value(&self) -> Option<f64> {
        self.observations.iter().find_map(|o| o.value)
    }

    /// Like [`latest_value`](Self::latest_value) but also returns the year.
    pub fn latest(&self) -> Option<(i32, f64)> {
        self.observations
            .iter()
            .find_map(|o| o.value.map(|v| (o.date, v)))
    }
}

/// One row of the `/api/gdp` overview endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GdpPoint {
    #[serde(deserialize_with = "de_year_from_string_or_number")]
    pub date: i32,
    pub gdp: Option<f64>,
}

/// Lagged GDP features, serialized with the exact names the model was trained on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GdpLags {
    #[serde(rename = "GDP_lag_1")]
    pub gdp_lag_1: f64,
    #[serde(rename = "GDP_lag_2")]
    pub gdp_lag_2: f64,
    #[serde(rename = "GDP_lag_3")]
    pub gdp_lag_3: f64,
}

/// Body of `POST /predict`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub country_name: String,
    pub prediction_year: i32,
    pub gdp_lags: GdpLags,
}

/// Successful `POST /predict` response.
///
/// The server has been seen answering with `country`/`prediction_year` as well as
/// `country_name`/`predicted_year`; accept both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub predicted_gdp: f64,
    #[serde(alias = "country")]
    pub country_name: String,
    #[serde(alias = "prediction_year", deserialize_with = "de_year_from_string_or_number")]
    pub predicted_year: i32,
}

/// `{ "error": "..." }` body returned by the server on failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: Option<String>,
}

/// Serde helper: parse a year from either a JSON number or a string.
fn de_year_from_string_or_number<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    struct YearVisitor;

    impl<'de> Visitor<'de> for YearVisitor {
        type Value = i32;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "a string or integer representing a year")
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            i32::try_from(v).map_err(E::custom)
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            i32::try_from(v).map_err(E::custom)
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v.fract() != 0.0 || !v.is_finite() {
                return Err(E::custom("year must be a whole number"));
            }
            Ok(v as i32)
        }

        fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            s.trim().parse::<i32>().map_err(E::custom)
        }
    }

    deserializer.deserialize_any(YearVisitor)
}
