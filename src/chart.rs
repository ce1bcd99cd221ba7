//! Declarative chart specifications and the renderer that builds them from the
//! current selection.
//!
//! A [`ChartSpec`] serializes to the JSON shape Plotly expects
//! (`{"data": [...traces], "layout": {...}}`), so it can be handed to any plotting
//! surface; [`crate::viz`] draws the same spec with plotters.

use crate::api::IndicatorSource;
use crate::fanout::{CountryFetch, fetch_all};
use crate::models::{ChartType, Indicator, IndicatorSeries, SelectedCountry};
use crate::state::RenderRequest;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceKind {
    Scatter,
    Bar,
    Pie,
}

/// One plotted series. Time-series traces use `x`/`y`; pie traces use
/// `labels`/`values`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    #[serde(rename = "type")]
    pub kind: TraceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub x: Vec<i32>,
    /// `None` keeps a gap in the line.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub y: Vec<Option<f64>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub textinfo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insidetextorientation: Option<String>,
}

impl Trace {
    fn time_series(kind: TraceKind, name: &str, series: &IndicatorSeries) -> Self {
        let (x, y) = series
            .chronological()
            .into_iter()
            .map(|o| (o.date, o.value))
            .unzip();
        Self {
            kind,
            mode: (kind == TraceKind::Scatter).then(|| "lines+markers".to_string()),
            name: Some(name.to_string()),
            x,
            y,
            labels: Vec::new(),
            values: Vec::new(),
            textinfo: None,
            insidetextorientation: None,
        }
    }

    fn pie(labels: Vec<String>, values: Vec<f64>) -> Self {
        Self {
            kind: TraceKind::Pie,
            mode: None,
            name: None,
            x: Vec::new(),
            y: Vec::new(),
            labels,
            values,
            textinfo: Some("label+percent".into()),
            insidetextorientation: Some("radial".into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisSpec {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<AxisSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<AxisSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barmode: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

impl ChartSpec {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn is_pie(&self) -> bool {
        self.data.iter().any(|t| t.kind == TraceKind::Pie)
    }
}

/// Build a chart spec from already-fetched series. Pure: same input, same spec.
///
/// - Pie: latest non-null value per country; countries without one get no slice.
/// - Line/Bar: one trace per country with a non-empty series, oldest year first.
///
/// Trace (and slice) order follows `fetched`, i.e. selection order.
pub fn build_chart_spec(
    indicator: Indicator,
    chart_type: ChartType,
    fetched: &[(SelectedCountry, IndicatorSeries)],
) -> ChartSpec {
    let name = indicator.display_name();
    match chart_type {
        ChartType::Pie => {
            let (labels, values) = fetched
                .iter()
                .filter_map(|(country, series)| {
                    series.latest_value().map(|v| (country.name.clone(), v))
                })
                .unzip();
            ChartSpec {
                data: vec![Trace::pie(labels, values)],
                layout: Layout {
                    title: format!("Latest {name} Comparison"),
                    xaxis: None,
                    yaxis: None,
                    barmode: None,
                },
            }
        }
        ChartType::Line | ChartType::Bar => {
            let kind = if chart_type == ChartType::Line {
                TraceKind::Scatter
            } else {
                TraceKind::Bar
            };
            let data = fetched
                .iter()
                .filter(|(_, series)| !series.is_empty())
                .map(|(country, series)| Trace::time_series(kind, &country.name, series))
                .collect();
            ChartSpec {
                data,
                layout: Layout {
                    title: format!("{name} Comparison"),
                    xaxis: Some(AxisSpec {
                        title: "Year".into(),
                    }),
                    yaxis: Some(AxisSpec {
                        title: indicator.y_axis_label().into(),
                    }),
                    barmode: Some("group".into()),
                },
            }
        }
    }
}

/// Status text shown while a render is in flight.
pub fn loading_message(indicator: Indicator, chart_type: ChartType, countries: usize) -> String {
    match chart_type {
        ChartType::Pie => format!("Loading latest {} data...", indicator.display_name()),
        _ => format!(
            "Loading {} data for {} countries...",
            indicator.display_name(),
            countries
        ),
    }
}

/// A country whose fetch failed; it is simply missing from the chart.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchFailure {
    pub country: SelectedCountry,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedChart {
    pub spec: ChartSpec,
    /// Successfully fetched series, in selection order.
    pub series: Vec<(SelectedCountry, IndicatorSeries)>,
    pub failures: Vec<FetchFailure>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    /// Nothing selected: the chart panel is hidden and nothing was fetched.
    Hidden,
    Chart(RenderedChart),
    /// Every fetch failed.
    Failed { message: String },
}

/// Turns (selection, indicator, chart type) into a [`RenderOutcome`] by fetching
/// each selected country's series from an [`IndicatorSource`].
pub struct ChartRenderer<'a, S: IndicatorSource + ?Sized> {
    source: &'a S,
}

impl<'a, S: IndicatorSource + ?Sized> ChartRenderer<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    pub fn render(
        &self,
        selection: &[SelectedCountry],
        indicator: Indicator,
        chart_type: ChartType,
    ) -> RenderOutcome {
        if selection.is_empty() {
            log::debug!("empty selection, hiding chart");
            return RenderOutcome::Hidden;
        }

        let fetched = fetch_all(self.source, indicator, selection);
        let total = fetched.len();

        let mut series = Vec::with_capacity(total);
        let mut failures = Vec::new();
        let mut first_error = None;
        for CountryFetch { country, result } in fetched {
            match result {
                Ok(s) => series.push((country, s)),
                Err(e) => {
                    failures.push(FetchFailure {
                        country,
                        message: e.to_string(),
                    });
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        if series.is_empty() {
            let message = first_error
                .map(|e| e.user_message())
                .unwrap_or_else(|| "Could not load chart data.".to_string());
            log::error!("all {} {} fetches failed", total, indicator);
            return RenderOutcome::Failed { message };
        }

        let spec = build_chart_spec(indicator, chart_type, &series);
        log::info!(
            "rendered {} {} chart: {} trace(s), {} failure(s)",
            indicator,
            chart_type,
            spec.data.len(),
            failures.len()
        );
        RenderOutcome::Chart(RenderedChart {
            spec,
            series,
            failures,
        })
    }

    pub fn render_request(&self, request: &RenderRequest) -> RenderOutcome {
        self.render(&request.selection, request.indicator, request.chart_type)
    }
}

/// Single-series line chart for the `/api/gdp` overview (newest-first input).
pub fn gdp_overview_spec(points: &[crate::models::GdpPoint], label: &str) -> ChartSpec {
    let series = IndicatorSeries::new(
        points
            .iter()
            .map(|p| crate::models::Observation {
                date: p.date,
                value: p.gdp,
            })
            .collect(),
    );
    ChartSpec {
        data: vec![Trace::time_series(TraceKind::Scatter, label, &series)],
        layout: Layout {
            title: "GDP (in USD) Over Time".into(),
            xaxis: Some(AxisSpec {
                title: "Year".into(),
            }),
            yaxis: Some(AxisSpec {
                title: "GDP ($)".into(),
            }),
            barmode: None,
        },
    }
}
