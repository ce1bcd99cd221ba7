//! wbi_atlas
//!
//! Client side of an economic-indicator dashboard: pick countries on a world map,
//! compare GDP, inflation or unemployment across them as a line, bar or pie chart,
//! and ask a remote model for a GDP forecast. Pairs with the `wbi-atlas` CLI and
//! the `wbi-atlas-gui` desktop app.
//!
//! ### Features
//! - Fetch one indicator series per selected country, concurrently, with per-country failure isolation
//! - Build Plotly-compatible chart specs and draw them as SVG/PNG with plotters
//! - World map with Natural Earth projection, hit testing and click-to-select
//! - Prediction form with client-side validation
//! - CSV/JSON export and summary statistics of the fetched data
//!
//! ### Example
//! ```no_run
//! use wbi_atlas::{ChartRenderer, ChartType, Client, DashboardState, Indicator, RenderOutcome};
//!
//! let client = Client::default();
//! let mut state = DashboardState::default();
//! state.toggle_country("DEU", "Germany");
//! state.toggle_country("USA", "United States");
//!
//! let outcome = ChartRenderer::new(&client).render_request(&state.snapshot());
//! if let RenderOutcome::Chart(chart) = outcome {
//!     wbi_atlas::viz::render_to_file(&chart.spec, "gdp.svg", 1000, 600, "en")?;
//!     println!("{}", chart.spec.to_json()?);
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod api;
pub mod chart;
pub mod config;
pub mod error;
pub mod fanout;
pub mod geo;
pub mod models;
pub mod predict;
pub mod selection;
pub mod state;
pub mod stats;
pub mod storage;
pub mod viz;

pub use api::{Client, IndicatorSource, PredictionService};
pub use chart::{ChartRenderer, ChartSpec, RenderOutcome, RenderedChart, build_chart_spec};
pub use config::AtlasConfig;
pub use error::ApiError;
pub use geo::{MapView, WorldMap};
pub use models::{ChartType, Indicator, IndicatorSeries, Observation, SelectedCountry};
pub use predict::{PredictionForm, PredictionOutcome};
pub use selection::{SelectionStore, Toggle};
pub use state::{DashboardState, RenderRequest, StateChange};
