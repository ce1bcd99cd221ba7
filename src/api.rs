//! Synchronous client for the **dashboard data server**.
//!
//! Endpoints:
//! - `GET /api/data/{indicator}/{countryCode}` → `[{date, value|null}, ...]` (newest first)
//! - `GET /api/gdp` → `[{date, gdp}, ...]`
//! - `POST /predict` → `{predicted_gdp, country_name, predicted_year}` or `{error}`
//!
//! ### Notes
//! - One HTTP request per call. There is deliberately no retry, cache or pagination.
//! - Non-2xx answers become [`ApiError::Http`]; transport failures [`ApiError::Network`].
//!
//! Typical usage:
//! ```no_run
//! # use wbi_atlas::{Client, Indicator};
//! let client = Client::default();
//! let series = client.fetch_series(Indicator::Gdp, "DEU")?;
//! println!("{} observations", series.len());
//! # Ok::<(), wbi_atlas::ApiError>(())
//! ```

use crate::config::AtlasConfig;
use crate::error::ApiError;
use crate::models::{
    ErrorBody, GdpPoint, Indicator, IndicatorSeries, PredictionRequest, PredictionResponse,
};
use anyhow::Context;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
use reqwest::blocking::{Client as HttpClient, Response};
use reqwest::redirect::Policy;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Anything that can produce an indicator series for one country.
///
/// Implemented by [`Client`]; tests substitute in-memory fakes.
pub trait IndicatorSource: Sync {
    fn fetch_series(&self, indicator: Indicator, country_code: &str)
    -> Result<IndicatorSeries, ApiError>;
}

/// The remote GDP forecasting model.
pub trait PredictionService {
    fn predict(&self, request: &PredictionRequest) -> Result<PredictionResponse, ApiError>;
}

#[derive(Debug, Clone)]
pub struct Client {
    pub base_url: String,
    http: HttpClient,
}

impl Default for Client {
    fn default() -> Self {
        let http = build_http(&AtlasConfig::default()).expect("reqwest client build");
        Self {
            base_url: crate::config::DEFAULT_API_BASE_URL.into(),
            http,
        }
    }
}

fn build_http(cfg: &AtlasConfig) -> reqwest::Result<HttpClient> {
    HttpClient::builder()
        .timeout(Duration::from_secs(cfg.timeout_secs)) // total request timeout
        .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .redirect(Policy::limited(5))
        .user_agent(concat!("wbi_atlas/", env!("CARGO_PKG_VERSION")))
        .build()
}

// Allow -, _, . unescaped in path segments (indicator keys, ISO codes)
const SAFE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

fn enc(segment: &str) -> String {
    percent_encoding::utf8_percent_encode(segment.trim(), SAFE).to_string()
}

impl Client {
    /// Build a client from configuration (base URL and timeouts).
    pub fn new(cfg: &AtlasConfig) -> anyhow::Result<Self> {
        let http = build_http(cfg).context("build http client")?;
        Ok(Self {
            base_url: cfg.api_base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Client for an arbitrary base URL with default timeouts.
    pub fn with_base_url(base_url: impl Into<String>) -> anyhow::Result<Self> {
        let cfg = AtlasConfig {
            api_base_url: base_url.into(),
            ..AtlasConfig::default()
        };
        Self::new(&cfg)
    }

    /// `GET /api/data/{indicator}/{countryCode}`.
    pub fn fetch_series(
        &self,
        indicator: Indicator,
        country_code: &str,
    ) -> Result<IndicatorSeries, ApiError> {
        let url = format!(
            "{}/api/data/{}/{}",
            self.base_url,
            indicator.key(),
            enc(country_code)
        );
        self.get_json(&url, "indicator series")
    }

    /// `GET /api/gdp`: the server's single-country GDP overview.
    pub fn fetch_gdp(&self) -> Result<Vec<GdpPoint>, ApiError> {
        let url = format!("{}/api/gdp", self.base_url);
        self.get_json(&url, "gdp overview")
    }

    /// `POST /predict`.
    pub fn predict(&self, request: &PredictionRequest) -> Result<PredictionResponse, ApiError> {
        let url = format!("{}/predict", self.base_url);
        log::debug!("POST {} ({})", url, request.country_name);
        let resp = self.http.post(&url).json(request).send()?;
        decode(resp, "prediction")
    }

    /// Download a GeoJSON document (world country polygons) as text.
    pub fn fetch_geography(&self, url: &str) -> Result<String, ApiError> {
        log::debug!("GET {}", url);
        let resp = self.http.get(url).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Http {
                status: status.as_u16(),
                message: None,
            });
        }
        Ok(resp.text()?)
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str, what: &'static str) -> Result<T, ApiError> {
        log::debug!("GET {}", url);
        let resp = self.http.get(url).send()?;
        decode(resp, what)
    }
}

/// Turn a response into `T`, or into an [`ApiError::Http`] carrying the server's
/// `{error}` message when the status is not 2xx.
fn decode<T: DeserializeOwned>(resp: Response, what: &'static str) -> Result<T, ApiError> {
    let status = resp.status();
    let body = resp.text()?;
    if !status.is_success() {
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.error)
            .filter(|m| !m.trim().is_empty());
        log::debug!("{} answered HTTP {}", what, status);
        return Err(ApiError::Http {
            status: status.as_u16(),
            message,
        });
    }
    serde_json::from_str(&body).map_err(|source| ApiError::Decode { what, source })
}

impl IndicatorSource for Client {
    fn fetch_series(
        &self,
        indicator: Indicator,
        country_code: &str,
    ) -> Result<IndicatorSeries, ApiError> {
        Client::fetch_series(self, indicator, country_code)
    }
}

impl PredictionService for Client {
    fn predict(&self, request: &PredictionRequest) -> Result<PredictionResponse, ApiError> {
        Client::predict(self, request)
    }
}
