//! Runtime configuration: defaults that match the local dashboard server, optionally
//! overridden by a JSON file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_GEOGRAPHY_URL: &str =
    "https://raw.githubusercontent.com/holtzy/D3-graph-gallery/master/DATA/world.geojson";
/// Year the bundled GDP model forecasts.
pub const DEFAULT_PREDICTION_YEAR: i32 = 2023;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtlasConfig {
    pub api_base_url: String,
    pub geography_url: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub prediction_year: i32,
    pub chart_width: u32,
    pub chart_height: u32,
    /// Locale tag for axis labels, e.g. `"en"` or `"de"`.
    pub locale: String,
    /// TTF used for chart text. `None` searches common system locations.
    pub font_path: Option<PathBuf>,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            geography_url: DEFAULT_GEOGRAPHY_URL.into(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
            prediction_year: DEFAULT_PREDICTION_YEAR,
            chart_width: 1000,
            chart_height: 600,
            locale: "en".into(),
            font_path: None,
        }
    }
}

impl AtlasConfig {
    /// Read a JSON config file. Keys that are absent keep their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let cfg: AtlasConfig = serde_json::from_str(&text)
            .with_context(|| format!("parse config {}", path.display()))?;
        log::debug!("loaded config from {}", path.display());
        Ok(cfg)
    }

    /// `load` when a path is given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn with_api_base(mut self, base: Option<String>) -> Self {
        if let Some(b) = base {
            self.api_base_url = b.trim_end_matches('/').to_string();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_file_keeps_defaults() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, r#"{{"api_base_url":"http://example.test:8080","locale":"de"}}"#).unwrap();
        let cfg = AtlasConfig::load(f.path()).unwrap();
        assert_eq!(cfg.api_base_url, "http://example.test:8080");
        assert_eq!(cfg.locale, "de");
        assert_eq!(cfg.prediction_year, DEFAULT_PREDICTION_YEAR);
        assert_eq!(cfg.timeout_secs, 30);
    }

    #[test]
    fn api_base_override_strips_trailing_slash() {
        let cfg = AtlasConfig::default().with_api_base(Some("http://h:1/".into()));
        assert_eq!(cfg.api_base_url, "http://h:1");
    }
}
