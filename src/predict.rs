//! GDP forecast form: client-side validation, submission to the prediction
//! service, and display formatting. The forecast itself is computed remotely.

use crate::api::PredictionService;
use crate::config::DEFAULT_PREDICTION_YEAR;
use crate::models::{GdpLags, PredictionRequest, PredictionResponse};
use num_format::{Locale, ToFormattedString};
use thiserror::Error;

/// Countries the forecasting model was trained on.
pub const PREDICTION_COUNTRIES: [&str; 15] = [
    "Australia",
    "Brazil",
    "Canada",
    "China",
    "France",
    "Germany",
    "India",
    "Indonesia",
    "Japan",
    "Korea, Rep.",
    "Mexico",
    "Russian Federation",
    "South Africa",
    "United Kingdom",
    "United States",
];

pub const VALIDATION_MESSAGE: &str = "Please select a country and enter valid GDP lag values.";
pub const NETWORK_MESSAGE: &str =
    "Failed to connect to the prediction service. Make sure the server is running.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("{}", VALIDATION_MESSAGE)]
    MissingCountry,
    #[error("{}", VALIDATION_MESSAGE)]
    InvalidLag { field: &'static str, input: String },
}

/// Raw form inputs, as typed.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionForm {
    pub country: String,
    pub gdp_lag_1: String,
    pub gdp_lag_2: String,
    pub gdp_lag_3: String,
    pub prediction_year: i32,
}

impl Default for PredictionForm {
    fn default() -> Self {
        Self {
            country: String::new(),
            gdp_lag_1: String::new(),
            gdp_lag_2: String::new(),
            gdp_lag_3: String::new(),
            prediction_year: DEFAULT_PREDICTION_YEAR,
        }
    }
}

fn parse_lag(field: &'static str, input: &str) -> Result<f64, FormError> {
    let cleaned: String = input.trim().chars().filter(|c| *c != '_').collect();
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(FormError::InvalidLag {
            field,
            input: input.to_string(),
        }),
    }
}

impl PredictionForm {
    pub fn new(country: &str, lag1: &str, lag2: &str, lag3: &str) -> Self {
        Self {
            country: country.to_string(),
            gdp_lag_1: lag1.to_string(),
            gdp_lag_2: lag2.to_string(),
            gdp_lag_3: lag3.to_string(),
            ..Self::default()
        }
    }

    /// Build the request body, or explain what is missing.
    pub fn validate(&self) -> Result<PredictionRequest, FormError> {
        let country = self.country.trim();
        if country.is_empty() {
            return Err(FormError::MissingCountry);
        }
        let gdp_lags = GdpLags {
            gdp_lag_1: parse_lag("GDP_lag_1", &self.gdp_lag_1)?,
            gdp_lag_2: parse_lag("GDP_lag_2", &self.gdp_lag_2)?,
            gdp_lag_3: parse_lag("GDP_lag_3", &self.gdp_lag_3)?,
        };
        Ok(PredictionRequest {
            country_name: country.to_string(),
            prediction_year: self.prediction_year,
            gdp_lags,
        })
    }

    /// Validate, then post to `service`. Invalid input never reaches the network.
    pub fn submit<S: PredictionService + ?Sized>(&self, service: &S) -> PredictionOutcome {
        let request = match self.validate() {
            Ok(r) => r,
            Err(e) => {
                log::debug!("prediction form rejected: {:?}", e);
                return PredictionOutcome::Error(e.to_string());
            }
        };
        match service.predict(&request) {
            Ok(resp) => PredictionOutcome::Forecast(PredictionDisplay::from(&resp)),
            Err(e) if e.is_network() => {
                log::error!("prediction request failed: {}", e);
                PredictionOutcome::Error(NETWORK_MESSAGE.to_string())
            }
            Err(crate::error::ApiError::Http {
                message: Some(m), ..
            }) => PredictionOutcome::Error(format!("Error: {m}")),
            Err(e) => {
                log::warn!("prediction api error: {}", e);
                PredictionOutcome::Error("Error: Unknown API error".to_string())
            }
        }
    }
}

/// What the results section shows.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictionOutcome {
    Forecast(PredictionDisplay),
    Error(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PredictionDisplay {
    pub country: String,
    pub year: i32,
    pub predicted_gdp: f64,
    /// e.g. `"$26,854,599,000,000"`
    pub formatted_gdp: String,
}

impl From<&PredictionResponse> for PredictionDisplay {
    fn from(r: &PredictionResponse) -> Self {
        Self {
            country: r.country_name.clone(),
            year: r.predicted_year,
            predicted_gdp: r.predicted_gdp,
            formatted_gdp: format_usd(r.predicted_gdp),
        }
    }
}

/// Whole US dollars with thousands separators: `1234567.6` → `"$1,234,568"`.
pub fn format_usd(value: f64) -> String {
    if !value.is_finite() {
        return "N/A".to_string();
    }
    let rounded = value.round();
    let digits = if rounded.abs() < u128::MAX as f64 {
        (rounded.abs() as u128).to_formatted_string(&Locale::en)
    } else {
        group_thousands(&format!("{:.0}", rounded.abs()))
    };
    if rounded < 0.0 {
        format!("-${digits}")
    } else {
        format!("${digits}")
    }
}

/// `"1234567"` → `"1,234,567"`, for magnitudes past `u128`.
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usd_formatting() {
        assert_eq!(format_usd(0.0), "$0");
        assert_eq!(format_usd(1234567.6), "$1,234,568");
        assert_eq!(format_usd(-42.4), "-$42");
        assert_eq!(format_usd(26_854_599_000_000.0), "$26,854,599,000,000");
        assert_eq!(format_usd(f64::NAN), "N/A");
    }

    #[test]
    fn huge_values_keep_separators() {
        assert_eq!(format_usd(1e19), "$10,000,000,000,000,000,000");
        assert_eq!(format_usd(-1e19), "-$10,000,000,000,000,000,000");
        let beyond = format_usd(1e40);
        assert!(beyond.starts_with("$10,000,000,000,"));
        assert!(beyond.trim_start_matches('$').split(',').skip(1).all(|g| g.len() == 3));
        assert_eq!(group_thousands("1234567"), "1,234,567");
        assert_eq!(group_thousands("123"), "123");
    }

    #[test]
    fn lags_accept_underscores_and_whitespace() {
        assert_eq!(parse_lag("GDP_lag_1", " 1_000 ").unwrap(), 1000.0);
        assert!(parse_lag("GDP_lag_1", "abc").is_err());
        assert!(parse_lag("GDP_lag_1", "inf").is_err());
        assert!(parse_lag("GDP_lag_1", "").is_err());
    }
}
