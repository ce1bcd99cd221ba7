use std::sync::atomic::{AtomicUsize, Ordering};
use wbi_atlas::predict::{NETWORK_MESSAGE, PREDICTION_COUNTRIES, VALIDATION_MESSAGE};
use wbi_atlas::models::{PredictionRequest, PredictionResponse};
use wbi_atlas::{ApiError, PredictionForm, PredictionOutcome, PredictionService};

struct FakeModel {
    calls: AtomicUsize,
    answer: fn(&PredictionRequest) -> Result<PredictionResponse, ApiError>,
}

impl FakeModel {
    fn new(answer: fn(&PredictionRequest) -> Result<PredictionResponse, ApiError>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            answer,
        }
    }
}

impl PredictionService for FakeModel {
    fn predict(&self, request: &PredictionRequest) -> Result<PredictionResponse, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.answer)(request)
    }
}

fn echo_sum(r: &PredictionRequest) -> Result<PredictionResponse, ApiError> {
    Ok(PredictionResponse {
        predicted_gdp: r.gdp_lags.gdp_lag_1 + r.gdp_lags.gdp_lag_2 + r.gdp_lags.gdp_lag_3,
        country_name: r.country_name.clone(),
        predicted_year: r.prediction_year,
    })
}

#[test]
fn blank_country_is_rejected_without_a_request() {
    let model = FakeModel::new(echo_sum);
    let form = PredictionForm::new("  ", "1", "2", "3");

    assert_eq!(
        form.submit(&model),
        PredictionOutcome::Error(VALIDATION_MESSAGE.to_string())
    );
    assert_eq!(model.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn non_numeric_lag_is_rejected_without_a_request() {
    let model = FakeModel::new(echo_sum);
    let form = PredictionForm::new("Germany", "1e12", "lots", "3");
    assert_eq!(
        form.submit(&model),
        PredictionOutcome::Error(VALIDATION_MESSAGE.to_string())
    );
    assert_eq!(model.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn valid_form_posts_once_and_formats_dollars() {
    let model = FakeModel::new(echo_sum);
    let form = PredictionForm::new(
        "United States",
        "9000000000000",
        "9000000000000",
        "8854599000000",
    );

    match form.submit(&model) {
        PredictionOutcome::Forecast(d) => {
            assert_eq!(d.country, "United States");
            assert_eq!(d.year, 2023);
            assert_eq!(d.formatted_gdp, "$26,854,599,000,000");
        }
        other => panic!("expected forecast, got {other:?}"),
    }
    assert_eq!(model.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn request_uses_model_field_names() {
    let form = PredictionForm::new("Japan", "1", "2", "3");
    let body = serde_json::to_value(form.validate().unwrap()).unwrap();
    assert_eq!(body["country_name"], "Japan");
    assert_eq!(body["prediction_year"], 2023);
    assert_eq!(body["gdp_lags"]["GDP_lag_1"], 1.0);
    assert_eq!(body["gdp_lags"]["GDP_lag_3"], 3.0);
}

#[test]
fn server_error_text_is_shown() {
    let model = FakeModel::new(|_| {
        Err(ApiError::Http {
            status: 400,
            message: Some("Country not found".into()),
        })
    });
    let form = PredictionForm::new("Atlantis", "1", "2", "3");
    assert_eq!(
        form.submit(&model),
        PredictionOutcome::Error("Error: Country not found".into())
    );
}

#[test]
fn error_without_text_is_unknown() {
    let model = FakeModel::new(|_| {
        Err(ApiError::Http {
            status: 500,
            message: None,
        })
    });
    let form = PredictionForm::new("Germany", "1", "2", "3");
    assert_eq!(
        form.submit(&model),
        PredictionOutcome::Error("Error: Unknown API error".into())
    );
}

#[test]
fn unreachable_server_is_a_network_error() {
    // Nothing listens on port 9 of localhost in a test sandbox.
    let client = wbi_atlas::Client::with_base_url("http://127.0.0.1:9").unwrap();
    let form = PredictionForm::new("Germany", "1", "2", "3");
    assert_eq!(
        form.submit(&client),
        PredictionOutcome::Error(NETWORK_MESSAGE.to_string())
    );
}

#[test]
fn fifteen_training_countries() {
    assert_eq!(PREDICTION_COUNTRIES.len(), 15);
    assert!(PREDICTION_COUNTRIES.contains(&"Korea, Rep."));
}
