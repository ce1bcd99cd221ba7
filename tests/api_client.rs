//! Client tests against a one-shot HTTP server on localhost.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};
use wbi_atlas::models::{GdpLags, PredictionRequest};
use wbi_atlas::{ApiError, Client, Indicator};

/// Serve exactly one request with `status` and `body`; the handle yields the
/// request line and body that were received.
fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<(String, String)>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream);
        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();

        let mut content_length = 0usize;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            if line == "\r\n" || line.is_empty() {
                break;
            }
            if let Some((k, v)) = line.split_once(':')
                && k.eq_ignore_ascii_case("content-length")
            {
                content_length = v.trim().parse().unwrap();
            }
        }
        let mut req_body = vec![0u8; content_length];
        reader.read_exact(&mut req_body).unwrap();

        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let mut stream = reader.into_inner();
        stream.write_all(response.as_bytes()).unwrap();
        stream.flush().unwrap();
        (
            request_line.trim_end().to_string(),
            String::from_utf8(req_body).unwrap(),
        )
    });
    (base, handle)
}

#[test]
fn fetch_series_hits_indicator_path() {
    let (base, server) = serve_once(
        "200 OK",
        r#"[{"date":"2021","value":3.1},{"date":"2020","value":null}]"#,
    );
    let client = Client::with_base_url(base).unwrap();
    let series = client.fetch_series(Indicator::Unemployment, "ZAF").unwrap();
    let (request_line, _) = server.join().unwrap();

    assert_eq!(request_line, "GET /api/data/unemployment/ZAF HTTP/1.1");
    assert_eq!(series.len(), 2);
    assert_eq!(series.latest_value(), Some(3.1));
}

#[test]
fn malformed_body_is_a_decode_error() {
    let (base, server) = serve_once("200 OK", r#"{"oops": true}"#);
    let client = Client::with_base_url(base).unwrap();
    let err = client.fetch_series(Indicator::Gdp, "DEU").unwrap_err();
    server.join().unwrap();
    assert!(matches!(err, ApiError::Decode { .. }), "{err:?}");
    assert!(!err.is_network());
    assert!(err.user_message().starts_with("API error"));
}

#[test]
fn http_error_carries_server_message() {
    let (base, server) = serve_once("404 Not Found", r#"{"error":"No data for XYZ"}"#);
    let client = Client::with_base_url(base).unwrap();
    let err = client.fetch_series(Indicator::Gdp, "XYZ").unwrap_err();
    server.join().unwrap();
    match err {
        ApiError::Http { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message.as_deref(), Some("No data for XYZ"));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn predict_posts_json_body() {
    let (base, server) = serve_once(
        "200 OK",
        r#"{"country":"Canada","prediction_year":2023,"predicted_gdp":2.1e12}"#,
    );
    let client = Client::with_base_url(format!("{base}/")).unwrap();
    let request = PredictionRequest {
        country_name: "Canada".into(),
        prediction_year: 2023,
        gdp_lags: GdpLags {
            gdp_lag_1: 2.0e12,
            gdp_lag_2: 1.9e12,
            gdp_lag_3: 1.8e12,
        },
    };
    let resp = client.predict(&request).unwrap();
    let (request_line, body) = server.join().unwrap();

    assert_eq!(request_line, "POST /predict HTTP/1.1");
    let sent: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(sent["gdp_lags"]["GDP_lag_2"], 1.9e12);
    assert_eq!(resp.country_name, "Canada");
    assert_eq!(resp.predicted_year, 2023);
}

#[test]
fn gdp_overview() {
    let (base, server) = serve_once("200 OK", r#"[{"date":"2022","gdp":2.5e13}]"#);
    let client = Client::with_base_url(base).unwrap();
    let rows = client.fetch_gdp().unwrap();
    let (request_line, _) = server.join().unwrap();
    assert_eq!(request_line, "GET /api/gdp HTTP/1.1");
    assert_eq!(rows.len(), 1);
}

#[test]
fn refused_connection_is_a_network_error() {
    let port = {
        let l = TcpListener::bind("127.0.0.1:0").unwrap();
        l.local_addr().unwrap().port()
    };
    let client = Client::with_base_url(format!("http://127.0.0.1:{port}")).unwrap();
    let err = client.fetch_series(Indicator::Gdp, "DEU").unwrap_err();
    assert!(err.is_network(), "{err:?}");
}
