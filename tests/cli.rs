use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn cli_shows_help() {
    let mut cmd = Command::cargo_bin("wbi-atlas").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("chart"))
        .stdout(predicate::str::contains("predict"));
}

#[test]
fn predict_lists_training_countries_offline() {
    let mut cmd = Command::cargo_bin("wbi-atlas").unwrap();
    cmd.args(["predict", "--list-countries"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Russian Federation"));
}

#[test]
fn predict_rejects_bad_lags_before_any_request() {
    let mut cmd = Command::cargo_bin("wbi-atlas").unwrap();
    cmd.args([
        "--api-base",
        "http://127.0.0.1:9",
        "predict",
        "--country",
        "Germany",
        "--lag1",
        "abc",
        "--lag2",
        "1",
        "--lag3",
        "1",
    ]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("valid GDP lag values"));
}

#[test]
fn unknown_indicator_is_a_usage_error() {
    let mut cmd = Command::cargo_bin("wbi-atlas").unwrap();
    cmd.args(["chart", "--countries", "DEU", "--indicator", "population"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unknown indicator"));
}

#[test]
fn map_from_local_geojson() {
    let dir = tempfile::tempdir().unwrap();
    let geo = dir.path().join("world.geojson");
    std::fs::write(
        &geo,
        r#"{"type":"FeatureCollection","features":[{"type":"Feature","id":"AAA",
        "properties":{"name":"Square"},"geometry":{"type":"Polygon",
        "coordinates":[[[-40,-20],[-10,-20],[-10,20],[-40,20],[-40,-20]]]}}]}"#,
    )
    .unwrap();
    let out = dir.path().join("map.svg");

    let mut cmd = Command::cargo_bin("wbi-atlas").unwrap();
    cmd.args(["map", "--geography"])
        .arg(&geo)
        .args(["--select", "AAA,ZZZ", "--out"])
        .arg(&out);
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Unknown country code ZZZ"));
    assert!(out.exists());
}

// Live test (opt-in): cargo test --features online
#[cfg(feature = "online")]
#[test]
fn chart_online_stats() {
    let mut cmd = Command::cargo_bin("wbi-atlas").unwrap();
    cmd.args([
        "chart",
        "--countries",
        "DEU:Germany,USA:United States",
        "--indicator",
        "gdp",
        "--stats",
    ]);
    cmd.assert().success().stdout(predicate::str::contains("DEU"));
}
