use std::fs;
use tempfile::tempdir;
use wbi_atlas::chart::{build_chart_spec, gdp_overview_spec};
use wbi_atlas::geo::{MapView, WorldMap};
use wbi_atlas::models::GdpPoint;
use wbi_atlas::viz::{self, map as map_viz};
use wbi_atlas::{
    ChartType, DashboardState, Indicator, IndicatorSeries, Observation, SelectedCountry,
};

fn sample() -> Vec<(SelectedCountry, IndicatorSeries)> {
    let series = |vals: [Option<f64>; 3]| {
        IndicatorSeries::new(
            [2021, 2020, 2019]
                .into_iter()
                .zip(vals)
                .map(|(date, value)| Observation { date, value })
                .collect(),
        )
    };
    vec![
        (
            SelectedCountry::new("DEU", "Germany"),
            series([Some(4.2e12), None, Some(3.9e12)]),
        ),
        (
            SelectedCountry::new("USA", "United States"),
            series([Some(2.3e13), Some(2.1e13), Some(2.14e13)]),
        ),
    ]
}

#[test]
fn every_chart_type_renders_svg() {
    let dir = tempdir().unwrap();
    for chart_type in ChartType::ALL {
        let spec = build_chart_spec(Indicator::Gdp, chart_type, &sample());
        let path = dir.path().join(format!("{}.svg", chart_type));
        viz::render_to_file(&spec, &path, 800, 500, "en").unwrap();
        let svg = fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"), "{chart_type}: not an svg");
        assert!(svg.len() > 200, "{chart_type}: svg has content");
    }
}

#[test]
fn png_output_for_non_svg_extension() {
    let dir = tempdir().unwrap();
    let spec = build_chart_spec(Indicator::Inflation, ChartType::Bar, &sample());
    let path = dir.path().join("chart.png");
    viz::render_to_file(&spec, &path, 640, 400, "de").unwrap();
    let bytes = fs::read(&path).unwrap();
    assert_eq!(&bytes[1..4], b"PNG");
}

#[test]
fn rgb_buffer_matches_size() {
    let spec = gdp_overview_spec(
        &[
            GdpPoint { date: 2021, gdp: Some(2.3e13) },
            GdpPoint { date: 2020, gdp: Some(2.1e13) },
        ],
        "GDP",
    );
    let buf = viz::render_to_rgb(&spec, 320, 200, "en").unwrap();
    assert_eq!(buf.len(), 320 * 200 * 3);
}

#[test]
fn tiny_canvas_is_an_error() {
    let spec = build_chart_spec(Indicator::Gdp, ChartType::Line, &sample());
    assert!(viz::render_to_rgb(&spec, 40, 40, "en").is_err());
}

#[test]
fn pie_slices_share_the_whole() {
    let spec = build_chart_spec(Indicator::Gdp, ChartType::Pie, &sample());
    let slices = viz::pie_slices(&spec.data[0]);
    assert_eq!(slices.len(), 2);
    let total: f64 = slices.iter().map(|s| s.fraction).sum();
    assert!((total - 1.0).abs() < 1e-9);
    assert_eq!(slices[0].label, "Germany");
}

#[test]
fn map_renders_with_selection() {
    let world = WorldMap::from_geojson_str(
        r#"{"type":"FeatureCollection","features":[{"type":"Feature","id":"AAA",
        "properties":{"name":"Square"},"geometry":{"type":"Polygon",
        "coordinates":[[[-40,-20],[-10,-20],[-10,20],[-40,20],[-40,-20]]]}}]}"#,
    )
    .unwrap();
    let view = MapView::new(world, 480, 300);
    let mut state = DashboardState::default();
    state.toggle_country("AAA", "Square");

    let buf = map_viz::render_map_to_rgb(&view, &state, None).unwrap();
    assert_eq!(buf.len(), 480 * 300 * 3);

    let dir = tempdir().unwrap();
    let path = dir.path().join("map.svg");
    map_viz::render_map_to_file(&view, &state, Some("AAA"), &path).unwrap();
    assert!(fs::read_to_string(&path).unwrap().contains("<svg"));
}
