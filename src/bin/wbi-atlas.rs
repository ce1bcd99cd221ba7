use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use regex::Regex;
use std::path::{Path, PathBuf};
use wbi_atlas::chart::gdp_overview_spec;
use wbi_atlas::geo::{MapView, WorldMap};
use wbi_atlas::predict::{PREDICTION_COUNTRIES, PredictionForm, PredictionOutcome};
use wbi_atlas::viz::{fonts, map as map_viz};
use wbi_atlas::{
    AtlasConfig, ChartRenderer, ChartType, Client, DashboardState, Indicator, RenderOutcome,
    SelectedCountry,
};
use wbi_atlas::{stats, storage, viz};

#[derive(Parser, Debug)]
#[command(
    name = "wbi-atlas",
    version,
    about = "Compare economic indicators across countries and query the GDP forecast model"
)]
struct Cli {
    /// JSON config file (missing keys keep their defaults).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Base URL of the dashboard data server, e.g. http://127.0.0.1:5000
    #[arg(long, global = true)]
    api_base: Option<String>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compare one indicator across countries (and optionally save, plot, and print stats).
    Chart(ChartArgs),
    /// Plot the server's GDP overview series.
    Gdp(GdpArgs),
    /// Ask the model for a GDP forecast from the last three years of GDP.
    Predict(PredictArgs),
    /// Draw the world map with the given countries highlighted.
    Map(MapArgs),
}

#[derive(ValueEnum, Clone, Debug)]
enum OutFormat {
    Csv,
    Json,
}

#[derive(Args, Debug)]
struct ChartArgs {
    /// Countries separated by comma or semicolon, optionally with a display name (e.g., DEU:Germany,USA)
    #[arg(short, long)]
    countries: String,
    /// gdp, inflation or unemployment
    #[arg(short, long, default_value = "gdp")]
    indicator: Indicator,
    /// line, bar or pie
    #[arg(short = 't', long = "type", default_value = "line")]
    chart_type: ChartType,
    /// Create a chart at the given path (.svg or .png).
    #[arg(long)]
    plot: Option<PathBuf>,
    /// Write the Plotly-compatible chart spec as JSON.
    #[arg(long)]
    spec: Option<PathBuf>,
    /// Save fetched series to file (format inferred by --format or extension).
    #[arg(long)]
    out: Option<PathBuf>,
    /// Output format (csv or json). If omitted, inferred from --out extension.
    #[arg(long, value_enum)]
    format: Option<OutFormat>,
    /// Width of the plot (default from config, 1000).
    #[arg(long)]
    width: Option<u32>,
    /// Height of the plot (default from config, 600).
    #[arg(long)]
    height: Option<u32>,
    /// Print per-country statistics to stdout.
    #[arg(long, default_value_t = false)]
    stats: bool,
}

#[derive(Args, Debug)]
struct GdpArgs {
    #[arg(long)]
    plot: Option<PathBuf>,
    #[arg(long)]
    spec: Option<PathBuf>,
    #[arg(long)]
    width: Option<u32>,
    #[arg(long)]
    height: Option<u32>,
}

#[derive(Args, Debug)]
struct PredictArgs {
    /// Country name as the model knows it (e.g., "United States").
    #[arg(long, required_unless_present = "list_countries")]
    country: Option<String>,
    /// GDP one year before the forecast year (USD).
    #[arg(long = "lag1", required_unless_present = "list_countries")]
    lag1: Option<String>,
    /// GDP two years before.
    #[arg(long = "lag2", required_unless_present = "list_countries")]
    lag2: Option<String>,
    /// GDP three years before.
    #[arg(long = "lag3", required_unless_present = "list_countries")]
    lag3: Option<String>,
    /// Forecast year (default from config, 2023).
    #[arg(long)]
    year: Option<i32>,
    /// List the countries the model was trained on and exit.
    #[arg(long, default_value_t = false)]
    list_countries: bool,
}

#[derive(Args, Debug)]
struct MapArgs {
    /// GeoJSON file or http(s) URL (default from config).
    #[arg(long)]
    geography: Option<String>,
    /// Country codes to highlight, separated by comma or semicolon.
    #[arg(long, default_value = "")]
    select: String,
    /// Output image (.svg or .png).
    #[arg(long)]
    out: PathBuf,
    #[arg(long, default_value_t = 960)]
    width: u32,
    #[arg(long, default_value_t = 600)]
    height: u32,
}

fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(x) if x.is_finite() => {
            // Format up to 4 decimals, then trim trailing zeros and trailing dot.
            let s = format!("{:.4}", x);
            s.trim_end_matches('0').trim_end_matches('.').to_string()
        }
        _ => "NA".to_string(),
    }
}

fn parse_list(s: &str) -> Vec<String> {
    s.split([',', ';'])
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// `DEU:Germany,USA` -> [(DEU, Germany), (USA, USA)]
fn parse_countries(s: &str) -> Result<Vec<SelectedCountry>> {
    let re = Regex::new(r"^([A-Za-z0-9]{2,3})(?::(.+))?$")?;
    parse_list(s)
        .iter()
        .map(|item| {
            let caps = re
                .captures(item)
                .with_context(|| format!("invalid country '{item}', expected CODE or CODE:Name"))?;
            let code = caps[1].to_ascii_uppercase();
            let name = caps
                .get(2)
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_else(|| code.clone());
            Ok(SelectedCountry::new(code, name))
        })
        .collect()
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let cfg = AtlasConfig::load_or_default(cli.config.as_deref())?.with_api_base(cli.api_base);
    fonts::init(cfg.font_path.as_deref());
    match cli.cmd {
        Command::Chart(args) => cmd_chart(&cfg, args),
        Command::Gdp(args) => cmd_gdp(&cfg, args),
        Command::Predict(args) => cmd_predict(&cfg, args),
        Command::Map(args) => cmd_map(&cfg, args),
    }
}

fn write_spec(spec: &wbi_atlas::ChartSpec, path: &Path) -> Result<()> {
    std::fs::write(path, spec.to_json()?).with_context(|| format!("write {}", path.display()))?;
    eprintln!("Wrote chart spec to {}", path.display());
    Ok(())
}

fn cmd_chart(cfg: &AtlasConfig, args: ChartArgs) -> Result<()> {
    let countries = parse_countries(&args.countries)?;
    if countries.is_empty() {
        bail!("--countries must name at least one country");
    }

    let mut state = DashboardState::new(args.indicator, args.chart_type);
    for c in &countries {
        if !state.is_selected(&c.code) {
            state.toggle_country(&c.code, &c.name);
        }
    }

    let client = Client::new(cfg)?;
    eprintln!(
        "{}",
        wbi_atlas::chart::loading_message(args.indicator, args.chart_type, state.selection().len())
    );
    let chart = match ChartRenderer::new(&client).render_request(&state.snapshot()) {
        RenderOutcome::Chart(chart) => chart,
        RenderOutcome::Failed { message } => bail!(message),
        RenderOutcome::Hidden => bail!("nothing selected"),
    };
    for f in &chart.failures {
        eprintln!("Skipped {} ({}): {}", f.country.name, f.country.code, f.message);
    }

    if let Some(path) = args.out.as_ref() {
        let fmt = match args.format {
            Some(OutFormat::Csv) => "csv",
            Some(OutFormat::Json) => "json",
            None => path.extension().and_then(|e| e.to_str()).unwrap_or("csv"),
        }
        .to_ascii_lowercase();
        match fmt.as_str() {
            "csv" => storage::save_csv(args.indicator, &chart.series, path)?,
            "json" => storage::save_json(args.indicator, &chart.series, path)?,
            other => bail!("unsupported format: {}", other),
        }
        let rows: usize = chart.series.iter().map(|(_, s)| s.len()).sum();
        eprintln!("Saved {} rows to {}", rows, path.display());
    }

    if let Some(path) = args.spec.as_ref() {
        write_spec(&chart.spec, path)?;
    }

    if let Some(plot_path) = args.plot.as_ref() {
        viz::render_to_file(
            &chart.spec,
            plot_path,
            args.width.unwrap_or(cfg.chart_width),
            args.height.unwrap_or(cfg.chart_height),
            &cfg.locale,
        )?;
        eprintln!("Wrote plot to {}", plot_path.display());
    }

    if args.stats {
        for s in stats::summarize(&chart.series) {
            println!(
                "{} • {}  count={} missing={}  min={} max={} mean={} median={} latest={}",
                s.code,
                s.name,
                s.count,
                s.missing,
                fmt_opt(s.min),
                fmt_opt(s.max),
                fmt_opt(s.mean),
                fmt_opt(s.median),
                s.latest
                    .map(|(year, v)| format!("{}@{}", fmt_opt(Some(v)), year))
                    .unwrap_or_else(|| "NA".into())
            );
        }
    }

    if args.out.is_none() && args.spec.is_none() && args.plot.is_none() && !args.stats {
        println!("{}", chart.spec.to_json()?);
    }
    Ok(())
}

fn cmd_gdp(cfg: &AtlasConfig, args: GdpArgs) -> Result<()> {
    let client = Client::new(cfg)?;
    let points = client.fetch_gdp()?;
    let spec = gdp_overview_spec(&points, "GDP");

    if let Some(path) = args.spec.as_ref() {
        write_spec(&spec, path)?;
    }
    if let Some(plot_path) = args.plot.as_ref() {
        viz::render_to_file(
            &spec,
            plot_path,
            args.width.unwrap_or(cfg.chart_width),
            args.height.unwrap_or(cfg.chart_height),
            &cfg.locale,
        )?;
        eprintln!("Wrote plot to {}", plot_path.display());
    }
    if args.spec.is_none() && args.plot.is_none() {
        for p in &points {
            println!("{}\t{}", p.date, fmt_opt(p.gdp));
        }
    }
    Ok(())
}

fn cmd_predict(cfg: &AtlasConfig, args: PredictArgs) -> Result<()> {
    if args.list_countries {
        for c in PREDICTION_COUNTRIES {
            println!("{c}");
        }
        return Ok(());
    }
    let country = args.country.unwrap_or_default();
    if !PREDICTION_COUNTRIES.contains(&country.trim()) {
        log::warn!("{} is not one of the model's training countries", country);
    }

    let mut form = PredictionForm::new(
        &country,
        args.lag1.as_deref().unwrap_or_default(),
        args.lag2.as_deref().unwrap_or_default(),
        args.lag3.as_deref().unwrap_or_default(),
    );
    form.prediction_year = args.year.unwrap_or(cfg.prediction_year);

    let client = Client::new(cfg)?;
    match form.submit(&client) {
        PredictionOutcome::Forecast(d) => {
            println!("Country: {}", d.country);
            println!("Year: {}", d.year);
            println!("Predicted GDP: {}", d.formatted_gdp);
            Ok(())
        }
        PredictionOutcome::Error(message) => bail!(message),
    }
}

fn cmd_map(cfg: &AtlasConfig, args: MapArgs) -> Result<()> {
    let source = args.geography.as_deref().unwrap_or(&cfg.geography_url);
    let world = if source.starts_with("http://") || source.starts_with("https://") {
        let client = Client::new(cfg)?;
        let text = client
            .fetch_geography(source)
            .with_context(|| format!("download {source}"))?;
        WorldMap::from_geojson_str(&text)?
    } else {
        WorldMap::load(source)?
    };

    let view = MapView::new(world, args.width, args.height);
    let mut state = DashboardState::default();
    for code in parse_list(&args.select) {
        let code = code.to_ascii_uppercase();
        match view.country(&code) {
            Some(c) if !state.is_selected(&c.code) => {
                state.toggle_country(&c.code, &c.name);
            }
            Some(_) => {}
            None => eprintln!("Unknown country code {code}, not on the map"),
        }
    }

    map_viz::render_map_to_file(&view, &state, None, &args.out)?;
    eprintln!(
        "Wrote map with {} selected country(ies) to {}",
        state.selection().len(),
        args.out.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countries_with_and_without_names() {
        let got = parse_countries("deu:Germany; USA").unwrap();
        assert_eq!(
            got,
            vec![
                SelectedCountry::new("DEU", "Germany"),
                SelectedCountry::new("USA", "USA")
            ]
        );
        assert!(parse_countries("Germany").is_err());
    }
}
