/*!
 * Desktop dashboard for wbi-atlas
 *
 * Click countries on the world map to compare an economic indicator across them.
 * The chart panel opens with the first selected country and offers indicator and
 * chart-type switches, export, and a list of countries whose data could not be loaded.
 * A separate window queries the GDP forecast model.
 *
 * Configuration: set WBI_ATLAS_CONFIG to a JSON config file; RUST_LOG for logging.
 */

use anyhow::Result;
use eframe::egui;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use wbi_atlas::chart::{RenderedChart, loading_message};
use wbi_atlas::geo::{MapView, WorldMap};
use wbi_atlas::predict::{PREDICTION_COUNTRIES, PredictionForm, PredictionOutcome};
use wbi_atlas::viz::{fonts, map as map_viz};
use wbi_atlas::{
    AtlasConfig, ChartRenderer, ChartType, Client, DashboardState, Indicator, RenderOutcome,
    StateChange,
};
use wbi_atlas::{storage, viz};

const MAP_W: u32 = 960;
const MAP_H: u32 = 540;
const CHART_W: u32 = 640;
const CHART_H: u32 = 420;

fn main() -> Result<()> {
    env_logger::init();

    let config_path = std::env::var_os("WBI_ATLAS_CONFIG").map(PathBuf::from);
    let cfg = AtlasConfig::load_or_default(config_path.as_deref())?;
    if !fonts::init(cfg.font_path.as_deref()) {
        log::warn!("charts will be drawn without text");
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 720.0])
            .with_min_inner_size([800.0, 500.0])
            .with_title("Economic Indicators Atlas"),
        ..Default::default()
    };

    eframe::run_native(
        "wbi-atlas",
        options,
        Box::new(|cc| Ok(Box::new(AtlasApp::new(&cc.egui_ctx, cfg)?))),
    )
    .map_err(|e| anyhow::anyhow!("gui failed: {e}"))
}

/// Chart on screen plus its source data.
struct ChartView {
    rendered: RenderedChart,
    texture: Option<egui::TextureHandle>,
    image_error: Option<String>,
}

/// Result of one background chart render.
struct ChartMessage {
    revision: u64,
    outcome: RenderOutcome,
    image: Option<Result<Vec<u8>, String>>,
}

struct AtlasApp {
    cfg: AtlasConfig,
    client: Client,
    state: DashboardState,

    // Map
    view: Option<MapView>,
    map_rx: Option<mpsc::Receiver<Result<WorldMap, String>>>,
    map_texture: Option<egui::TextureHandle>,
    map_dirty: bool,
    map_status: String,
    hovered: Option<String>,

    // Chart panel
    chart_rx: Option<mpsc::Receiver<ChartMessage>>,
    chart: Option<ChartView>,
    chart_status: String,
    chart_error: String,
    updated_at: String,
    export_dir: PathBuf,
    export_message: String,

    // Prediction window
    show_prediction: bool,
    form: PredictionForm,
    prediction_rx: Option<mpsc::Receiver<PredictionOutcome>>,
    prediction: Option<PredictionOutcome>,
}

fn chart_type_label(t: ChartType) -> &'static str {
    match t {
        ChartType::Line => "Line Chart",
        ChartType::Bar => "Bar Chart",
        ChartType::Pie => "Pie Chart",
    }
}

fn rgb_texture(ctx: &egui::Context, name: &str, w: u32, h: u32, buf: &[u8]) -> egui::TextureHandle {
    let image = egui::ColorImage::from_rgb([w as usize, h as usize], buf);
    ctx.load_texture(name, image, egui::TextureOptions::LINEAR)
}

impl AtlasApp {
    fn new(ctx: &egui::Context, cfg: AtlasConfig) -> Result<Self> {
        let client = Client::new(&cfg)?;
        // Default to user's home directory for exports
        let export_dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        let form = PredictionForm {
            prediction_year: cfg.prediction_year,
            ..PredictionForm::default()
        };

        let mut app = Self {
            cfg,
            client,
            state: DashboardState::default(),
            view: None,
            map_rx: None,
            map_texture: None,
            map_dirty: false,
            map_status: String::new(),
            hovered: None,
            chart_rx: None,
            chart: None,
            chart_status: String::new(),
            chart_error: String::new(),
            updated_at: String::new(),
            export_dir,
            export_message: String::new(),
            show_prediction: false,
            form,
            prediction_rx: None,
            prediction: None,
        };
        app.load_geography(ctx);
        Ok(app)
    }

    fn load_geography(&mut self, ctx: &egui::Context) {
        self.map_status = "Loading world map...".to_string();
        let (sender, receiver) = mpsc::channel();
        self.map_rx = Some(receiver);

        let source = self.cfg.geography_url.clone();
        let client = self.client.clone();
        let ctx = ctx.clone();
        thread::spawn(move || {
            let result = if source.starts_with("http://") || source.starts_with("https://") {
                client
                    .fetch_geography(&source)
                    .map_err(|e| e.to_string())
                    .and_then(|text| {
                        WorldMap::from_geojson_str(&text).map_err(|e| format!("{e:#}"))
                    })
            } else {
                WorldMap::load(&source).map_err(|e| format!("{e:#}"))
            };
            let _ = sender.send(result);
            ctx.request_repaint();
        });
    }

    fn is_busy(&self) -> bool {
        self.map_rx.is_some() || self.chart_rx.is_some() || self.prediction_rx.is_some()
    }

    fn check_background_results(&mut self, ctx: &egui::Context) {
        if let Some(receiver) = &self.map_rx
            && let Ok(result) = receiver.try_recv()
        {
            self.map_rx = None;
            match result {
                Ok(world) => {
                    self.map_status =
                        format!("{} countries. Click to select.", world.countries().len());
                    self.view = Some(MapView::new(world, MAP_W, MAP_H));
                    self.map_dirty = true;
                }
                Err(e) => {
                    log::error!("world map unavailable: {e}");
                    self.map_status = format!("Could not load world map: {e}");
                }
            }
        }

        if let Some(receiver) = &self.chart_rx
            && let Ok(message) = receiver.try_recv()
        {
            self.chart_rx = None;
            self.apply_chart(ctx, message);
        }

        if let Some(receiver) = &self.prediction_rx
            && let Ok(outcome) = receiver.try_recv()
        {
            self.prediction_rx = None;
            self.prediction = Some(outcome);
        }
    }

    /// React to a state mutation: restyle the map and rebuild the chart when needed.
    fn on_change(&mut self, ctx: &egui::Context, change: StateChange) {
        if matches!(change, StateChange::Selection { .. } | StateChange::Cleared) {
            self.map_dirty = true;
        }
        if change.needs_redraw() {
            self.request_chart(ctx);
        }
    }

    fn request_chart(&mut self, ctx: &egui::Context) {
        let request = self.state.snapshot();
        self.chart_error.clear();
        self.export_message.clear();
        if request.selection.is_empty() {
            self.chart = None;
            self.chart_rx = None;
            self.chart_status.clear();
            return;
        }

        self.chart_status =
            loading_message(request.indicator, request.chart_type, request.selection.len());
        let (sender, receiver) = mpsc::channel();
        // Replacing the receiver drops any render still in flight.
        self.chart_rx = Some(receiver);

        let client = self.client.clone();
        let locale = self.cfg.locale.clone();
        let ctx = ctx.clone();
        thread::spawn(move || {
            let outcome = ChartRenderer::new(&client).render_request(&request);
            let image = match &outcome {
                RenderOutcome::Chart(chart) => Some(
                    viz::render_to_rgb(&chart.spec, CHART_W, CHART_H, &locale)
                        .map_err(|e| format!("{e:#}")),
                ),
                _ => None,
            };
            let _ = sender.send(ChartMessage {
                revision: request.revision,
                outcome,
                image,
            });
            ctx.request_repaint();
        });
    }

    fn apply_chart(&mut self, ctx: &egui::Context, message: ChartMessage) {
        if message.revision != self.state.revision() {
            log::debug!(
                "dropping chart for revision {} (now {})",
                message.revision,
                self.state.revision()
            );
            return;
        }
        self.chart_status.clear();
        match message.outcome {
            RenderOutcome::Hidden => self.chart = None,
            RenderOutcome::Failed { message } => {
                self.chart = None;
                self.chart_error = message;
            }
            RenderOutcome::Chart(rendered) => {
                let (texture, image_error) = match message.image {
                    Some(Ok(buf)) => (
                        Some(rgb_texture(ctx, "chart", CHART_W, CHART_H, &buf)),
                        None,
                    ),
                    Some(Err(e)) => (None, Some(e)),
                    None => (None, None),
                };
                self.chart = Some(ChartView {
                    rendered,
                    texture,
                    image_error,
                });
                self.updated_at = chrono::Local::now().format("%H:%M:%S").to_string();
            }
        }
    }

    fn map_ui(&mut self, ui: &mut egui::Ui) {
        let ctx = ui.ctx().clone();
        let Some(view) = &self.view else {
            ui.centered_and_justified(|ui| {
                if self.map_rx.is_some() {
                    ui.spinner();
                } else {
                    ui.colored_label(egui::Color32::RED, &self.map_status);
                }
            });
            return;
        };

        if self.map_dirty || self.map_texture.is_none() {
            match map_viz::render_map_to_rgb(view, &self.state, self.hovered.as_deref()) {
                Ok(buf) => {
                    let (w, h) = view.size();
                    self.map_texture = Some(rgb_texture(&ctx, "map", w, h, &buf));
                }
                Err(e) => self.map_status = format!("Map render failed: {e:#}"),
            }
            self.map_dirty = false;
        }
        let Some(texture) = &self.map_texture else {
            return;
        };

        let (w, h) = view.size();
        let avail = ui.available_size();
        let scale = (avail.x / w as f32).min(avail.y / h as f32).max(0.1);
        let response = ui.add(
            egui::Image::new((texture.id(), egui::vec2(w as f32 * scale, h as f32 * scale)))
                .sense(egui::Sense::click()),
        );
        // Screen point -> map pixel.
        let to_map = |p: egui::Pos2| {
            (
                ((p.x - response.rect.min.x) / scale) as f64,
                ((p.y - response.rect.min.y) / scale) as f64,
            )
        };

        let mut hovered = None;
        if let Some(pos) = response.hover_pos() {
            let (x, y) = to_map(pos);
            if let Some(tip) = view.hover(x, y) {
                let anchor =
                    response.rect.min + egui::vec2(tip.x as f32 * scale, tip.y as f32 * scale);
                let painter = ui.painter();
                let galley = painter.layout_no_wrap(
                    tip.text,
                    egui::FontId::proportional(13.0),
                    egui::Color32::BLACK,
                );
                let bg = egui::Rect::from_min_size(anchor, galley.size()).expand(4.0);
                painter.rect_filled(bg, 3.0, egui::Color32::from_white_alpha(230));
                painter.galley(anchor, galley, egui::Color32::BLACK);
            }
            hovered = view.hit_test(x, y).map(|c| c.code.clone());
        }

        let mut change = None;
        if response.clicked()
            && let Some(pos) = response.interact_pointer_pos()
        {
            let (x, y) = to_map(pos);
            change = view.click(x, y, &mut self.state);
        }

        if hovered != self.hovered {
            self.hovered = hovered;
            self.map_dirty = true;
        }
        if let Some(change) = change {
            self.on_change(&ctx, change);
        }
    }

    fn chart_panel(&mut self, ui: &mut egui::Ui) {
        let ctx = ui.ctx().clone();
        let mut changes = Vec::new();

        ui.heading("Country comparison");
        ui.add_space(5.0);

        let mut indicator = self.state.indicator();
        let mut chart_type = self.state.chart_type();
        ui.horizontal(|ui| {
            egui::ComboBox::from_label("Indicator")
                .selected_text(indicator.display_name())
                .show_ui(ui, |ui| {
                    for i in Indicator::ALL {
                        ui.selectable_value(&mut indicator, i, i.display_name());
                    }
                });
            egui::ComboBox::from_label("Chart")
                .selected_text(chart_type_label(chart_type))
                .show_ui(ui, |ui| {
                    for t in ChartType::ALL {
                        ui.selectable_value(&mut chart_type, t, chart_type_label(t));
                    }
                });
        });
        changes.push(self.state.set_indicator(indicator));
        changes.push(self.state.set_chart_type(chart_type));

        ui.horizontal(|ui| {
            if ui.button("Clear selection").clicked() {
                changes.push(self.state.clear_selection());
            }
            if ui.button("Close").clicked() {
                changes.push(self.state.close_panel());
            }
        });

        let names: Vec<&str> = self.state.selection().iter().map(|c| c.name.as_str()).collect();
        ui.label(format!("Selected: {}", names.join(", ")));
        ui.separator();

        if self.chart_rx.is_some() {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(&self.chart_status);
            });
        }
        if !self.chart_error.is_empty() {
            ui.colored_label(egui::Color32::RED, &self.chart_error);
        }

        let mut export_chart = false;
        let mut export_data = false;
        if let Some(chart) = &self.chart {
            if let Some(texture) = &chart.texture {
                let width = ui.available_width().min(CHART_W as f32);
                let size = egui::vec2(width, width * CHART_H as f32 / CHART_W as f32);
                ui.image((texture.id(), size));
            } else if let Some(e) = &chart.image_error {
                ui.colored_label(egui::Color32::RED, format!("Could not draw chart: {e}"));
            }

            for f in &chart.rendered.failures {
                ui.colored_label(
                    egui::Color32::from_rgb(200, 120, 0),
                    format!("No data for {}: {}", f.country.name, f.message),
                );
            }
            if !self.updated_at.is_empty() {
                ui.weak(format!("Updated {}", self.updated_at));
            }

            ui.horizontal(|ui| {
                export_chart = ui.button("Export chart…").clicked();
                export_data = ui.button("Export data…").clicked();
            });
        }
        if !self.export_message.is_empty() {
            ui.label(&self.export_message);
        }

        if export_chart {
            self.export_chart();
        }
        if export_data {
            self.export_data();
        }
        for change in changes {
            self.on_change(&ctx, change);
        }
    }

    fn export_chart(&mut self) {
        let Some(chart) = &self.chart else {
            return;
        };
        let Some(path) = rfd::FileDialog::new()
            .set_directory(&self.export_dir)
            .set_file_name("chart.png")
            .add_filter("PNG image", &["png"])
            .add_filter("SVG image", &["svg"])
            .save_file()
        else {
            return;
        };
        self.export_message = match viz::render_to_file(
            &chart.rendered.spec,
            &path,
            self.cfg.chart_width,
            self.cfg.chart_height,
            &self.cfg.locale,
        ) {
            Ok(()) => format!("Saved {}", path.display()),
            Err(e) => format!("Export failed: {e:#}"),
        };
        if let Some(dir) = path.parent() {
            self.export_dir = dir.to_path_buf();
        }
    }

    fn export_data(&mut self) {
        let Some(chart) = &self.chart else {
            return;
        };
        let Some(path) = rfd::FileDialog::new()
            .set_directory(&self.export_dir)
            .set_file_name("data.csv")
            .add_filter("CSV", &["csv"])
            .add_filter("JSON", &["json"])
            .save_file()
        else {
            return;
        };
        let indicator = self.state.indicator();
        let result = if path.extension().and_then(|e| e.to_str()) == Some("json") {
            storage::save_json(indicator, &chart.rendered.series, &path)
        } else {
            storage::save_csv(indicator, &chart.rendered.series, &path)
        };
        self.export_message = match result {
            Ok(()) => format!("Saved {}", path.display()),
            Err(e) => format!("Export failed: {e:#}"),
        };
        if let Some(dir) = path.parent() {
            self.export_dir = dir.to_path_buf();
        }
    }

    fn start_prediction(&mut self, ctx: &egui::Context) {
        // Invalid input is reported without touching the network.
        if let Err(e) = self.form.validate() {
            self.prediction = Some(PredictionOutcome::Error(e.to_string()));
            return;
        }
        self.prediction = None;

        let (sender, receiver) = mpsc::channel();
        self.prediction_rx = Some(receiver);
        let form = self.form.clone();
        let client = self.client.clone();
        let ctx = ctx.clone();
        thread::spawn(move || {
            let _ = sender.send(form.submit(&client));
            ctx.request_repaint();
        });
    }

    fn prediction_ui(&mut self, ui: &mut egui::Ui) {
        let selected = if self.form.country.is_empty() {
            "Select a country".to_string()
        } else {
            self.form.country.clone()
        };
        egui::ComboBox::from_label("Country")
            .selected_text(selected)
            .show_ui(ui, |ui| {
                for c in PREDICTION_COUNTRIES {
                    ui.selectable_value(&mut self.form.country, c.to_string(), c);
                }
            });

        egui::Grid::new("lags").num_columns(2).show(ui, |ui| {
            ui.label("GDP lag 1 (USD):");
            ui.text_edit_singleline(&mut self.form.gdp_lag_1);
            ui.end_row();
            ui.label("GDP lag 2 (USD):");
            ui.text_edit_singleline(&mut self.form.gdp_lag_2);
            ui.end_row();
            ui.label("GDP lag 3 (USD):");
            ui.text_edit_singleline(&mut self.form.gdp_lag_3);
            ui.end_row();
        });
        ui.label(format!("Prediction year: {}", self.form.prediction_year));

        let busy = self.prediction_rx.is_some();
        ui.horizontal(|ui| {
            if ui.add_enabled(!busy, egui::Button::new("Predict")).clicked() {
                let ctx = ui.ctx().clone();
                self.start_prediction(&ctx);
            }
            if busy {
                ui.spinner();
            }
        });

        ui.add_space(8.0);
        match &self.prediction {
            Some(PredictionOutcome::Forecast(d)) => {
                ui.label(format!("Country: {}", d.country));
                ui.label(format!("Year: {}", d.year));
                ui.strong(format!("Predicted GDP: {}", d.formatted_gdp));
            }
            Some(PredictionOutcome::Error(message)) => {
                ui.colored_label(egui::Color32::RED, message);
            }
            None => {}
        }
    }
}

impl eframe::App for AtlasApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_background_results(ctx);

        // Keep the spinners moving
        if self.is_busy() {
            ctx.request_repaint();
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Economic Indicators Atlas");
                ui.separator();
                if ui.button("GDP Prediction").clicked() {
                    self.show_prediction = !self.show_prediction;
                }
                let n = self.state.selection().len();
                if n > 0
                    && !self.state.panel_visible()
                    && ui.button(format!("Show chart ({n})")).clicked()
                {
                    self.state.open_panel();
                }
                ui.label(&self.map_status);
            });
        });

        if self.state.panel_visible() {
            egui::SidePanel::right("chart_panel")
                .min_width(420.0)
                .default_width(CHART_W as f32 + 20.0)
                .show(ctx, |ui| {
                    egui::ScrollArea::vertical().show(ui, |ui| self.chart_panel(ui));
                });
        }

        egui::CentralPanel::default().show(ctx, |ui| self.map_ui(ui));

        let mut open = self.show_prediction;
        egui::Window::new("GDP Prediction")
            .open(&mut open)
            .resizable(false)
            .show(ctx, |ui| self.prediction_ui(ui));
        self.show_prediction = open;
    }
}
