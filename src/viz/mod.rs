//! Visualization: draw a [`ChartSpec`] to **SVG**, **PNG** or an in-memory RGB buffer.
//!
//! - Distinct series colors (Microsoft Office palette)
//! - Y axis scaled to thousands/millions/billions/trillions unless the axis is a percentage
//! - Locale-aware tick labels (`30,000` vs `30.000`)
//! - Line (lines + markers), grouped Bar, and Pie charts with a legend panel on the right
//!
//! The world map has its own renderer in [`map`].

pub mod fonts;
pub mod map;
pub mod text;
pub mod util;

use crate::chart::{ChartSpec, Trace, TraceKind};
use anyhow::{Result, anyhow, bail};

use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::LineSeries;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;

use std::f64::consts::PI;
use std::path::Path;

use text::truncate_to_width;
use util::{compute_left_label_area_px, format_tick, map_locale, office_color, scaled_axis_title};

const MARGIN: u32 = 16;
const LEGEND_FONT_PX: u32 = 14;

pub(crate) fn draw_err<E: std::fmt::Debug>(e: E) -> anyhow::Error {
    anyhow!("{:?}", e)
}

/// Render to `out_path`: `.svg` uses the SVG backend, anything else is written as a bitmap (PNG).
pub fn render_to_file<P: AsRef<Path>>(
    spec: &ChartSpec,
    out_path: P,
    width: u32,
    height: u32,
    locale_tag: &str,
) -> Result<()> {
    check_size(width, height)?;
    let out_path = out_path.as_ref();
    let path_string = out_path.to_string_lossy().into_owned();

    if out_path.extension().and_then(|s| s.to_str()) == Some("svg") {
        let root = SVGBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_spec(root, spec, locale_tag)?;
    } else {
        let root = BitMapBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_spec(root, spec, locale_tag)?;
    }
    log::info!("wrote chart to {}", out_path.display());
    Ok(())
}

/// Render into a packed RGB buffer (`width * height * 3` bytes), e.g. for a GUI texture.
pub fn render_to_rgb(
    spec: &ChartSpec,
    width: u32,
    height: u32,
    locale_tag: &str,
) -> Result<Vec<u8>> {
    check_size(width, height)?;
    let mut buf = vec![255u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (width, height)).into_drawing_area();
        draw_spec(root, spec, locale_tag)?;
    }
    Ok(buf)
}

pub(crate) fn check_size(width: u32, height: u32) -> Result<()> {
    if width < 100 || height < 100 {
        bail!("chart size {width}x{height} is too small (minimum 100x100)");
    }
    Ok(())
}

/// One pie slice with its share of the total.
#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: String,
    pub value: f64,
    pub fraction: f64,
}

/// Slices to draw for a pie trace. Non-positive and non-finite values cannot be
/// drawn as a share and are skipped.
pub fn pie_slices(trace: &Trace) -> Vec<PieSlice> {
    let kept: Vec<(&String, f64)> = trace
        .labels
        .iter()
        .zip(trace.values.iter().copied())
        .filter(|(_, v)| v.is_finite() && *v > 0.0)
        .collect();
    let total: f64 = kept.iter().map(|(_, v)| v).sum();
    if total <= 0.0 {
        return Vec::new();
    }
    kept.into_iter()
        .map(|(label, value)| PieSlice {
            label: label.clone(),
            value,
            fraction: value / total,
        })
        .collect()
}

/// Split a series at missing values so lines show gaps instead of bridging them.
fn segments(points: &[(f64, Option<f64>)]) -> Vec<Vec<(f64, f64)>> {
    let mut out = Vec::new();
    let mut cur = Vec::new();
    for (x, y) in points {
        match y {
            Some(v) => cur.push((*x, *v)),
            None if !cur.is_empty() => out.push(std::mem::take(&mut cur)),
            None => {}
        }
    }
    if !cur.is_empty() {
        out.push(cur);
    }
    out
}

fn draw_spec<DB>(root: DrawingArea<DB, Shift>, spec: &ChartSpec, locale_tag: &str) -> Result<()>
where
    DB: DrawingBackend,
{
    root.fill(&WHITE).map_err(draw_err)?;
    let with_text = fonts::available();

    let title = spec.layout.title.trim();
    let area = if with_text && !title.is_empty() {
        root.titled(title, (FontFamily::SansSerif, 22))
            .map_err(draw_err)?
    } else {
        root
    };

    let (w, _h) = area.dim_in_pixel();
    let (plot_area, legend_area) = if with_text {
        let legend_w = (w as f64 * 0.2).clamp(120.0, 260.0) as i32;
        let (plot, legend) = area.split_horizontally((w as i32 - legend_w).max(100));
        (plot, Some(legend))
    } else {
        (area, None)
    };

    let legend_items = if let Some(pie) = spec.data.iter().find(|t| t.kind == TraceKind::Pie) {
        draw_pie(&plot_area, pie, with_text)?
    } else {
        draw_time_series(&plot_area, spec, locale_tag, with_text)?
    };

    if let Some(ref legend) = legend_area {
        draw_legend(legend, &legend_items)?;
        legend.present().map_err(draw_err)?;
    }
    plot_area.present().map_err(draw_err)?;
    Ok(())
}

fn draw_time_series<DB>(
    plot_area: &DrawingArea<DB, Shift>,
    spec: &ChartSpec,
    locale_tag: &str,
    with_text: bool,
) -> Result<Vec<(String, RGBAColor)>>
where
    DB: DrawingBackend,
{
    let series: Vec<(&str, Vec<(f64, Option<f64>)>)> = spec
        .data
        .iter()
        .filter(|t| matches!(t.kind, TraceKind::Scatter | TraceKind::Bar))
        .map(|t| {
            let pts = t
                .x
                .iter()
                .zip(t.y.iter())
                .map(|(x, y)| (*x as f64, y.filter(|v| v.is_finite())))
                .collect();
            (t.name.as_deref().unwrap_or(""), pts)
        })
        .collect();

    let xs: Vec<f64> = series.iter().flat_map(|(_, p)| p.iter().map(|(x, _)| *x)).collect();
    let ys: Vec<f64> = series
        .iter()
        .flat_map(|(_, p)| p.iter().filter_map(|(_, y)| *y))
        .collect();
    if xs.is_empty() || ys.is_empty() {
        log::debug!("chart has no numeric values, drawing empty frame");
        return Ok(Vec::new());
    }

    let bars = spec.data.iter().any(|t| t.kind == TraceKind::Bar);

    let (mut x_min, mut x_max) = (
        xs.iter().cloned().fold(f64::INFINITY, f64::min),
        xs.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
    );
    if bars {
        x_min -= 0.6;
        x_max += 0.6;
    } else if (x_max - x_min).abs() < f64::EPSILON {
        x_min -= 1.0;
        x_max += 1.0;
    }

    let (mut min_val, mut max_val) = (
        ys.iter().cloned().fold(f64::INFINITY, f64::min),
        ys.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
    );
    if bars {
        min_val = min_val.min(0.0);
        max_val = max_val.max(0.0);
    }
    if (max_val - min_val).abs() < f64::EPSILON {
        min_val -= 1.0;
        max_val += 1.0;
    }
    let pad = (max_val - min_val) * 0.05;
    let min_val = if bars && min_val >= 0.0 { 0.0 } else { min_val - pad };
    let max_val = max_val + pad;

    let y_title_raw = spec
        .layout
        .yaxis
        .as_ref()
        .map(|a| a.title.as_str())
        .unwrap_or("");
    let (yscale, y_title) = scaled_axis_title(y_title_raw, min_val, max_val);
    let x_title = spec
        .layout
        .xaxis
        .as_ref()
        .map(|a| a.title.clone())
        .unwrap_or_else(|| "Year".to_string());

    let y_label_count = 10usize;
    let left_px = if with_text {
        compute_left_label_area_px(min_val / yscale, max_val / yscale, y_label_count, 12)
    } else {
        0
    };

    let mut chart = ChartBuilder::on(plot_area)
        .margin(MARGIN)
        .set_label_area_size(LabelAreaPosition::Left, left_px)
        .set_label_area_size(LabelAreaPosition::Bottom, if with_text { 48 } else { 0 })
        .build_cartesian_2d(x_min..x_max, (min_val / yscale)..(max_val / yscale))
        .map_err(draw_err)?;

    if with_text {
        let (num_locale, dec_sep) = map_locale(locale_tag);
        let x_label_fmt = |x: &f64| (x.round() as i32).to_string();
        let y_label_fmt = |v: &f64| format_tick(*v, num_locale, dec_sep);
        let year_span = (x_max - x_min).round().max(1.0) as usize;
        chart
            .configure_mesh()
            .x_desc(x_title)
            .y_desc(y_title)
            .x_labels(year_span.min(12))
            .y_labels(y_label_count)
            .x_label_formatter(&x_label_fmt)
            .y_label_formatter(&y_label_fmt)
            .label_style((FontFamily::SansSerif, 12))
            .axis_desc_style((FontFamily::SansSerif, 14))
            .draw()
            .map_err(draw_err)?;
    }

    let mut legend_items = Vec::with_capacity(series.len());
    let n_series = series.len().max(1);
    let group_width = 0.8f64;
    let bar_w = group_width / n_series as f64;

    for (idx, (name, pts)) in series.iter().enumerate() {
        let color = office_color(idx);
        let scaled: Vec<(f64, Option<f64>)> =
            pts.iter().map(|(x, y)| (*x, y.map(|v| v / yscale))).collect();

        if bars {
            for (x, v) in scaled.iter().filter_map(|(x, y)| y.map(|v| (*x, v))) {
                let x0 = x - group_width / 2.0 + idx as f64 * bar_w;
                let x1 = x0 + bar_w;
                let rect =
                    Rectangle::new([(x0, 0.0f64.min(v)), (x1, 0.0f64.max(v))], color.filled());
                chart
                    .draw_series(std::iter::once(rect))
                    .map_err(draw_err)?;
            }
        } else {
            let style = ShapeStyle {
                color,
                filled: false,
                stroke_width: 2,
            };
            for seg in segments(&scaled) {
                chart
                    .draw_series(LineSeries::new(seg, style))
                    .map_err(draw_err)?;
            }
            chart
                .draw_series(
                    scaled
                        .iter()
                        .filter_map(|(x, y)| y.map(|v| Circle::new((*x, v), 3, color.filled()))),
                )
                .map_err(draw_err)?;
        }
        legend_items.push((name.to_string(), color));
    }

    Ok(legend_items)
}

fn draw_pie<DB>(
    plot_area: &DrawingArea<DB, Shift>,
    trace: &Trace,
    with_text: bool,
) -> Result<Vec<(String, RGBAColor)>>
where
    DB: DrawingBackend,
{
    let slices = pie_slices(trace);
    if slices.is_empty() {
        log::debug!("pie has no positive values, drawing empty frame");
        return Ok(Vec::new());
    }

    let (w, h) = plot_area.dim_in_pixel();
    let (cx, cy) = (w as f64 / 2.0, h as f64 / 2.0);
    let radius = w.min(h) as f64 * 0.42;

    let mut legend_items = Vec::with_capacity(slices.len());
    let mut start = -PI / 2.0; // 12 o'clock, clockwise
    for (idx, slice) in slices.iter().enumerate() {
        let color = office_color(idx);
        let sweep = slice.fraction * 2.0 * PI;
        let steps = ((slice.fraction * 180.0).ceil() as usize).max(2);

        let mut poly: Vec<(i32, i32)> = Vec::with_capacity(steps + 2);
        poly.push((cx.round() as i32, cy.round() as i32));
        for i in 0..=steps {
            let a = start + sweep * i as f64 / steps as f64;
            poly.push((
                (cx + radius * a.cos()).round() as i32,
                (cy + radius * a.sin()).round() as i32,
            ));
        }
        plot_area
            .draw(&Polygon::new(poly, color.filled()))
            .map_err(draw_err)?;

        let pct = slice.fraction * 100.0;
        // Radial percent label, skipped for slivers.
        if with_text && pct >= 4.0 {
            let mid = start + sweep / 2.0;
            let pos = (
                (cx + radius * 0.65 * mid.cos()).round() as i32,
                (cy + radius * 0.65 * mid.sin()).round() as i32,
            );
            let style = TextStyle::from((FontFamily::SansSerif, 13))
                .color(&WHITE)
                .pos(Pos::new(HPos::Center, VPos::Center));
            plot_area
                .draw(&Text::new(format!("{pct:.1}%"), pos, style))
                .map_err(draw_err)?;
        }

        legend_items.push((format!("{} ({:.1}%)", slice.label, pct), color));
        start += sweep;
    }
    Ok(legend_items)
}

fn draw_legend<DB>(area: &DrawingArea<DB, Shift>, items: &[(String, RGBAColor)]) -> Result<()>
where
    DB: DrawingBackend,
{
    let (w, _h) = area.dim_in_pixel();
    let text_max_px = w.saturating_sub(40);
    let line_h = LEGEND_FONT_PX as i32 + 8;
    let mut y = MARGIN as i32 + line_h;

    for (label, color) in items {
        area.draw(&Rectangle::new([(8, y - 5), (20, y + 5)], color.filled()))
            .map_err(draw_err)?;
        let text = truncate_to_width(label, LEGEND_FONT_PX, text_max_px);
        let style = TextStyle::from((FontFamily::SansSerif, LEGEND_FONT_PX))
            .pos(Pos::new(HPos::Left, VPos::Center));
        area.draw(&Text::new(text, (28, y), style))
            .map_err(draw_err)?;
        y += line_h;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gaps_split_segments() {
        let pts = vec![
            (2000.0, Some(1.0)),
            (2001.0, None),
            (2002.0, Some(2.0)),
            (2003.0, Some(3.0)),
            (2004.0, None),
        ];
        let segs = segments(&pts);
        assert_eq!(segs, vec![vec![(2000.0, 1.0)], vec![(2002.0, 2.0), (2003.0, 3.0)]]);
    }
}
