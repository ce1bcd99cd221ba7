//! Draw a [`MapView`] with selected/unselected styling.

use crate::geo::{CountryStyle, MapView};
use crate::state::DashboardState;
use anyhow::Result;
use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;
use std::path::Path;

use super::{check_size, draw_err};

const OCEAN: RGBColor = RGBColor(173, 216, 230);
const LAND: RGBColor = RGBColor(204, 204, 204);
const LAND_HOVER: RGBColor = RGBColor(170, 170, 170);
const SELECTED: RGBColor = RGBColor(237, 125, 49); // Office orange
const BORDER: RGBColor = RGBColor(255, 255, 255);

/// Render the map at the view's size. `.svg` paths use the SVG backend, others PNG.
pub fn render_map_to_file<P: AsRef<Path>>(
    view: &MapView,
    state: &DashboardState,
    hovered: Option<&str>,
    out_path: P,
) -> Result<()> {
    let (w, h) = view.size();
    check_size(w, h)?;
    let out_path = out_path.as_ref();
    let path_string = out_path.to_string_lossy().into_owned();
    if out_path.extension().and_then(|s| s.to_str()) == Some("svg") {
        let root = SVGBackend::new(path_string.as_str(), (w, h)).into_drawing_area();
        draw_map(root, view, state, hovered)?;
    } else {
        let root = BitMapBackend::new(path_string.as_str(), (w, h)).into_drawing_area();
        draw_map(root, view, state, hovered)?;
    }
    log::info!("wrote map to {}", out_path.display());
    Ok(())
}

/// Render into a packed RGB buffer of `width * height * 3` bytes.
pub fn render_map_to_rgb(
    view: &MapView,
    state: &DashboardState,
    hovered: Option<&str>,
) -> Result<Vec<u8>> {
    let (w, h) = view.size();
    check_size(w, h)?;
    let mut buf = vec![0u8; w as usize * h as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (w, h)).into_drawing_area();
        draw_map(root, view, state, hovered)?;
    }
    Ok(buf)
}

fn draw_map<DB>(
    root: DrawingArea<DB, Shift>,
    view: &MapView,
    state: &DashboardState,
    hovered: Option<&str>,
) -> Result<()>
where
    DB: DrawingBackend,
{
    root.fill(&OCEAN).map_err(draw_err)?;

    for (country, polygons) in view.projected_countries() {
        let fill = match view.style_for(&country.code, state) {
            CountryStyle::Selected => SELECTED,
            CountryStyle::Unselected if hovered == Some(country.code.as_str()) => LAND_HOVER,
            CountryStyle::Unselected => LAND,
        };
        for rings in polygons {
            let Some(exterior) = rings.first() else {
                continue;
            };
            let pts: Vec<(i32, i32)> = exterior
                .iter()
                .map(|(x, y)| (x.round() as i32, y.round() as i32))
                .collect();
            if pts.len() < 3 {
                continue;
            }
            root.draw(&Polygon::new(pts.clone(), fill.filled()))
                .map_err(draw_err)?;
            // Lakes and enclaves: paint holes with the ocean color.
            for hole in rings.iter().skip(1) {
                let hole_pts: Vec<(i32, i32)> = hole
                    .iter()
                    .map(|(x, y)| (x.round() as i32, y.round() as i32))
                    .collect();
                if hole_pts.len() >= 3 {
                    root.draw(&Polygon::new(hole_pts, OCEAN.filled()))
                        .map_err(draw_err)?;
                }
            }
            root.draw(&PathElement::new(pts, BORDER.stroke_width(1)))
                .map_err(draw_err)?;
        }
    }

    root.present().map_err(draw_err)?;
    Ok(())
}
