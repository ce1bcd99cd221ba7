//! World map model: country polygons from GeoJSON, a Natural Earth projection,
//! pointer hit testing, tooltips, and click-to-select.
//!
//! Screen coordinates are pixels with the origin at the top-left corner, the same
//! space the map is rendered in by [`crate::viz::map`].

use crate::models::SelectedCountry;
use crate::state::{DashboardState, StateChange};
use ahash::AHashMap;
use anyhow::{Context, Result, bail};
use geojson::{Feature, GeoJson, Value};
use std::path::Path;

/// `[lon, lat]` rings of one polygon; the first ring is the exterior, the rest are holes.
pub type Rings = Vec<Vec<(f64, f64)>>;

#[derive(Debug, Clone, PartialEq)]
pub struct CountryShape {
    /// Feature id, typically ISO 3166-1 alpha-3 (`"DEU"`).
    pub code: String,
    pub name: String,
    pub polygons: Vec<Rings>,
}

impl CountryShape {
    pub fn as_selected(&self) -> SelectedCountry {
        SelectedCountry::new(self.code.clone(), self.name.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct WorldMap {
    countries: Vec<CountryShape>,
}

impl WorldMap {
    /// Parse a GeoJSON FeatureCollection (or single Feature). Features without a
    /// Polygon/MultiPolygon geometry or without an id are skipped.
    pub fn from_geojson_str(text: &str) -> Result<Self> {
        let gj: GeoJson = text.parse().context("parse geojson")?;
        let features = match gj {
            GeoJson::FeatureCollection(fc) => fc.features,
            GeoJson::Feature(f) => vec![f],
            GeoJson::Geometry(_) => bail!("expected a FeatureCollection, got a bare geometry"),
        };

        let total = features.len();
        let countries: Vec<CountryShape> = features
            .into_iter()
            .filter_map(country_from_feature)
            .collect();
        if countries.len() < total {
            log::debug!(
                "skipped {} feature(s) without id or polygon geometry",
                total - countries.len()
            );
        }
        log::info!("loaded {} country shapes", countries.len());
        Ok(Self { countries })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read geography {}", path.display()))?;
        Self::from_geojson_str(&text)
    }

    pub fn countries(&self) -> &[CountryShape] {
        &self.countries
    }

    pub fn find(&self, code: &str) -> Option<&CountryShape> {
        self.countries.iter().find(|c| c.code == code)
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }
}

fn feature_code(f: &Feature) -> Option<String> {
    use geojson::feature::Id;
    match f.id.as_ref()? {
        Id::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Id::String(_) => None,
        Id::Number(n) => Some(n.to_string()),
    }
}

fn ring(positions: &[Vec<f64>]) -> Vec<(f64, f64)> {
    positions
        .iter()
        .filter(|p| p.len() >= 2)
        .map(|p| (p[0], p[1]))
        .collect()
}

fn country_from_feature(f: Feature) -> Option<CountryShape> {
    let code = feature_code(&f)?;
    let name = f
        .property("name")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| code.clone());

    let polygons: Vec<Rings> = match f.geometry.map(|g| g.value)? {
        Value::Polygon(rings) => vec![rings.iter().map(|r| ring(r)).collect()],
        Value::MultiPolygon(polys) => polys
            .iter()
            .map(|rings| rings.iter().map(|r| ring(r)).collect())
            .collect(),
        _ => return None,
    };
    Some(CountryShape {
        code,
        name,
        polygons,
    })
}

/// d3's `geoNaturalEarth1`, scaled and centered on a viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NaturalEarth {
    pub scale: f64,
    pub translate: (f64, f64),
}

/// Extent of the raw projection: |x| <= 0.8707π at the equator, |y| <= ~1.4224 at the poles.
const RAW_HALF_WIDTH: f64 = 0.8707 * std::f64::consts::PI;
const RAW_HALF_HEIGHT: f64 = 1.4224;

impl NaturalEarth {
    /// Largest scale that shows the whole globe inside `width x height`, centered.
    pub fn fit(width: f64, height: f64) -> Self {
        let scale = (width / (2.0 * RAW_HALF_WIDTH)).min(height / (2.0 * RAW_HALF_HEIGHT)) * 0.98;
        Self {
            scale,
            translate: (width / 2.0, height / 2.0),
        }
    }

    /// Raw Natural Earth I formula on radians.
    fn raw(lambda: f64, phi: f64) -> (f64, f64) {
        let phi2 = phi * phi;
        let phi4 = phi2 * phi2;
        let x = lambda
            * (0.8707 - 0.131979 * phi2
                + phi4 * (-0.013791 + phi4 * (0.003971 * phi2 - 0.001529 * phi4)));
        let y = phi
            * (1.007226
                + phi2 * (0.015085 + phi4 * (-0.044475 + 0.028874 * phi2 - 0.005916 * phi4)));
        (x, y)
    }

    /// `(lon, lat)` in degrees to screen pixels (y grows downward).
    pub fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        let (x, y) = Self::raw(lon.to_radians(), lat.to_radians());
        (
            self.translate.0 + self.scale * x,
            self.translate.1 - self.scale * y,
        )
    }
}

/// Visual class of a country on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountryStyle {
    Unselected,
    Selected,
}

/// Tooltip anchored next to the pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub text: String,
    pub x: f64,
    pub y: f64,
}

/// Offsets of the tooltip relative to the pointer.
pub const TOOLTIP_OFFSET: (f64, f64) = (10.0, -28.0);

#[derive(Debug, Clone)]
struct Projected {
    polygons: Vec<Vec<Vec<(f64, f64)>>>,
    bbox: (f64, f64, f64, f64),
}

/// A [`WorldMap`] projected into a viewport.
#[derive(Debug, Clone)]
pub struct MapView {
    map: WorldMap,
    width: u32,
    height: u32,
    projection: NaturalEarth,
    projected: Vec<Projected>,
    by_code: AHashMap<String, usize>,
}

impl MapView {
    pub fn new(map: WorldMap, width: u32, height: u32) -> Self {
        let by_code = map
            .countries
            .iter()
            .enumerate()
            .map(|(i, c)| (c.code.clone(), i))
            .collect();
        let mut view = Self {
            map,
            width,
            height,
            projection: NaturalEarth::fit(width as f64, height as f64),
            projected: Vec::new(),
            by_code,
        };
        view.reproject();
        view
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn map(&self) -> &WorldMap {
        &self.map
    }

    pub fn projection(&self) -> NaturalEarth {
        self.projection
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if (width, height) == (self.width, self.height) {
            return;
        }
        self.width = width;
        self.height = height;
        self.projection = NaturalEarth::fit(width as f64, height as f64);
        self.reproject();
    }

    fn reproject(&mut self) {
        let proj = self.projection;
        self.projected = self
            .map
            .countries
            .iter()
            .map(|c| {
                let polygons: Vec<Vec<Vec<(f64, f64)>>> = c
                    .polygons
                    .iter()
                    .map(|rings| {
                        rings
                            .iter()
                            .map(|r| r.iter().map(|(lon, lat)| proj.project(*lon, *lat)).collect())
                            .collect()
                    })
                    .collect();
                let bbox = polygons
                    .iter()
                    .flatten()
                    .flatten()
                    .fold(
                        (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
                        |(x0, y0, x1, y1), (x, y)| (x0.min(*x), y0.min(*y), x1.max(*x), y1.max(*y)),
                    );
                Projected { polygons, bbox }
            })
            .collect();
    }

    /// Screen-space polygons of each country, in map order.
    pub fn projected_countries(
        &self,
    ) -> impl Iterator<Item = (&CountryShape, &Vec<Vec<Vec<(f64, f64)>>>)> {
        self.map
            .countries
            .iter()
            .zip(self.projected.iter().map(|p| &p.polygons))
    }

    /// Country under the pointer, if any. The first matching feature wins.
    pub fn hit_test(&self, x: f64, y: f64) -> Option<&CountryShape> {
        self.projected
            .iter()
            .position(|p| {
                let (x0, y0, x1, y1) = p.bbox;
                x >= x0
                    && x <= x1
                    && y >= y0
                    && y <= y1
                    && p.polygons.iter().any(|rings| point_in_rings(x, y, rings))
            })
            .map(|i| &self.map.countries[i])
    }

    /// Tooltip with the hovered country's name, offset from the pointer.
    pub fn hover(&self, x: f64, y: f64) -> Option<Tooltip> {
        self.hit_test(x, y).map(|c| Tooltip {
            text: c.name.clone(),
            x: x + TOOLTIP_OFFSET.0,
            y: y + TOOLTIP_OFFSET.1,
        })
    }

    /// Toggle the country under the pointer. `None` when the click hit the ocean.
    pub fn click(&self, x: f64, y: f64, state: &mut DashboardState) -> Option<StateChange> {
        let country = self.hit_test(x, y)?;
        let change = state.toggle_country(&country.code, &country.name);
        log::debug!("map click on {} -> {:?}", country.code, change);
        Some(change)
    }

    pub fn style_for(&self, code: &str, state: &DashboardState) -> CountryStyle {
        if state.is_selected(code) {
            CountryStyle::Selected
        } else {
            CountryStyle::Unselected
        }
    }

    pub fn country(&self, code: &str) -> Option<&CountryShape> {
        self.by_code.get(code).map(|i| &self.map.countries[*i])
    }
}

/// Even-odd rule over all rings, so holes are excluded.
fn point_in_rings(x: f64, y: f64, rings: &[Vec<(f64, f64)>]) -> bool {
    let mut inside = false;
    for ring in rings {
        let n = ring.len();
        if n < 3 {
            continue;
        }
        let mut j = n - 1;
        for i in 0..n {
            let (xi, yi) = ring[i];
            let (xj, yj) = ring[j];
            if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
                inside = !inside;
            }
            j = i;
        }
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hole_is_not_inside() {
        let outer = vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)];
        let hole = vec![(4.0, 4.0), (6.0, 4.0), (6.0, 6.0), (4.0, 6.0), (4.0, 4.0)];
        let rings = vec![outer, hole];
        assert!(point_in_rings(2.0, 2.0, &rings));
        assert!(!point_in_rings(5.0, 5.0, &rings));
        assert!(!point_in_rings(12.0, 5.0, &rings));
    }

    #[test]
    fn origin_projects_to_center() {
        let p = NaturalEarth::fit(960.0, 600.0);
        let (x, y) = p.project(0.0, 0.0);
        assert!((x - 480.0).abs() < 1e-9);
        assert!((y - 300.0).abs() < 1e-9);
        // North is up.
        let (_, y_north) = p.project(0.0, 45.0);
        assert!(y_north < 300.0);
    }

    #[test]
    fn whole_globe_fits_viewport() {
        let p = NaturalEarth::fit(960.0, 600.0);
        for (lon, lat) in [(-180.0, 0.0), (180.0, 0.0), (0.0, 90.0), (0.0, -90.0)] {
            let (x, y) = p.project(lon, lat);
            assert!((0.0..=960.0).contains(&x), "x={x}");
            assert!((0.0..=600.0).contains(&y), "y={y}");
        }
    }
}
