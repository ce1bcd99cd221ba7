//! Utility functions for visualization: colors, scaling, locale mapping, label widths.

use num_format::{Locale, ToFormattedString};
use plotters::prelude::*;

use super::text::estimate_text_width_px;

/// Office 2013+ series palette: #4472C4 #ED7D31 #A5A5A5 #FFC000 #5B9BD5
/// #70AD47 #264478 #9E480E #636363 #997300.
const PALETTE: [(u8, u8, u8); 10] = [
    (68, 114, 196),
    (237, 125, 49),
    (165, 165, 165),
    (255, 192, 0),
    (91, 155, 213),
    (112, 173, 71),
    (38, 68, 120),
    (158, 72, 14),
    (99, 99, 99),
    (153, 115, 0),
];

/// Series color by trace index; wraps after ten.
pub fn office_color(idx: usize) -> RGBAColor {
    let (r, g, b) = PALETTE[idx % PALETTE.len()];
    RGBColor(r, g, b).to_rgba()
}

const MAGNITUDES: [(f64, &str); 4] = [
    (1.0e12, "trillions"),
    (1.0e9, "billions"),
    (1.0e6, "millions"),
    (1.0e3, "thousands"),
];

/// Divisor and word for the largest magnitude not above `max_abs`, e.g. `(1e6, "millions")`.
pub fn choose_axis_scale(max_abs: f64) -> (f64, &'static str) {
    MAGNITUDES
        .iter()
        .copied()
        .find(|(m, _)| max_abs >= *m)
        .unwrap_or((1.0, ""))
}

/// Percent axes (inflation, unemployment) are never rescaled.
pub fn is_percentage_like(title: &str) -> bool {
    let t = title.to_ascii_lowercase();
    t.contains('%') || t.contains("percent")
}

/// Axis scale + final Y title for the given raw title and value range.
/// `"GDP (Current US$)"` spanning trillions becomes `(1e12, "GDP (Current US$) (trillions)")`.
pub fn scaled_axis_title(title: &str, min_val: f64, max_val: f64) -> (f64, String) {
    let max_abs = min_val.abs().max(max_val.abs());
    let (scale, word) = if is_percentage_like(title) {
        (1.0, "")
    } else {
        choose_axis_scale(max_abs)
    };
    let title = match (title.trim(), word) {
        ("", "") => "Value".to_string(),
        ("", w) => format!("Value ({w})"),
        (t, "") => t.to_string(),
        (t, w) => format!("{t} ({w})"),
    };
    (scale, title)
}

/// `num_format` locale and decimal separator for a config locale tag.
/// Unknown tags fall back to English.
pub fn map_locale(tag: &str) -> (&'static Locale, char) {
    let lang = tag
        .split(['_', '-'])
        .next()
        .unwrap_or("")
        .to_ascii_lowercase();
    match lang.as_str() {
        "de" => (&Locale::de, ','),
        "fr" => (&Locale::fr, ','),
        "es" => (&Locale::es, ','),
        "it" => (&Locale::it, ','),
        "pt" => (&Locale::pt, ','),
        "nl" => (&Locale::nl, ','),
        _ => (&Locale::en, '.'),
    }
}

/// Tick label for an already-scaled value: whole numbers get thousands separators,
/// small magnitudes keep one or two decimals with the locale's decimal separator.
pub fn format_tick(v: f64, locale: &Locale, dec_sep: char) -> String {
    let a = v.abs();
    if a >= 100.0 {
        return (v.round() as i64).to_formatted_string(locale);
    }
    let prec = if a >= 10.0 { 1 } else { 2 };
    let s = format!("{:.*}", prec, v);
    if dec_sep == '.' { s } else { s.replace('.', &dec_sep.to_string()) }
}

/// Width of the left label area: the widest tick label plus room for the rotated
/// axis title, kept within 60..=160 px.
pub fn compute_left_label_area_px(
    ymin_scaled: f64,
    ymax_scaled: f64,
    ticks: usize,
    font_px: u32,
) -> u32 {
    let steps = ticks.max(1);
    let widest = (0..=steps)
        .map(|i| ymin_scaled + (ymax_scaled - ymin_scaled) * i as f64 / steps as f64)
        .map(|v| estimate_text_width_px(&format_tick(v, &Locale::en, '.'), font_px))
        .max()
        .unwrap_or(0);
    widest.saturating_add(40).clamp(60, 160)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gdp_axis_is_scaled_percent_axis_is_not() {
        let (s, t) = scaled_axis_title("GDP (Current US$)", 1.0e12, 2.5e13);
        assert_eq!(s, 1.0e12);
        assert_eq!(t, "GDP (Current US$) (trillions)");

        let (s, t) = scaled_axis_title("Inflation (Annual %)", -2.0, 8000.0);
        assert_eq!(s, 1.0);
        assert_eq!(t, "Inflation (Annual %)");
    }

    #[test]
    fn ticks_follow_locale() {
        let (german, sep) = map_locale("de");
        assert_eq!(format_tick(12345.0, german, sep), "12.345");
        assert_eq!(format_tick(2.5, german, sep), "2,50");
        let (english, sep) = map_locale("en_US");
        assert_eq!(format_tick(12345.0, english, sep), "12,345");
        assert_eq!(map_locale("de-AT").1, ',');
    }
}
