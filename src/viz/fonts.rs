//! Font registration for the `ab_glyph` text path.
//!
//! `ab_glyph` does not discover OS fonts, so a TTF has to be registered as
//! "sans-serif" before any caption or label is drawn. Without one, charts are
//! rendered as shapes only.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static FONT_READY: OnceLock<bool> = OnceLock::new();

const CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Register a sans-serif face once per process. The first call decides; later
/// calls return the cached answer.
pub fn init(preferred: Option<&Path>) -> bool {
    *FONT_READY.get_or_init(|| {
        let mut paths: Vec<PathBuf> = Vec::new();
        if let Some(p) = preferred {
            paths.push(p.to_path_buf());
        }
        paths.extend(CANDIDATES.iter().map(PathBuf::from));

        for path in paths {
            let Ok(bytes) = std::fs::read(&path) else {
                continue;
            };
            // ab_glyph keeps a reference for the process lifetime.
            let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
            match plotters::style::register_font(
                "sans-serif",
                plotters::style::FontStyle::Normal,
                bytes,
            ) {
                Ok(()) => {
                    log::debug!("registered chart font {}", path.display());
                    return true;
                }
                Err(_) => log::debug!("not a usable font: {}", path.display()),
            }
        }
        log::warn!("no TTF font found; charts will be drawn without text");
        false
    })
}

/// Whether chart text can be drawn.
pub fn available() -> bool {
    init(None)
}
