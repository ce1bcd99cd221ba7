//! Text measurement and truncation for legend labels and tooltips.

/// Heuristic: estimate pixel width of text (Plotters has no built-in text measuring).
pub fn estimate_text_width_px(text: &str, font_px: u32) -> u32 {
    ((text.chars().count() as f32) * (font_px as f32) * 0.60).ceil() as u32
}

/// Truncate to fit `max_px` and add a single ellipsis if needed.
pub fn truncate_to_width(text: &str, font_px: u32, max_px: u32) -> String {
    if estimate_text_width_px(text, font_px) <= max_px {
        return text.to_string();
    }
    let mut out = String::new();
    for ch in text.chars() {
        out.push(ch);
        if estimate_text_width_px(&out, font_px) > max_px {
            out.pop();
            break;
        }
    }
    // Make room for the ellipsis.
    while !out.is_empty() && estimate_text_width_px(&format!("{out}…"), font_px) > max_px {
        out.pop();
    }
    if out.is_empty() {
        out
    } else {
        format!("{out}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(truncate_to_width("Germany", 14, 500), "Germany");
    }

    #[test]
    fn long_text_gets_ellipsis() {
        let s = truncate_to_width("Venezuela, Bolivarian Republic of", 14, 100);
        assert!(s.ends_with('…'));
        assert!(estimate_text_width_px(&s, 14) <= 100);
    }
}
