use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generators
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            hsl_to_color32(hue)
        })
        .collect()
}

/// Generates `n` colours sweeping the hue from `from_hue` to `to_hue`
/// (degrees). Used for ordered series such as the review-count bands on the
/// scatter map, where adjacent bands should read as adjacent colours.
pub fn gradient_palette(n: usize, from_hue: f32, to_hue: f32) -> Vec<Color32> {
    match n {
        0 => Vec::new(),
        1 => vec![hsl_to_color32(from_hue)],
        _ => (0..n)
            .map(|i| {
                let t = i as f32 / (n - 1) as f32;
                hsl_to_color32(from_hue + t * (to_hue - from_hue))
            })
            .collect(),
    }
}

fn hsl_to_color32(hue: f32) -> Color32 {
    let hsl = Hsl::new(hue, 0.75, 0.55);
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_has_requested_size_and_distinct_entries() {
        assert!(generate_palette(0).is_empty());
        let palette = generate_palette(6);
        assert_eq!(palette.len(), 6);
        for (i, a) in palette.iter().enumerate() {
            for b in palette.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_gradient_endpoints_match_hues() {
        let g = gradient_palette(5, 210.0, 0.0);
        assert_eq!(g.len(), 5);
        assert_eq!(g[0], gradient_palette(1, 210.0, 0.0)[0]);
        assert_eq!(*g.last().unwrap(), gradient_palette(1, 0.0, 0.0)[0]);
    }
}
