use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::{Month, CALENDAR};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Month colours
// ---------------------------------------------------------------------------

/// One colour per calendar month, shared by the bar legend and the
/// month-wise box plot.
#[derive(Debug, Clone)]
pub struct MonthPalette {
    colors: Vec<Color32>,
}

impl Default for MonthPalette {
    fn default() -> Self {
        Self {
            colors: generate_palette(CALENDAR.len()),
        }
    }
}

impl MonthPalette {
    pub fn color_for(&self, month: Month) -> Color32 {
        self.colors
            .get(month.index())
            .copied()
            .unwrap_or(Color32::GRAY)
    }
}
