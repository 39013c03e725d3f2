use std::path::Path;

use anyhow::{bail, Context, Result};
use eframe::egui::{self, vec2, ColorImage, Pos2, Rect};

use crate::state::{AppState, Status};

// ---------------------------------------------------------------------------
// PNG export of the visible chart
// ---------------------------------------------------------------------------

/// Ask the viewport for a screenshot. The file is written once the
/// screenshot event arrives (see [`take_screenshot`]).
pub fn request_export(ctx: &egui::Context, state: &mut AppState) {
    let Some(kind) = state.chart_kind() else {
        return;
    };
    let file = rfd::FileDialog::new()
        .set_title("Save chart")
        .set_file_name(kind.file_name())
        .add_filter("PNG", &["png"])
        .save_file();

    if let Some(mut path) = file {
        if path.extension().is_none() {
            path.set_extension("png");
        }
        state.pending_export = Some(path);
        ctx.send_viewport_cmd(egui::ViewportCommand::Screenshot(egui::UserData::default()));
    }
}

/// Finish a pending export if this frame delivered a screenshot.
pub fn take_screenshot(ctx: &egui::Context, state: &mut AppState) {
    if state.pending_export.is_none() {
        return;
    }
    let screenshot = ctx.input(|i| {
        i.raw.events.iter().find_map(|e| match e {
            egui::Event::Screenshot { image, .. } => Some(image.clone()),
            _ => None,
        })
    });
    let Some(screenshot) = screenshot else {
        return;
    };
    let Some(path) = state.pending_export.take() else {
        return;
    };

    let region = state
        .chart_rect
        .unwrap_or_else(|| Rect::from_min_size(Pos2::ZERO, ctx.screen_rect().size()));

    finish_export(state, &screenshot, region, ctx.pixels_per_point(), &path);
}

/// Write the cropped screenshot and report the outcome in the status line.
pub fn finish_export(
    state: &mut AppState,
    screenshot: &ColorImage,
    region: Rect,
    pixels_per_point: f32,
    path: &Path,
) {
    match save_region(screenshot, region, pixels_per_point, path) {
        Ok(()) => {
            log::info!("Saved chart to {}", path.display());
            state.status = Some(Status::Info(format!("Saved {}", path.display())));
        }
        Err(e) => {
            log::error!("Failed to export chart: {e:#}");
            state.status = Some(Status::Error(format!("Error: {e:#}")));
        }
    }
}

/// Crop `screenshot` to `region` (in points) and write it as PNG.
///
/// The region is clipped to the screenshot, which may be smaller than the
/// rect recorded when the export was requested if the window shrank since.
pub fn save_region(
    screenshot: &ColorImage,
    region: Rect,
    pixels_per_point: f32,
    path: &Path,
) -> Result<()> {
    let [full_width, full_height] = screenshot.size;
    let bounds = Rect::from_min_size(
        Pos2::ZERO,
        vec2(
            full_width as f32 / pixels_per_point,
            full_height as f32 / pixels_per_point,
        ),
    );
    let clipped = region.intersect(bounds);
    if !clipped.is_positive()
        || (clipped.width() * pixels_per_point) < 1.0
        || (clipped.height() * pixels_per_point) < 1.0
    {
        bail!("chart area lies outside the captured window");
    }

    let cropped = screenshot.region(&clipped, Some(pixels_per_point));
    let [width, height] = cropped.size;
    let bytes: Vec<u8> = cropped.pixels.iter().flat_map(|c| c.to_array()).collect();

    let buffer = image::RgbaImage::from_raw(width as u32, height as u32, bytes)
        .context("screenshot buffer does not match its size")?;
    buffer
        .save(path)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
