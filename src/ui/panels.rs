use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::pipeline::PipelineRun;
use crate::export;
use crate::state::{AppState, View};
use crate::ui::plot::{render_chart, PlotRenderer, Rendered};
use crate::ui::table;

// ---------------------------------------------------------------------------
// Left side panel – dataset summary and cleaning settings
// ---------------------------------------------------------------------------

/// Render the left panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Dataset");
    ui.separator();

    if state.run.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    let mut rerun = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            if let Some(run) = &state.run {
                summary(ui, run);
            }
            ui.separator();

            // ---- Outlier quantiles ----
            ui.strong("Outlier filter");
            let filter = &mut state.filter_config;
            ui.add(
                egui::Slider::new(&mut filter.lower_quantile, 0.0..=0.5)
                    .text("lower")
                    .fixed_decimals(3),
            );
            ui.add(
                egui::Slider::new(&mut filter.upper_quantile, 0.5..=1.0)
                    .text("upper")
                    .fixed_decimals(3),
            );
            ui.horizontal(|ui: &mut Ui| {
                if ui.button("Apply").clicked() {
                    rerun = true;
                }
                if ui.small_button("Reset").clicked() {
                    *filter = Default::default();
                    rerun = true;
                }
            });
        });

    if rerun {
        state.rerun();
    }
}

fn summary(ui: &mut Ui, run: &PipelineRun) {
    let series = run.series();
    let cleaned = run.cleaned();

    egui::Grid::new("summary_grid")
        .num_columns(2)
        .striped(true)
        .show(ui, |ui: &mut Ui| {
            ui.label("Observations");
            ui.label(series.len().to_string());
            ui.end_row();

            ui.label("From");
            ui.label(series.first_date().map(|d| d.to_string()).unwrap_or_default());
            ui.end_row();

            ui.label("To");
            ui.label(series.last_date().map(|d| d.to_string()).unwrap_or_default());
            ui.end_row();

            ui.label("Bounds");
            match cleaned.bounds() {
                Some(b) => ui.label(format!("{:.1} – {:.1}", b.lower, b.upper)),
                None => ui.label("–"),
            };
            ui.end_row();

            ui.label("Kept");
            ui.label(cleaned.len().to_string());
            ui.end_row();

            ui.label("Removed");
            ui.label(cleaned.removed().to_string());
            ui.end_row();

            ui.label("Months");
            ui.label(run.means().len().to_string());
            ui.end_row();
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let can_export = state.run.is_some() && state.chart_kind().is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Save chart as PNG…"))
                .clicked()
            {
                export::request_export(ui.ctx(), state);
                ui.close_menu();
            }
        });

        ui.separator();

        for view in View::ALL {
            if ui.selectable_label(state.view == view, view.label()).clicked() {
                state.view = view;
            }
        }

        ui.separator();

        if let (Some(run), Some(path)) = (&state.run, &state.source) {
            ui.label(format!(
                "{}: {} days, {} after cleaning",
                path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default(),
                run.series().len(),
                run.cleaned().len()
            ));
        }

        if let Some(status) = &state.status {
            let color = if status.is_error() {
                Color32::RED
            } else {
                Color32::DARK_GREEN
            };
            ui.label(RichText::new(status.text()).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the selected chart or table and remember where the chart landed.
pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    let Some(run) = &state.run else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to view page views  (File → Open…)");
        });
        return;
    };

    let rect = match state.view {
        View::Chart(kind) => {
            let mut renderer = PlotRenderer {
                ui,
                months: &state.months,
            };
            match render_chart(kind, run, &mut renderer) {
                Rendered::Single(response) => Some(response.rect),
                Rendered::Pair(a, b) => Some(a.rect.union(b.rect)),
            }
        }
        View::Table => {
            table::pivot_table(ui, run.pivot());
            None
        }
    };
    state.chart_rect = rect;
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open daily series")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}
