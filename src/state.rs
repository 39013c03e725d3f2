use std::path::{Path, PathBuf};

use eframe::egui::Rect;

use crate::color::MonthPalette;
use crate::data::filter::FilterConfig;
use crate::data::loader::LoaderConfig;
use crate::data::pipeline::PipelineRun;
use crate::ui::plot::ChartKind;

// ---------------------------------------------------------------------------
// Views shown in the central panel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Chart(ChartKind),
    Table,
}

impl View {
    pub const ALL: [View; 4] = [
        View::Chart(ChartKind::Line),
        View::Chart(ChartKind::Bar),
        View::Chart(ChartKind::Box),
        View::Table,
    ];

    pub fn label(self) -> &'static str {
        match self {
            View::Chart(kind) => kind.label(),
            View::Table => "Table",
        }
    }
}

/// Message shown at the end of the top bar.
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Info(String),
    Error(String),
}

impl Status {
    pub fn text(&self) -> &str {
        match self {
            Status::Info(msg) | Status::Error(msg) => msg,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Status::Error(_))
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Artifacts of the last successful run (None until a file is loaded).
    pub run: Option<PipelineRun>,

    /// File the current run was loaded from.
    pub source: Option<PathBuf>,

    pub loader_config: LoaderConfig,

    /// Quantiles applied on the next run. Edited in the side panel.
    pub filter_config: FilterConfig,

    pub view: View,

    pub months: MonthPalette,

    /// Screen area of the chart drawn last frame, used to crop exports.
    pub chart_rect: Option<Rect>,

    /// Destination of a requested PNG export awaiting its screenshot.
    pub pending_export: Option<PathBuf>,

    /// Outcome of the last load, rerun or export.
    pub status: Option<Status>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            run: None,
            source: None,
            loader_config: LoaderConfig::default(),
            filter_config: FilterConfig::default(),
            view: View::Chart(ChartKind::Line),
            months: MonthPalette::default(),
            chart_rect: None,
            pending_export: None,
            status: None,
        }
    }
}

impl AppState {
    /// Load `path` and run the pipeline. On failure the previous run is kept
    /// and the error is shown.
    pub fn load_path(&mut self, path: &Path) {
        match PipelineRun::from_path(path, &self.loader_config, &self.filter_config) {
            Ok(run) => {
                self.source = Some(path.to_path_buf());
                self.set_run(run);
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.status = Some(Status::Error(format!("Error: {e}")));
            }
        }
    }

    /// Re-run cleaning and aggregation on the loaded series with the current
    /// filter config.
    pub fn rerun(&mut self) {
        let Some(series) = self.run.as_ref().map(|run| run.series().clone()) else {
            return;
        };
        match PipelineRun::execute(series, &self.filter_config) {
            Ok(run) => self.set_run(run),
            Err(e) => {
                log::warn!("Rejected filter settings: {e}");
                self.status = Some(Status::Error(format!("Error: {e}")));
            }
        }
    }

    pub fn set_run(&mut self, run: PipelineRun) {
        self.run = Some(run);
        self.status = None;
    }

    /// Chart currently on screen, if the view is a chart.
    pub fn chart_kind(&self) -> Option<ChartKind> {
        match self.view {
            View::Chart(kind) => Some(kind),
            View::Table => None,
        }
    }
}
