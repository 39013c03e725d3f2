use std::path::Path;

use super::aggregate::{annotate, monthly_means, AnnotatedObservation, GroupedMean};
use super::error::Result;
use super::filter::{remove_outliers, CleanedSeries, FilterConfig};
use super::loader::{load_file, LoaderConfig};
use super::model::Series;
use super::pivot::PivotMatrix;

// ---------------------------------------------------------------------------
// PipelineRun – every derived artifact of one dataset
// ---------------------------------------------------------------------------

/// The outputs of a single load → clean → aggregate → pivot pass.
///
/// Built once and never mutated; the renderer borrows whichever artifact a
/// chart needs.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    series: Series,
    cleaned: CleanedSeries,
    means: Vec<GroupedMean>,
    pivot: PivotMatrix,
    annotated: Vec<AnnotatedObservation>,
}

impl PipelineRun {
    /// Run every stage on an already-loaded series.
    pub fn execute(series: Series, filter: &FilterConfig) -> Result<Self> {
        let cleaned = remove_outliers(&series, filter)?;
        let means = monthly_means(&cleaned);
        let pivot = PivotMatrix::from_means(&means);
        let annotated = annotate(&cleaned);

        log::info!(
            "Cleaned {} → {} observations, {} monthly means over {} years",
            series.len(),
            cleaned.len(),
            means.len(),
            pivot.rows().len()
        );

        Ok(Self {
            series,
            cleaned,
            means,
            pivot,
            annotated,
        })
    }

    /// Load `path` and run every stage. A load failure aborts before any
    /// cleaning happens.
    pub fn from_path(path: &Path, loader: &LoaderConfig, filter: &FilterConfig) -> Result<Self> {
        let series = load_file(path, loader)?;
        Self::execute(series, filter)
    }

    /// The unfiltered input.
    pub fn series(&self) -> &Series {
        &self.series
    }

    pub fn cleaned(&self) -> &CleanedSeries {
        &self.cleaned
    }

    pub fn means(&self) -> &[GroupedMean] {
        &self.means
    }

    pub fn pivot(&self) -> &PivotMatrix {
        &self.pivot
    }

    /// Cleaned observations tagged with year and month, sorted by month.
    pub fn annotated(&self) -> &[AnnotatedObservation] {
        &self.annotated
    }
}
