use serde::{Deserialize, Serialize};

use super::error::{PipelineError, Result};
use super::model::{Observation, Series};
use super::stats::{quantile, sorted_values};

// ---------------------------------------------------------------------------
// Filter configuration
// ---------------------------------------------------------------------------

/// Quantiles that bound the retained values. Both inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    pub lower_quantile: f64,
    pub upper_quantile: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            lower_quantile: 0.025,
            upper_quantile: 0.975,
        }
    }
}

impl FilterConfig {
    pub fn validate(&self) -> Result<()> {
        let in_unit = |q: f64| (0.0..=1.0).contains(&q);
        if !in_unit(self.lower_quantile) || !in_unit(self.upper_quantile) {
            return Err(PipelineError::Config(format!(
                "quantiles must lie in [0, 1], got {} and {}",
                self.lower_quantile, self.upper_quantile
            )));
        }
        if self.lower_quantile > self.upper_quantile {
            return Err(PipelineError::Config(format!(
                "lower quantile {} exceeds upper quantile {}",
                self.lower_quantile, self.upper_quantile
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Bounds and cleaned series
// ---------------------------------------------------------------------------

/// Inclusive value range computed once from the unfiltered series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlierBounds {
    pub lower: f64,
    pub upper: f64,
}

impl OutlierBounds {
    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }

    /// Both bounds equal: the series had a single distinct value near the
    /// quantiles.
    pub fn is_degenerate(&self) -> bool {
        self.lower == self.upper
    }
}

/// A [`Series`] with every value inside the frozen [`OutlierBounds`].
///
/// `bounds` is `None` only for an empty input, in which case the cleaned
/// series is empty as well.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanedSeries {
    observations: Vec<Observation>,
    bounds: Option<OutlierBounds>,
    removed: usize,
}

impl CleanedSeries {
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn bounds(&self) -> Option<OutlierBounds> {
        self.bounds
    }

    /// How many observations of the input fell outside the bounds.
    pub fn removed(&self) -> usize {
        self.removed
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

// ---------------------------------------------------------------------------
// OutlierFilter
// ---------------------------------------------------------------------------

/// Bounds at the configured quantiles of every value in `series`.
///
/// Depends only on the multiset of values, so row order never matters.
pub fn compute_bounds(series: &Series, config: &FilterConfig) -> Option<OutlierBounds> {
    let sorted = sorted_values(series.values());
    let lower = quantile(&sorted, config.lower_quantile)?;
    let upper = quantile(&sorted, config.upper_quantile)?;
    Some(OutlierBounds { lower, upper })
}

/// Keep observations whose value lies within the quantile bounds.
pub fn remove_outliers(series: &Series, config: &FilterConfig) -> Result<CleanedSeries> {
    config.validate()?;

    let Some(bounds) = compute_bounds(series, config) else {
        log::debug!("Empty series, nothing to clean");
        return Ok(CleanedSeries::default());
    };

    if bounds.is_degenerate() {
        log::warn!(
            "Outlier bounds collapsed to a single value ({}); cleaned series keeps only that value",
            bounds.lower
        );
    }

    let observations: Vec<Observation> = series
        .observations()
        .iter()
        .filter(|o| bounds.contains(o.value))
        .copied()
        .collect();
    let removed = series.len() - observations.len();

    log::debug!(
        "Outlier bounds [{:.3}, {:.3}] removed {removed} of {} observations",
        bounds.lower,
        bounds.upper,
        series.len()
    );

    Ok(CleanedSeries {
        observations,
        bounds: Some(bounds),
        removed,
    })
}
