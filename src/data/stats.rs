// ---------------------------------------------------------------------------
// Percentile helper
// ---------------------------------------------------------------------------

/// Compute the `q`-quantile (0.0 ..= 1.0) of a **sorted** slice using linear
/// interpolation between order statistics (NumPy / pandas default).
///
/// Returns `None` for an empty slice.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    let len = sorted.len();
    if len == 0 {
        return None;
    }
    if len == 1 {
        return Some(sorted[0]);
    }
    let rank = q.clamp(0.0, 1.0) * (len as f64 - 1.0);
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return Some(sorted[lo]);
    }
    let frac = rank - lo as f64;
    Some(sorted[lo] + frac * (sorted[hi] - sorted[lo]))
}

/// Copy and sort values ascending.
pub fn sorted_values(values: impl IntoIterator<Item = f64>) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.into_iter().collect();
    sorted.sort_by(f64::total_cmp);
    sorted
}

// ---------------------------------------------------------------------------
// BoxSummary – five numbers of a box-and-whisker glyph
// ---------------------------------------------------------------------------

/// Tukey box statistics. Whiskers reach the most extreme observations that
/// lie within 1.5 × IQR of the box; anything beyond is a flier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxSummary {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub fliers: usize,
    pub count: usize,
}

impl BoxSummary {
    const WHISKER_IQR: f64 = 1.5;

    pub fn from_values(values: &[f64]) -> Option<Self> {
        let sorted = sorted_values(values.iter().copied());
        let q1 = quantile(&sorted, 0.25)?;
        let median = quantile(&sorted, 0.5)?;
        let q3 = quantile(&sorted, 0.75)?;

        let iqr = q3 - q1;
        let low_fence = q1 - Self::WHISKER_IQR * iqr;
        let high_fence = q3 + Self::WHISKER_IQR * iqr;

        let inside: Vec<f64> = sorted
            .iter()
            .copied()
            .filter(|v| (low_fence..=high_fence).contains(v))
            .collect();
        let lower_whisker = inside.first().copied().unwrap_or(q1);
        let upper_whisker = inside.last().copied().unwrap_or(q3);
        let fliers = sorted.len() - inside.len();

        Some(BoxSummary {
            lower_whisker,
            q1,
            median,
            q3,
            upper_whisker,
            fliers,
            count: sorted.len(),
        })
    }
}
