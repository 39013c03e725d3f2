use std::collections::BTreeMap;

use super::aggregate::GroupedMean;
use super::model::{Month, CALENDAR};

// ---------------------------------------------------------------------------
// PivotMatrix – year × month table of monthly means
// ---------------------------------------------------------------------------

/// One year of the pivot: a cell per calendar month, `None` where the year
/// has no data for that month.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotRow {
    pub year: i32,
    pub cells: [Option<f64>; 12],
}

impl PivotRow {
    pub fn cell(&self, month: Month) -> Option<f64> {
        self.cells[month.index()]
    }
}

/// Rows ascending by year, columns fixed to [`CALENDAR`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PivotMatrix {
    rows: Vec<PivotRow>,
}

impl PivotMatrix {
    /// Reshape monthly means into the year × month matrix.
    ///
    /// Builds an explicit `year → month → mean` mapping first, then lays each
    /// year out across the twelve calendar columns.
    pub fn from_means(means: &[GroupedMean]) -> Self {
        let mut by_year: BTreeMap<i32, BTreeMap<Month, f64>> = BTreeMap::new();
        for g in means {
            by_year.entry(g.year).or_default().insert(g.month, g.mean);
        }

        let rows = by_year
            .into_iter()
            .map(|(year, months)| PivotRow {
                year,
                cells: CALENDAR.map(|m| months.get(&m).copied()),
            })
            .collect();

        PivotMatrix { rows }
    }

    /// Column order. Always January through December.
    pub fn columns(&self) -> &'static [Month; 12] {
        &CALENDAR
    }

    pub fn rows(&self) -> &[PivotRow] {
        &self.rows
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.rows.iter().map(|r| r.year)
    }

    pub fn row(&self, year: i32) -> Option<&PivotRow> {
        self.rows
            .binary_search_by_key(&year, |r| r.year)
            .ok()
            .map(|i| &self.rows[i])
    }

    /// Mean for (year, month), `None` when no observations back the cell.
    pub fn cell(&self, year: i32, month: Month) -> Option<f64> {
        self.row(year)?.cell(month)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
