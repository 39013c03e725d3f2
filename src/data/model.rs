use std::fmt;

use chrono::{Datelike, NaiveDate};

use super::error::{PipelineError, Result};

// ---------------------------------------------------------------------------
// Month – calendar month label shared by every view
// ---------------------------------------------------------------------------

/// A calendar month. Ordering follows the calendar, never the name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

/// The twelve months in calendar order.
///
/// Pivot columns, bar legends and the month-wise box plot axis all iterate
/// this one constant so the views cannot disagree on month order.
pub const CALENDAR: [Month; 12] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

impl Month {
    /// Month of a calendar date.
    pub fn of(date: NaiveDate) -> Month {
        CALENDAR[date.month0() as usize]
    }

    /// 1-based month number (January = 1).
    pub fn number(self) -> u32 {
        self.index() as u32 + 1
    }

    /// 0-based position in [`CALENDAR`].
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
            Month::September => "September",
            Month::October => "October",
            Month::November => "November",
            Month::December => "December",
        }
    }

    /// Three-letter label for narrow axes.
    pub fn short_name(self) -> &'static str {
        &self.name()[..3]
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Observation – one daily sample
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    pub fn month(&self) -> Month {
        Month::of(self.date)
    }
}

// ---------------------------------------------------------------------------
// Series – date-ordered observations with unique dates
// ---------------------------------------------------------------------------

/// Observations sorted ascending by date. Dates are unique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    observations: Vec<Observation>,
}

impl Series {
    /// Sort the observations by date and reject repeated dates.
    pub fn from_observations(mut observations: Vec<Observation>) -> Result<Self> {
        observations.sort_by_key(|o| o.date);
        if let Some(pair) = observations.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(PipelineError::malformed(
                format!("date {}", pair[0].date),
                "date appears more than once",
            ));
        }
        Ok(Series { observations })
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.observations.iter().map(|o| o.value)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.observations.first().map(|o| o.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.observations.last().map(|o| o.date)
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Whether the series is empty.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

#[cfg(test)]
pub(crate) fn obs(date: &str, value: f64) -> Observation {
    Observation::new(
        NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        value,
    )
}
