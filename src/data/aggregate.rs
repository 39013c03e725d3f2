//! Year / month grouping of the cleaned series.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;

use super::filter::CleanedSeries;
use super::model::{Month, CALENDAR};

// ---------------------------------------------------------------------------
// GroupedMean
// ---------------------------------------------------------------------------

/// Arithmetic mean of all cleaned observations sharing a (year, month).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupedMean {
    pub year: i32,
    pub month: Month,
    pub mean: f64,
    /// Number of observations averaged.
    pub count: usize,
}

#[derive(Default)]
struct Accumulator {
    sum: f64,
    count: usize,
}

/// Group by (year, month) and average.
///
/// Groups appear in order of first encounter. The cleaned series is date
/// ordered, so that is year ascending then month ascending. Months with no
/// observations are absent.
pub fn monthly_means(cleaned: &CleanedSeries) -> Vec<GroupedMean> {
    let mut order: Vec<(i32, Month)> = Vec::new();
    let mut buckets: HashMap<(i32, Month), Accumulator> = HashMap::new();

    for o in cleaned.observations() {
        let key = (o.year(), o.month());
        let acc = buckets.entry(key).or_insert_with(|| {
            order.push(key);
            Accumulator::default()
        });
        acc.sum += o.value;
        acc.count += 1;
    }

    let means: Vec<GroupedMean> = order
        .into_iter()
        .filter_map(|key| {
            let acc = buckets.get(&key)?;
            Some(GroupedMean {
                year: key.0,
                month: key.1,
                mean: acc.sum / acc.count as f64,
                count: acc.count,
            })
        })
        .collect();

    log::debug!("Grouped {} observations into {} months", cleaned.len(), means.len());
    means
}

// ---------------------------------------------------------------------------
// Flat annotated view (box plots)
// ---------------------------------------------------------------------------

/// A cleaned observation tagged with its year and month.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnotatedObservation {
    pub date: NaiveDate,
    pub value: f64,
    pub year: i32,
    pub month: Month,
}

/// Every cleaned observation annotated with year and month, sorted by month
/// number. The sort is stable: within a month, date order is kept.
pub fn annotate(cleaned: &CleanedSeries) -> Vec<AnnotatedObservation> {
    let mut flat: Vec<AnnotatedObservation> = cleaned
        .observations()
        .iter()
        .map(|o| AnnotatedObservation {
            date: o.date,
            value: o.value,
            year: o.year(),
            month: o.month(),
        })
        .collect();
    flat.sort_by_key(|a| a.month.number());
    flat
}

/// Values per year, years ascending.
pub fn values_by_year(flat: &[AnnotatedObservation]) -> BTreeMap<i32, Vec<f64>> {
    let mut groups: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
    for a in flat {
        groups.entry(a.year).or_default().push(a.value);
    }
    groups
}

/// Values per month across all years, in calendar order. Months with no
/// observations are left out.
pub fn values_by_month(flat: &[AnnotatedObservation]) -> Vec<(Month, Vec<f64>)> {
    let mut per_month: [Vec<f64>; 12] = Default::default();
    for a in flat {
        per_month[a.month.index()].push(a.value);
    }
    CALENDAR
        .iter()
        .zip(per_month)
        .filter(|(_, values)| !values.is_empty())
        .map(|(&month, values)| (month, values))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{remove_outliers, FilterConfig};
    use crate::data::model::{obs, Series};

    /// Cleaned series that keeps every observation.
    fn keep_all(observations: Vec<crate::data::model::Observation>) -> CleanedSeries {
        let series = Series::from_observations(observations).unwrap();
        let config = FilterConfig {
            lower_quantile: 0.0,
            upper_quantile: 1.0,
        };
        remove_outliers(&series, &config).unwrap()
    }

    #[test]
    fn test_monthly_means_order_and_values() {
        let cleaned = keep_all(vec![
            obs("2019-02-01", 4.0),
            obs("2018-12-01", 1.0),
            obs("2018-12-02", 3.0),
            obs("2019-01-01", 10.0),
            obs("2019-01-02", 20.0),
            obs("2019-01-03", 30.0),
        ]);
        let means = monthly_means(&cleaned);
        let keys: Vec<(i32, Month)> = means.iter().map(|g| (g.year, g.month)).collect();
        assert_eq!(
            keys,
            vec![
                (2018, Month::December),
                (2019, Month::January),
                (2019, Month::February),
            ]
        );
        assert_eq!(means[0].mean, 2.0);
        assert_eq!(means[1].mean, 20.0);
        assert_eq!(means[1].count, 3);
        assert_eq!(means[2].mean, 4.0);
    }

    #[test]
    fn test_grouping_completeness() {
        let observations: Vec<_> = (0..400)
            .map(|i| {
                let date = chrono::NaiveDate::from_ymd_opt(2017, 3, 1).unwrap()
                    + chrono::Duration::days(i);
                crate::data::model::Observation::new(date, (i % 17) as f64)
            })
            .collect();
        let cleaned = keep_all(observations);
        let means = monthly_means(&cleaned);

        let total: usize = means.iter().map(|g| g.count).sum();
        assert_eq!(total, cleaned.len());

        for g in &means {
            let members: Vec<f64> = cleaned
                .observations()
                .iter()
                .filter(|o| o.year() == g.year && o.month() == g.month)
                .map(|o| o.value)
                .collect();
            assert_eq!(members.len(), g.count);
            let expected = members.iter().sum::<f64>() / members.len() as f64;
            assert!((g.mean - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_missing_months_are_absent_not_zero() {
        let cleaned = keep_all(vec![obs("2019-01-15", 5.0), obs("2019-03-15", 7.0)]);
        let means = monthly_means(&cleaned);
        assert_eq!(means.len(), 2);
        assert!(means.iter().all(|g| g.month != Month::February));
    }

    #[test]
    fn test_empty_cleaned_series_has_no_groups() {
        assert!(monthly_means(&CleanedSeries::default()).is_empty());
        assert!(annotate(&CleanedSeries::default()).is_empty());
    }

    #[test]
    fn test_annotate_sorts_by_month_number_stably() {
        let cleaned = keep_all(vec![
            obs("2017-11-01", 1.0),
            obs("2018-01-01", 2.0),
            obs("2018-11-01", 3.0),
            obs("2019-01-01", 4.0),
        ]);
        let flat = annotate(&cleaned);
        let tagged: Vec<(i32, Month)> = flat.iter().map(|a| (a.year, a.month)).collect();
        assert_eq!(
            tagged,
            vec![
                (2018, Month::January),
                (2019, Month::January),
                (2017, Month::November),
                (2018, Month::November),
            ]
        );
    }

    #[test]
    fn test_values_by_year_ascending() {
        let cleaned = keep_all(vec![
            obs("2019-05-01", 1.0),
            obs("2017-05-01", 2.0),
            obs("2018-05-01", 3.0),
        ]);
        let groups = values_by_year(&annotate(&cleaned));
        let years: Vec<i32> = groups.keys().copied().collect();
        assert_eq!(years, vec![2017, 2018, 2019]);
    }

    #[test]
    fn test_values_by_month_calendar_order() {
        let cleaned = keep_all(vec![
            obs("2018-12-01", 1.0),
            obs("2018-04-01", 2.0),
            obs("2018-08-01", 3.0),
            obs("2019-04-01", 4.0),
        ]);
        let groups = values_by_month(&annotate(&cleaned));
        let months: Vec<Month> = groups.iter().map(|(m, _)| *m).collect();
        assert_eq!(months, vec![Month::April, Month::August, Month::December]);
        assert_eq!(groups[0].1, vec![2.0, 4.0]);
    }
}
