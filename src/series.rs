//! Assembly of per-year daily means into one dated series.
//!
//! Every value is keyed by its calendar date, derived from the water year and
//! the 1-based day label, and the calendar axis is joined against those keys.
//! A year that is absent therefore never shifts the dates of later years.

use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use crate::config::MissingYearPolicy;
use crate::date_gen::{DateGenerator, WaterYear};

pub const ROUNDING_DIGITS: i32 = 4;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SeriesAlignmentError {
    #[error("water year {year} has {found} daily values but spans {expected} days")]
    DayCount {
        year: i32,
        expected: usize,
        found: usize,
    },

    #[error("water year {year} lies outside the {start}-{end} window")]
    OutOfWindow { year: i32, start: i32, end: i32 },

    #[error("water year {0} was supplied more than once")]
    DuplicateYear(i32),

    #[error("no data for water year {0}")]
    MissingYear(i32),

    #[error("invalid analysis window {start}-{end}")]
    InvalidWindow { start: i32, end: i32 },
}

/// Daily means of one water year, in day-label order.
#[derive(Debug, Clone, PartialEq)]
pub struct YearSequence {
    pub year: i32,
    pub values: Vec<Option<f64>>,
}

impl YearSequence {
    pub fn new(year: i32, values: Vec<Option<f64>>) -> Self {
        Self { year, values }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyMean {
    pub date: NaiveDate,
    /// `None` when no pixel contributed on that day.
    pub value: Option<f64>,
}

/// Dated catchment means in ascending date order.
///
/// Water years without input files are listed in `missing_years`. Under
/// [`MissingYearPolicy::Skip`] their dates are absent, so the series can be
/// shorter than the analysis window. Under [`MissingYearPolicy::Fill`] their
/// dates are present with no value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DailyMeanSeries {
    entries: Vec<DailyMean>,
    missing_years: Vec<i32>,
    policy: MissingYearPolicy,
}

impl DailyMeanSeries {
    pub fn entries(&self) -> &[DailyMean] {
        &self.entries
    }

    pub fn missing_years(&self) -> &[i32] {
        &self.missing_years
    }

    /// How the dates of `missing_years` were treated.
    pub fn policy(&self) -> MissingYearPolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, date: NaiveDate) -> Option<&DailyMean> {
        self.entries
            .binary_search_by_key(&date, |entry| entry.date)
            .ok()
            .map(|i| &self.entries[i])
    }

    pub fn values(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        self.entries.iter().map(|entry| entry.value)
    }
}

pub fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10_f64.powi(digits);
    (value * factor).round() / factor
}

/// Joins per-year daily means against the daily calendar of the
/// `start_year`..=`end_year` water years.
pub fn assemble(
    start_year: i32,
    end_year: i32,
    sequences: Vec<YearSequence>,
    policy: MissingYearPolicy,
) -> Result<DailyMeanSeries, SeriesAlignmentError> {
    let invalid_window = SeriesAlignmentError::InvalidWindow {
        start: start_year,
        end: end_year,
    };
    if start_year > end_year {
        return Err(invalid_window);
    }
    let calendar = DateGenerator::for_years(start_year, end_year).ok_or(invalid_window)?;

    let mut keyed: BTreeMap<NaiveDate, Option<f64>> = BTreeMap::new();
    let mut present = BTreeSet::new();

    for sequence in sequences {
        let year = sequence.year;
        if !(start_year..=end_year).contains(&year) {
            return Err(SeriesAlignmentError::OutOfWindow {
                year,
                start: start_year,
                end: end_year,
            });
        }
        if !present.insert(year) {
            return Err(SeriesAlignmentError::DuplicateYear(year));
        }

        let water_year = WaterYear::new(year).ok_or(SeriesAlignmentError::OutOfWindow {
            year,
            start: start_year,
            end: end_year,
        })?;
        if sequence.values.len() != water_year.len_days() {
            return Err(SeriesAlignmentError::DayCount {
                year,
                expected: water_year.len_days(),
                found: sequence.values.len(),
            });
        }

        for (index, value) in sequence.values.into_iter().enumerate() {
            if let Some(date) = water_year.date_of_day(index + 1) {
                keyed.insert(date, value.map(|v| round_to(v, ROUNDING_DIGITS)));
            }
        }
    }

    let mut missing_years = Vec::new();
    for water_year in calendar.water_years() {
        if present.contains(&water_year.year()) {
            continue;
        }
        match policy {
            MissingYearPolicy::Error => {
                return Err(SeriesAlignmentError::MissingYear(water_year.year()));
            }
            MissingYearPolicy::Skip | MissingYearPolicy::Fill => {
                missing_years.push(water_year.year())
            }
        }
    }

    let entries = calendar
        .generate_date_series()
        .into_iter()
        .filter_map(|date| match keyed.get(&date) {
            Some(&value) => Some(DailyMean { date, value }),
            None if policy == MissingYearPolicy::Fill => Some(DailyMean { date, value: None }),
            None => None,
        })
        .collect();

    Ok(DailyMeanSeries {
        entries,
        missing_years,
        policy,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("Invalid date")
    }

    fn constant(year: i32, value: f64) -> YearSequence {
        let days = WaterYear::new(year).unwrap().len_days();
        YearSequence::new(year, vec![Some(value); days])
    }

    #[test]
    fn test_series_spans_the_window() {
        let series = assemble(
            2001,
            2002,
            vec![constant(2001, 1.0), constant(2002, 2.0)],
            MissingYearPolicy::Skip,
        )
        .unwrap();

        assert_eq!(series.len(), 730);
        assert!(series.missing_years().is_empty());
        assert_eq!(series.entries()[0].date, date(2001, 10, 1));
        assert_eq!(series.entries()[729].date, date(2003, 9, 30));
        assert_eq!(series.get(date(2002, 9, 30)).unwrap().value, Some(1.0));
        assert_eq!(series.get(date(2002, 10, 1)).unwrap().value, Some(2.0));
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let series = assemble(
            2001,
            2002,
            vec![constant(2002, 2.0), constant(2001, 1.0)],
            MissingYearPolicy::Skip,
        )
        .unwrap();

        assert_eq!(series.entries()[0].value, Some(1.0));
        assert_eq!(series.entries()[729].value, Some(2.0));
    }

    #[test]
    fn test_skip_keeps_later_years_aligned() {
        let series = assemble(
            2001,
            2003,
            vec![constant(2001, 1.0), constant(2003, 3.0)],
            MissingYearPolicy::Skip,
        )
        .unwrap();

        // WY2003 contains Feb 29 2004.
        assert_eq!(series.len(), 365 + 366);
        assert_eq!(series.missing_years(), &[2002]);
        assert!(series.get(date(2003, 1, 1)).is_none());
        assert_eq!(series.get(date(2003, 10, 1)).unwrap().value, Some(3.0));
        assert_eq!(series.get(date(2004, 2, 29)).unwrap().value, Some(3.0));
    }

    #[test]
    fn test_fill_keeps_missing_dates() {
        let series = assemble(
            2001,
            2003,
            vec![constant(2001, 1.0), constant(2003, 3.0)],
            MissingYearPolicy::Fill,
        )
        .unwrap();

        assert_eq!(series.len(), 365 + 365 + 366);
        assert_eq!(series.missing_years(), &[2002]);
        assert_eq!(series.policy(), MissingYearPolicy::Fill);
        assert_eq!(series.get(date(2003, 1, 1)).unwrap().value, None);
        assert_eq!(series.get(date(2003, 10, 1)).unwrap().value, Some(3.0));
    }

    #[test]
    fn test_error_policy_rejects_missing_year() {
        let err = assemble(2001, 2002, vec![constant(2001, 1.0)], MissingYearPolicy::Error)
            .unwrap_err();
        assert_eq!(err, SeriesAlignmentError::MissingYear(2002));
    }

    #[test]
    fn test_day_count_mismatch_is_rejected() {
        let err = assemble(
            1999,
            1999,
            vec![YearSequence::new(1999, vec![Some(1.0); 365])],
            MissingYearPolicy::Skip,
        )
        .unwrap_err();

        assert_eq!(
            err,
            SeriesAlignmentError::DayCount {
                year: 1999,
                expected: 366,
                found: 365
            }
        );
    }

    #[test]
    fn test_out_of_window_and_duplicate_years() {
        let err = assemble(2001, 2001, vec![constant(2002, 1.0)], MissingYearPolicy::Skip)
            .unwrap_err();
        assert!(matches!(err, SeriesAlignmentError::OutOfWindow { year: 2002, .. }));

        let err = assemble(
            2001,
            2001,
            vec![constant(2001, 1.0), constant(2001, 2.0)],
            MissingYearPolicy::Skip,
        )
        .unwrap_err();
        assert_eq!(err, SeriesAlignmentError::DuplicateYear(2001));
    }

    #[test]
    fn test_values_are_rounded_and_gaps_kept() {
        let mut values = vec![Some(1.234_567); 365];
        values[1] = None;
        let series = assemble(
            2001,
            2001,
            vec![YearSequence::new(2001, values)],
            MissingYearPolicy::Skip,
        )
        .unwrap();

        assert_eq!(series.entries()[0].value, Some(1.2346));
        assert_eq!(series.entries()[1].value, None);
    }

    #[test]
    fn test_inverted_window() {
        let err = assemble(2002, 2001, vec![], MissingYearPolicy::Skip).unwrap_err();
        assert_eq!(
            err,
            SeriesAlignmentError::InvalidWindow {
                start: 2002,
                end: 2001
            }
        );
    }
}
