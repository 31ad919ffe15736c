//! CSV persistence of the daily series and the annual summary.

use chrono::NaiveDate;
use csv::WriterBuilder;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

use crate::series::{DailyMean, DailyMeanSeries};

#[derive(Debug, Serialize, Deserialize)]
struct DailyRow {
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "SWE_Mean")]
    swe_mean: Option<f64>,
}

/// Sentinel-filtered mean SWE of one water year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnualMean {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "SWE_Annual_Mean")]
    pub mean: Option<f64>,
}

const SERIES_HEADER: [&str; 2] = ["Date", "SWE_Mean"];
const ANNUAL_HEADER: [&str; 2] = ["Year", "SWE_Annual_Mean"];

// The header is written up front so that an empty table still has one.
fn writer_with_header(path: &Path, header: [&str; 2]) -> Result<csv::Writer<File>, csv::Error> {
    let mut writer = WriterBuilder::new().has_headers(false).from_path(path)?;
    writer.write_record(header)?;
    Ok(writer)
}

/// Writes `Date,SWE_Mean` rows. Days without data get an empty field.
pub fn write_series(path: &Path, series: &DailyMeanSeries) -> Result<(), csv::Error> {
    let mut writer = writer_with_header(path, SERIES_HEADER)?;
    for entry in series.entries() {
        writer.serialize(DailyRow {
            date: entry.date,
            swe_mean: entry.value,
        })?;
    }
    writer.flush()?;
    Ok(())
}

pub fn read_series(path: &Path) -> Result<Vec<DailyMean>, csv::Error> {
    let mut reader = csv::Reader::from_path(path)?;
    reader
        .deserialize::<DailyRow>()
        .map(|row| {
            row.map(|r| DailyMean {
                date: r.date,
                value: r.swe_mean,
            })
        })
        .collect()
}

pub fn write_annual(path: &Path, annual: &[AnnualMean]) -> Result<(), csv::Error> {
    let mut writer = writer_with_header(path, ANNUAL_HEADER)?;
    for row in annual {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn read_annual(path: &Path) -> Result<Vec<AnnualMean>, csv::Error> {
    let mut reader = csv::Reader::from_path(path)?;
    reader.deserialize().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MissingYearPolicy;
    use crate::series::{YearSequence, assemble};
    use tempfile::tempdir;

    fn sample_series() -> DailyMeanSeries {
        let mut values: Vec<Option<f64>> = (0..365).map(|d| Some(d as f64 / 7.0)).collect();
        values[10] = None;
        assemble(
            2001,
            2001,
            vec![YearSequence::new(2001, values)],
            MissingYearPolicy::Skip,
        )
        .unwrap()
    }

    #[test]
    fn test_series_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("swe_means.csv");
        let series = sample_series();

        write_series(&path, &series).unwrap();
        let rows = read_series(&path).unwrap();

        assert_eq!(rows.len(), series.len());
        for (read, written) in rows.iter().zip(series.entries()) {
            assert_eq!(read.date, written.date);
            match (read.value, written.value) {
                (Some(a), Some(b)) => assert!((a - b).abs() < 1e-4),
                (a, b) => assert_eq!(a, b),
            }
        }
        assert_eq!(rows[10].value, None);
    }

    #[test]
    fn test_series_layout() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("swe_means.csv");

        write_series(&path, &sample_series()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Date,SWE_Mean");
        assert_eq!(lines[1], "2001-10-01,0.0");
        assert_eq!(lines[2], "2001-10-02,0.1429");
        assert_eq!(lines[11], "2001-10-11,");
        assert_eq!(lines.len(), 366);
    }

    #[test]
    fn test_annual_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("annual.csv");
        let annual = vec![
            AnnualMean {
                year: 2001,
                mean: Some(12.5),
            },
            AnnualMean {
                year: 2002,
                mean: None,
            },
        ];

        write_annual(&path, &annual).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Year,SWE_Annual_Mean\n2001,12.5\n"));
        assert_eq!(read_annual(&path).unwrap(), annual);
    }

    #[test]
    fn test_empty_outputs_keep_their_header() {
        let dir = tempdir().unwrap();
        let series_path = dir.path().join("swe_means.csv");
        let annual_path = dir.path().join("annual.csv");

        write_series(&series_path, &DailyMeanSeries::default()).unwrap();
        write_annual(&annual_path, &[]).unwrap();

        assert_eq!(
            std::fs::read_to_string(&series_path).unwrap(),
            "Date,SWE_Mean\n"
        );
        assert_eq!(
            std::fs::read_to_string(&annual_path).unwrap(),
            "Year,SWE_Annual_Mean\n"
        );
        assert!(read_series(&series_path).unwrap().is_empty());
    }
}
