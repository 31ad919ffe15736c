use crate::config::MissingYearPolicy;
use crate::series::DailyMeanSeries;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesStatistics {
    pub days: usize,
    pub valid_days: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

pub fn series_statistics(series: &DailyMeanSeries) -> SeriesStatistics {
    let valid_values: Vec<f64> = series.values().flatten().collect();

    SeriesStatistics {
        days: series.len(),
        valid_days: valid_values.len(),
        min: valid_values.iter().copied().fold(f64::INFINITY, f64::min),
        max: valid_values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        mean: if valid_values.is_empty() {
            f64::NAN
        } else {
            valid_values.iter().sum::<f64>() / valid_values.len() as f64
        },
    }
}

/// Describes the water years that had no input files, worded by how the
/// series treated them.
pub fn missing_years_note(series: &DailyMeanSeries) -> Option<String> {
    let years = series.missing_years();
    if years.is_empty() {
        return None;
    }
    let treatment = match series.policy() {
        MissingYearPolicy::Fill => "filled with empty values",
        MissingYearPolicy::Skip | MissingYearPolicy::Error => "left out of the series",
    };
    Some(format!("Water years without files ({treatment}): {years:?}"))
}

pub fn log_series_statistics(series: &DailyMeanSeries) {
    let stats = series_statistics(series);

    log::info!(
        "SWE series - Number of days: {}, days with data: {}",
        stats.days,
        stats.valid_days
    );

    if stats.valid_days > 0 {
        log::info!("  Min: {:.4} m", stats.min);
        log::info!("  Max: {:.4} m", stats.max);
        log::info!("  Mean: {:.4} m", stats.mean);
        log::info!(
            "  Valid days: {} / {} ({:.1}%)",
            stats.valid_days,
            stats.days,
            100.0 * stats.valid_days as f64 / stats.days as f64
        );
    }

    if let Some(note) = missing_years_note(series) {
        log::warn!("  {}", note);
    }
}
