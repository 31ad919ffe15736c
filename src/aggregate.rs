//! Spatial reductions of SWE stacks under composable pixel filters.

use ndarray::{Array2, ArrayView2, Axis};
use thiserror::Error;

use crate::array::LabeledArray;
use crate::variant::RasterVariant;

pub const DEFAULT_NODATA_SENTINEL: f64 = -999.0;

#[derive(Debug, Error, PartialEq)]
pub enum AggregateError {
    #[error(
        "shape mismatch: SWE grid is {swe:?} (rows, cols) but the mask grid is {mask:?}"
    )]
    ShapeMismatch {
        swe: (usize, usize),
        mask: (usize, usize),
    },

    #[error("expected a {expected} array, got {found}")]
    WrongVariable {
        expected: RasterVariant,
        found: RasterVariant,
    },

    #[error("mask array has no layers")]
    EmptyMask,
}

/// Decides whether a single SWE pixel takes part in a mean.
pub trait PixelFilter {
    fn keep(&self, row: usize, col: usize, value: f64) -> bool;
}

/// Keeps seasonal-snow pixels: those whose mask value is exactly 0.
///
/// Only the first mask layer is used, and it applies to every day of the
/// SWE stack.
#[derive(Debug, Clone)]
pub struct SeasonalSnowMask {
    excluded: Array2<bool>,
}

impl SeasonalSnowMask {
    pub fn from_mask(mask: &LabeledArray) -> Result<Self, AggregateError> {
        if mask.variant() != RasterVariant::Mask {
            return Err(AggregateError::WrongVariable {
                expected: RasterVariant::Mask,
                found: mask.variant(),
            });
        }
        let layer = mask.plane(0).ok_or(AggregateError::EmptyMask)?;
        Ok(Self::from_layer(layer))
    }

    pub fn from_layer(layer: ArrayView2<'_, f64>) -> Self {
        Self {
            excluded: layer.mapv(|v| v != 0.0),
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        self.excluded.dim()
    }

    /// True where the pixel is non-seasonal snow.
    pub fn excluded(&self) -> &Array2<bool> {
        &self.excluded
    }

    pub fn included_count(&self) -> usize {
        self.excluded.iter().filter(|&&e| !e).count()
    }
}

impl PixelFilter for SeasonalSnowMask {
    fn keep(&self, row: usize, col: usize, _value: f64) -> bool {
        self.excluded
            .get((row, col))
            .is_some_and(|excluded| !excluded)
    }
}

/// Drops pixels carrying a literal no-data value.
#[derive(Debug, Clone, Copy)]
pub struct SentinelFilter {
    pub sentinel: f64,
}

impl Default for SentinelFilter {
    fn default() -> Self {
        Self {
            sentinel: DEFAULT_NODATA_SENTINEL,
        }
    }
}

impl PixelFilter for SentinelFilter {
    fn keep(&self, _row: usize, _col: usize, value: f64) -> bool {
        value != self.sentinel
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct MeanAccumulator {
    sum: f64,
    count: usize,
}

impl MeanAccumulator {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

fn accumulate(
    acc: &mut MeanAccumulator,
    plane: ArrayView2<'_, f64>,
    filters: &[&dyn PixelFilter],
) {
    for ((row, col), &value) in plane.indexed_iter() {
        if value.is_finite() && filters.iter().all(|f| f.keep(row, col, value)) {
            acc.push(value);
        }
    }
}

fn check_swe(swe: &LabeledArray) -> Result<(), AggregateError> {
    if swe.variant() != RasterVariant::Swe {
        return Err(AggregateError::WrongVariable {
            expected: RasterVariant::Swe,
            found: swe.variant(),
        });
    }
    Ok(())
}

/// Mean over both spatial axes for every day, keeping only the pixels that
/// pass all filters. Non-finite values never count. A day with no
/// qualifying pixel yields `None`.
pub fn daily_means(swe: &LabeledArray, filters: &[&dyn PixelFilter]) -> Vec<Option<f64>> {
    swe.data()
        .axis_iter(Axis(0))
        .map(|plane| {
            let mut acc = MeanAccumulator::default();
            accumulate(&mut acc, plane, filters);
            acc.mean()
        })
        .collect()
}

/// Daily catchment means of seasonal-snow pixels, one entry per day in
/// ascending day order.
pub fn masked_daily_means(
    swe: &LabeledArray,
    mask: &LabeledArray,
) -> Result<Vec<Option<f64>>, AggregateError> {
    check_swe(swe)?;
    let seasonal = SeasonalSnowMask::from_mask(mask)?;

    if seasonal.shape() != swe.grid_shape() {
        return Err(AggregateError::ShapeMismatch {
            swe: swe.grid_shape(),
            mask: seasonal.shape(),
        });
    }

    let means = daily_means(swe, &[&seasonal]);

    let empty_days = means.iter().filter(|m| m.is_none()).count();
    if empty_days > 0 {
        log::warn!(
            "{} of {} day(s) have no seasonal-snow pixel with data",
            empty_days,
            means.len()
        );
    }

    Ok(means)
}

/// Single mean over every day and pixel that passes the filters.
pub fn annual_mean(
    swe: &LabeledArray,
    filters: &[&dyn PixelFilter],
) -> Result<Option<f64>, AggregateError> {
    check_swe(swe)?;

    let mut acc = MeanAccumulator::default();
    for plane in swe.data().axis_iter(Axis(0)) {
        accumulate(&mut acc, plane, filters);
    }

    Ok(acc.mean())
}

/// Per-pixel mean over the day axis. Pixels with no qualifying day are NaN.
pub fn temporal_mean_grid(
    swe: &LabeledArray,
    filters: &[&dyn PixelFilter],
) -> Result<Array2<f64>, AggregateError> {
    check_swe(swe)?;

    let (height, width) = swe.grid_shape();
    let mut grid = Array2::<MeanAccumulator>::default((height, width));

    for plane in swe.data().axis_iter(Axis(0)) {
        for ((row, col), &value) in plane.indexed_iter() {
            if value.is_finite() && filters.iter().all(|f| f.keep(row, col, value)) {
                grid[(row, col)].push(value);
            }
        }
    }

    Ok(grid.mapv(|acc| acc.mean().unwrap_or(f64::NAN)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::build;
    use crate::readers::{RasterMetadata, RasterStack};
    use crate::variant::VariantKeywords;
    use ndarray::{Array3, array};
    use std::path::Path;

    fn labeled(data: Array3<f64>, name: &str) -> LabeledArray {
        let (bands, height, width) = data.dim();
        let metadata = RasterMetadata {
            width,
            height,
            band_count: bands,
            geo_transform: [0.0, 1.0, 0.0, 0.0, 0.0, -1.0],
            crs_wkt: None,
            epsg: None,
            nodata: None,
        };
        build(
            RasterStack::new(data, metadata),
            Path::new(name),
            &VariantKeywords::default(),
        )
        .unwrap()
    }

    fn corner_mask() -> LabeledArray {
        labeled(array![[[0.0, 0.0], [0.0, 1.0]]], "WY2001_MASK.tif")
    }

    #[test]
    fn test_masked_mean_excludes_non_seasonal_pixel() {
        let swe = labeled(
            array![
                [[1.0, 2.0], [3.0, 100.0]],
                [[4.0, 4.5], [5.0, 100.0]],
                [[0.1, 0.2], [0.4, 100.0]],
            ],
            "WY2001_SWE.tif",
        );

        let means = masked_daily_means(&swe, &corner_mask()).unwrap();

        assert_eq!(means.len(), 3);
        assert!((means[0].unwrap() - 2.0).abs() < 1e-4);
        assert!((means[1].unwrap() - 4.5).abs() < 1e-4);
        assert!((means[2].unwrap() - 0.2333).abs() < 1e-4);
    }

    #[test]
    fn test_masked_mean_is_not_zero_fill() {
        let swe = labeled(array![[[6.0, 6.0], [6.0, 6.0]]], "WY2001_SWE.tif");
        let means = masked_daily_means(&swe, &corner_mask()).unwrap();
        assert_eq!(means, vec![Some(6.0)]);
    }

    #[test]
    fn test_fully_masked_day_is_none() {
        let swe = labeled(array![[[1.0, 2.0], [3.0, 4.0]]], "WY2001_SWE.tif");
        let mask = labeled(array![[[1.0, 2.0], [3.0, 4.0]]], "WY2001_MASK.tif");

        let means = masked_daily_means(&swe, &mask).unwrap();
        assert_eq!(means, vec![None]);
    }

    #[test]
    fn test_nan_pixels_do_not_count() {
        let swe = labeled(array![[[f64::NAN, 2.0], [4.0, 9.0]]], "WY2001_SWE.tif");
        let means = masked_daily_means(&swe, &corner_mask()).unwrap();
        assert_eq!(means, vec![Some(3.0)]);
    }

    #[test]
    fn test_only_first_mask_layer_is_used() {
        let swe = labeled(array![[[1.0, 3.0], [5.0, 7.0]]], "WY2001_SWE.tif");
        let mask = labeled(
            array![[[0.0, 0.0], [0.0, 1.0]], [[1.0, 1.0], [1.0, 1.0]]],
            "WY2001_MASK.tif",
        );

        let means = masked_daily_means(&swe, &mask).unwrap();
        assert_eq!(means, vec![Some(3.0)]);
    }

    #[test]
    fn test_shape_mismatch_is_rejected() {
        let swe = labeled(Array3::zeros((2, 3, 2)), "WY2001_SWE.tif");

        let err = masked_daily_means(&swe, &corner_mask()).unwrap_err();
        assert_eq!(
            err,
            AggregateError::ShapeMismatch {
                swe: (3, 2),
                mask: (2, 2)
            }
        );
    }

    #[test]
    fn test_swapped_arguments_are_rejected() {
        let swe = labeled(Array3::zeros((2, 2, 2)), "WY2001_SWE.tif");

        let err = masked_daily_means(&corner_mask(), &swe).unwrap_err();
        assert!(matches!(err, AggregateError::WrongVariable { .. }));
    }

    #[test]
    fn test_sentinel_filter_is_independent_of_mask() {
        let swe = labeled(
            array![[[-999.0, 2.0], [4.0, 6.0]], [[1.0, -999.0], [3.0, 5.0]]],
            "WY2001_SWE.tif",
        );
        let sentinel = SentinelFilter::default();

        // Sentinel only: (2 + 4 + 6 + 1 + 3 + 5) / 6
        let mean = annual_mean(&swe, &[&sentinel]).unwrap().unwrap();
        assert!((mean - 3.5).abs() < 1e-12);

        // Sentinel and mask compose: (2 + 4 + 1 + 3) / 4
        let mask = SeasonalSnowMask::from_mask(&corner_mask()).unwrap();
        let mean = annual_mean(&swe, &[&sentinel, &mask]).unwrap().unwrap();
        assert!((mean - 2.5).abs() < 1e-12);

        // Mask only still counts the sentinel values.
        let daily = daily_means(&swe, &[&mask]);
        assert!((daily[0].unwrap() - (-999.0 + 2.0 + 4.0) / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_temporal_mean_grid() {
        let swe = labeled(
            array![[[-999.0, 2.0], [4.0, 6.0]], [[-999.0, 4.0], [8.0, 6.0]]],
            "WY2001_SWE.tif",
        );

        let grid = temporal_mean_grid(&swe, &[&SentinelFilter::default()]).unwrap();

        assert!(grid[(0, 0)].is_nan());
        assert_eq!(grid[(0, 1)], 3.0);
        assert_eq!(grid[(1, 0)], 6.0);
        assert_eq!(grid[(1, 1)], 6.0);
    }

    #[test]
    fn test_seasonal_mask_counts() {
        let mask = SeasonalSnowMask::from_mask(&corner_mask()).unwrap();
        assert_eq!(mask.included_count(), 3);
        assert!(mask.excluded()[(1, 1)]);
        assert!(!mask.keep(5, 5, 1.0));
    }
}
