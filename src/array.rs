//! Labelled, coordinate-aware views of raster stacks.

use ndarray::{Array1, Array3, ArrayView2};
use std::path::Path;

use crate::readers::{GeoTransform, RasterStack};
use crate::variant::{RasterVariant, VariantKeywords};

/// A raster stack with a named leading axis and explicit `y`/`x` coordinates.
///
/// The leading axis is `day` for SWE stacks and `Non_seasonal_snow` for mask
/// stacks, labelled `1..=N`. The data keeps the (leading, y, x) layout of the
/// source file.
#[derive(Debug, Clone)]
pub struct LabeledArray {
    variant: RasterVariant,
    data: Array3<f64>,
    labels: Vec<usize>,
    y: Array1<f64>,
    x: Array1<f64>,
    crs_wkt: Option<String>,
    epsg: Option<i32>,
    transform: GeoTransform,
}

impl LabeledArray {
    pub fn variant(&self) -> RasterVariant {
        self.variant
    }

    pub fn name(&self) -> String {
        self.variant.to_string()
    }

    pub fn leading_axis(&self) -> &'static str {
        self.variant.leading_axis().unwrap_or("band")
    }

    pub fn dims(&self) -> [&'static str; 3] {
        [self.leading_axis(), "y", "x"]
    }

    pub fn data(&self) -> &Array3<f64> {
        &self.data
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn y(&self) -> &Array1<f64> {
        &self.y
    }

    pub fn x(&self) -> &Array1<f64> {
        &self.x
    }

    pub fn crs_wkt(&self) -> Option<&str> {
        self.crs_wkt.as_deref()
    }

    pub fn epsg(&self) -> Option<i32> {
        self.epsg
    }

    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Spatial grid shape as (height, width).
    pub fn grid_shape(&self) -> (usize, usize) {
        let (_, height, width) = self.data.dim();
        (height, width)
    }

    /// One (y, x) plane of the leading axis, by zero-based index.
    pub fn plane(&self, index: usize) -> Option<ArrayView2<'_, f64>> {
        (index < self.len()).then(|| self.data.index_axis(ndarray::Axis(0), index))
    }
}

/// Coordinates of the top-left corner of each pixel along one axis.
pub fn axis_coordinates(origin: f64, step: f64, count: usize) -> Array1<f64> {
    Array1::from_iter((0..count).map(|i| origin + i as f64 * step))
}

/// Wraps a raster stack into a labelled array, classifying it by the file
/// name. Returns `None` for files that are neither SWE nor mask rasters.
pub fn build(stack: RasterStack, path: &Path, keywords: &VariantKeywords) -> Option<LabeledArray> {
    let variant = RasterVariant::classify(path, keywords);
    if variant == RasterVariant::Unrecognized {
        return None;
    }

    let RasterStack { data, metadata } = stack;
    let (_, height, width) = data.dim();
    let (origin_x, origin_y) = metadata.origin();
    let (step_x, step_y) = metadata.pixel_size();

    Some(LabeledArray {
        variant,
        labels: (1..=data.dim().0).collect(),
        y: axis_coordinates(origin_y, step_y, height),
        x: axis_coordinates(origin_x, step_x, width),
        data,
        crs_wkt: metadata.crs_wkt,
        epsg: metadata.epsg,
        transform: metadata.geo_transform,
    })
}
