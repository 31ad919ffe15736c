#![allow(dead_code)]

use gdal::DriverManager;
use gdal::raster::Buffer;
use gdal::spatial_ref::SpatialRef;
use ndarray::Array3;
use std::path::Path;

pub const TRANSFORM: [f64; 6] = [85.0, 0.00225, 0.0, 30.0, 0.0, -0.00225];

/// Writes a (band, row, col) stack as a float64 GeoTIFF in EPSG:4326.
pub fn write_geotiff(path: &Path, data: &Array3<f64>) {
    let (bands, height, width) = data.dim();
    let driver = DriverManager::get_driver_by_name("GTiff").expect("GTiff driver");
    let mut dataset = driver
        .create_with_band_type::<f64, _>(path, width, height, bands)
        .expect("create GeoTIFF");

    dataset.set_geo_transform(&TRANSFORM).expect("set transform");
    let srs = SpatialRef::from_epsg(4326).expect("EPSG:4326");
    dataset.set_spatial_ref(&srs).expect("set spatial ref");

    for (index, plane) in data.outer_iter().enumerate() {
        let mut band = dataset.rasterband(index + 1).expect("band");
        let mut buffer = Buffer::new((width, height), plane.iter().copied().collect());
        band.write((0, 0), (width, height), &mut buffer)
            .expect("write band");
    }
}

/// A 4x4 mask of seasonal snow with the top-left corner flagged as glacier.
pub fn corner_mask() -> Array3<f64> {
    let mut mask = Array3::zeros((1, 4, 4));
    mask[(0, 0, 0)] = 1.0;
    mask
}

pub fn constant_swe(days: usize, value: f64) -> Array3<f64> {
    Array3::from_elem((days, 4, 4), value)
}

/// Writes the SWE and mask rasters of one water year in the HMASR naming
/// scheme.
pub fn write_year(dir: &Path, year: i32, swe: &Array3<f64>, mask: &Array3<f64>) {
    write_geotiff(
        &dir.join(format!("HMA_SR_D_v01_WY{year}_SWE_mean.tif")),
        swe,
    );
    write_geotiff(&dir.join(format!("HMA_SR_D_v01_WY{year}_MASK.tif")), mask);
}
