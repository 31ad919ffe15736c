use ndarray::Array3;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub trait DataReader {
    fn read_data(&self) -> Result<RasterStack, ReadError>;
}

/// Failure to turn a raster file into a [`RasterStack`].
///
/// A path that cannot be opened is reported as `NotFound` when nothing exists
/// there and as `RasterOpen` when gdal rejects the file; both are open errors.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("raster file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error(transparent)]
    UnknownType(#[from] FileError),

    #[error("failed to open raster {}: {source}", path.display())]
    RasterOpen {
        path: PathBuf,
        #[source]
        source: gdal::errors::GdalError,
    },

    #[error("failed to read band {band} of {}: {source}", path.display())]
    Band {
        path: PathBuf,
        band: usize,
        #[source]
        source: gdal::errors::GdalError,
    },

    #[error("{} has no raster bands", .0.display())]
    NoBands(PathBuf),

    #[error("band layout of {} does not fit its dimensions: {source}", path.display())]
    Layout {
        path: PathBuf,
        #[source]
        source: ndarray::ShapeError,
    },
}

#[derive(Debug, Error)]
pub enum FileError {
    #[error("unknown raster file type: {}", .0.display())]
    UnknownFileType(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    GeoTiff,
}

/// Six-parameter affine transform, in GDAL order:
/// `[origin_x, pixel_width, row_rotation, origin_y, column_rotation, pixel_height]`.
pub type GeoTransform = [f64; 6];

#[derive(Debug, Clone, PartialEq)]
pub struct RasterMetadata {
    pub width: usize,
    pub height: usize,
    pub band_count: usize,
    pub geo_transform: GeoTransform,
    /// Coordinate reference system as WKT, when the file carries one.
    pub crs_wkt: Option<String>,
    /// Authority code of the reference system (usually EPSG).
    pub epsg: Option<i32>,
    pub nodata: Option<f64>,
}

impl RasterMetadata {
    pub fn origin(&self) -> (f64, f64) {
        (self.geo_transform[0], self.geo_transform[3])
    }

    /// Per-pixel step along x and y. The y step is usually negative.
    pub fn pixel_size(&self) -> (f64, f64) {
        (self.geo_transform[1], self.geo_transform[5])
    }
}

/// All bands of one raster file, shaped (band, row, col).
#[derive(Debug, Clone)]
pub struct RasterStack {
    pub data: Array3<f64>,
    pub metadata: RasterMetadata,
}

impl RasterStack {
    pub fn new(data: Array3<f64>, metadata: RasterMetadata) -> Self {
        Self { data, metadata }
    }

    pub fn band_count(&self) -> usize {
        self.data.dim().0
    }
}

impl fmt::Display for RasterStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let finite = || self.data.iter().copied().filter(|x| x.is_finite());
        let min_value = finite().reduce(f64::min).unwrap_or(f64::NAN);
        let max_value = finite().reduce(f64::max).unwrap_or(f64::NAN);

        write!(
            f,
            "Bands: {}\nWidth: {}\nHeight: {}\nEPSG: {}\nMin value: {}\nMax value: {}",
            self.band_count(),
            self.metadata.width,
            self.metadata.height,
            self.metadata
                .epsg
                .map_or_else(|| "unknown".to_string(), |code| code.to_string()),
            min_value,
            max_value,
        )
    }
}
