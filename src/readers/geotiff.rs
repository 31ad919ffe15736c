use super::{DataReader, RasterMetadata, RasterStack, ReadError};
use gdal::Dataset;
use ndarray::Array3;
use std::path::PathBuf;

pub struct GeoTiffReader {
    pub path: PathBuf,
}

impl GeoTiffReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn metadata(&self, dataset: &Dataset) -> Result<RasterMetadata, ReadError> {
        let (width, height) = dataset.raster_size();
        let band_count = dataset.raster_count();

        let geo_transform = dataset
            .geo_transform()
            .map_err(|source| ReadError::RasterOpen {
                path: self.path.clone(),
                source,
            })?;

        let spatial_ref = dataset.spatial_ref().ok();
        let crs_wkt = spatial_ref.as_ref().and_then(|srs| srs.to_wkt().ok());
        let epsg = spatial_ref.as_ref().and_then(|srs| srs.auth_code().ok());

        let nodata = if band_count > 0 {
            dataset.rasterband(1).ok().and_then(|b| b.no_data_value())
        } else {
            None
        };

        Ok(RasterMetadata {
            width,
            height,
            band_count,
            geo_transform,
            crs_wkt,
            epsg,
            nodata,
        })
    }
}

impl DataReader for GeoTiffReader {
    // The dataset is dropped on every return path, so at most one file
    // handle is open at a time.
    fn read_data(&self) -> Result<RasterStack, ReadError> {
        if !self.path.exists() {
            return Err(ReadError::NotFound(self.path.clone()));
        }

        let dataset = Dataset::open(&self.path).map_err(|source| ReadError::RasterOpen {
            path: self.path.clone(),
            source,
        })?;

        let metadata = self.metadata(&dataset)?;
        if metadata.band_count == 0 {
            return Err(ReadError::NoBands(self.path.clone()));
        }

        let (width, height) = (metadata.width, metadata.height);
        let mut buffer = Vec::with_capacity(metadata.band_count * width * height);

        for index in 1..=metadata.band_count {
            let band_error = |source| ReadError::Band {
                path: self.path.clone(),
                band: index,
                source,
            };
            let band = dataset.rasterband(index).map_err(band_error)?;
            let values = band
                .read_as::<f64>((0, 0), (width, height), (width, height), None)
                .map_err(band_error)?;
            buffer.extend_from_slice(values.data());
        }

        let data = Array3::from_shape_vec((metadata.band_count, height, width), buffer).map_err(
            |source| ReadError::Layout {
                path: self.path.clone(),
                source,
            },
        )?;

        log::debug!(
            "Read {} band(s) of {}x{} from {}",
            metadata.band_count,
            width,
            height,
            self.path.display()
        );

        Ok(RasterStack::new(data, metadata))
    }
}
