pub mod geotiff;
pub mod types;
pub mod utils;

use std::path::Path;

pub use geotiff::GeoTiffReader;
pub use types::{
    DataReader, FileError, FileType, GeoTransform, RasterMetadata, RasterStack, ReadError,
};
pub use utils::{is_raster_file, reader_from_filetype};

pub fn create_reader(path: &Path) -> Result<Box<dyn DataReader>, FileError> {
    match reader_from_filetype(path)? {
        FileType::GeoTiff => Ok(Box::new(GeoTiffReader::new(path))),
    }
}

/// Reads every band of the raster at `path` with the reader its extension
/// selects.
pub fn open_raster(path: &Path) -> Result<RasterStack, ReadError> {
    create_reader(path)?.read_data()
}
