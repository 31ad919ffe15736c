use super::types::{FileError, FileType};
use std::path::Path;

pub fn reader_from_filetype(path: &Path) -> Result<FileType, FileError> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("tif") | Some("tiff") => Ok(FileType::GeoTiff),
        _ => Err(FileError::UnknownFileType(path.to_path_buf())),
    }
}

pub fn is_raster_file(path: &Path) -> bool {
    reader_from_filetype(path).is_ok()
}
