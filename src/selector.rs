use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::readers::is_raster_file;

/// Lists the raster files directly inside `directory` whose name contains
/// both keywords. Results come back in directory-listing order, which is
/// platform dependent. An unreadable or empty directory yields no matches.
pub fn select(directory: &Path, keyword1: &str, keyword2: &str) -> Vec<PathBuf> {
    WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|entry| {
            let name = entry.file_name().to_string_lossy();
            is_raster_file(entry.path()) && name.contains(keyword1) && name.contains(keyword2)
        })
        .map(|entry| entry.into_path())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    fn touch(dir: &Path, name: &str) {
        File::create(dir.join(name)).unwrap();
    }

    #[test]
    fn test_select_matches_both_keywords() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "WY1999_SWE.tif");
        touch(dir.path(), "WY1999_MASK.tif");
        touch(dir.path(), "WY2000_SWE.tif");

        let found = select(dir.path(), "1999", "SWE");
        assert_eq!(found, vec![dir.path().join("WY1999_SWE.tif")]);

        // Keyword order does not matter.
        let found = select(dir.path(), "MASK", "1999");
        assert_eq!(found, vec![dir.path().join("WY1999_MASK.tif")]);
    }

    #[test]
    fn test_select_requires_raster_extension() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "WY1999_SWE.tif.aux.xml");
        touch(dir.path(), "WY1999_SWE.csv");

        assert!(select(dir.path(), "1999", "SWE").is_empty());
    }

    #[test]
    fn test_select_is_not_recursive() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("archive");
        std::fs::create_dir(&nested).unwrap();
        touch(&nested, "WY1999_SWE.tif");

        assert!(select(dir.path(), "1999", "SWE").is_empty());
    }

    #[test]
    fn test_select_missing_directory_is_empty() {
        let dir = tempdir().unwrap();
        assert!(select(&dir.path().join("nope"), "1999", "SWE").is_empty());
    }

    #[test]
    fn test_select_multiple_matches() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "WY1999_SWE_a.tif");
        touch(dir.path(), "WY1999_SWE_b.tif");

        let mut found = select(dir.path(), "1999", "SWE");
        found.sort();
        assert_eq!(
            found,
            vec![
                dir.path().join("WY1999_SWE_a.tif"),
                dir.path().join("WY1999_SWE_b.tif"),
            ]
        );
    }
}
