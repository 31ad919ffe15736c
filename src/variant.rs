use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// Substrings identifying the two raster variables in a file name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct VariantKeywords {
    pub swe: String,
    pub mask: String,
}

impl Default for VariantKeywords {
    fn default() -> Self {
        Self {
            swe: "SWE".to_string(),
            mask: "MASK".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterVariant {
    Swe,
    Mask,
    Unrecognized,
}

impl RasterVariant {
    /// Classifies a raster by its file name. Only the final path component is
    /// inspected and the SWE keyword takes precedence over the mask keyword.
    pub fn classify(path: &Path, keywords: &VariantKeywords) -> Self {
        let Some(name) = path.file_name().map(|n| n.to_string_lossy()) else {
            return RasterVariant::Unrecognized;
        };

        if name.contains(keywords.swe.as_str()) {
            RasterVariant::Swe
        } else if name.contains(keywords.mask.as_str()) {
            RasterVariant::Mask
        } else {
            RasterVariant::Unrecognized
        }
    }

    /// Name of the leading (non-spatial) axis of arrays of this variant.
    pub fn leading_axis(&self) -> Option<&'static str> {
        match self {
            RasterVariant::Swe => Some("day"),
            RasterVariant::Mask => Some("Non_seasonal_snow"),
            RasterVariant::Unrecognized => None,
        }
    }
}

impl fmt::Display for RasterVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RasterVariant::Swe => write!(f, "SWE"),
            RasterVariant::Mask => write!(f, "Non_seasonal_snow"),
            RasterVariant::Unrecognized => write!(f, "unrecognized"),
        }
    }
}
