use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// What the assembled series does with a water year whose input files are
/// missing.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingYearPolicy {
    /// Leave the year's dates out; the series is shorter than the window.
    #[default]
    #[serde(rename(deserialize = "skip"))]
    Skip,
    /// Keep the year's dates with no-data values.
    #[serde(rename(deserialize = "fill"))]
    Fill,
    /// Refuse to assemble the series.
    #[serde(rename(deserialize = "error"))]
    Error,
}

#[derive(Debug)]
pub struct MissingYearPolicyParseError(String);

impl fmt::Display for MissingYearPolicyParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "invalid missing-year policy '{}', expected one of skip, fill, error",
            self.0
        )
    }
}

impl std::error::Error for MissingYearPolicyParseError {}

impl FromStr for MissingYearPolicy {
    type Err = MissingYearPolicyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "skip" => Ok(MissingYearPolicy::Skip),
            "fill" => Ok(MissingYearPolicy::Fill),
            "error" => Ok(MissingYearPolicy::Error),
            other => Err(MissingYearPolicyParseError(other.to_string())),
        }
    }
}

impl fmt::Display for MissingYearPolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MissingYearPolicy::Skip => write!(f, "skip"),
            MissingYearPolicy::Fill => write!(f, "fill"),
            MissingYearPolicy::Error => write!(f, "error"),
        }
    }
}
