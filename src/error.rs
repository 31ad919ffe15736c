use std::path::PathBuf;
use thiserror::Error;

use crate::aggregate::AggregateError;
use crate::config::ConfigError;
use crate::plot::PlotError;
use crate::readers::ReadError;
use crate::series::SeriesAlignmentError;
use crate::variant::RasterVariant;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Read(#[from] ReadError),

    #[error("water year {year}: {source}")]
    Aggregate {
        year: i32,
        #[source]
        source: AggregateError,
    },

    #[error(transparent)]
    Alignment(#[from] SeriesAlignmentError),

    #[error("{} was selected as {expected} but its name classifies as {found}", path.display())]
    UnexpectedVariant {
        path: PathBuf,
        expected: RasterVariant,
        found: RasterVariant,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Plot(#[from] PlotError),
}
