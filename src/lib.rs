//! Catchment-wide daily mean snow water equivalent from yearly raster stacks.
//!
//! Each water year has a multi-band SWE raster (one band per day) and a mask
//! raster flagging non-seasonal snow. The daily means of the seasonal-snow
//! pixels are joined into one dated series, written as CSV and optionally
//! drawn as a per-year figure.

pub mod aggregate;
pub mod array;
pub mod config;
pub mod date_gen;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod plot;
pub mod readers;
pub mod selector;
pub mod series;
pub mod utils;
pub mod variant;

pub use config::Config;
pub use error::PipelineError;
pub use pipeline::SweRunner;
