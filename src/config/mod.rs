use serde::Deserialize;
use serde::Deserializer;
use serde::de::Error;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::aggregate::DEFAULT_NODATA_SENTINEL;
use crate::date_gen::WaterYear;
use crate::plot::FigureStyle;
use crate::variant::VariantKeywords;

pub mod error;
pub use error::ConfigError;

pub mod missing_years;
pub use missing_years::MissingYearPolicy;

pub const DEFAULT_START_YEAR: i32 = 1999;
pub const DEFAULT_END_YEAR: i32 = 2016;

#[derive(Debug, Clone)]
pub struct Config {
    input_dir: PathBuf,
    output_csv: PathBuf,
    output_fig: Option<PathBuf>,
    annual_csv: Option<PathBuf>,
    start_year: i32,
    end_year: i32,
    keywords: VariantKeywords,
    missing_years: MissingYearPolicy,
    nodata_sentinel: f64,
    figure: FigureStyle,
}

fn check_years(start_year: i32, end_year: i32) -> Result<(), ConfigError> {
    for year in [start_year, end_year] {
        if WaterYear::new(year).is_none() {
            return Err(ConfigError::YearRange(year));
        }
    }
    if start_year > end_year {
        return Err(ConfigError::YearOrder {
            start: start_year,
            end: end_year,
        });
    }
    Ok(())
}

// An empty path means "not set"; it is how the command line says "no figure".
fn non_empty(path: Option<PathBuf>) -> Option<PathBuf> {
    path.filter(|p| !p.as_os_str().is_empty())
}

// Deserializes a Config, checking that the years are representable and in
// order. Paths may be left out and supplied later from the command line.
impl<'de> Deserialize<'de> for Config {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct ConfigHelper {
            input_dir: Option<PathBuf>,
            output_csv: Option<PathBuf>,
            output_fig: Option<PathBuf>,
            annual_csv: Option<PathBuf>,
            start_year: Option<i32>,
            end_year: Option<i32>,
            keywords: Option<VariantKeywords>,
            missing_years: Option<MissingYearPolicy>,
            nodata_sentinel: Option<f64>,
            figure: Option<FigureStyle>,
        }

        let helper = ConfigHelper::deserialize(deserializer)?;

        let start_year = helper.start_year.unwrap_or(DEFAULT_START_YEAR);
        let end_year = helper.end_year.unwrap_or(DEFAULT_END_YEAR);
        check_years(start_year, end_year).map_err(D::Error::custom)?;

        Ok(Config {
            input_dir: helper.input_dir.unwrap_or_default(),
            output_csv: helper.output_csv.unwrap_or_default(),
            output_fig: non_empty(helper.output_fig),
            annual_csv: non_empty(helper.annual_csv),
            start_year,
            end_year,
            keywords: helper.keywords.unwrap_or_default(),
            missing_years: helper.missing_years.unwrap_or_default(),
            nodata_sentinel: helper.nodata_sentinel.unwrap_or(DEFAULT_NODATA_SENTINEL),
            figure: helper.figure.unwrap_or_default(),
        })
    }
}

impl Config {
    pub fn new(input_dir: impl Into<PathBuf>, output_csv: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_csv: output_csv.into(),
            output_fig: None,
            annual_csv: None,
            start_year: DEFAULT_START_YEAR,
            end_year: DEFAULT_END_YEAR,
            keywords: VariantKeywords::default(),
            missing_years: MissingYearPolicy::default(),
            nodata_sentinel: DEFAULT_NODATA_SENTINEL,
            figure: FigureStyle::default(),
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let config: Config = serde_json::from_reader(reader).map_err(ConfigError::from)?;

        Ok(config)
    }

    pub fn with_years(mut self, start_year: i32, end_year: i32) -> Result<Self, ConfigError> {
        check_years(start_year, end_year)?;
        self.start_year = start_year;
        self.end_year = end_year;
        Ok(self)
    }

    pub fn with_input_dir(mut self, input_dir: impl Into<PathBuf>) -> Self {
        self.input_dir = input_dir.into();
        self
    }

    pub fn with_output_csv(mut self, output_csv: impl Into<PathBuf>) -> Self {
        self.output_csv = output_csv.into();
        self
    }

    pub fn with_output_fig(mut self, output_fig: Option<PathBuf>) -> Self {
        self.output_fig = non_empty(output_fig);
        self
    }

    pub fn with_annual_csv(mut self, annual_csv: Option<PathBuf>) -> Self {
        self.annual_csv = non_empty(annual_csv);
        self
    }

    pub fn with_keywords(mut self, keywords: VariantKeywords) -> Self {
        self.keywords = keywords;
        self
    }

    pub fn with_missing_years(mut self, policy: MissingYearPolicy) -> Self {
        self.missing_years = policy;
        self
    }

    pub fn with_nodata_sentinel(mut self, sentinel: f64) -> Self {
        self.nodata_sentinel = sentinel;
        self
    }

    pub fn with_figure_style(mut self, style: FigureStyle) -> Self {
        self.figure = style;
        self
    }

    /// Checks the settings that can only be verified against the file system.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input_dir.as_os_str().is_empty() {
            return Err(ConfigError::Missing("input_dir"));
        }
        if self.output_csv.as_os_str().is_empty() {
            return Err(ConfigError::Missing("output_csv"));
        }
        if !self.input_dir.is_dir() {
            return Err(ConfigError::InputDir(self.input_dir.clone()));
        }
        check_years(self.start_year, self.end_year)
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    pub fn output_csv(&self) -> &Path {
        &self.output_csv
    }

    pub fn output_fig(&self) -> Option<&Path> {
        self.output_fig.as_deref()
    }

    pub fn annual_csv(&self) -> Option<&Path> {
        self.annual_csv.as_deref()
    }

    pub fn start_year(&self) -> i32 {
        self.start_year
    }

    pub fn end_year(&self) -> i32 {
        self.end_year
    }

    pub fn years(&self) -> std::ops::RangeInclusive<i32> {
        self.start_year..=self.end_year
    }

    pub fn keywords(&self) -> &VariantKeywords {
        &self.keywords
    }

    pub fn missing_years(&self) -> MissingYearPolicy {
        self.missing_years
    }

    pub fn nodata_sentinel(&self) -> f64 {
        self.nodata_sentinel
    }

    pub fn figure(&self) -> &FigureStyle {
        &self.figure
    }
}
