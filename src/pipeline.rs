use std::path::{Path, PathBuf};

use crate::aggregate::{self, AggregateError, SeasonalSnowMask, SentinelFilter};
use crate::array::{self, LabeledArray};
use crate::config::Config;
use crate::error::PipelineError;
use crate::output::{self, AnnualMean};
use crate::plot::{self, YearPanel};
use crate::readers;
use crate::selector;
use crate::series::{self, DailyMeanSeries, YearSequence};
use crate::variant::RasterVariant;

/// The SWE and mask rasters of one water year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearInputs {
    pub year: i32,
    pub swe: PathBuf,
    pub mask: PathBuf,
}

#[derive(Debug, Clone)]
pub struct YearResult {
    pub year: i32,
    pub daily: Vec<Option<f64>>,
    pub annual_mean: Option<f64>,
    pub panel: Option<YearPanel>,
}

#[derive(Debug, Clone)]
pub struct RunOutput {
    pub series: DailyMeanSeries,
    pub annual: Vec<AnnualMean>,
    pub panels: Vec<YearPanel>,
}

#[derive(Debug)]
pub struct SweRunner {
    config: Config,
}

impl SweRunner {
    pub fn new(config: Config) -> Self {
        SweRunner { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn pick(&self, year: i32, keyword: &str) -> Option<PathBuf> {
        let mut matches = selector::select(self.config.input_dir(), &year.to_string(), keyword);
        if matches.len() > 1 {
            log::warn!(
                "{} files match {} for {}, using {}",
                matches.len(),
                keyword,
                year,
                matches[0].display()
            );
        }
        (!matches.is_empty()).then(|| matches.swap_remove(0))
    }

    /// Finds the SWE and mask files of a water year. Returns `None`, with a
    /// warning, when either is missing.
    pub fn locate_year(&self, year: i32) -> Option<YearInputs> {
        let keywords = self.config.keywords();
        let mask = self.pick(year, &keywords.mask);
        let swe = self.pick(year, &keywords.swe);

        match (swe, mask) {
            (Some(swe), Some(mask)) => Some(YearInputs { year, swe, mask }),
            (swe, mask) => {
                let mut missing = Vec::new();
                if swe.is_none() {
                    missing.push(keywords.swe.as_str());
                }
                if mask.is_none() {
                    missing.push(keywords.mask.as_str());
                }
                log::warn!(
                    "Missing {} file(s) for year {}. Skipping...",
                    missing.join(" and "),
                    year
                );
                None
            }
        }
    }

    fn load(&self, path: &Path, expected: RasterVariant) -> Result<LabeledArray, PipelineError> {
        let stack = readers::open_raster(path)?;
        log::debug!("{}:\n{}", path.display(), stack);

        match array::build(stack, path, self.config.keywords()) {
            Some(array) if array.variant() == expected => Ok(array),
            built => Err(PipelineError::UnexpectedVariant {
                path: path.to_path_buf(),
                expected,
                found: built.map_or(RasterVariant::Unrecognized, |array| array.variant()),
            }),
        }
    }

    /// Reads one year's rasters and reduces them. Each file is closed before
    /// the next one is opened.
    pub fn process_year(&self, inputs: &YearInputs) -> Result<YearResult, PipelineError> {
        let year = inputs.year;
        let with_year = |source: AggregateError| PipelineError::Aggregate { year, source };

        let mask = self.load(&inputs.mask, RasterVariant::Mask)?;
        let swe = self.load(&inputs.swe, RasterVariant::Swe)?;
        log::info!(
            "Water year {}: {} day(s) on a {}x{} grid",
            year,
            swe.len(),
            swe.grid_shape().1,
            swe.grid_shape().0
        );

        let daily = aggregate::masked_daily_means(&swe, &mask).map_err(with_year)?;

        let sentinel = SentinelFilter {
            sentinel: self.config.nodata_sentinel(),
        };
        let annual_mean = aggregate::annual_mean(&swe, &[&sentinel]).map_err(with_year)?;

        let panel = match self.config.output_fig() {
            Some(_) => Some(YearPanel {
                year,
                mean: aggregate::temporal_mean_grid(&swe, &[&sentinel]).map_err(with_year)?,
                non_seasonal: SeasonalSnowMask::from_mask(&mask)
                    .map_err(with_year)?
                    .excluded()
                    .clone(),
            }),
            None => None,
        };

        Ok(YearResult {
            year,
            daily,
            annual_mean,
            panel,
        })
    }

    /// Processes every water year of the window in order and assembles the
    /// daily series.
    pub fn run(&self) -> Result<RunOutput, PipelineError> {
        self.config.validate()?;

        let mut sequences = Vec::new();
        let mut annual = Vec::new();
        let mut panels = Vec::new();

        for year in self.config.years() {
            let Some(inputs) = self.locate_year(year) else {
                continue;
            };

            let result = self.process_year(&inputs)?;
            annual.push(AnnualMean {
                year,
                mean: result.annual_mean,
            });
            panels.extend(result.panel);
            sequences.push(YearSequence::new(year, result.daily));
        }

        let series = series::assemble(
            self.config.start_year(),
            self.config.end_year(),
            sequences,
            self.config.missing_years(),
        )?;

        Ok(RunOutput {
            series,
            annual,
            panels,
        })
    }

    /// Runs the pipeline and writes every configured output.
    pub fn run_and_save(&self) -> Result<RunOutput, PipelineError> {
        let output = self.run()?;

        output::write_series(self.config.output_csv(), &output.series)?;
        log::info!(
            "SWE means saved to {}",
            self.config.output_csv().display()
        );

        if let Some(path) = self.config.annual_csv() {
            output::write_annual(path, &output.annual)?;
            log::info!("Annual means saved to {}", path.display());
        }

        if let Some(path) = self.config.output_fig() {
            if output.panels.is_empty() {
                log::warn!("No water year was processed, skipping the figure");
            } else {
                plot::render_figure(path, &output.panels, self.config.figure())?;
            }
        }

        Ok(output)
    }
}
