use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use hmasr_swe::config::MissingYearPolicy;
use hmasr_swe::{Config, SweRunner, utils};

/// Calculate SWE means from GeoTIFF files.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the directory containing the input GeoTIFF files.
    #[arg(long = "input_dir", required_unless_present = "config")]
    input_dir: Option<PathBuf>,

    /// Path to save the output CSV file containing SWE means.
    #[arg(long = "output_csv", required_unless_present = "config")]
    output_csv: Option<PathBuf>,

    /// Path to save the per-year figure (PNG). Empty skips plotting.
    #[arg(long = "output_fig")]
    output_fig: Option<String>,

    /// Path to save the annual mean SWE of each water year.
    #[arg(long = "annual_csv")]
    annual_csv: Option<PathBuf>,

    /// Start year for the analysis [default: 1999].
    #[arg(long = "start_year")]
    start_year: Option<i32>,

    /// End year for the analysis [default: 2016].
    #[arg(long = "end_year")]
    end_year: Option<i32>,

    /// What to do with water years whose files are missing: skip, fill or error.
    #[arg(long = "missing_years")]
    missing_years: Option<MissingYearPolicy>,

    /// JSON configuration file. Command-line flags take precedence.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn build_config(cli: Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => Config::new(PathBuf::new(), PathBuf::new()),
    };

    if let Some(input_dir) = cli.input_dir {
        config = config.with_input_dir(input_dir);
    }
    if let Some(output_csv) = cli.output_csv {
        config = config.with_output_csv(output_csv);
    }
    if let Some(output_fig) = cli.output_fig {
        config = config.with_output_fig(Some(PathBuf::from(output_fig)));
    }
    if cli.annual_csv.is_some() {
        config = config.with_annual_csv(cli.annual_csv);
    }
    if let Some(policy) = cli.missing_years {
        config = config.with_missing_years(policy);
    }
    if cli.start_year.is_some() || cli.end_year.is_some() {
        let start_year = cli.start_year.unwrap_or(config.start_year());
        let end_year = cli.end_year.unwrap_or(config.end_year());
        config = config.with_years(start_year, end_year)?;
    }

    config.validate()?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = build_config(Cli::parse())?;

    log::info!(
        "Calculating SWE means for {} to {}...",
        config.start_year(),
        config.end_year()
    );
    log::info!("Input directory: {}", config.input_dir().display());
    log::info!("Output CSV: {}", config.output_csv().display());

    let runner = SweRunner::new(config);
    let output = runner.run_and_save()?;

    utils::log_series_statistics(&output.series);

    Ok(())
}
