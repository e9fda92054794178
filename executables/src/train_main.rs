#![cfg_attr(feature = "strict", deny(warnings))]
#![cfg_attr(feature = "strict", deny(clippy::all))]
use chrono::Utc;
use common::{
    dataset, logging,
    util::{path_or_relative_to_project_root, write_serializable_to_json},
    PriceResult,
};
use evaluators::{KpiEvaluator, KpiOutput};
use predictions::Driver;
use predictors::{GbmPricePipeline, PipelineConfig};
use serde::Serialize;
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(StructOpt, Debug)]
#[structopt(about = "Fits the price pipeline on a training csv and saves the fitted state.")]
struct Cli {
    #[structopt(short = "d", long = "data", parse(from_os_str))]
    data_path: PathBuf,
    #[structopt(short = "t", long, default_value = "price")]
    target: String,
    #[structopt(long = "config", parse(from_os_str))]
    config_path: Option<PathBuf>,
    #[structopt(short = "o", long = "output", parse(from_os_str))]
    output_path: Option<PathBuf>,
    #[structopt(short = "m", long = "metrics", parse(from_os_str))]
    metrics_path: Option<PathBuf>,
    #[structopt(long, help = "Fit on raw prices instead of ln(1 + price)")]
    no_log_target: bool,
}

#[derive(Debug, Serialize)]
struct TrainingMetrics {
    validation: KpiOutput,
    in_sample: KpiOutput,
}

impl Cli {
    fn output_path(&self, timestamp: &str) -> PriceResult<PathBuf> {
        path_or_relative_to_project_root(
            self.output_path.as_ref(),
            &format!("data/models/{}.json", timestamp),
        )
    }

    fn metrics_path(&self, timestamp: &str) -> PriceResult<PathBuf> {
        path_or_relative_to_project_root(
            self.metrics_path.as_ref(),
            &format!("data/metrics/{}.json", timestamp),
        )
    }

    fn read_config(&self) -> PriceResult<PipelineConfig> {
        let mut config = match self.config_path.as_ref() {
            Some(path) => PipelineConfig::from_file(path)?,
            None => PipelineConfig::default(),
        };
        if self.no_log_target {
            config.log_target = false;
        }
        Ok(config)
    }
}

fn main() -> PriceResult<()> {
    logging::init_logging("train");

    let args = Cli::from_args();
    log::info!("CLI Arguments: {:?}", args);
    let config = args.read_config()?;
    log::info!("Using config {:#?}", config);

    log::info!("start loading data");
    let data = dataset::read_csv_from_path(&args.data_path, &args.target)?;
    log::info!("loaded {} rows", data.len());

    let pipeline = GbmPricePipeline::new(config);
    let evaluator = KpiEvaluator::new();
    let driver = Driver::with(&pipeline, &evaluator);

    let (_, validation) = driver.drive(&data)?;
    log::info!("Validation:\n{}", validation);

    log::info!("refitting on all data");
    let (state, in_sample) = driver.drive_full(&data)?;
    log::info!("In sample:\n{}", in_sample);

    let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%S").to_string();
    let output_path = args.output_path(&timestamp)?;
    state.save(&output_path)?;
    log::info!("Wrote fitted state to {:?}", &output_path);

    let metrics_path = args.metrics_path(&timestamp)?;
    write_serializable_to_json(
        &TrainingMetrics {
            validation,
            in_sample,
        },
        &metrics_path,
    )?;
    log::info!("Wrote evaluation to {:?}", &metrics_path);

    Ok(())
}
