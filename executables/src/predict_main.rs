#![cfg_attr(feature = "strict", deny(warnings))]
#![cfg_attr(feature = "strict", deny(clippy::all))]
use common::{logging, PriceResult, PropertyRecord};
use executables::{parse_record, read_requests, PredictionResponse, GENERIC_ERROR_MESSAGE};
use predictions::Pipeline;
use predictors::{FittedEncodingState, GbmPricePipeline};
use rayon::prelude::*;
use serde_json::Value;
use std::iter::once;
use std::path::PathBuf;
use std::process;
use structopt::StructOpt;

#[derive(StructOpt, Debug)]
#[structopt(
    about = "Predicts the price of every property in the input and prints one json line each."
)]
struct Cli {
    #[structopt(short = "m", long = "model", parse(from_os_str))]
    model_path: PathBuf,
    #[structopt(
        short = "i",
        long = "input",
        parse(from_os_str),
        help = "json or json lines, read from stdin if not given"
    )]
    input_path: Option<PathBuf>,
}

fn predict_one(
    pipeline: &GbmPricePipeline,
    state: &FittedEncodingState,
    request: &Value,
) -> PriceResult<f64> {
    let record = parse_record(request)?;
    let frame = PropertyRecord::to_frame(once(&record))?;
    pipeline
        .predict(state, &frame)?
        .into_iter()
        .next()
        .ok_or_else(|| "pipeline returned no price".into())
}

fn fail(err: impl std::fmt::Display) -> ! {
    log::error!("{}", err);
    eprintln!("{}", GENERIC_ERROR_MESSAGE);
    process::exit(1)
}

fn main() {
    logging::init_file_logging("predict");

    let args = Cli::from_args();
    log::info!("CLI Arguments: {:?}", args);

    let state = FittedEncodingState::load(&args.model_path).unwrap_or_else(|err| fail(err));
    let requests = read_requests(args.input_path.as_deref()).unwrap_or_else(|err| fail(err));
    log::info!("predicting {} requests", requests.len());

    let pipeline = GbmPricePipeline::default();
    let responses: Vec<PredictionResponse> = requests
        .par_iter()
        .enumerate()
        .map(|(idx, request)| match predict_one(&pipeline, &state, request) {
            Ok(price) => PredictionResponse::success(price),
            Err(err) => {
                log::warn!("request {} failed: {}", idx, err);
                PredictionResponse::failure()
            }
        })
        .collect();

    for response in &responses {
        match serde_json::to_string(response) {
            Ok(line) => println!("{}", line),
            Err(err) => fail(err),
        }
    }
    log::info!(
        "{} of {} requests succeeded",
        responses
            .iter()
            .filter(|response| response.predicted_price.is_some())
            .count(),
        responses.len()
    );
}
