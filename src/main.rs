use clap::Parser;
use log::{error, info};
use std::process::ExitCode;

use coco_split::pipeline::PIPELINE_STEPS;
use coco_split::utils::create_progress_bar;
use coco_split::{run_pipeline_with_progress, Args};

fn main() -> ExitCode {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if !args.input.exists() {
        error!("The specified input does not exist: {}", args.input.display());
        return ExitCode::FAILURE;
    }

    info!("Starting COCO normalize-and-split for {}...", args.input.display());
    let config = args.to_pipeline_config();

    let pb = create_progress_bar(PIPELINE_STEPS, "Pipeline");
    match run_pipeline_with_progress(&config, &pb) {
        Ok(report) => {
            pb.finish_with_message("done");
            report.print_summary();
            ExitCode::SUCCESS
        }
        Err(e) => {
            pb.abandon();
            error!("Failed to process dataset: {}", e);
            ExitCode::FAILURE
        }
    }
}
