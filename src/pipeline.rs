//! The normalize-and-split pipeline
//!
//! Stages run strictly in order over one owned [`Dataset`]:
//! filenames, category ids, box clipping, annotation ids, then the split. The
//! only I/O is the initial read and the two final writes.

use indicatif::ProgressBar;
use log::info;

use crate::bbox::validate_and_clip_bboxes;
use crate::categories::reindex_categories;
use crate::coco::Dataset;
use crate::config::{is_valid_ratio, PipelineConfig};
use crate::error::{CocoSplitError, Result};
use crate::io::{load_dataset, write_split};
use crate::normalize::normalize_filenames;
use crate::split::{reindex_annotations, split_dataset, split_rng};
use crate::types::{PipelineReport, SplitData, SplitSummary};

/// Number of progress steps reported by [`run_pipeline_with_progress`]
pub const PIPELINE_STEPS: u64 = 7;

/// Run the filename, category, clipping and annotation-id stages on `dataset`
/// in place and fill the matching report fields
pub fn normalize_dataset(
    dataset: &mut Dataset,
    config: &PipelineConfig,
    report: &mut PipelineReport,
) -> Result<()> {
    normalize_stages(dataset, config, report, &ProgressBar::hidden())
}

fn normalize_stages(
    dataset: &mut Dataset,
    config: &PipelineConfig,
    report: &mut PipelineReport,
    pb: &ProgressBar,
) -> Result<()> {
    pb.set_message("normalizing file names");
    normalize_filenames(dataset, &config.filenames);
    pb.inc(1);

    pb.set_message("reindexing categories");
    report.categories = reindex_categories(dataset, config.dangling_categories)?;
    pb.inc(1);

    pb.set_message("clipping boxes");
    report.bboxes = validate_and_clip_bboxes(dataset, config.clip);
    info!(
        "Fixed {} bboxes; Dropped {} invalid annotations.",
        report.bboxes.fixed, report.bboxes.dropped
    );
    pb.inc(1);

    pb.set_message("reindexing annotations");
    reindex_annotations(dataset);
    pb.inc(1);
    Ok(())
}

fn split_stage(
    mut dataset: Dataset,
    config: &PipelineConfig,
    mut report: PipelineReport,
    pb: &ProgressBar,
) -> Result<(SplitData, PipelineReport)> {
    normalize_stages(&mut dataset, config, &mut report, pb)?;

    pb.set_message("splitting");
    let split = split_dataset(&dataset, config.train_ratio, &mut split_rng(config.seed))?;
    report.train = SplitSummary::from_dataset(&split.train);
    report.val = SplitSummary::from_dataset(&split.val);
    pb.inc(1);
    Ok((split, report))
}

fn initial_report(dataset: &Dataset) -> PipelineReport {
    PipelineReport {
        input_images: dataset.images.len(),
        input_annotations: dataset.annotations.len(),
        ..Default::default()
    }
}

/// Normalize `dataset` and split it, without touching the filesystem
pub fn process_dataset(
    dataset: Dataset,
    config: &PipelineConfig,
) -> Result<(SplitData, PipelineReport)> {
    check_ratio(config)?;
    let report = initial_report(&dataset);
    split_stage(dataset, config, report, &ProgressBar::hidden())
}

/// Read `config.input`, run every stage and write both split files
pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineReport> {
    run_pipeline_with_progress(config, &ProgressBar::hidden())
}

/// Same as [`run_pipeline`], advancing `pb` once per stage
pub fn run_pipeline_with_progress(
    config: &PipelineConfig,
    pb: &ProgressBar,
) -> Result<PipelineReport> {
    // Fail before reading anything
    check_ratio(config)?;

    pb.set_message("loading");
    let dataset = load_dataset(&config.input)?;
    pb.inc(1);

    let report = initial_report(&dataset);
    let (split, mut report) = split_stage(dataset, config, report, pb)?;

    pb.set_message("writing");
    let (train_path, val_path) = write_split(&split, &config.output_dir, config.pretty)?;
    report.train_path = train_path;
    report.val_path = val_path;
    pb.inc(1);

    Ok(report)
}

fn check_ratio(config: &PipelineConfig) -> Result<()> {
    if is_valid_ratio(config.train_ratio) {
        Ok(())
    } else {
        Err(CocoSplitError::InvalidRatio(config.train_ratio))
    }
}
