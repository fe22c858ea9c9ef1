//! COCO dataset normalizer and train/val splitter
//!
//! This library repairs a COCO detection export (file names, category ids, box
//! geometry, annotation ids) and partitions it into train and val annotation files
//! with a seeded, reproducible shuffle.

pub mod bbox;
pub mod categories;
pub mod coco;
pub mod config;
pub mod error;
pub mod io;
pub mod normalize;
pub mod pipeline;
pub mod split;
pub mod types;
pub mod utils;

// Re-export commonly used types and functions
pub use coco::{Annotation, Category, Dataset, Image};
pub use config::{Args, DanglingPolicy, FilenameConfig, PipelineConfig};
pub use error::{CocoSplitError, Result};
pub use io::{load_dataset, save_dataset, write_split};
pub use pipeline::{process_dataset, run_pipeline, run_pipeline_with_progress};
pub use types::{PipelineReport, SplitData};
