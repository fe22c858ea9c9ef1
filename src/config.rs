use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::str::FromStr;

/// Prefix prepended to normalized file names unless `--no-prefix` is given
pub const DEFAULT_IMAGE_PREFIX: &str = "images/";

/// Normalize a COCO JSON export and split it into train/val annotation files.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct Args {
    /// Path to the source COCO JSON file
    #[arg(long = "input")]
    pub input: PathBuf,

    /// Directory to write instances_train.json and instances_val.json into
    #[arg(long = "output-dir")]
    pub output_dir: PathBuf,

    /// Proportion of images that go to the training split
    #[arg(long = "train-ratio", default_value_t = 0.8, value_parser = validate_ratio)]
    pub train_ratio: f64,

    /// Do not prepend `images/` to normalized file names
    #[arg(long = "no-prefix")]
    pub no_prefix: bool,

    /// Keep the full (slash-normalized) path instead of the basename
    #[arg(long = "keep-absolute")]
    pub keep_absolute: bool,

    /// Seed for the train/val shuffle
    #[arg(long = "seed", default_value_t = 42)]
    pub seed: u64,

    /// Only drop invalid annotations, do not clip or round box geometry
    #[arg(long = "no-clip")]
    pub no_clip: bool,

    /// Write single-line JSON instead of indented output
    #[arg(long = "compact")]
    pub compact: bool,

    /// What to do with annotations whose category id is not in the category list
    #[arg(long = "dangling-categories", value_enum, default_value = "keep")]
    pub dangling_categories: DanglingPolicy,
}

/// Handling of annotations that reference a category missing from `categories`
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default)]
pub enum DanglingPolicy {
    /// Leave the category id untouched and log a warning
    #[default]
    Keep,
    /// Remove the annotation
    Drop,
    /// Abort the run
    Error,
}

/// How image `file_name` fields are rewritten
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenameConfig {
    pub prefix: Option<String>,
    pub basename_only: bool,
}

impl Default for FilenameConfig {
    fn default() -> Self {
        Self {
            prefix: Some(DEFAULT_IMAGE_PREFIX.to_string()),
            basename_only: true,
        }
    }
}

/// Everything a single pipeline run needs, independent of the CLI
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub train_ratio: f64,
    pub seed: u64,
    pub filenames: FilenameConfig,
    pub clip: bool,
    pub pretty: bool,
    pub dangling_categories: DanglingPolicy,
}

impl PipelineConfig {
    pub fn new(input: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output_dir: output_dir.into(),
            train_ratio: 0.8,
            seed: 42,
            filenames: FilenameConfig::default(),
            clip: true,
            pretty: true,
            dangling_categories: DanglingPolicy::Keep,
        }
    }
}

impl Args {
    pub fn to_pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            input: self.input.clone(),
            output_dir: self.output_dir.clone(),
            train_ratio: self.train_ratio,
            seed: self.seed,
            filenames: FilenameConfig {
                prefix: (!self.no_prefix).then(|| DEFAULT_IMAGE_PREFIX.to_string()),
                basename_only: !self.keep_absolute,
            },
            clip: !self.no_clip,
            pretty: !self.compact,
            dangling_categories: self.dangling_categories,
        }
    }
}

/// Whether `ratio` lies in the open interval (0, 1)
pub fn is_valid_ratio(ratio: f64) -> bool {
    ratio > 0.0 && ratio < 1.0
}

// Validate that the ratio is strictly between 0.0 and 1.0
fn validate_ratio(s: &str) -> Result<f64, String> {
    match f64::from_str(s) {
        Ok(val) if is_valid_ratio(val) => Ok(val),
        _ => Err("RATIO must be strictly between 0.0 and 1.0".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_ratio() {
        assert!(validate_ratio("0.5").is_ok());
        assert!(validate_ratio("0.999").is_ok());
        assert!(validate_ratio("0.0").is_err());
        assert!(validate_ratio("1.0").is_err());
        assert!(validate_ratio("-0.1").is_err());
        assert!(validate_ratio("NaN").is_err());
        assert!(validate_ratio("abc").is_err());
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["coco-split", "--input", "in.json", "--output-dir", "out"])
            .unwrap();
        assert_eq!(args.train_ratio, 0.8);
        assert_eq!(args.seed, 42);
        assert_eq!(args.dangling_categories, DanglingPolicy::Keep);

        let config = args.to_pipeline_config();
        assert_eq!(config.filenames, FilenameConfig::default());
        assert!(config.clip);
        assert!(config.pretty);
    }

    #[test]
    fn test_flags_map_to_config() {
        let args = Args::try_parse_from([
            "coco-split",
            "--input",
            "in.json",
            "--output-dir",
            "out",
            "--no-prefix",
            "--keep-absolute",
            "--no-clip",
            "--compact",
            "--dangling-categories",
            "drop",
            "--seed",
            "7",
        ])
        .unwrap();
        let config = args.to_pipeline_config();
        assert_eq!(config.filenames.prefix, None);
        assert!(!config.filenames.basename_only);
        assert!(!config.clip);
        assert!(!config.pretty);
        assert_eq!(config.dangling_categories, DanglingPolicy::Drop);
        assert_eq!(config.seed, 7);
    }

    #[test]
    fn test_missing_required_argument_is_rejected() {
        assert!(Args::try_parse_from(["coco-split", "--input", "in.json"]).is_err());
        assert!(Args::try_parse_from([
            "coco-split",
            "--input",
            "in.json",
            "--output-dir",
            "out",
            "--train-ratio",
            "1.5"
        ])
        .is_err());
    }
}
