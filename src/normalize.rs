//! Filename normalization for image records

use crate::coco::Dataset;
use crate::config::FilenameConfig;

/// Canonical relative form of an image file reference.
///
/// Both `/` and `\` count as separators when taking the basename, so Windows
/// exports are handled on any host.
pub fn normalize_file_name(file_name: &str, config: &FilenameConfig) -> String {
    let name = if config.basename_only {
        file_name
            .rsplit(|c: char| c == '/' || c == '\\')
            .next()
            .unwrap_or(file_name)
    } else {
        file_name
    };
    let name = name.replace('\\', "/");

    match &config.prefix {
        Some(prefix) if !prefix.is_empty() && !name.starts_with(prefix.as_str()) => {
            format!("{prefix}{name}")
        }
        _ => name,
    }
}

/// Rewrite every image's `file_name` in place
pub fn normalize_filenames(dataset: &mut Dataset, config: &FilenameConfig) {
    for image in &mut dataset.images {
        image.file_name = normalize_file_name(&image.file_name, config);
    }
}
