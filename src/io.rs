use log::{debug, info};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::coco::Dataset;
use crate::error::{CocoSplitError, Result};
use crate::types::{SplitData, TRAIN_FILE_NAME, VAL_FILE_NAME};
use crate::utils::create_output_directory;

/// Read a COCO JSON file, parsing directly from the file stream
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let file = File::open(path).map_err(|e| CocoSplitError::io(path, e))?;
    let dataset: Dataset =
        serde_json::from_reader(BufReader::new(file)).map_err(|e| CocoSplitError::json(path, e))?;
    info!(
        "Loaded {}: {} images, {} annotations, {} categories",
        path.display(),
        dataset.images.len(),
        dataset.annotations.len(),
        dataset.categories.len()
    );
    Ok(dataset)
}

/// Write `dataset` to `path`.
///
/// The JSON goes to a temporary file next to `path` which is renamed over `path`
/// only once fully written, so a failed run never leaves a truncated file under
/// the final name. Missing parent directories are created.
pub fn save_dataset(dataset: &Dataset, path: &Path, pretty: bool) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    create_output_directory(dir).map_err(|e| CocoSplitError::io(dir, e))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| CocoSplitError::io(dir, e))?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        let written = if pretty {
            serde_json::to_writer_pretty(&mut writer, dataset)
        } else {
            serde_json::to_writer(&mut writer, dataset)
        };
        written.map_err(|e| CocoSplitError::json(path, e))?;
        writer.flush().map_err(|e| CocoSplitError::io(path, e))?;
    }
    tmp.as_file()
        .sync_all()
        .map_err(|e| CocoSplitError::io(tmp.path(), e))?;
    debug!("Persisting {} -> {}", tmp.path().display(), path.display());
    tmp.persist(path)
        .map_err(|e| CocoSplitError::io(path, e.error))?;
    Ok(())
}

/// Write both splits into `output_dir` and return `(train_path, val_path)`
pub fn write_split(
    split: &SplitData,
    output_dir: &Path,
    pretty: bool,
) -> Result<(PathBuf, PathBuf)> {
    let train_path = output_dir.join(TRAIN_FILE_NAME);
    let val_path = output_dir.join(VAL_FILE_NAME);

    save_dataset(&split.train, &train_path, pretty)?;
    info!("Wrote {}", train_path.display());
    save_dataset(&split.val, &val_path, pretty)?;
    info!("Wrote {}", val_path.display());

    Ok((train_path, val_path))
}
