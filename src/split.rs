//! Train/val splitting and annotation renumbering

use log::{info, warn};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;

use crate::coco::Dataset;
use crate::config::is_valid_ratio;
use crate::error::{CocoSplitError, Result};
use crate::types::SplitData;

/// The generator used for splitting. ChaCha8's stream is fixed by its algorithm,
/// so a seed yields the same permutation on every platform and release.
pub fn split_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Renumber annotation ids to `0..N` in their current order
pub fn reindex_annotations(dataset: &mut Dataset) {
    for (new_id, ann) in dataset.annotations.iter_mut().enumerate() {
        ann.id = new_id as u64;
    }
}

/// Shuffle image ids with `rng` and cut the result at `floor(N * train_ratio)`.
///
/// Returns `(train_ids, val_ids)`, each in shuffled order.
pub fn partition_image_ids<R: Rng + ?Sized>(
    image_ids: &[u64],
    train_ratio: f64,
    rng: &mut R,
) -> Result<(Vec<u64>, Vec<u64>)> {
    if !is_valid_ratio(train_ratio) {
        return Err(CocoSplitError::InvalidRatio(train_ratio));
    }

    let mut ids = image_ids.to_vec();
    ids.shuffle(rng);

    let split_idx = (ids.len() as f64 * train_ratio).floor() as usize;
    let val_ids = ids.split_off(split_idx);
    Ok((ids, val_ids))
}

/// Number of entries in `image_ids` that repeat an earlier id
pub fn count_duplicate_ids(image_ids: &[u64]) -> usize {
    let mut seen = HashSet::with_capacity(image_ids.len());
    image_ids.iter().filter(|id| !seen.insert(**id)).count()
}

fn subset(dataset: &Dataset, ids: &HashSet<u64>) -> Dataset {
    let images = dataset
        .images
        .iter()
        .filter(|img| ids.contains(&img.id))
        .cloned()
        .collect();
    let annotations = dataset
        .annotations
        .iter()
        .filter(|ann| ids.contains(&ann.image_id))
        .cloned()
        .collect();

    let mut sub = dataset.with_records(images, annotations);
    reindex_annotations(&mut sub);
    sub
}

/// Split `dataset` into independent train and val datasets.
///
/// Images and annotations keep their source order inside each subset. Both
/// subsets get the full category list and info block, and each subset's
/// annotation ids restart at zero.
pub fn split_dataset<R: Rng + ?Sized>(
    dataset: &Dataset,
    train_ratio: f64,
    rng: &mut R,
) -> Result<SplitData> {
    let image_ids: Vec<u64> = dataset.images.iter().map(|img| img.id).collect();
    let duplicates = count_duplicate_ids(&image_ids);
    if duplicates > 0 {
        warn!(
            "{} image records repeat an existing id; a repeated id may land in both splits",
            duplicates
        );
    }
    let (train_ids, val_ids) = partition_image_ids(&image_ids, train_ratio, rng)?;

    let train_ids: HashSet<u64> = train_ids.into_iter().collect();
    let val_ids: HashSet<u64> = val_ids.into_iter().collect();

    let split = SplitData {
        train: subset(dataset, &train_ids),
        val: subset(dataset, &val_ids),
    };

    info!(
        "Split {} images into {} train / {} val",
        image_ids.len(),
        split.train.images.len(),
        split.val.images.len()
    );
    if split.train.images.is_empty() || split.val.images.is_empty() {
        warn!(
            "One of the splits is empty (train ratio {}, {} images)",
            train_ratio,
            image_ids.len()
        );
    }
    Ok(split)
}
