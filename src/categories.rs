//! Contiguous category ids

use log::{debug, warn};
use std::collections::HashMap;

use crate::coco::Dataset;
use crate::config::DanglingPolicy;
use crate::error::{CocoSplitError, Result};

/// Outcome of a category reindex pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CategoryReindex {
    /// Annotations whose category id had no entry in the category list
    pub dangling: usize,
    /// How many of those were removed (only under `DanglingPolicy::Drop`)
    pub dangling_dropped: usize,
}

/// Renumber categories to `0..N` ordered by original id and rewrite every
/// annotation's `category_id` to match.
pub fn reindex_categories(
    dataset: &mut Dataset,
    policy: DanglingPolicy,
) -> Result<CategoryReindex> {
    dataset.categories.sort_by_key(|c| c.id);

    let mut id_map = HashMap::with_capacity(dataset.categories.len());
    for (new_id, category) in dataset.categories.iter_mut().enumerate() {
        id_map.insert(category.id, new_id as u64);
        category.id = new_id as u64;
    }

    let mut stats = CategoryReindex::default();
    let mut kept = Vec::with_capacity(dataset.annotations.len());
    for mut ann in std::mem::take(&mut dataset.annotations) {
        match id_map.get(&ann.category_id) {
            Some(&new_id) => ann.category_id = new_id,
            None => {
                stats.dangling += 1;
                debug!(
                    "Annotation {} references unknown category {}",
                    ann.id, ann.category_id
                );
                match policy {
                    DanglingPolicy::Keep => {}
                    DanglingPolicy::Drop => {
                        stats.dangling_dropped += 1;
                        continue;
                    }
                    DanglingPolicy::Error => {
                        return Err(CocoSplitError::DanglingCategory {
                            annotation_id: ann.id,
                            category_id: ann.category_id,
                        });
                    }
                }
            }
        }
        kept.push(ann);
    }
    dataset.annotations = kept;

    if stats.dangling > 0 {
        warn!(
            "{} annotations reference categories missing from the category list ({:?} policy)",
            stats.dangling, policy
        );
    }
    Ok(stats)
}
