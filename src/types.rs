use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::bbox::BBoxStats;
use crate::categories::CategoryReindex;
use crate::coco::Dataset;

/// Output file name for the training split
pub const TRAIN_FILE_NAME: &str = "instances_train.json";
/// Output file name for the validation split
pub const VAL_FILE_NAME: &str = "instances_val.json";

// The two datasets produced by the splitter
#[derive(Debug, Clone)]
pub struct SplitData {
    pub train: Dataset,
    pub val: Dataset,
}

/// Image and annotation counts for one output file
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SplitSummary {
    pub images: usize,
    pub annotations: usize,
    /// Instances per category name
    pub per_category: BTreeMap<String, usize>,
}

impl SplitSummary {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let names: BTreeMap<u64, &str> = dataset
            .categories
            .iter()
            .map(|c| (c.id, c.name.as_str()))
            .collect();

        let mut per_category: BTreeMap<String, usize> = dataset
            .categories
            .iter()
            .map(|c| (c.name.clone(), 0))
            .collect();
        for ann in &dataset.annotations {
            let name = names
                .get(&ann.category_id)
                .map(|n| n.to_string())
                .unwrap_or_else(|| format!("<unknown {}>", ann.category_id));
            *per_category.entry(name).or_insert(0) += 1;
        }

        Self {
            images: dataset.images.len(),
            annotations: dataset.annotations.len(),
            per_category,
        }
    }
}

/// Everything a pipeline run reports back
#[derive(Debug, Default, Clone)]
pub struct PipelineReport {
    pub input_images: usize,
    pub input_annotations: usize,
    pub categories: CategoryReindex,
    pub bboxes: BBoxStats,
    pub train: SplitSummary,
    pub val: SplitSummary,
    pub train_path: PathBuf,
    pub val_path: PathBuf,
}

impl PipelineReport {
    /// Annotations removed for any reason before splitting
    pub fn total_dropped(&self) -> usize {
        self.bboxes.dropped + self.categories.dangling_dropped
    }

    pub fn print_summary(&self) {
        log::info!("=== Processing Summary ===");
        log::info!(
            "Input: {} images, {} annotations",
            self.input_images,
            self.input_annotations
        );
        log::info!(
            "Fixed {} bboxes; Dropped {} invalid annotations.",
            self.bboxes.fixed,
            self.bboxes.dropped
        );
        if self.categories.dangling > 0 {
            log::warn!(
                "Annotations with unknown category: {} (dropped: {})",
                self.categories.dangling,
                self.categories.dangling_dropped
            );
        }
        log::info!(
            "Train: {} images, {} annotations",
            self.train.images,
            self.train.annotations
        );
        log::info!(
            "Val: {} images, {} annotations",
            self.val.images,
            self.val.annotations
        );
        for (name, count) in &self.train.per_category {
            let val = self.val.per_category.get(name).copied().unwrap_or(0);
            log::info!("  {:<20} train {:>6}  val {:>6}", name, count, val);
        }
        log::info!("Wrote: {}", self.train_path.display());
        log::info!("Wrote: {}", self.val_path.display());
    }
}
