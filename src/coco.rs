//! COCO format data structures
//!
//! Only the fields the pipeline reads or rewrites are typed. Everything else on a
//! record is kept in an `extra` map and written back unchanged, in input key order.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Unknown JSON fields carried through untouched
pub type Extra = Map<String, Value>;

/// COCO category information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Category {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            extra: Extra::new(),
        }
    }
}

/// COCO image information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: u64,
    pub width: u32,
    pub height: u32,
    pub file_name: String,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Image {
    pub fn new(id: u64, file_name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id,
            width,
            height,
            file_name: file_name.into(),
            extra: Extra::new(),
        }
    }
}

/// COCO annotation information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: u64,
    pub image_id: u64,
    pub category_id: u64,
    /// `[x, y, width, height]`. Parsed as floats and always written back as
    /// floats, so an integer box `[10, 10, 20, 20]` is emitted as
    /// `[10.0, 10.0, 20.0, 20.0]` even when no clipping touched it.
    #[serde(default)]
    pub bbox: [f64; 4],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Annotation {
    pub fn new(id: u64, image_id: u64, category_id: u64, bbox: [f64; 4]) -> Self {
        Self {
            id,
            image_id,
            category_id,
            bbox,
            area: None,
            extra: Extra::new(),
        }
    }
}

fn empty_info() -> Value {
    Value::Object(Map::new())
}

/// Complete COCO dataset structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default = "empty_info")]
    pub info: Value,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Default for Dataset {
    fn default() -> Self {
        Self {
            images: Vec::new(),
            annotations: Vec::new(),
            categories: Vec::new(),
            info: empty_info(),
            extra: Extra::new(),
        }
    }
}

impl Dataset {
    /// A dataset with the same categories, info and top-level passthrough keys,
    /// holding the given images and annotations.
    pub fn with_records(&self, images: Vec<Image>, annotations: Vec<Annotation>) -> Self {
        Self {
            images,
            annotations,
            categories: self.categories.clone(),
            info: self.info.clone(),
            extra: self.extra.clone(),
        }
    }
}
