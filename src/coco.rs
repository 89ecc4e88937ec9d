//! COCO format data structures and lookups
//!
//! This module reads a COCO annotation file (as exported by CVAT and similar
//! tools) and indexes it by category and image id.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::Result;

/// COCO category information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub supercategory: String,
}

/// COCO image information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    pub id: u32,
    pub file_name: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

impl Image {
    pub fn new(id: u32, file_name: String, width: u32, height: u32) -> Self {
        Self {
            id,
            file_name,
            width,
            height,
        }
    }
}

/// COCO annotation information; geometry is not needed here and is ignored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Annotation {
    pub id: u32,
    pub image_id: u32,
    pub category_id: u32,
}

impl Annotation {
    pub fn new(id: u32, image_id: u32, category_id: u32) -> Self {
        Self {
            id,
            image_id,
            category_id,
        }
    }
}

/// The parts of a COCO file used for classification
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CocoFile {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

/// Read-only index over a COCO file: category -> images, image id -> image
#[derive(Debug, Clone, Default)]
pub struct CocoIndex {
    categories: BTreeMap<u32, Category>,
    images: HashMap<u32, Image>,
    cat_to_imgs: BTreeMap<u32, Vec<u32>>,
}

impl CocoIndex {
    /// Parse and index the COCO file at `path`
    pub fn from_path(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let coco: CocoFile = serde_json::from_reader(reader)?;
        Ok(Self::new(coco))
    }

    pub fn new(coco: CocoFile) -> Self {
        let mut cat_to_imgs: BTreeMap<u32, Vec<u32>> = coco
            .categories
            .iter()
            .map(|category| (category.id, Vec::new()))
            .collect();

        for annotation in &coco.annotations {
            let Some(image_ids) = cat_to_imgs.get_mut(&annotation.category_id) else {
                log::debug!(
                    "Annotation {} uses undeclared category {}, ignoring it",
                    annotation.id,
                    annotation.category_id
                );
                continue;
            };
            // An image annotated several times with one category is listed once
            if !image_ids.contains(&annotation.image_id) {
                image_ids.push(annotation.image_id);
            }
        }

        Self {
            categories: coco.categories.into_iter().map(|c| (c.id, c)).collect(),
            images: coco.images.into_iter().map(|i| (i.id, i)).collect(),
            cat_to_imgs,
        }
    }

    /// Declared category ids, ascending
    pub fn cat_ids(&self) -> Vec<u32> {
        self.cat_to_imgs.keys().copied().collect()
    }

    pub fn category(&self, id: u32) -> Option<&Category> {
        self.categories.get(&id)
    }

    /// Image ids annotated with `category_id`, in annotation order
    pub fn img_ids_for_cat(&self, category_id: u32) -> &[u32] {
        self.cat_to_imgs
            .get(&category_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Resolve image ids, skipping ids with no image entry
    pub fn load_imgs(&self, ids: &[u32]) -> Vec<&Image> {
        ids.iter()
            .filter_map(|id| {
                let image = self.images.get(id);
                if image.is_none() {
                    log::warn!("Annotation references unknown image id {}", id);
                }
                image
            })
            .collect()
    }

    pub fn num_images(&self) -> usize {
        self.images.len()
    }
}
