//! Builds the `dataset/healthy` and `dataset/unhealthy` folders from a COCO
//! catalog stored in `extra/`.

use log::{debug, info, warn};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::coco::CocoIndex;
use crate::config::{ToolboxConfig, ANNOTATIONS_FILE_NAME};
use crate::error::{Result, ToolboxError};
use crate::types::{ImageClass, StructureStats};
use crate::utils::{create_dir_if_missing, create_progress_bar};

/// Dataset layout rooted at one folder, with its annotation catalog if present
#[derive(Debug, Clone)]
pub struct ImgToolbox {
    root_path: PathBuf,
    dataset_path: PathBuf,
    extras_path: PathBuf,
    annotations_path: PathBuf,
    annotations: Option<CocoIndex>,
    healthy_categories: BTreeSet<u32>,
}

impl ImgToolbox {
    /// Resolve the layout under `config.root_path` and load
    /// `extra/instances_default.json`.
    ///
    /// A missing annotation file is not an error: the toolbox is built without
    /// a catalog and `create_dataset_structure` will refuse to run. A file that
    /// exists but cannot be parsed is an error.
    pub fn new(config: ToolboxConfig) -> Result<Self> {
        let root_path = config.root_path;
        let dataset_path = root_path.join("dataset");
        let extras_path = root_path.join("extra");
        let annotations_path = extras_path.join(ANNOTATIONS_FILE_NAME);

        let annotations = if annotations_path.exists() {
            let index = CocoIndex::from_path(&annotations_path)?;
            info!(
                "Loaded {} images in {} categories from {}",
                index.num_images(),
                index.cat_ids().len(),
                annotations_path.display()
            );
            Some(index)
        } else {
            warn!(
                "Annotations file {} could not be found. Some methods will not work",
                annotations_path.display()
            );
            None
        };

        Ok(Self {
            root_path,
            dataset_path,
            extras_path,
            annotations_path,
            annotations,
            healthy_categories: config.healthy_categories,
        })
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    pub fn dataset_path(&self) -> &Path {
        &self.dataset_path
    }

    pub fn extras_path(&self) -> &Path {
        &self.extras_path
    }

    pub fn has_annotations(&self) -> bool {
        self.annotations.is_some()
    }

    /// Class a category's images are copied into
    pub fn classify(&self, category_id: u32) -> ImageClass {
        if self.healthy_categories.contains(&category_id) {
            ImageClass::Healthy
        } else {
            ImageClass::Unhealthy
        }
    }

    /// Folder receiving images of `class`
    pub fn class_path(&self, class: ImageClass) -> PathBuf {
        self.dataset_path.join(class.dir_name())
    }

    /// Create the class folders and copy every annotated image into the folder
    /// of its category's class. Same-named files are overwritten; a failure
    /// partway through leaves the copies made so far.
    pub fn create_dataset_structure(&self) -> Result<StructureStats> {
        let annotations = self
            .annotations
            .as_ref()
            .ok_or_else(|| ToolboxError::AnnotationsNotLoaded(self.annotations_path.clone()))?;

        create_dir_if_missing(&self.dataset_path)?;
        for class in ImageClass::ALL {
            create_dir_if_missing(&self.class_path(class))?;
        }

        let cat_ids = annotations.cat_ids();
        let total: usize = cat_ids
            .iter()
            .map(|&id| annotations.img_ids_for_cat(id).len())
            .sum();
        info!(
            "Copying {} images from {} into {}",
            total,
            self.extras_path.display(),
            self.dataset_path.display()
        );

        let mut stats = StructureStats::new();
        let pb = create_progress_bar(total as u64, "Structure");
        for category_id in cat_ids {
            let class = self.classify(category_id);
            let images = annotations.load_imgs(annotations.img_ids_for_cat(category_id));
            debug!(
                "Category {} ({}) -> {}: {} images",
                category_id,
                annotations
                    .category(category_id)
                    .map(|c| c.name.as_str())
                    .unwrap_or("unnamed"),
                class,
                images.len()
            );

            for image in images {
                let source = self.extras_path.join(&image.file_name);
                let image_name = Path::new(&image.file_name)
                    .file_name()
                    .ok_or_else(|| {
                        ToolboxError::InvalidArgument(format!(
                            "image {} has no file name: {:?}",
                            image.id, image.file_name
                        ))
                    })?;
                if !source.exists() {
                    return Err(ToolboxError::PathNotFound(source));
                }

                fs::copy(&source, self.class_path(class).join(image_name))?;
                stats.increment_copied(class);
                pb.inc(1);
            }
            stats.categories_seen += 1;
        }
        pb.finish_with_message("Structure complete");

        stats.print_summary();
        Ok(stats)
    }
}

/// Load the catalog under `config.root_path` and build the dataset structure,
/// failing with `AnnotationsNotLoaded` when the annotation file is missing.
pub fn build_dataset_structure(config: ToolboxConfig) -> Result<StructureStats> {
    ImgToolbox::new(config)?.create_dataset_structure()
}
