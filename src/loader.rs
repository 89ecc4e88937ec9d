//! Lazy loading of a class-per-folder image dataset.
//!
//! The root directory is expected to look like:
//! ```text
//! root/
//! ├── healthy/
//! │   ├── leaf_001.jpg
//! │   └── leaf_002.png
//! └── unhealthy/
//!     └── ...
//! ```
//! Class folders are sorted by name before labels are assigned, so the same
//! tree always produces the same labels regardless of platform.

use log::{debug, info};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use crate::array::image_to_array;
use crate::error::Result;
use crate::types::Sample;
use crate::utils::{ensure_directory, list_images, list_subdirectories};

/// Start loading the dataset under `root`.
///
/// Only the class folders are listed here; files are listed when their folder
/// is reached and decoded one at a time as the iterator advances.
pub fn load_dataset(root: &Path) -> Result<DatasetIter> {
    ensure_directory(root)?;

    let class_dirs = list_subdirectories(root)?;
    info!(
        "Loading dataset from {} with {} classes",
        root.display(),
        class_dirs.len()
    );

    Ok(DatasetIter {
        class_dirs,
        next_class: 0,
        current_label: 0,
        pending: VecDeque::new(),
    })
}

/// One-shot iterator over the samples of a dataset folder
#[derive(Debug)]
pub struct DatasetIter {
    class_dirs: Vec<PathBuf>,
    next_class: usize,
    current_label: usize,
    pending: VecDeque<PathBuf>,
}

impl DatasetIter {
    /// Class folder names, indexed by label
    pub fn class_names(&self) -> Vec<String> {
        self.class_dirs
            .iter()
            .map(|dir| dir.file_name().unwrap_or_default().to_string_lossy().into_owned())
            .collect()
    }

    pub fn num_classes(&self) -> usize {
        self.class_dirs.len()
    }

    // Advance to the next class folder that holds at least one image
    fn fill_pending(&mut self) -> Result<bool> {
        while self.pending.is_empty() {
            let Some(class_dir) = self.class_dirs.get(self.next_class) else {
                return Ok(false);
            };
            self.current_label = self.next_class;
            self.next_class += 1;

            let images = list_images(class_dir)?;
            debug!(
                "Class '{}' (label {}): {} images",
                class_dir.display(),
                self.current_label,
                images.len()
            );
            self.pending.extend(images);
        }
        Ok(true)
    }
}

impl Iterator for DatasetIter {
    type Item = Result<Sample>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.fill_pending() {
            Ok(true) => {}
            Ok(false) => return None,
            Err(e) => return Some(Err(e)),
        }

        let path = self.pending.pop_front()?;
        let label = self.current_label;
        Some(load_sample(&path, label))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.next_class >= self.class_dirs.len() {
            (self.pending.len(), Some(self.pending.len()))
        } else {
            (self.pending.len(), None)
        }
    }
}

fn load_sample(path: &Path, label: usize) -> Result<Sample> {
    let image = image::open(path)?;
    Ok(Sample {
        image: image_to_array(&image)?,
        label,
    })
}
