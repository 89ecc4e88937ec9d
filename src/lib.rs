//! Image dataset preparation toolbox
//!
//! This library provides the steps used to turn a folder of annotated leaf
//! photos into a training set: sorting images into `healthy` / `unhealthy`
//! folders from a COCO catalog, downscaling, thumbnail resizing, background
//! standardization, random pruning and loading images as arrays.

pub mod array;
pub mod background;
pub mod coco;
pub mod config;
pub mod downscale;
pub mod error;
pub mod loader;
pub mod purge;
pub mod resize;
pub mod structure;
pub mod types;
pub mod utils;

// Re-export commonly used types and functions
pub use config::{Args, Command, ToolboxConfig};
pub use error::{Result, ToolboxError};
pub use types::{ImageClass, Sample, StructureStats, IMG_FORMATS};

pub use background::standardize_background;
pub use downscale::downscale_images;
pub use loader::{load_dataset, DatasetIter};
pub use purge::{purge_elements, PurgeOptions};
pub use resize::{resize_images, TargetSize};
pub use structure::{build_dataset_structure, ImgToolbox};
