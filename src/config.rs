use clap::{Parser, Subcommand};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::str::FromStr;

use crate::resize::TargetSize;

/// Category ids copied into the `healthy` class unless configured otherwise
pub const DEFAULT_HEALTHY_CATEGORIES: &[u32] = &[1, 8];

/// Name of the annotation file expected inside the extras folder
pub const ANNOTATIONS_FILE_NAME: &str = "instances_default.json";

/// Command-line arguments for the image dataset toolbox.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Reduce every image in a folder by an integer factor
    Downscale {
        /// Folder holding the source images
        source: PathBuf,
        /// Existing folder receiving `<stem>_<W>x<H>.<ext>` files
        out: PathBuf,
        /// How many times to downscale each dimension
        #[arg(short, long, default_value_t = 2, value_parser = validate_factor)]
        factor: u32,
    },

    /// Shrink every image to fit a bounding box, keeping its aspect ratio
    Resize {
        source: PathBuf,
        target: PathBuf,
        /// Bounding box as WxH or W,H
        #[arg(short, long, value_parser = parse_target_size)]
        size: TargetSize,
    },

    /// Turn near-white background pixels black
    StandardizeBackground { source: PathBuf, target: PathBuf },

    /// Randomly delete images until the folder holds the target amount
    Purge {
        source: PathBuf,
        /// Number of images to keep
        #[arg(short, long = "target-amount", value_parser = validate_target_amount)]
        target_amount: usize,
        /// Seed for a reproducible selection
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Copy annotated images from `extra/` into `dataset/healthy` and `dataset/unhealthy`
    BuildStructure {
        /// Folder holding `extra/` and receiving `dataset/`
        #[arg(short, long, default_value = ".")]
        root: PathBuf,
        /// Category ids classified as healthy
        #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_HEALTHY_CATEGORIES.to_vec())]
        healthy_categories: Vec<u32>,
    },

    /// Load a class-per-folder dataset and report what was found
    Summarize { root: PathBuf },
}

/// Configuration of the dataset structure builder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolboxConfig {
    pub root_path: PathBuf,
    pub healthy_categories: BTreeSet<u32>,
}

impl Default for ToolboxConfig {
    fn default() -> Self {
        Self {
            root_path: PathBuf::from("."),
            healthy_categories: DEFAULT_HEALTHY_CATEGORIES.iter().copied().collect(),
        }
    }
}

impl ToolboxConfig {
    pub fn new(root_path: impl Into<PathBuf>) -> Self {
        Self {
            root_path: root_path.into(),
            ..Self::default()
        }
    }

    pub fn with_healthy_categories(mut self, categories: impl IntoIterator<Item = u32>) -> Self {
        self.healthy_categories = categories.into_iter().collect();
        self
    }
}

// Validate that the downscale factor is a positive integer
pub fn validate_factor(s: &str) -> Result<u32, String> {
    match u32::from_str(s) {
        Ok(val) if val >= 1 => Ok(val),
        _ => Err("FACTOR must be an integer of at least 1".to_string()),
    }
}

// Validate that the purge target is a positive integer
pub fn validate_target_amount(s: &str) -> Result<usize, String> {
    match usize::from_str(s) {
        Ok(val) if val >= 1 => Ok(val),
        _ => Err("TARGET_AMOUNT must be an integer of at least 1".to_string()),
    }
}

pub fn parse_target_size(s: &str) -> Result<TargetSize, String> {
    TargetSize::from_str(s).map_err(|e| e.to_string())
}
