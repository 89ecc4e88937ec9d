use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, ToolboxError};
use crate::utils::{ensure_directory, list_images};

/// Options controlling which images get purged
#[derive(Debug, Clone, Copy, Default)]
pub struct PurgeOptions {
    /// Fixed seed for a reproducible selection; entropy when `None`
    pub seed: Option<u64>,
}

/// Randomly delete images from `source` until exactly `target_amount` remain.
///
/// Nothing is removed when the folder already holds `target_amount` images or
/// fewer. Deleted files are not backed up. Returns the removed paths.
pub fn purge_elements(source: &Path, target_amount: usize, options: PurgeOptions) -> Result<Vec<PathBuf>> {
    if target_amount == 0 {
        return Err(ToolboxError::InvalidArgument(
            "parameter \"target_amount\" is 0, should be at least 1".to_string(),
        ));
    }
    ensure_directory(source)?;

    let images = list_images(source)?;
    let purged = select_for_purge(images, target_amount, options.seed);
    info!(
        "Purging {} images from {} to keep {}",
        purged.len(),
        source.display(),
        target_amount
    );

    for path in &purged {
        fs::remove_file(path)?;
        debug!("Removed {}", path.display());
    }

    Ok(purged)
}

/// Shuffle `images` and return the ones that exceed `target_amount`
pub fn select_for_purge(mut images: Vec<PathBuf>, target_amount: usize, seed: Option<u64>) -> Vec<PathBuf> {
    let excess = images.len().saturating_sub(target_amount);
    if excess == 0 {
        return Vec::new();
    }

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    images.shuffle(&mut rng);
    images.truncate(excess);
    images
}
