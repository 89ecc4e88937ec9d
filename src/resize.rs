use image::imageops::FilterType;
use image::DynamicImage;
use log::{debug, info};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Result, ToolboxError};
use crate::utils::{create_progress_bar, ensure_directory, list_images};

/// Bounding box for thumbnail resizing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSize {
    pub width: u32,
    pub height: u32,
}

impl TargetSize {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(ToolboxError::InvalidArgument(format!(
                "parameter \"target_size\" is {}x{}, both sizes must be at least 1",
                width, height
            )));
        }
        Ok(Self { width, height })
    }

    /// Validate a pair of raw components, e.g. the two halves of `WxH`
    pub fn from_parts(parts: &[&str]) -> Result<Self> {
        if parts.len() != 2 {
            return Err(ToolboxError::InvalidArgument(format!(
                "parameter \"target_size\" has length of {}, should be 2",
                parts.len()
            )));
        }

        let mut sizes = [0u32; 2];
        for (size, part) in sizes.iter_mut().zip(parts) {
            *size = part.trim().parse().map_err(|_| {
                ToolboxError::InvalidArgument(format!(
                    "parameter \"target_size\" contents must be integers, got {:?}",
                    part
                ))
            })?;
        }
        Self::new(sizes[0], sizes[1])
    }
}

impl FromStr for TargetSize {
    type Err = ToolboxError;

    /// Accepts `WxH` or `W,H`
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(|c: char| c == 'x' || c == 'X' || c == ',').collect();
        Self::from_parts(&parts)
    }
}

impl fmt::Display for TargetSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Shrink every supported image in `source` to fit `target_size` and save it
/// under the same file name in `target`. Images already inside the box are
/// written unchanged.
pub fn resize_images(source: &Path, target: &Path, target_size: TargetSize) -> Result<Vec<PathBuf>> {
    ensure_directory(source)?;
    ensure_directory(target)?;

    let images = list_images(source)?;
    info!(
        "Resizing {} images from {} to fit {}",
        images.len(),
        source.display(),
        target_size
    );

    let pb = create_progress_bar(images.len() as u64, "Resize");
    let mut written = Vec::with_capacity(images.len());
    for path in &images {
        let image = image::open(path)?;
        let resized = thumbnail(image, target_size);

        let output_path = target.join(path.file_name().unwrap_or_default());
        resized.save(&output_path)?;
        debug!(
            "{} -> {} ({}x{})",
            path.display(),
            output_path.display(),
            resized.width(),
            resized.height()
        );

        written.push(output_path);
        pb.inc(1);
    }
    pb.finish_with_message("Resize complete");

    Ok(written)
}

/// Aspect-preserving shrink into the target box using a Lanczos filter
pub fn thumbnail(image: DynamicImage, target_size: TargetSize) -> DynamicImage {
    let (width, height) = thumbnail_dimensions(image.width(), image.height(), target_size);
    if (width, height) == (image.width(), image.height()) {
        return image;
    }
    image.resize_exact(width, height, FilterType::Lanczos3)
}

/// Dimensions of an image shrunk to fit `target_size`, never enlarged.
///
/// The free side is rounded down or up, whichever keeps the aspect ratio
/// closest to the original; ties keep the smaller value.
pub fn thumbnail_dimensions(width: u32, height: u32, target_size: TargetSize) -> (u32, u32) {
    let (x, y) = (target_size.width, target_size.height);
    if (x >= width && y >= height) || width == 0 || height == 0 {
        return (width, height);
    }

    let aspect = width as f64 / height as f64;
    if x as f64 / y as f64 >= aspect {
        let x = round_aspect(y as f64 * aspect, |n| (aspect - n / y as f64).abs());
        (x, y)
    } else {
        let y = round_aspect(x as f64 / aspect, |n| {
            if n == 0.0 {
                0.0
            } else {
                (aspect - x as f64 / n).abs()
            }
        });
        (x, y)
    }
}

// Pick floor or ceil of `number` by the smaller `key`, at least 1
fn round_aspect(number: f64, key: impl Fn(f64) -> f64) -> u32 {
    let (floor, ceil) = (number.floor(), number.ceil());
    let best = if key(ceil) < key(floor) { ceil } else { floor };
    (best as u32).max(1)
}
