use log::{debug, info};
use ndarray::{Array2, Array3, Axis, Zip};
use std::path::{Path, PathBuf};

use crate::array::{array_to_image, image_to_array};
use crate::error::{Result, ToolboxError};
use crate::utils::{create_progress_bar, ensure_directory, list_images};

/// Pixels whose red, green and blue values are all at or above this are background
pub const WHITE_THRESHOLD: u8 = 225;

/// Replace near-white pixels with black in every supported image of `source`,
/// saving each result under its original file name in `target`.
pub fn standardize_background(source: &Path, target: &Path) -> Result<Vec<PathBuf>> {
    ensure_directory(source)?;
    ensure_directory(target)?;

    let images = list_images(source)?;
    info!(
        "Standardizing background of {} images from {}",
        images.len(),
        source.display()
    );

    let pb = create_progress_bar(images.len() as u64, "Background");
    let mut written = Vec::with_capacity(images.len());
    for path in &images {
        let image = image::open(path)?;
        let mut data = image_to_array(&image)?;

        let channels = data.len_of(Axis(2));
        if channels < 3 {
            return Err(ToolboxError::UnsupportedColorType {
                path: path.clone(),
                channels,
            });
        }

        let replaced = blacken_background(&mut data);
        let output_path = target.join(path.file_name().unwrap_or_default());
        array_to_image(data)?.save(&output_path)?;
        debug!(
            "{} -> {} ({} pixels replaced)",
            path.display(),
            output_path.display(),
            replaced
        );

        written.push(output_path);
        pb.inc(1);
    }
    pb.finish_with_message("Background standardization complete");

    Ok(written)
}

/// Mask of pixels whose first three channels are all >= `WHITE_THRESHOLD`
pub fn white_mask(data: &Array3<u8>) -> Array2<bool> {
    Zip::from(data.lanes(Axis(2))).map_collect(|pixel| {
        pixel.len() >= 3 && pixel.iter().take(3).all(|&value| value >= WHITE_THRESHOLD)
    })
}

/// Set the RGB channels of every near-white pixel to 0, leaving alpha alone.
/// Returns how many pixels were replaced.
pub fn blacken_background(data: &mut Array3<u8>) -> usize {
    let mask = white_mask(data);
    let mut replaced = 0;

    Zip::from(data.lanes_mut(Axis(2)))
        .and(&mask)
        .for_each(|mut pixel, &is_white| {
            if is_white {
                pixel.iter_mut().take(3).for_each(|value| *value = 0);
                replaced += 1;
            }
        });

    replaced
}
