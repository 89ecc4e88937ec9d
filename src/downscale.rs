//! Integer-factor box reduction of a folder of images.

use image::{DynamicImage, ImageBuffer, Pixel};
use log::{debug, info};
use std::path::{Path, PathBuf};

use crate::error::{Result, ToolboxError};
use crate::utils::{create_progress_bar, ensure_directory, list_images};

/// Downscale every supported image in `source` by `factor` and write it to `out`.
///
/// Each output pixel is the rounded mean of a `factor x factor` block, so an
/// image of `(W, H)` becomes `(W / factor, H / factor)` (at least 1x1). Output
/// files are named `<stem>_<width>x<height>.<ext>`. Files written before a
/// failure are left in place.
pub fn downscale_images(source: &Path, out: &Path, factor: u32) -> Result<Vec<PathBuf>> {
    if factor == 0 {
        return Err(ToolboxError::InvalidArgument(
            "parameter \"factor\" must be at least 1".to_string(),
        ));
    }
    ensure_directory(source)?;
    ensure_directory(out)?;

    let images = list_images(source)?;
    info!(
        "Downscaling {} images from {} by a factor of {}",
        images.len(),
        source.display(),
        factor
    );

    let pb = create_progress_bar(images.len() as u64, "Downscale");
    let mut written = Vec::with_capacity(images.len());
    for path in &images {
        let image = image::open(path)?;
        let reduced = box_reduce(&image, factor);

        let output_path = out.join(downscaled_file_name(path, reduced.width(), reduced.height()));
        reduced.save(&output_path)?;
        debug!("{} -> {}", path.display(), output_path.display());

        written.push(output_path);
        pb.inc(1);
    }
    pb.finish_with_message("Downscale complete");

    Ok(written)
}

/// `<stem>_<width>x<height>.<ext>`, keeping the original extension
pub fn downscaled_file_name(path: &Path, width: u32, height: u32) -> String {
    let stem = path.file_stem().unwrap_or_default().to_string_lossy();
    match path.extension() {
        Some(ext) => format!("{}_{}x{}.{}", stem, width, height, ext.to_string_lossy()),
        None => format!("{}_{}x{}", stem, width, height),
    }
}

/// Box-reduce an image by an integer factor, keeping its 8-bit color type
pub fn box_reduce(image: &DynamicImage, factor: u32) -> DynamicImage {
    match image {
        DynamicImage::ImageLuma8(buf) => DynamicImage::ImageLuma8(reduce_buffer(buf, factor)),
        DynamicImage::ImageLumaA8(buf) => DynamicImage::ImageLumaA8(reduce_buffer(buf, factor)),
        DynamicImage::ImageRgb8(buf) => DynamicImage::ImageRgb8(reduce_buffer(buf, factor)),
        DynamicImage::ImageRgba8(buf) => DynamicImage::ImageRgba8(reduce_buffer(buf, factor)),
        other if other.color().has_alpha() => {
            DynamicImage::ImageRgba8(reduce_buffer(&other.to_rgba8(), factor))
        }
        other => DynamicImage::ImageRgb8(reduce_buffer(&other.to_rgb8(), factor)),
    }
}

fn reduce_buffer<P>(buf: &ImageBuffer<P, Vec<u8>>, factor: u32) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8>,
{
    let factor = factor.max(1);
    let width = (buf.width() / factor).max(1);
    let height = (buf.height() / factor).max(1);
    let channels = P::CHANNEL_COUNT as usize;

    let mut reduced = ImageBuffer::<P, Vec<u8>>::new(width, height);
    let mut sums = vec![0u64; channels];

    for (x, y, pixel) in reduced.enumerate_pixels_mut() {
        sums.iter_mut().for_each(|s| *s = 0);
        let x_end = ((x + 1) * factor).min(buf.width());
        let y_end = ((y + 1) * factor).min(buf.height());

        let mut count = 0u64;
        for sy in y * factor..y_end {
            for sx in x * factor..x_end {
                for (sum, &value) in sums.iter_mut().zip(buf.get_pixel(sx, sy).channels()) {
                    *sum += value as u64;
                }
                count += 1;
            }
        }

        for (out, sum) in pixel.channels_mut().iter_mut().zip(&sums) {
            *out = ((sum + count / 2) / count.max(1)) as u8;
        }
    }

    reduced
}
