//! Conversions between decoded images and `ndarray` pixel arrays.
//!
//! Arrays use the (height, width, channels) layout with 8-bit channels.
//! Gray, gray+alpha, RGB and RGBA images keep their channel count; wider
//! color types are narrowed to 8-bit RGB or RGBA.

use image::{DynamicImage, GrayAlphaImage, GrayImage, RgbImage, RgbaImage};
use ndarray::Array3;

use crate::error::{Result, ToolboxError};

/// Copy the pixels of `image` into an owned `(height, width, channels)` array
pub fn image_to_array(image: &DynamicImage) -> Result<Array3<u8>> {
    let (width, height) = (image.width() as usize, image.height() as usize);

    let (channels, raw) = match image {
        DynamicImage::ImageLuma8(buf) => (1, buf.as_raw().clone()),
        DynamicImage::ImageLumaA8(buf) => (2, buf.as_raw().clone()),
        DynamicImage::ImageRgb8(buf) => (3, buf.as_raw().clone()),
        DynamicImage::ImageRgba8(buf) => (4, buf.as_raw().clone()),
        other if other.color().has_alpha() => (4, other.to_rgba8().into_raw()),
        other => (3, other.to_rgb8().into_raw()),
    };

    Ok(Array3::from_shape_vec((height, width, channels), raw)?)
}

/// Rebuild an image from a `(height, width, channels)` array
pub fn array_to_image(array: Array3<u8>) -> Result<DynamicImage> {
    let (height, width, channels) = array.dim();
    let (width, height) = (width as u32, height as u32);

    let raw = if array.is_standard_layout() {
        match array.into_raw_vec_and_offset() {
            (vec, Some(offset)) if offset > 0 => vec[offset..].to_vec(),
            (vec, _) => vec,
        }
    } else {
        array.iter().copied().collect()
    };

    let shape_mismatch = || {
        ToolboxError::InvalidArgument(format!(
            "pixel buffer does not match {}x{}x{}",
            width, height, channels
        ))
    };

    let image = match channels {
        1 => DynamicImage::ImageLuma8(GrayImage::from_raw(width, height, raw).ok_or_else(shape_mismatch)?),
        2 => DynamicImage::ImageLumaA8(
            GrayAlphaImage::from_raw(width, height, raw).ok_or_else(shape_mismatch)?,
        ),
        3 => DynamicImage::ImageRgb8(RgbImage::from_raw(width, height, raw).ok_or_else(shape_mismatch)?),
        4 => DynamicImage::ImageRgba8(RgbaImage::from_raw(width, height, raw).ok_or_else(shape_mismatch)?),
        n => {
            return Err(ToolboxError::InvalidArgument(format!(
                "cannot build an image with {} channels",
                n
            )))
        }
    };
    Ok(image)
}
