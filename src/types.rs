use ndarray::Array3;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

// Supported image formats
pub const IMG_FORMATS: &[&str] = &["jpg", "jpeg", "png"];

// Precomputed HashSet of image extensions for fast lookup
pub static IMAGE_EXTENSIONS_SET: OnceLock<HashSet<String>> = OnceLock::new();

/// Get the image extensions set
pub fn get_image_extensions_set() -> &'static HashSet<String> {
    IMAGE_EXTENSIONS_SET.get_or_init(|| IMG_FORMATS.iter().map(|ext| ext.to_lowercase()).collect())
}

/// Whether the path carries one of the supported image extensions (case-insensitive)
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| get_image_extensions_set().contains(&ext.to_lowercase()))
}

// The two output classes of the dataset structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageClass {
    Healthy,
    Unhealthy,
}

impl ImageClass {
    pub const ALL: [ImageClass; 2] = [ImageClass::Healthy, ImageClass::Unhealthy];

    /// Folder name used for this class under the dataset root
    pub fn dir_name(&self) -> &'static str {
        match self {
            ImageClass::Healthy => "healthy",
            ImageClass::Unhealthy => "unhealthy",
        }
    }
}

impl fmt::Display for ImageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// One decoded image and the index of the class folder it came from
#[derive(Debug, Clone)]
pub struct Sample {
    /// Pixels in (height, width, channels) layout
    pub image: Array3<u8>,
    pub label: usize,
}

// Struct to hold structure building statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StructureStats {
    pub categories_seen: usize,
    pub healthy_copied: usize,
    pub unhealthy_copied: usize,
}

impl StructureStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_copied(&mut self, class: ImageClass) {
        match class {
            ImageClass::Healthy => self.healthy_copied += 1,
            ImageClass::Unhealthy => self.unhealthy_copied += 1,
        }
    }

    pub fn total_copied(&self) -> usize {
        self.healthy_copied + self.unhealthy_copied
    }

    pub fn print_summary(&self) {
        log::info!("=== Structure Summary ===");
        log::info!("Categories processed: {}", self.categories_seen);
        log::info!("Copied to healthy: {}", self.healthy_copied);
        log::info!("Copied to unhealthy: {}", self.unhealthy_copied);

        if self.total_copied() == 0 {
            log::warn!("No images were copied; the annotation catalog references no images");
        }
    }
}
