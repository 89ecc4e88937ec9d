use image::{GrayImage, Luma, Rgb, RgbImage};
use img_toolbox::utils::list_images;
use img_toolbox::{
    build_dataset_structure, downscale_images, load_dataset, purge_elements, resize_images,
    standardize_background, ImgToolbox, PurgeOptions, TargetSize, ToolboxConfig, ToolboxError,
};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

fn write_rgb(path: &Path, width: u32, height: u32, color: [u8; 3]) {
    RgbImage::from_pixel(width, height, Rgb(color)).save(path).unwrap();
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn write_annotations(root: &Path, json: &str) {
    let extra = root.join("extra");
    fs::create_dir_all(&extra).unwrap();
    fs::write(extra.join("instances_default.json"), json).unwrap();
}

const CATALOG: &str = r#"{
    "licenses": [{"name": "", "id": 0, "url": ""}],
    "info": {"contributor": "", "date_created": "", "description": "", "url": "", "version": "", "year": ""},
    "categories": [
        {"id": 1, "name": "healthy_leaf", "supercategory": ""},
        {"id": 2, "name": "rust", "supercategory": ""},
        {"id": 8, "name": "healthy_stem", "supercategory": ""}
    ],
    "images": [
        {"id": 1, "width": 4, "height": 4, "file_name": "a.jpg", "license": 0},
        {"id": 2, "width": 4, "height": 4, "file_name": "b.jpg", "license": 0},
        {"id": 3, "width": 4, "height": 4, "file_name": "batch/c.png", "license": 0}
    ],
    "annotations": [
        {"id": 1, "image_id": 1, "category_id": 1, "segmentation": [], "area": 4.0, "bbox": [0, 0, 2, 2], "iscrowd": 0},
        {"id": 2, "image_id": 2, "category_id": 2, "segmentation": [], "area": 4.0, "bbox": [0, 0, 2, 2], "iscrowd": 0},
        {"id": 3, "image_id": 3, "category_id": 8, "segmentation": [], "area": 4.0, "bbox": [0, 0, 2, 2], "iscrowd": 0}
    ]
}"#;

#[test]
fn test_downscale_encodes_new_dimensions() {
    let source = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_rgb(&source.path().join("leaf.png"), 101, 50, [10, 200, 10]);
    write_rgb(&source.path().join("stem.jpg"), 64, 64, [120, 90, 30]);
    fs::write(source.path().join("notes.txt"), "not an image").unwrap();

    let written = downscale_images(source.path(), out.path(), 4).unwrap();

    assert_eq!(written.len(), 2);
    assert_eq!(file_names(out.path()), vec!["leaf_25x12.png", "stem_16x16.jpg"]);

    let reduced = image::open(out.path().join("leaf_25x12.png")).unwrap().to_rgb8();
    assert_eq!(reduced.dimensions(), (25, 12));
    assert_eq!(reduced.get_pixel(0, 0), &Rgb([10, 200, 10]));
}

#[test]
fn test_downscale_requires_directories() {
    let temp_dir = tempfile::tempdir().unwrap();
    let missing = temp_dir.path().join("missing");
    let file = temp_dir.path().join("file.png");
    write_rgb(&file, 2, 2, [0, 0, 0]);

    assert!(matches!(
        downscale_images(&missing, temp_dir.path(), 2),
        Err(ToolboxError::PathNotFound(p)) if p == missing
    ));
    assert!(matches!(
        downscale_images(temp_dir.path(), &file, 2),
        Err(ToolboxError::NotADirectory(p)) if p == file
    ));
    assert!(matches!(
        downscale_images(temp_dir.path(), temp_dir.path(), 0),
        Err(ToolboxError::InvalidArgument(_))
    ));
}

#[test]
fn test_list_images_filters_one_listing() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["b.PNG", "a.jpeg", "c.Jpg", "notes.txt", "archive.png.bak"] {
        fs::write(dir.path().join(name), b"x").unwrap();
    }
    fs::create_dir(dir.path().join("folder.png")).unwrap();

    let images = list_images(dir.path()).unwrap();
    let names: Vec<_> = images
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a.jpeg", "b.PNG", "c.Jpg"]);
}

#[cfg(target_os = "linux")]
#[test]
fn test_list_images_in_non_utf8_directory() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let root = tempfile::tempdir().unwrap();
    let dir = root.path().join(OsStr::from_bytes(b"leaves_\xff"));
    fs::create_dir(&dir).unwrap();
    write_rgb(&dir.join("leaf.png"), 2, 2, [0, 120, 0]);

    assert_eq!(list_images(&dir).unwrap(), vec![dir.join("leaf.png")]);

    let out = root.path().join("out");
    fs::create_dir(&out).unwrap();
    assert_eq!(downscale_images(&dir, &out, 2).unwrap().len(), 1);
}

#[test]
fn test_resize_fits_bounding_box() {
    let source = tempfile::tempdir().unwrap();
    let target = tempfile::tempdir().unwrap();
    write_rgb(&source.path().join("wide.png"), 400, 200, [50, 50, 50]);
    write_rgb(&source.path().join("small.png"), 50, 20, [50, 50, 50]);

    let size = TargetSize::new(100, 100).unwrap();
    resize_images(source.path(), target.path(), size).unwrap();

    let wide = image::open(target.path().join("wide.png")).unwrap();
    assert_eq!((wide.width(), wide.height()), (100, 50));
    let small = image::open(target.path().join("small.png")).unwrap();
    assert_eq!((small.width(), small.height()), (50, 20));
}

#[test]
fn test_standardize_background() {
    let source = tempfile::tempdir().unwrap();
    let target = tempfile::tempdir().unwrap();

    let mut buf = RgbImage::from_pixel(2, 1, Rgb([230, 230, 230]));
    buf.put_pixel(1, 0, Rgb([200, 230, 230]));
    buf.save(source.path().join("leaf.png")).unwrap();

    let written = standardize_background(source.path(), target.path()).unwrap();
    assert_eq!(written, vec![target.path().join("leaf.png")]);

    let result = image::open(target.path().join("leaf.png")).unwrap().to_rgb8();
    assert_eq!(result.get_pixel(0, 0), &Rgb([0, 0, 0]));
    assert_eq!(result.get_pixel(1, 0), &Rgb([200, 230, 230]));

    // The source is untouched
    let original = image::open(source.path().join("leaf.png")).unwrap().to_rgb8();
    assert_eq!(original.get_pixel(0, 0), &Rgb([230, 230, 230]));
}

#[test]
fn test_standardize_background_rejects_grayscale() {
    let source = tempfile::tempdir().unwrap();
    let target = tempfile::tempdir().unwrap();
    GrayImage::from_pixel(2, 2, Luma([255]))
        .save(source.path().join("gray.png"))
        .unwrap();

    assert!(matches!(
        standardize_background(source.path(), target.path()),
        Err(ToolboxError::UnsupportedColorType { channels: 1, .. })
    ));
}

fn fill_with_images(dir: &Path, count: usize) -> Vec<PathBuf> {
    (0..count)
        .map(|i| {
            let path = dir.join(format!("img_{:02}.png", i));
            fs::write(&path, b"png").unwrap();
            path
        })
        .collect()
}

#[test]
fn test_purge_leaves_exact_count() {
    let source = tempfile::tempdir().unwrap();
    fill_with_images(source.path(), 10);
    fs::write(source.path().join("labels.csv"), "keep me").unwrap();

    let purged = purge_elements(source.path(), 7, PurgeOptions::default()).unwrap();

    assert_eq!(purged.len(), 3);
    assert!(purged.iter().all(|p| !p.exists()));
    let remaining = file_names(source.path());
    assert_eq!(remaining.len(), 8);
    assert!(remaining.contains(&"labels.csv".to_string()));
}

#[test]
fn test_purge_selection_is_random() {
    let mut removed_counts: HashMap<String, usize> = HashMap::new();
    let trials = 50;

    for _ in 0..trials {
        let source = tempfile::tempdir().unwrap();
        fill_with_images(source.path(), 10);
        for path in purge_elements(source.path(), 7, PurgeOptions::default()).unwrap() {
            let name = path.file_name().unwrap().to_string_lossy().into_owned();
            *removed_counts.entry(name).or_default() += 1;
        }
        assert_eq!(file_names(source.path()).len(), 7);
    }

    for i in 0..10 {
        let removed = removed_counts.get(&format!("img_{:02}.png", i)).copied().unwrap_or(0);
        assert!(removed > 0, "img_{:02}.png was never removed", i);
        assert!(removed < trials, "img_{:02}.png was always removed", i);
    }
}

#[test]
fn test_purge_with_seed_is_reproducible() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    fill_with_images(first.path(), 10);
    fill_with_images(second.path(), 10);

    let options = PurgeOptions { seed: Some(7) };
    purge_elements(first.path(), 4, options).unwrap();
    purge_elements(second.path(), 4, options).unwrap();

    assert_eq!(file_names(first.path()), file_names(second.path()));
}

#[test]
fn test_purge_validates_before_touching_filesystem() {
    let missing = PathBuf::from("/definitely/not/here");
    assert!(matches!(
        purge_elements(&missing, 0, PurgeOptions::default()),
        Err(ToolboxError::InvalidArgument(_))
    ));

    let source = tempfile::tempdir().unwrap();
    fill_with_images(source.path(), 3);
    assert!(purge_elements(source.path(), 5, PurgeOptions::default())
        .unwrap()
        .is_empty());
    assert_eq!(file_names(source.path()).len(), 3);
}

#[test]
fn test_loader_yields_every_sample_with_sorted_labels() {
    let root = tempfile::tempdir().unwrap();
    for (class, color) in [("unhealthy", [150, 40, 40]), ("healthy", [40, 150, 40])] {
        let dir = root.path().join(class);
        fs::create_dir(&dir).unwrap();
        for i in 0..3 {
            write_rgb(&dir.join(format!("{}_{}.png", class, i)), 4, 3, color);
        }
        fs::write(dir.join("readme.txt"), "skip").unwrap();
        fs::create_dir(dir.join("nested")).unwrap();
        write_rgb(&dir.join("nested").join("deep.png"), 4, 3, color);
    }
    fs::write(root.path().join("stray.png"), b"not a class").unwrap();

    let samples = load_dataset(root.path()).unwrap();
    assert_eq!(samples.class_names(), vec!["healthy", "unhealthy"]);
    assert_eq!(samples.num_classes(), 2);

    let samples: Vec<_> = samples.map(|s| s.unwrap()).collect();
    assert_eq!(samples.len(), 6);
    assert!(samples.iter().all(|s| s.label < 2));
    assert!(samples.iter().all(|s| s.image.dim() == (3, 4, 3)));

    let healthy: Vec<_> = samples.iter().filter(|s| s.label == 0).collect();
    assert_eq!(healthy.len(), 3);
    assert!(healthy.iter().all(|s| s.image[[0, 0, 1]] == 150));
}

#[test]
fn test_loader_requires_directory() {
    let temp_dir = tempfile::tempdir().unwrap();
    let file = temp_dir.path().join("file.png");
    fs::write(&file, b"png").unwrap();

    assert!(matches!(
        load_dataset(&temp_dir.path().join("missing")),
        Err(ToolboxError::PathNotFound(_))
    ));
    assert!(matches!(load_dataset(&file), Err(ToolboxError::NotADirectory(_))));
}

#[test]
fn test_loader_reports_undecodable_images() {
    let root = tempfile::tempdir().unwrap();
    let dir = root.path().join("only");
    fs::create_dir(&dir).unwrap();
    fs::write(dir.join("broken.png"), b"not really a png").unwrap();
    write_rgb(&dir.join("ok.png"), 2, 2, [1, 2, 3]);

    let results: Vec<_> = load_dataset(root.path()).unwrap().collect();
    assert_eq!(results.len(), 2);
    assert!(results[0].is_err());
    assert_eq!(results[1].as_ref().unwrap().label, 0);
}

#[test]
fn test_build_dataset_structure() {
    let root = tempfile::tempdir().unwrap();
    write_annotations(root.path(), CATALOG);
    let extra = root.path().join("extra");
    fs::write(extra.join("a.jpg"), b"a").unwrap();
    fs::write(extra.join("b.jpg"), b"b").unwrap();
    fs::create_dir(extra.join("batch")).unwrap();
    fs::write(extra.join("batch").join("c.png"), b"c").unwrap();

    let stats = build_dataset_structure(ToolboxConfig::new(root.path())).unwrap();

    assert_eq!(stats.categories_seen, 3);
    assert_eq!(stats.healthy_copied, 2);
    assert_eq!(stats.unhealthy_copied, 1);

    let dataset = root.path().join("dataset");
    assert_eq!(file_names(&dataset.join("healthy")), vec!["a.jpg", "c.png"]);
    assert_eq!(file_names(&dataset.join("unhealthy")), vec!["b.jpg"]);
    assert_eq!(fs::read(dataset.join("healthy").join("a.jpg")).unwrap(), b"a");

    // Sources are copied, not moved
    assert!(extra.join("a.jpg").exists());

    // Running again overwrites in place
    let stats = build_dataset_structure(ToolboxConfig::new(root.path())).unwrap();
    assert_eq!(stats.total_copied(), 3);
    assert_eq!(file_names(&dataset.join("healthy")).len(), 2);
}

#[test]
fn test_build_dataset_structure_with_custom_categories() {
    let root = tempfile::tempdir().unwrap();
    write_annotations(root.path(), CATALOG);
    let extra = root.path().join("extra");
    fs::write(extra.join("a.jpg"), b"a").unwrap();
    fs::write(extra.join("b.jpg"), b"b").unwrap();
    fs::create_dir(extra.join("batch")).unwrap();
    fs::write(extra.join("batch").join("c.png"), b"c").unwrap();

    let config = ToolboxConfig::new(root.path()).with_healthy_categories([2]);
    build_dataset_structure(config).unwrap();

    let dataset = root.path().join("dataset");
    assert_eq!(file_names(&dataset.join("healthy")), vec!["b.jpg"]);
    assert_eq!(file_names(&dataset.join("unhealthy")), vec!["a.jpg", "c.png"]);
}

#[test]
fn test_build_without_annotations_creates_nothing() {
    let root = tempfile::tempdir().unwrap();

    let toolbox = ImgToolbox::new(ToolboxConfig::new(root.path())).unwrap();
    assert!(!toolbox.has_annotations());

    match toolbox.create_dataset_structure() {
        Err(ToolboxError::AnnotationsNotLoaded(path)) => {
            assert!(path.ends_with("extra/instances_default.json"))
        }
        other => panic!("expected AnnotationsNotLoaded, got {:?}", other),
    }
    assert!(!root.path().join("dataset").exists());
}

#[test]
fn test_malformed_annotations_fail_construction() {
    let root = tempfile::tempdir().unwrap();
    write_annotations(root.path(), "{ not json");

    assert!(matches!(
        ImgToolbox::new(ToolboxConfig::new(root.path())),
        Err(ToolboxError::Json(_))
    ));
}

#[test]
fn test_missing_source_image_is_reported() {
    let root = tempfile::tempdir().unwrap();
    write_annotations(root.path(), CATALOG);
    fs::write(root.path().join("extra").join("a.jpg"), b"a").unwrap();

    let result = build_dataset_structure(ToolboxConfig::new(root.path()));
    assert!(matches!(result, Err(ToolboxError::PathNotFound(p)) if p.ends_with("b.jpg")));

    // Copies made before the failure stay on disk
    assert!(root.path().join("dataset/healthy/a.jpg").exists());
}
