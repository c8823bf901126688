//! Memoria template loading.
//!
//! Templates are small reference images located inside larger screenshots.
//! The file stem is the template name; point values come from the
//! caller-supplied table and default to 0 for unlisted names.

use anyhow::{Context, Result, anyhow};
use image::{GrayImage, RgbImage};
use log::{info, warn};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Image file extensions considered by the template and screenshot loaders.
pub(crate) const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// A named reference image with its configured point value.
#[derive(Debug, Clone)]
pub struct Template {
    /// Template name (file stem), unique within a run
    pub name: String,
    /// Full-color pixels, used for histogram comparison
    pub image: RgbImage,
    /// Grayscale rendition, used for cross-correlation matching
    pub gray: GrayImage,
    /// Caller-assigned ranking weight, independent of match quality
    pub point_value: u32,
}

pub(crate) fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Loads all memoria templates from a directory.
///
/// Unreadable image files are logged and skipped; only an absent directory
/// fails the load. The returned map is keyed by template name.
pub fn load_templates(
    dir: &Path,
    point_values: &HashMap<String, u32>,
) -> Result<BTreeMap<String, Template>> {
    if !dir.is_dir() {
        return Err(anyhow!("Memoria directory {} does not exist", dir.display()));
    }

    let mut paths: Vec<_> = std::fs::read_dir(dir)
        .context(format!("Failed to list memoria directory {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_image_file(path))
        .collect();
    paths.sort();

    let mut templates = BTreeMap::new();
    for path in paths {
        let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
            warn!("Skipping memoria with non-UTF-8 name: {}", path.display());
            continue;
        };
        if templates.contains_key(name) {
            warn!(
                "Skipping {}: template name {:?} already loaded",
                path.display(),
                name
            );
            continue;
        }
        match image::open(&path) {
            Ok(img) => {
                let point_value = point_values.get(name).copied().unwrap_or(0);
                templates.insert(
                    name.to_string(),
                    Template {
                        name: name.to_string(),
                        image: img.to_rgb8(),
                        gray: img.to_luma8(),
                        point_value,
                    },
                );
            }
            Err(e) => {
                warn!("Skipping unreadable memoria {}: {}", path.display(), e);
            }
        }
    }

    info!(
        "Loaded {} memoria templates from {}",
        templates.len(),
        dir.display()
    );
    Ok(templates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use tempfile::tempdir;

    #[test]
    fn loads_templates_with_point_values() {
        let dir = tempdir().unwrap();
        let img = RgbImage::from_pixel(4, 4, Rgb([200, 10, 10]));
        img.save(dir.path().join("yingying-ss1.png")).unwrap();
        img.save(dir.path().join("aoi-ss2.png")).unwrap();

        let mut point_values = HashMap::new();
        point_values.insert("yingying-ss1".to_string(), 20);

        let templates = load_templates(dir.path(), &point_values).unwrap();
        assert_eq!(templates.len(), 2);
        assert_eq!(templates["yingying-ss1"].point_value, 20);
        // Unlisted templates default to 0 points
        assert_eq!(templates["aoi-ss2"].point_value, 0);
        assert_eq!(templates["aoi-ss2"].image.dimensions(), (4, 4));
    }

    #[test]
    fn skips_unreadable_files() {
        let dir = tempdir().unwrap();
        let img = RgbImage::from_pixel(4, 4, Rgb([0, 0, 0]));
        img.save(dir.path().join("good.png")).unwrap();
        std::fs::write(dir.path().join("broken.png"), b"not a png").unwrap();

        let templates = load_templates(dir.path(), &HashMap::new()).unwrap();
        assert_eq!(templates.len(), 1);
        assert!(templates.contains_key("good"));
    }

    #[test]
    fn ignores_non_image_files() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"hello").unwrap();

        let templates = load_templates(dir.path(), &HashMap::new()).unwrap();
        assert!(templates.is_empty());
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(load_templates(&missing, &HashMap::new()).is_err());
    }
}
