//! Folder-Labeled Dataset Loader
//!
//! Discovers a dataset laid out as one subdirectory per class:
//!
//! ```text
//! root_dir/
//! ├── cats/
//! │   ├── image1.jpg
//! │   └── image2.jpg
//! ├── dogs/
//! │   └── ...
//! └── ...
//! ```
//!
//! Class names are sorted so that label indices are stable and deterministic
//! across runs; this ordering is what the exported head's index-to-label
//! mapping is built from.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::utils::error::{ImagefoldError, Result};

/// File extensions treated as images
const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "bmp", "gif"];

/// A single image sample with its label
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageSample {
    /// Path to the image file
    pub path: PathBuf,
    /// Class label index
    pub label: usize,
    /// Class name (the subdirectory name)
    pub class_name: String,
}

/// Folder-labeled image dataset
#[derive(Debug, Clone)]
pub struct ImageFolderDataset {
    /// Root directory of the dataset
    pub root_dir: PathBuf,
    /// All discovered samples
    pub samples: Vec<ImageSample>,
    /// Ordered class names; index position is the label
    classes: Vec<String>,
    /// Mapping from class name to label index
    class_to_idx: HashMap<String, usize>,
}

impl ImageFolderDataset {
    /// Discover a dataset rooted at `root_dir`
    ///
    /// Fails if the directory does not exist, contains no class
    /// subdirectories, or contains no image files at all.
    pub fn new<P: AsRef<Path>>(root_dir: P) -> Result<Self> {
        let root_dir = root_dir.as_ref().to_path_buf();
        info!("Loading dataset from: {:?}", root_dir);

        if !root_dir.exists() {
            return Err(ImagefoldError::PathNotFound(root_dir));
        }

        // Discover class directories; sorted for deterministic label indices
        let mut classes: Vec<String> = Vec::new();
        for entry in std::fs::read_dir(&root_dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    classes.push(name.to_string());
                }
            }
        }
        classes.sort();

        if classes.is_empty() {
            return Err(ImagefoldError::Dataset(format!(
                "no class subdirectories found in {:?}",
                root_dir
            )));
        }

        let class_to_idx: HashMap<String, usize> = classes
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.clone(), idx))
            .collect();

        let mut samples = Vec::new();
        for class_name in &classes {
            let class_dir = root_dir.join(class_name);
            let label = class_to_idx[class_name];
            let before = samples.len();

            for entry in WalkDir::new(&class_dir)
                .min_depth(1)
                .max_depth(1)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let path = entry.path().to_path_buf();
                if let Some(ext) = path.extension() {
                    let ext = ext.to_string_lossy().to_lowercase();
                    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
                        samples.push(ImageSample {
                            path,
                            label,
                            class_name: class_name.clone(),
                        });
                    }
                }
            }

            debug!(
                "Class '{}' (label {}): {} samples",
                class_name,
                label,
                samples.len() - before
            );
        }

        if samples.is_empty() {
            return Err(ImagefoldError::Dataset(format!(
                "no images found under {:?}",
                root_dir
            )));
        }

        info!(
            "Detected {} classes, {} total samples",
            classes.len(),
            samples.len()
        );

        Ok(Self {
            root_dir,
            samples,
            classes,
            class_to_idx,
        })
    }

    /// Total number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the dataset contains no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of detected classes
    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    /// Ordered class names (index position is the label)
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Label index for a class name, if present
    pub fn class_index(&self, name: &str) -> Option<usize> {
        self.class_to_idx.get(name).copied()
    }

    /// Per-class sample counts
    pub fn class_counts(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.num_classes()];
        for sample in &self.samples {
            counts[sample.label] += 1;
        }
        counts
    }
}
