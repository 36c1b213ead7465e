//! # imagefold
//!
//! Trains an image classifier on a folder-labeled dataset and exports the
//! best model as a portable inference artifact.
//!
//! The pipeline:
//! 1. Discover classes from subdirectory names (sorted, deterministic labels)
//! 2. Split samples 80/20 into train/validation with a fixed seed
//! 3. Train a CNN classifier with Adam and cross-entropy loss
//! 4. Reduce the learning rate on validation-loss plateaus
//! 5. Snapshot the model on every strict validation-accuracy improvement
//! 6. Stop early after a patience of non-improving epochs
//! 7. Export the best snapshot as `model.ai` in the output directory
//!
//! Built on the Burn deep-learning framework; the compute backend (wgpu or
//! ndarray) is selected at compile time via the `wgpu` feature.

pub mod backend;
pub mod dataset;
pub mod export;
pub mod model;
pub mod training;
pub mod utils;

/// Default square input size images are resized to
pub const IMAGE_SIZE: usize = 224;

pub use backend::{DefaultBackend, TrainingBackend};
pub use dataset::{ImageFolderDataset, SplitConfig, TrainValSplit};
pub use export::{ModelArtifact, MODEL_FILE_NAME};
pub use model::{Classifier, ClassifierConfig};
pub use training::{run_training, TrainConfig, TrainingReport};
pub use utils::error::{ImagefoldError, Result};
