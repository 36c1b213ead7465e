//! Dataset module: folder-labeled discovery, deterministic splitting, and
//! preprocessing/batching for training.
//!
//! The pipeline is: discover class subdirectories ([`loader`]), partition
//! samples into train/validation subsets with a fixed seed ([`split`]), and
//! lazily load, resize, and normalize images at batch time ([`batch`]).

pub mod batch;
pub mod loader;
pub mod split;

pub use batch::{
    FolderImageDataset, ImageBatch, ImageBatcher, ImageItem, IMAGENET_MEAN, IMAGENET_STD,
};
pub use loader::{ImageFolderDataset, ImageSample};
pub use split::{SplitConfig, TrainValSplit};
