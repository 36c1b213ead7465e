//! Training module: the epoch loop and its control policies.
//!
//! The loop itself lives in [`run`]; learning-rate scheduling and early
//! stopping are separate policies so each can be tested and tuned on its own.

pub mod early_stopping;
pub mod run;
pub mod scheduler;

use std::path::PathBuf;

pub use early_stopping::EarlyStopping;
pub use run::{run_training, TrainingReport};
pub use scheduler::{PlateauMode, ReduceOnPlateau};

use crate::utils::error::{ImagefoldError, Result};

/// Configuration for a full training run
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Root directory of the folder-labeled dataset
    pub data_dir: PathBuf,
    /// Directory the exported model is written into
    pub output_dir: PathBuf,
    /// Maximum number of epochs
    pub epochs: usize,
    /// Consecutive non-improving epochs before early stopping
    pub patience: usize,
    /// Batch size for both training and validation
    pub batch_size: usize,
    /// Initial learning rate
    pub learning_rate: f64,
    /// Fraction of samples held out for validation
    pub validation_fraction: f64,
    /// Seed for the split and for per-epoch shuffling
    pub seed: u64,
    /// Square input size images are resized to
    pub image_size: usize,
    /// Optional pretrained backbone record to start from
    pub backbone_weights: Option<PathBuf>,
}

impl TrainConfig {
    /// Create a configuration with the standard defaults
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(data_dir: P, output_dir: Q) -> Self {
        Self {
            data_dir: data_dir.into(),
            output_dir: output_dir.into(),
            epochs: 10,
            patience: 5,
            batch_size: 32,
            learning_rate: 0.001,
            validation_fraction: 0.2,
            seed: 42,
            image_size: 224,
            backbone_weights: None,
        }
    }

    /// Set the maximum number of epochs
    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    /// Set the early-stopping patience
    pub fn with_patience(mut self, patience: usize) -> Self {
        self.patience = patience;
        self
    }

    /// Set the batch size
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the initial learning rate
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Set the split/shuffle seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the square input image size
    pub fn with_image_size(mut self, image_size: usize) -> Self {
        self.image_size = image_size;
        self
    }

    /// Start from a pretrained backbone record
    pub fn with_backbone_weights<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.backbone_weights = Some(path.into());
        self
    }

    /// Check the configuration for obviously unusable values
    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(ImagefoldError::Config("epochs must be at least 1".to_string()));
        }
        if self.batch_size == 0 {
            return Err(ImagefoldError::Config("batch size must be at least 1".to_string()));
        }
        if self.patience == 0 {
            return Err(ImagefoldError::Config("patience must be at least 1".to_string()));
        }
        if self.learning_rate <= 0.0 {
            return Err(ImagefoldError::Config(format!(
                "learning rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if self.image_size == 0 {
            return Err(ImagefoldError::Config("image size must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TrainConfig::new("data", "out");
        assert_eq!(config.epochs, 10);
        assert_eq!(config.patience, 5);
        assert_eq!(config.batch_size, 32);
        assert_eq!(config.learning_rate, 0.001);
        assert_eq!(config.validation_fraction, 0.2);
        assert_eq!(config.seed, 42);
        assert_eq!(config.image_size, 224);
        assert!(config.backbone_weights.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        assert!(TrainConfig::new("d", "o").with_epochs(0).validate().is_err());
        assert!(TrainConfig::new("d", "o").with_batch_size(0).validate().is_err());
        assert!(TrainConfig::new("d", "o").with_patience(0).validate().is_err());
        assert!(TrainConfig::new("d", "o")
            .with_learning_rate(0.0)
            .validate()
            .is_err());
    }
}
