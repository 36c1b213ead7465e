//! Train/Validation Split
//!
//! Deterministically partitions the dataset into a training subset and a
//! validation subset. The partition is driven by a fixed random seed so the
//! same input data always yields the same split: validation takes
//! `floor(fraction x N)` samples, training takes the remainder, with no
//! overlap and full coverage.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::dataset::loader::ImageSample;
use crate::utils::error::{ImagefoldError, Result};

/// Configuration for the train/validation split
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Fraction of samples held out for validation
    pub validation_fraction: f64,
    /// Random seed driving the partition
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            validation_fraction: 0.2,
            seed: 42,
        }
    }
}

impl SplitConfig {
    /// Create a split configuration, validating the fraction
    pub fn new(validation_fraction: f64, seed: u64) -> Result<Self> {
        if !(0.0..1.0).contains(&validation_fraction) {
            return Err(ImagefoldError::Config(format!(
                "validation fraction must be in [0.0, 1.0), got {}",
                validation_fraction
            )));
        }
        Ok(Self {
            validation_fraction,
            seed,
        })
    }
}

/// A deterministic partition of the dataset
#[derive(Debug, Clone)]
pub struct TrainValSplit {
    /// Training subset
    pub train: Vec<ImageSample>,
    /// Validation subset
    pub validation: Vec<ImageSample>,
    /// Configuration used to create this split
    pub config: SplitConfig,
}

impl TrainValSplit {
    /// Partition `samples` according to `config`
    ///
    /// Samples are shuffled with a seeded RNG; the first
    /// `floor(fraction x N)` go to validation, the rest to training.
    pub fn new(samples: Vec<ImageSample>, config: SplitConfig) -> Result<Self> {
        if samples.is_empty() {
            return Err(ImagefoldError::Dataset(
                "no samples provided for splitting".to_string(),
            ));
        }

        let mut shuffled = samples;
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        shuffled.shuffle(&mut rng);

        let val_size = (config.validation_fraction * shuffled.len() as f64).floor() as usize;
        let validation: Vec<ImageSample> = shuffled.drain(..val_size).collect();

        Ok(Self {
            train: shuffled,
            validation,
            config,
        })
    }

    /// Number of training samples
    pub fn train_len(&self) -> usize {
        self.train.len()
    }

    /// Number of validation samples
    pub fn validation_len(&self) -> usize {
        self.validation.len()
    }

    /// Total number of samples across both subsets
    pub fn total(&self) -> usize {
        self.train.len() + self.validation.len()
    }
}

impl std::fmt::Display for TrainValSplit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Train samples: {}, Val samples: {}",
            self.train.len(),
            self.validation.len()
        )
    }
}
