//! Metrics Module
//!
//! Running loss/accuracy accumulators for the training and validation phases.
//! Reset at the start of every epoch; loss is reported as the mean per-batch
//! loss, accuracy as 100 x correct / total.

/// Running accumulator for a single phase (training or validation) of an epoch
#[derive(Debug, Clone, Default)]
pub struct PhaseMetrics {
    total_loss: f64,
    batches: usize,
    correct: usize,
    samples: usize,
}

impl PhaseMetrics {
    /// Create a fresh accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one batch: its loss, correct-prediction count, and size
    pub fn add_batch(&mut self, loss: f64, correct: usize, batch_size: usize) {
        self.total_loss += loss;
        self.batches += 1;
        self.correct += correct;
        self.samples += batch_size;
    }

    /// Mean per-batch loss over the phase
    pub fn mean_loss(&self) -> f64 {
        if self.batches == 0 {
            0.0
        } else {
            self.total_loss / self.batches as f64
        }
    }

    /// Accuracy as a percentage (100 x correct / total)
    pub fn accuracy_pct(&self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            100.0 * self.correct as f64 / self.samples as f64
        }
    }

    /// Number of samples seen this phase
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Number of batches seen this phase
    pub fn batches(&self) -> usize {
        self.batches
    }
}
