//! Plateau Learning-Rate Scheduler
//!
//! Reduces the learning rate when a monitored metric stops improving. This
//! policy is intentionally independent of epoch-level early stopping: it has
//! its own (smaller) patience and operates on validation loss, while early
//! stopping watches validation accuracy.

use serde::{Deserialize, Serialize};

/// Direction of improvement for the monitored metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlateauMode {
    /// Metric should decrease (e.g., loss)
    Min,
    /// Metric should increase (e.g., accuracy)
    Max,
}

/// Reduce-on-plateau learning rate controller
#[derive(Debug, Clone)]
pub struct ReduceOnPlateau {
    best_metric: f64,
    checks_without_improvement: usize,
    current_lr: f64,
    factor: f64,
    patience: usize,
    min_lr: f64,
    mode: PlateauMode,
}

impl ReduceOnPlateau {
    /// Create a new controller
    pub fn new(initial_lr: f64, factor: f64, patience: usize, min_lr: f64, mode: PlateauMode) -> Self {
        let best_metric = match mode {
            PlateauMode::Min => f64::INFINITY,
            PlateauMode::Max => f64::NEG_INFINITY,
        };

        Self {
            best_metric,
            checks_without_improvement: 0,
            current_lr: initial_lr,
            factor,
            patience,
            min_lr,
            mode,
        }
    }

    /// Standard configuration for validation loss: halve after 2 stale checks
    pub fn for_validation_loss(initial_lr: f64) -> Self {
        Self::new(initial_lr, 0.5, 2, 0.0, PlateauMode::Min)
    }

    /// Feed a new metric value and return the learning rate to use next
    ///
    /// The rate is reduced once the metric has failed to strictly improve for
    /// `patience` consecutive checks; the stale-check counter resets after a
    /// reduction.
    pub fn step(&mut self, metric: f64) -> f64 {
        let improved = match self.mode {
            PlateauMode::Min => metric < self.best_metric,
            PlateauMode::Max => metric > self.best_metric,
        };

        if improved {
            self.best_metric = metric;
            self.checks_without_improvement = 0;
        } else {
            self.checks_without_improvement += 1;

            if self.checks_without_improvement >= self.patience {
                let new_lr = (self.current_lr * self.factor).max(self.min_lr);
                if new_lr < self.current_lr {
                    self.current_lr = new_lr;
                }
                self.checks_without_improvement = 0;
            }
        }

        self.current_lr
    }

    /// Current learning rate
    pub fn lr(&self) -> f64 {
        self.current_lr
    }
}
