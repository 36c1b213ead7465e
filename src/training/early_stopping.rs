//! Early Stopping Policy
//!
//! Tracks the best validation accuracy seen so far and counts consecutive
//! non-improving epochs. Improvement is strict: equaling the best does not
//! reset the counter, so the best-accuracy sequence is monotonically
//! non-decreasing by construction.

/// Epoch-level early stopping on validation accuracy
#[derive(Debug, Clone)]
pub struct EarlyStopping {
    best_accuracy: f64,
    epochs_without_improvement: usize,
    patience: usize,
}

impl EarlyStopping {
    /// Create a policy that stops after `patience` non-improving epochs
    pub fn new(patience: usize) -> Self {
        Self {
            best_accuracy: 0.0,
            epochs_without_improvement: 0,
            patience,
        }
    }

    /// Record an epoch's validation accuracy
    ///
    /// Returns `true` when this is a new best (the caller should snapshot the
    /// model); otherwise the no-improvement counter advances.
    pub fn update(&mut self, val_accuracy: f64) -> bool {
        if val_accuracy > self.best_accuracy {
            self.best_accuracy = val_accuracy;
            self.epochs_without_improvement = 0;
            true
        } else {
            self.epochs_without_improvement += 1;
            false
        }
    }

    /// Whether the patience threshold has been reached
    pub fn should_stop(&self) -> bool {
        self.epochs_without_improvement >= self.patience
    }

    /// Best validation accuracy observed so far
    pub fn best_accuracy(&self) -> f64 {
        self.best_accuracy
    }

    /// Consecutive epochs without improvement
    pub fn stale_epochs(&self) -> usize {
        self.epochs_without_improvement
    }

    /// Configured patience
    pub fn patience(&self) -> usize {
        self.patience
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_improvement_resets_counter() {
        let mut stop = EarlyStopping::new(3);

        assert!(stop.update(50.0));
        assert!(!stop.update(48.0));
        assert!(!stop.update(49.0));
        assert_eq!(stop.stale_epochs(), 2);

        assert!(stop.update(55.0));
        assert_eq!(stop.stale_epochs(), 0);
        assert!(!stop.should_stop());
    }

    #[test]
    fn test_stops_at_patience() {
        let mut stop = EarlyStopping::new(2);

        stop.update(60.0);
        stop.update(59.0);
        assert!(!stop.should_stop());
        stop.update(58.0);
        assert!(stop.should_stop());
    }

    #[test]
    fn test_patience_one_stops_after_first_stale_epoch() {
        // epochs 3, patience 1, accuracy decreasing after epoch 1:
        // training must stop after epoch 2
        let mut stop = EarlyStopping::new(1);

        assert!(stop.update(70.0)); // epoch 1: improvement
        assert!(!stop.update(65.0)); // epoch 2: stale
        assert!(stop.should_stop());
    }

    #[test]
    fn test_equal_accuracy_is_not_improvement() {
        let mut stop = EarlyStopping::new(5);

        assert!(stop.update(80.0));
        assert!(!stop.update(80.0));
        assert_eq!(stop.stale_epochs(), 1);
        assert_eq!(stop.best_accuracy(), 80.0);
    }

    #[test]
    fn test_best_accuracy_monotonic() {
        let mut stop = EarlyStopping::new(10);
        let mut last_best = 0.0;

        for acc in [10.0, 40.0, 30.0, 45.0, 20.0, 45.0] {
            stop.update(acc);
            assert!(stop.best_accuracy() >= last_best);
            last_best = stop.best_accuracy();
        }
        assert_eq!(stop.best_accuracy(), 45.0);
    }

    #[test]
    fn test_zero_accuracy_never_improves() {
        // When accuracy stays at 0.0 the initial best is never beaten,
        // so the snapshot stays at the initial model state.
        let mut stop = EarlyStopping::new(2);

        assert!(!stop.update(0.0));
        assert!(!stop.update(0.0));
        assert!(stop.should_stop());
        assert_eq!(stop.best_accuracy(), 0.0);
    }
}
