//! Logging Module
//!
//! Structured logging utilities built on the `tracing` crate, plus a small
//! epoch-progress logger for the training loop.

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level to display
    pub level: LogLevel,
    /// Whether to include target (module path)
    pub include_target: bool,
    /// Whether to use ANSI colors
    pub ansi_colors: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            include_target: false,
            ansi_colors: true,
        }
    }
}

impl LogConfig {
    /// Verbose configuration for debugging
    pub fn verbose() -> Self {
        Self {
            level: LogLevel::Debug,
            include_target: true,
            ansi_colors: true,
        }
    }
}

/// Log level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Convert to tracing Level
    pub fn to_tracing_level(&self) -> Level {
        match self {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

/// Initialize logging with the given configuration
///
/// Returns an error message if a global subscriber was already installed.
pub fn init_logging(config: &LogConfig) -> Result<(), String> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.level.to_tracing_level())
        .with_ansi(config.ansi_colors)
        .with_target(config.include_target)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| format!("Failed to initialize logging: {}", e))
}

/// Training progress logger
pub struct TrainingLogger {
    epoch: usize,
    total_epochs: usize,
    epoch_start: std::time::Instant,
    training_start: std::time::Instant,
}

impl TrainingLogger {
    /// Create a new training logger
    pub fn new(total_epochs: usize) -> Self {
        Self {
            epoch: 0,
            total_epochs,
            epoch_start: std::time::Instant::now(),
            training_start: std::time::Instant::now(),
        }
    }

    /// Log start of an epoch
    pub fn start_epoch(&mut self, epoch: usize) {
        self.epoch = epoch;
        self.epoch_start = std::time::Instant::now();
        tracing::info!("Epoch {}/{} started", epoch + 1, self.total_epochs);
    }

    /// Log end of an epoch with metrics
    pub fn end_epoch(
        &self,
        train_loss: f64,
        train_acc: f64,
        val_loss: f64,
        val_acc: f64,
        learning_rate: f64,
    ) {
        let epoch_time = self.epoch_start.elapsed();
        tracing::info!(
            "Epoch {}/{} completed in {:.1}s | Train Loss: {:.4} | Train Acc: {:.2}% | Val Loss: {:.4} | Val Acc: {:.2}% | LR: {:.6}",
            self.epoch + 1,
            self.total_epochs,
            epoch_time.as_secs_f64(),
            train_loss,
            train_acc,
            val_loss,
            val_acc,
            learning_rate
        );
    }

    /// Log a new best model
    pub fn log_new_best(&self, accuracy: f64) {
        tracing::info!("New best model! Val Acc: {:.2}%", accuracy);
    }

    /// Log a learning rate reduction
    pub fn log_lr_reduced(&self, old_lr: f64, new_lr: f64) {
        tracing::info!("Learning rate reduced: {:.6} -> {:.6}", old_lr, new_lr);
    }

    /// Log early stopping
    pub fn log_early_stop(&self, patience: usize) {
        tracing::warn!(
            "Early stopping triggered at epoch {} after {} epochs without improvement",
            self.epoch + 1,
            patience
        );
    }

    /// Log training completion
    pub fn log_complete(&self, epochs_run: usize, best_accuracy: f64) {
        let total_time = self.training_start.elapsed();
        tracing::info!(
            "Training complete! {} epochs in {:.1}s | Best Val Acc: {:.2}%",
            epochs_run,
            total_time.as_secs_f64(),
            best_accuracy
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_config_default() {
        let config = LogConfig::default();
        assert_eq!(config.level, LogLevel::Info);
        assert!(!config.include_target);
    }

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(LogLevel::Debug.to_tracing_level(), Level::DEBUG);
        assert_eq!(LogLevel::Warn.to_tracing_level(), Level::WARN);
    }
}
