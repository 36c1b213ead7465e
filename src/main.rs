//! Command-line entry point for training and exporting an image classifier.

#![recursion_limit = "256"]

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use tracing::info;

use imagefold::backend::{backend_name, default_device, TrainingBackend};
use imagefold::training::{run_training, TrainConfig};
use imagefold::utils::logging::{init_logging, LogConfig};
use imagefold::IMAGE_SIZE;

/// Train an image classifier on a folder-labeled dataset and export it
#[derive(Parser, Debug)]
#[command(name = "imagefold", version, about)]
struct Args {
    /// Dataset root directory: one subdirectory per class
    #[arg(long)]
    target: PathBuf,

    /// Output directory for the exported model
    #[arg(long)]
    output: PathBuf,

    /// Maximum number of training epochs
    #[arg(long, default_value_t = 10)]
    epochs: usize,

    /// Consecutive non-improving epochs before early stopping
    #[arg(long, default_value_t = 5)]
    patience: usize,

    /// Batch size for training and validation
    #[arg(long, default_value_t = 32)]
    batch_size: usize,

    /// Initial learning rate
    #[arg(long, default_value_t = 0.001)]
    learning_rate: f64,

    /// Seed for the train/validation split and batch shuffling
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Pretrained backbone record to start from
    #[arg(long)]
    weights: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_config = if args.verbose {
        LogConfig::verbose()
    } else {
        LogConfig::default()
    };
    init_logging(&log_config).map_err(anyhow::Error::msg)?;

    println!("{}", "imagefold trainer".bold().cyan());
    info!("Backend: {}", backend_name());

    let mut config = TrainConfig::new(args.target, args.output)
        .with_epochs(args.epochs)
        .with_patience(args.patience)
        .with_batch_size(args.batch_size)
        .with_learning_rate(args.learning_rate)
        .with_seed(args.seed)
        .with_image_size(IMAGE_SIZE);
    if let Some(weights) = args.weights {
        config = config.with_backbone_weights(weights);
    }

    let device = default_device();
    let report =
        run_training::<TrainingBackend>(&config, &device).context("training run failed")?;

    println!();
    println!("{}", "Training summary".bold().green());
    println!("  Epochs run:    {}", report.epochs_run);
    println!("  Best val acc:  {:.2}%", report.best_val_accuracy);
    println!("  Classes:       {}", report.classes.join(", "));
    println!(
        "  Exported to:   {}",
        report.artifact_path.display().to_string().yellow()
    );

    Ok(())
}
