//! Training Loop
//!
//! Drives the full run: dataset discovery, deterministic split, per-epoch
//! training and validation passes, plateau-based learning-rate reduction,
//! best-model snapshotting, early stopping, and final export.
//!
//! Each epoch runs four stages in order: a training pass over shuffled
//! batches, a validation pass in fixed order on the inference-mode model, a
//! scheduler update on the mean validation loss, and the early-stop check on
//! validation accuracy. The snapshot defaults to the initial model state, so
//! a run whose accuracy never improves still exports a usable artifact.

use std::path::PathBuf;

use burn::data::dataloader::batcher::Batcher;
use burn::data::dataset::Dataset;
use burn::module::AutodiffModule;
use burn::nn::loss::CrossEntropyLossConfig;
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::tensor::backend::{AutodiffBackend, Backend};
use burn::tensor::{ElementConversion, Int, Tensor};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::dataset::{
    FolderImageDataset, ImageBatch, ImageBatcher, ImageFolderDataset, ImageItem, SplitConfig,
    TrainValSplit,
};
use crate::export::ModelArtifact;
use crate::model::{Classifier, ClassifierConfig};
use crate::training::{EarlyStopping, ReduceOnPlateau, TrainConfig};
use crate::utils::error::Result;
use crate::utils::logging::TrainingLogger;
use crate::utils::metrics::PhaseMetrics;

/// Summary of a completed training run
#[derive(Debug, Clone)]
pub struct TrainingReport {
    /// Number of epochs actually run (early stopping may cut this short)
    pub epochs_run: usize,
    /// Best validation accuracy observed, in percent
    pub best_val_accuracy: f64,
    /// Ordered class names the exported head predicts over
    pub classes: Vec<String>,
    /// Path of the exported artifact
    pub artifact_path: PathBuf,
}

/// Count predictions matching the targets
fn count_correct<B: Backend>(logits: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> usize {
    let [batch_size, _] = logits.dims();
    let predictions = logits.argmax(1).reshape([batch_size]);
    predictions
        .equal(targets)
        .int()
        .sum()
        .into_scalar()
        .elem::<i64>() as usize
}

/// Run the full training pipeline and export the best model
pub fn run_training<B: AutodiffBackend>(
    config: &TrainConfig,
    device: &B::Device,
) -> Result<TrainingReport> {
    config.validate()?;

    let dataset = ImageFolderDataset::new(&config.data_dir)?;
    let classes = dataset.classes().to_vec();
    let num_classes = dataset.num_classes();

    let split = TrainValSplit::new(
        dataset.samples.clone(),
        SplitConfig::new(config.validation_fraction, config.seed)?,
    )?;
    info!("{}", split);

    let train_ds = FolderImageDataset::new(&split.train, config.image_size);
    let val_ds = FolderImageDataset::new(&split.validation, config.image_size);
    let batcher = ImageBatcher::new(config.image_size);

    let model_config = ClassifierConfig::new(num_classes);
    let mut model = Classifier::<B>::new(&model_config, device);
    if let Some(path) = &config.backbone_weights {
        info!("Loading pretrained backbone from {:?}", path);
        model = model.load_backbone_file(path, device)?;
    }

    let mut optimizer = AdamConfig::new().init();
    let loss_fn = CrossEntropyLossConfig::new().init::<B>(device);
    let val_loss_fn = CrossEntropyLossConfig::new().init::<B::InnerBackend>(device);

    let mut scheduler = ReduceOnPlateau::for_validation_loss(config.learning_rate);
    let mut early_stop = EarlyStopping::new(config.patience);
    let mut best_model = model.clone();
    let mut logger = TrainingLogger::new(config.epochs);
    let mut shuffle_rng = ChaCha8Rng::seed_from_u64(config.seed);

    let mut epochs_run = 0;
    for epoch in 0..config.epochs {
        logger.start_epoch(epoch);
        epochs_run = epoch + 1;
        let lr = scheduler.lr();

        // Training pass over shuffled batches
        let mut train_metrics = PhaseMetrics::new();
        let mut order: Vec<usize> = (0..train_ds.len()).collect();
        order.shuffle(&mut shuffle_rng);

        for chunk in order.chunks(config.batch_size) {
            // A decode failure aborts the run instead of shrinking the epoch
            let items = chunk
                .iter()
                .map(|&i| train_ds.try_get(i))
                .collect::<Result<Vec<ImageItem>>>()?;
            let batch_size = items.len();
            let batch: ImageBatch<B> = batcher.batch(items, device);

            let logits = model.forward(batch.images);
            let loss = loss_fn.forward(logits.clone(), batch.targets.clone());

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optimizer.step(lr, model, grads);

            let correct = count_correct(logits, batch.targets);
            train_metrics.add_batch(loss.into_scalar().elem::<f64>(), correct, batch_size);
        }
        debug!(
            "Training pass: {} batches, {} samples",
            train_metrics.batches(),
            train_metrics.samples()
        );

        // Validation pass in fixed order, inference mode
        let valid_model = model.valid();
        let mut val_metrics = PhaseMetrics::new();
        for start in (0..val_ds.len()).step_by(config.batch_size) {
            let end = usize::min(start + config.batch_size, val_ds.len());
            let items = (start..end)
                .map(|i| val_ds.try_get(i))
                .collect::<Result<Vec<ImageItem>>>()?;
            let batch_size = items.len();
            let batch: ImageBatch<B::InnerBackend> = batcher.batch(items, device);

            let logits = valid_model.forward(batch.images);
            let loss = val_loss_fn.forward(logits.clone(), batch.targets.clone());

            let correct = count_correct(logits, batch.targets);
            val_metrics.add_batch(loss.into_scalar().elem::<f64>(), correct, batch_size);
        }

        let val_loss = val_metrics.mean_loss();
        let val_acc = val_metrics.accuracy_pct();
        logger.end_epoch(
            train_metrics.mean_loss(),
            train_metrics.accuracy_pct(),
            val_loss,
            val_acc,
            lr,
        );

        // Scheduler watches validation loss, on its own patience
        let old_lr = scheduler.lr();
        let new_lr = scheduler.step(val_loss);
        if new_lr < old_lr {
            logger.log_lr_reduced(old_lr, new_lr);
        }

        // Snapshot only on strict accuracy improvement
        if early_stop.update(val_acc) {
            best_model = model.clone();
            logger.log_new_best(val_acc);
        }

        if early_stop.should_stop() {
            logger.log_early_stop(early_stop.patience());
            break;
        }
    }

    logger.log_complete(epochs_run, early_stop.best_accuracy());

    let artifact = ModelArtifact::from_model(
        &best_model.valid(),
        &model_config,
        classes.clone(),
        config.image_size,
    )?;
    let artifact_path = artifact.write(&config.output_dir)?;

    Ok(TrainingReport {
        epochs_run,
        best_val_accuracy: early_stop.best_accuracy(),
        classes,
        artifact_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::tensor::TensorData;

    type TestBackend = NdArray;

    #[test]
    fn test_count_correct() {
        let device = Default::default();
        // Rows 0 and 2 predict class 1, row 1 predicts class 0
        let logits = Tensor::<TestBackend, 2>::from_floats(
            TensorData::new(vec![0.1f32, 0.9, 0.8, 0.2, 0.3, 0.7], [3, 2]),
            &device,
        );
        let targets = Tensor::<TestBackend, 1, Int>::from_data(
            TensorData::new(vec![1i64, 0, 0], [3]),
            &device,
        );

        assert_eq!(count_correct(logits, targets), 2);
    }

    #[test]
    fn test_count_correct_all_wrong() {
        let device = Default::default();
        let logits = Tensor::<TestBackend, 2>::from_floats(
            TensorData::new(vec![0.9f32, 0.1, 0.9, 0.1], [2, 2]),
            &device,
        );
        let targets = Tensor::<TestBackend, 1, Int>::from_data(
            TensorData::new(vec![1i64, 1], [2]),
            &device,
        );

        assert_eq!(count_correct(logits, targets), 0);
    }
}
