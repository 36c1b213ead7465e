//! Model Export
//!
//! Serializes the best model snapshot into a single portable artifact,
//! `model.ai`, written into the caller-specified output directory. The
//! artifact declares the inference graph's interface: an `input` tensor of
//! shape (batch, 3, H, W) and an `output` tensor of shape
//! (batch, num_classes), both with a dynamic batch dimension, plus a fixed
//! graph-version marker for downstream-tool compatibility. The weight payload
//! itself is produced by Burn's binary recorder.

use std::fs;
use std::path::{Path, PathBuf};

use burn::module::Module;
use burn::record::{BinBytesRecorder, FullPrecisionSettings, Recorder};
use burn::tensor::backend::Backend;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::model::{Classifier, ClassifierConfig};
use crate::utils::error::{ImagefoldError, Result};

/// Fixed artifact filename inside the output directory
pub const MODEL_FILE_NAME: &str = "model.ai";

/// Artifact format identifier
pub const ARTIFACT_FORMAT: &str = "imagefold.model";

/// Fixed graph version marker declared by every exported artifact
pub const GRAPH_VERSION: u32 = 13;

/// Declared shape of one graph tensor; `None` marks a dynamic dimension
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TensorSpec {
    /// Tensor name as declared in the graph
    pub name: String,
    /// Dimensions, outermost first; `None` is dynamic
    pub shape: Vec<Option<usize>>,
}

impl TensorSpec {
    /// Input spec: (batch=dynamic, 3, size, size), named `input`
    pub fn image_input(image_size: usize) -> Self {
        Self {
            name: "input".to_string(),
            shape: vec![None, Some(3), Some(image_size), Some(image_size)],
        }
    }

    /// Output spec: (batch=dynamic, num_classes), named `output`
    pub fn class_output(num_classes: usize) -> Self {
        Self {
            name: "output".to_string(),
            shape: vec![None, Some(num_classes)],
        }
    }
}

/// The exported inference artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Format identifier ([`ARTIFACT_FORMAT`])
    pub format: String,
    /// Graph version marker ([`GRAPH_VERSION`])
    pub graph_version: u32,
    /// Declared input tensor
    pub input: TensorSpec,
    /// Declared output tensor
    pub output: TensorSpec,
    /// Ordered class names; index position is the output logit index
    pub classes: Vec<String>,
    /// Model configuration needed to rebuild the graph
    pub model: ClassifierConfig,
    /// Full weight snapshot as Burn binary record bytes
    pub weights: Vec<u8>,
}

impl ModelArtifact {
    /// Build an artifact from a trained model
    pub fn from_model<B: Backend>(
        model: &Classifier<B>,
        config: &ClassifierConfig,
        classes: Vec<String>,
        image_size: usize,
    ) -> Result<Self> {
        let recorder = BinBytesRecorder::<FullPrecisionSettings>::default();
        let weights = recorder
            .record(model.clone().into_record(), ())
            .map_err(|e| ImagefoldError::Export(format!("failed to record weights: {:?}", e)))?;

        Ok(Self {
            format: ARTIFACT_FORMAT.to_string(),
            graph_version: GRAPH_VERSION,
            input: TensorSpec::image_input(image_size),
            output: TensorSpec::class_output(classes.len()),
            classes,
            model: config.clone(),
            weights,
        })
    }

    /// Write the artifact as `model.ai` into `output_dir`, creating the
    /// directory if absent. Returns the full artifact path.
    pub fn write(&self, output_dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(output_dir)?;
        let path = output_dir.join(MODEL_FILE_NAME);

        let json = serde_json::to_string(self)
            .map_err(|e| ImagefoldError::Serialization(e.to_string()))?;
        fs::write(&path, json)?;

        info!("Model exported to {:?}", path);
        Ok(path)
    }

    /// Read an artifact back from disk
    pub fn read(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let artifact: Self = serde_json::from_str(&json)
            .map_err(|e| ImagefoldError::Serialization(e.to_string()))?;

        if artifact.format != ARTIFACT_FORMAT {
            return Err(ImagefoldError::Export(format!(
                "unexpected artifact format '{}'",
                artifact.format
            )));
        }
        Ok(artifact)
    }

    /// Rebuild the model and load the recorded weight snapshot
    pub fn load_model<B: Backend>(&self, device: &B::Device) -> Result<Classifier<B>> {
        let model = Classifier::<B>::new(&self.model, device);
        let recorder = BinBytesRecorder::<FullPrecisionSettings>::default();
        let record = recorder
            .load(self.weights.clone(), device)
            .map_err(|e| ImagefoldError::Export(format!("failed to load weights: {:?}", e)))?;
        Ok(model.load_record(record))
    }

    /// Number of classes declared by the artifact
    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::tensor::Tensor;
    use tempfile::TempDir;

    type TestBackend = NdArray;

    fn tiny_model() -> (Classifier<TestBackend>, ClassifierConfig) {
        let device = Default::default();
        let config = ClassifierConfig::new(2).with_base_filters(4);
        (Classifier::new(&config, &device), config)
    }

    #[test]
    fn test_tensor_specs_declare_dynamic_batch() {
        let input = TensorSpec::image_input(224);
        assert_eq!(input.name, "input");
        assert_eq!(input.shape, vec![None, Some(3), Some(224), Some(224)]);

        let output = TensorSpec::class_output(2);
        assert_eq!(output.name, "output");
        assert_eq!(output.shape, vec![None, Some(2)]);
    }

    #[test]
    fn test_write_creates_model_ai() {
        let (model, config) = tiny_model();
        let classes = vec!["mal".to_string(), "safe".to_string()];
        let artifact =
            ModelArtifact::from_model(&model, &config, classes, 224).unwrap();

        let dir = TempDir::new().unwrap();
        let out_dir = dir.path().join("nested").join("output");
        let path = artifact.write(&out_dir).unwrap();

        assert_eq!(path.file_name().unwrap(), "model.ai");
        assert!(path.exists());
    }

    #[test]
    fn test_round_trip_preserves_declarations() {
        let (model, config) = tiny_model();
        let classes = vec!["mal".to_string(), "safe".to_string()];
        let artifact =
            ModelArtifact::from_model(&model, &config, classes.clone(), 224).unwrap();

        let dir = TempDir::new().unwrap();
        let path = artifact.write(dir.path()).unwrap();

        let loaded = ModelArtifact::read(&path).unwrap();
        assert_eq!(loaded.graph_version, GRAPH_VERSION);
        assert_eq!(loaded.classes, classes);
        assert_eq!(loaded.num_classes(), 2);
        assert_eq!(loaded.input.shape[0], None);
        assert_eq!(loaded.output.shape, vec![None, Some(2)]);
    }

    #[test]
    fn test_loaded_model_matches_original() {
        let (model, config) = tiny_model();
        let classes = vec!["a".to_string(), "b".to_string()];
        let artifact = ModelArtifact::from_model(&model, &config, classes, 16).unwrap();

        let device = Default::default();
        let restored: Classifier<TestBackend> = artifact.load_model(&device).unwrap();

        let input = Tensor::<TestBackend, 4>::ones([1, 3, 16, 16], &device);
        let original: Vec<f32> = model.forward(input.clone()).into_data().to_vec().unwrap();
        let reloaded: Vec<f32> = restored.forward(input).into_data().to_vec().unwrap();

        for (a, b) in original.iter().zip(reloaded.iter()) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_read_rejects_foreign_format() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model.ai");
        std::fs::write(&path, "{\"format\":\"something.else\"}").unwrap();

        assert!(ModelArtifact::read(&path).is_err());
    }
}
