//! Convolutional Classifier
//!
//! The network is split into a reusable feature-extracting [`Backbone`] and a
//! final linear head sized to the detected class count. This mirrors the
//! transfer-learning recipe: backbone weights can be loaded from a previous
//! record while the head is always freshly initialized, and every parameter
//! stays trainable during fine-tuning.

use std::path::Path;

use burn::{
    config::Config,
    module::Module,
    nn::{
        conv::{Conv2d, Conv2dConfig},
        pool::{AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig, MaxPool2d, MaxPool2dConfig},
        BatchNorm, BatchNormConfig, Dropout, DropoutConfig, Linear, LinearConfig, PaddingConfig2d,
        Relu,
    },
    record::CompactRecorder,
    tensor::{backend::Backend, Tensor},
};

use crate::utils::error::ImagefoldError;

/// Width of the feature vector produced by the backbone
pub const FEATURE_DIM: usize = 256;

/// Configuration for the classifier
#[derive(Config, Debug)]
pub struct ClassifierConfig {
    /// Number of output classes (width of the final linear head)
    pub num_classes: usize,

    /// Number of input channels (3 for RGB)
    #[config(default = "3")]
    pub in_channels: usize,

    /// Base number of convolutional filters
    #[config(default = "32")]
    pub base_filters: usize,

    /// Dropout rate applied before the head
    #[config(default = "0.3")]
    pub dropout_rate: f64,
}

/// A CNN block with Conv2d, BatchNorm, ReLU, and MaxPool
#[derive(Module, Debug)]
pub struct ConvBlock<B: Backend> {
    conv: Conv2d<B>,
    bn: BatchNorm<B, 2>,
    relu: Relu,
    pool: MaxPool2d,
}

impl<B: Backend> ConvBlock<B> {
    /// Create a new convolutional block
    pub fn new(in_channels: usize, out_channels: usize, device: &B::Device) -> Self {
        let conv = Conv2dConfig::new([in_channels, out_channels], [3, 3])
            .with_padding(PaddingConfig2d::Same)
            .init(device);
        let bn = BatchNormConfig::new(out_channels).init(device);
        let pool = MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init();

        Self {
            conv,
            bn,
            relu: Relu::new(),
            pool,
        }
    }

    /// Forward pass through the block
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.conv.forward(x);
        let x = self.bn.forward(x);
        let x = self.relu.forward(x);
        self.pool.forward(x)
    }
}

/// Feature-extracting backbone
///
/// Four convolutional blocks with doubling filter counts, global average
/// pooling, and a penultimate linear layer producing a [`FEATURE_DIM`]-wide
/// feature vector. Global pooling makes the backbone input-size agnostic.
#[derive(Module, Debug)]
pub struct Backbone<B: Backend> {
    conv1: ConvBlock<B>,
    conv2: ConvBlock<B>,
    conv3: ConvBlock<B>,
    conv4: ConvBlock<B>,
    global_pool: AdaptiveAvgPool2d,
    fc: Linear<B>,
}

impl<B: Backend> Backbone<B> {
    /// Create a new backbone from configuration
    pub fn new(config: &ClassifierConfig, device: &B::Device) -> Self {
        let base = config.base_filters;

        let conv1 = ConvBlock::new(config.in_channels, base, device);
        let conv2 = ConvBlock::new(base, base * 2, device);
        let conv3 = ConvBlock::new(base * 2, base * 4, device);
        let conv4 = ConvBlock::new(base * 4, base * 8, device);

        let global_pool = AdaptiveAvgPool2dConfig::new([1, 1]).init();
        let fc = LinearConfig::new(base * 8, FEATURE_DIM).init(device);

        Self {
            conv1,
            conv2,
            conv3,
            conv4,
            global_pool,
            fc,
        }
    }

    /// Extract features from a batch of images
    ///
    /// Input shape [batch, channels, height, width], output [batch, FEATURE_DIM].
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 2> {
        let x = self.conv1.forward(x);
        let x = self.conv2.forward(x);
        let x = self.conv3.forward(x);
        let x = self.conv4.forward(x);

        // [B, C, H, W] -> [B, C, 1, 1] -> [B, C]
        let x = self.global_pool.forward(x);
        let [batch_size, channels, _, _] = x.dims();
        let x = x.reshape([batch_size, channels]);

        let x = self.fc.forward(x);
        Relu::new().forward(x)
    }
}

/// Image classifier: backbone features plus a replaceable linear head
#[derive(Module, Debug)]
pub struct Classifier<B: Backend> {
    backbone: Backbone<B>,
    dropout: Dropout,
    head: Linear<B>,
    num_classes: usize,
}

impl<B: Backend> Classifier<B> {
    /// Create a classifier with a freshly initialized backbone and head
    pub fn new(config: &ClassifierConfig, device: &B::Device) -> Self {
        let backbone = Backbone::new(config, device);
        let dropout = DropoutConfig::new(config.dropout_rate).init();
        let head = LinearConfig::new(FEATURE_DIM, config.num_classes).init(device);

        Self {
            backbone,
            dropout,
            head,
            num_classes: config.num_classes,
        }
    }

    /// Replace the backbone weights with a pretrained record
    ///
    /// Only the backbone is loaded; the head keeps its fresh initialization,
    /// which is how the output layer is "replaced" for a new class count.
    /// All parameters remain trainable afterwards.
    pub fn load_backbone_file<P: AsRef<Path>>(
        mut self,
        path: P,
        device: &B::Device,
    ) -> crate::utils::error::Result<Self> {
        let recorder = CompactRecorder::new();
        self.backbone = self
            .backbone
            .load_file(path.as_ref(), &recorder, device)
            .map_err(|e| {
                ImagefoldError::Model(format!(
                    "failed to load backbone weights from {:?}: {:?}",
                    path.as_ref(),
                    e
                ))
            })?;
        Ok(self)
    }

    /// Forward pass producing logits of shape [batch, num_classes]
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 2> {
        let features = self.backbone.forward(x);
        let features = self.dropout.forward(features);
        self.head.forward(features)
    }

    /// Forward pass with softmax for inference
    pub fn forward_softmax(&self, x: Tensor<B, 4>) -> Tensor<B, 2> {
        let logits = self.forward(x);
        burn::tensor::activation::softmax(logits, 1)
    }

    /// Number of output classes
    pub fn num_classes(&self) -> usize {
        self.num_classes
    }
}
