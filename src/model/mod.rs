//! Model module: the convolutional backbone and its replaceable classifier head.

pub mod cnn;

pub use cnn::{Backbone, Classifier, ClassifierConfig, ConvBlock, FEATURE_DIM};
