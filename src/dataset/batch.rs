//! Preprocessing and Batching
//!
//! Implements Burn's `Dataset` and `Batcher` traits for folder-labeled image
//! data. Every sample, training and validation alike, goes through the same
//! fixed pipeline: force 3-channel RGB, resize to the target size, scale to
//! [0, 1] CHW floats, then normalize per channel with the ImageNet statistics
//! at batch time.

use std::path::{Path, PathBuf};

use burn::data::dataloader::batcher::Batcher;
use burn::data::dataset::Dataset;
use burn::prelude::*;
use image::imageops::FilterType;
use image::ImageReader;

use crate::dataset::loader::ImageSample;
use crate::utils::error::{ImagefoldError, Result};

/// Per-channel ImageNet mean used for input normalization
pub const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];

/// Per-channel ImageNet standard deviation used for input normalization
pub const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// A single preprocessed image ready for batching
#[derive(Clone, Debug)]
pub struct ImageItem {
    /// Image data as flattened CHW float array [3 * H * W], scaled to [0, 1]
    pub image: Vec<f32>,
    /// Class label
    pub label: usize,
}

impl ImageItem {
    /// Load and preprocess an image from disk
    ///
    /// Grayscale and paletted inputs are promoted to 3-channel RGB before
    /// resizing, so single-channel datasets are usable without special cases.
    pub fn from_path(path: &Path, label: usize, image_size: usize) -> Result<Self> {
        let img = ImageReader::open(path)
            .map_err(|e| ImagefoldError::ImageLoad(path.to_path_buf(), e.to_string()))?
            .decode()
            .map_err(|e| ImagefoldError::ImageLoad(path.to_path_buf(), e.to_string()))?
            .resize_exact(image_size as u32, image_size as u32, FilterType::Triangle)
            .to_rgb8();

        let (width, height) = (image_size, image_size);
        let mut image = vec![0.0f32; 3 * height * width];

        // CHW layout, scaled to [0, 1]
        for y in 0..height {
            for x in 0..width {
                let pixel = img.get_pixel(x as u32, y as u32);
                image[y * width + x] = pixel[0] as f32 / 255.0;
                image[height * width + y * width + x] = pixel[1] as f32 / 255.0;
                image[2 * height * width + y * width + x] = pixel[2] as f32 / 255.0;
            }
        }

        Ok(Self { image, label })
    }

    /// Create from pre-loaded CHW data
    pub fn from_data(image: Vec<f32>, label: usize) -> Self {
        Self { image, label }
    }
}

/// Burn dataset over (path, label) samples with lazy on-demand loading
#[derive(Debug, Clone)]
pub struct FolderImageDataset {
    samples: Vec<(PathBuf, usize)>,
    image_size: usize,
}

impl FolderImageDataset {
    /// Create a dataset from discovered samples
    pub fn new(samples: &[ImageSample], image_size: usize) -> Self {
        Self {
            samples: samples.iter().map(|s| (s.path.clone(), s.label)).collect(),
            image_size,
        }
    }

    /// Target image size (square)
    pub fn image_size(&self) -> usize {
        self.image_size
    }

    /// Load the item at `index`, propagating decode failures
    ///
    /// The training loop uses this instead of [`Dataset::get`] so that a
    /// corrupt or unreadable image aborts the run rather than silently
    /// shrinking the sample counts.
    pub fn try_get(&self, index: usize) -> Result<ImageItem> {
        let (path, label) = self.samples.get(index).ok_or_else(|| {
            ImagefoldError::Dataset(format!("sample index {} out of range", index))
        })?;
        ImageItem::from_path(path, *label, self.image_size)
    }
}

impl Dataset<ImageItem> for FolderImageDataset {
    fn get(&self, index: usize) -> Option<ImageItem> {
        self.try_get(index).ok()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

/// A batch of images and labels
#[derive(Clone, Debug)]
pub struct ImageBatch<B: Backend> {
    /// Images with shape [batch_size, 3, height, width], ImageNet-normalized
    pub images: Tensor<B, 4>,
    /// Labels with shape [batch_size]
    pub targets: Tensor<B, 1, Int>,
}

/// Batcher that stacks items and applies ImageNet normalization
#[derive(Clone, Debug)]
pub struct ImageBatcher {
    image_size: usize,
}

impl ImageBatcher {
    /// Create a batcher for the given image size
    pub fn new(image_size: usize) -> Self {
        Self { image_size }
    }
}

impl<B: Backend> Batcher<B, ImageItem, ImageBatch<B>> for ImageBatcher {
    fn batch(&self, items: Vec<ImageItem>, device: &B::Device) -> ImageBatch<B> {
        let batch_size = items.len();
        let channels = 3;
        let height = self.image_size;
        let width = self.image_size;

        let images_data: Vec<f32> = items.iter().flat_map(|item| item.image.clone()).collect();

        let images = Tensor::<B, 4>::from_floats(
            TensorData::new(images_data, [batch_size, channels, height, width]),
            device,
        );

        // Normalize per channel: (x - mean) / std
        let mean = Tensor::<B, 4>::from_floats(
            TensorData::new(IMAGENET_MEAN.to_vec(), [1, 3, 1, 1]),
            device,
        );
        let std = Tensor::<B, 4>::from_floats(
            TensorData::new(IMAGENET_STD.to_vec(), [1, 3, 1, 1]),
            device,
        );
        let images = (images - mean) / std;

        let targets_data: Vec<i64> = items.iter().map(|item| item.label as i64).collect();
        let targets =
            Tensor::<B, 1, Int>::from_data(TensorData::new(targets_data, [batch_size]), device);

        ImageBatch { images, targets }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use image::{Luma, Rgb};
    use tempfile::TempDir;

    type TestBackend = NdArray;

    #[test]
    fn test_item_from_rgb_image() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("red.png");
        image::RgbImage::from_pixel(16, 16, Rgb([255, 0, 0]))
            .save(&path)
            .unwrap();

        let item = ImageItem::from_path(&path, 1, 8).unwrap();
        assert_eq!(item.image.len(), 3 * 8 * 8);
        assert_eq!(item.label, 1);

        // Red channel saturated, green and blue empty
        assert!((item.image[0] - 1.0).abs() < 1e-6);
        assert!(item.image[8 * 8].abs() < 1e-6);
        assert!(item.image[2 * 8 * 8].abs() < 1e-6);
    }

    #[test]
    fn test_grayscale_promoted_to_three_channels() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gray.png");
        image::GrayImage::from_pixel(16, 16, Luma([128]))
            .save(&path)
            .unwrap();

        let item = ImageItem::from_path(&path, 0, 8).unwrap();
        assert_eq!(item.image.len(), 3 * 8 * 8);

        // All three channels carry the same value
        let r = item.image[0];
        let g = item.image[8 * 8];
        let b = item.image[2 * 8 * 8];
        assert!((r - g).abs() < 1e-6);
        assert!((g - b).abs() < 1e-6);
    }

    #[test]
    fn test_missing_image_fails() {
        let err = ImageItem::from_path(Path::new("/no/such/image.png"), 0, 8).unwrap_err();
        assert!(matches!(err, ImagefoldError::ImageLoad(_, _)));
    }

    #[test]
    fn test_batch_shape_and_targets() {
        let size = 4usize;
        let items = vec![
            ImageItem::from_data(vec![0.5; 3 * size * size], 0),
            ImageItem::from_data(vec![0.5; 3 * size * size], 1),
            ImageItem::from_data(vec![0.5; 3 * size * size], 1),
        ];

        let batcher = ImageBatcher::new(size);
        let device = Default::default();
        let batch: ImageBatch<TestBackend> = batcher.batch(items, &device);

        assert_eq!(batch.images.dims(), [3, 3, size, size]);
        assert_eq!(batch.targets.dims(), [3]);
    }

    #[test]
    fn test_batch_applies_imagenet_normalization() {
        let size = 2usize;
        // Channel-constant input 0.5 everywhere
        let items = vec![ImageItem::from_data(vec![0.5; 3 * size * size], 0)];

        let batcher = ImageBatcher::new(size);
        let device = Default::default();
        let batch: ImageBatch<TestBackend> = batcher.batch(items, &device);

        let values: Vec<f32> = batch.images.into_data().to_vec().unwrap();
        for c in 0..3 {
            let expected = (0.5 - IMAGENET_MEAN[c]) / IMAGENET_STD[c];
            for i in 0..size * size {
                assert!((values[c * size * size + i] - expected).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn test_try_get_propagates_decode_failure() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not a png").unwrap();

        let samples = vec![ImageSample {
            path,
            label: 0,
            class_name: "broken".to_string(),
        }];
        let dataset = FolderImageDataset::new(&samples, 8);

        let err = dataset.try_get(0).unwrap_err();
        assert!(matches!(err, ImagefoldError::ImageLoad(_, _)));
        // The trait impl still degrades to None
        assert!(dataset.get(0).is_none());

        let err = dataset.try_get(1).unwrap_err();
        assert!(matches!(err, ImagefoldError::Dataset(_)));
    }

    #[test]
    fn test_dataset_lazy_loading() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("img.png");
        image::RgbImage::from_pixel(8, 8, Rgb([10, 20, 30]))
            .save(&path)
            .unwrap();

        let samples = vec![ImageSample {
            path,
            label: 3,
            class_name: "three".to_string(),
        }];
        let dataset = FolderImageDataset::new(&samples, 8);

        assert_eq!(dataset.len(), 1);
        let item = dataset.get(0).unwrap();
        assert_eq!(item.label, 3);
        assert!(dataset.get(1).is_none());
    }
}
