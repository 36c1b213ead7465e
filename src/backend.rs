//! Backend Selection
//!
//! The compute backend is chosen at compile time: the default `wgpu` feature
//! selects the GPU backend, building with `--no-default-features` falls back
//! to the CPU `ndarray` backend. The active backend is logged at startup so a
//! CPU fallback is never silent.

use burn::backend::Autodiff;

#[cfg(feature = "wgpu")]
pub type DefaultBackend = burn::backend::Wgpu;

#[cfg(not(feature = "wgpu"))]
pub type DefaultBackend = burn::backend::NdArray;

/// Autodiff-wrapped backend used for training
pub type TrainingBackend = Autodiff<DefaultBackend>;

/// Name of the compiled-in backend, for startup logging
pub fn backend_name() -> &'static str {
    if cfg!(feature = "wgpu") {
        "wgpu"
    } else {
        "ndarray"
    }
}

/// Default device for the compiled-in backend
pub fn default_device() -> <DefaultBackend as burn::tensor::backend::Backend>::Device {
    Default::default()
}
