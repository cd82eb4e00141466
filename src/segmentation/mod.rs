pub mod morphology;
#[cfg(feature = "onnx")]
mod preprocess;
#[cfg(feature = "onnx")]
mod rvm;
pub mod types;

pub use morphology::{KernelRange, MaskMorphology};
#[cfg(feature = "onnx")]
pub use preprocess::Preprocessor;
#[cfg(feature = "onnx")]
pub use rvm::{RobustVideoMatting, RvmProb};
pub use types::{Mask, MattingPredictor, ObjectId, TARGET_OBJECTS};

#[cfg(feature = "onnx")]
use crate::context::ExecutionContext;
#[cfg(feature = "onnx")]
use anyhow::Result;

/// Create the default ONNX predictor (RVM) for `context`
#[cfg(feature = "onnx")]
pub fn create_default_model(model_path: &str, context: &ExecutionContext) -> Result<RobustVideoMatting> {
    RobustVideoMatting::new(model_path, context)
}
