use anyhow::Result;
use image::RgbImage;
use ndarray::{Array2, ArrayView2};

/// Identifier of a tracked target. Only a single target is ever tracked.
pub type ObjectId = u32;

/// The one target label handed to the predictor on encode.
pub const TARGET_OBJECTS: [ObjectId; 1] = [1];

/// Per-pixel mask, row-major `[height, width]`.
///
/// Seed masks hold values in `[0, 255]`; masks returned by a predictor are
/// normalized to `[0, 1]`.
pub type Mask = Array2<f32>;

/// Trait for stateful, memory-augmented matting predictors
///
/// Each call pushes one frame through the model. The three call modes differ
/// only in how they treat the predictor's internal memory:
///
/// - `encode` binds the seed mask to the target objects
/// - `reset_memory` runs the frame as if it were the first one, discarding
///   anything accumulated so far
/// - `propagate` consults and extends the memory
///
/// Implementors are not re-entrant: one instance serves one clip at a time.
pub trait MattingPredictor {
    /// Raw per-frame output (probabilities, logits, ...).
    type Prob;

    /// Encode the seed mask for `objects` on `image`
    fn encode(
        &mut self,
        image: &RgbImage,
        seed: ArrayView2<'_, f32>,
        objects: &[ObjectId],
    ) -> Result<Self::Prob>;

    /// Process `image` after clearing past memory
    fn reset_memory(&mut self, image: &RgbImage) -> Result<Self::Prob>;

    /// Process `image` using and updating the memory
    fn propagate(&mut self, image: &RgbImage) -> Result<Self::Prob>;

    /// Convert a raw output to a single-channel mask in `[0, 1]`
    fn to_mask(&self, prob: &Self::Prob) -> Result<Mask>;
}
