//! Seed-mask video matting.
//!
//! A stateful matting predictor is primed on the first frame of a clip, then
//! run over every frame; its masks are composited against a neutral gray
//! background and emitted together with the complementary matte.

pub mod capture;
pub mod config;
pub mod context;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod segmentation;

pub use config::MattingConfig;
pub use context::{Device, ExecutionContext, Precision};
pub use error::{MattingError, MattingResult};
pub use pipeline::{MattingOutput, MattingPipeline};
pub use segmentation::{KernelRange, Mask, MattingPredictor, ObjectId};
