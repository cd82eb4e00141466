pub mod compositor;
mod driver;
pub mod warmup;

pub use compositor::{Composited, Compositor, BACKGROUND};
pub use driver::{MattingOutput, MattingPipeline};
pub use warmup::{StepMode, WarmupSequencer, WarmupStep, DEFAULT_WARMUP, MAX_WARMUP};
