mod sequence;

pub use sequence::PngSequence;

use anyhow::Result;
use image::RgbImage;

/// Trait for output destinations
pub trait OutputSink {
    /// Write a frame to the output
    fn write_frame(&mut self, frame: &RgbImage) -> Result<()>;

    /// Number of frames written so far
    fn frames_written(&self) -> usize;

    /// Write every frame in order
    fn write_all(&mut self, frames: &[RgbImage]) -> Result<()> {
        for frame in frames {
            self.write_frame(frame)?;
        }
        Ok(())
    }
}
