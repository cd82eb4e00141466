mod sequence;

pub use sequence::{load_mask, ImageSequence};

use anyhow::Result;
use image::RgbImage;

/// Trait for frame sources
pub trait FrameSource {
    /// Read the next frame, `None` once the source is exhausted
    fn next_frame(&mut self) -> Result<Option<RgbImage>>;

    /// Get the resolution of the frames
    fn resolution(&self) -> (u32, u32);

    /// Drain the source into memory
    fn read_all(&mut self) -> Result<Vec<RgbImage>> {
        let mut frames = Vec::new();
        while let Some(frame) = self.next_frame()? {
            frames.push(frame);
        }
        Ok(frames)
    }
}
