use super::types::Mask;
use anyhow::{ensure, Result};
use image::{imageops, ImageBuffer, Luma, RgbImage};
use ndarray::{Array2, Array4};

/// Preprocessor for converting RGB frames to model input tensors
pub struct Preprocessor {
    target_width: u32,
    target_height: u32,
}

impl Preprocessor {
    pub fn new(target_width: u32, target_height: u32) -> Self {
        Self {
            target_width,
            target_height,
        }
    }

    /// Preprocess an RGB frame into a normalized NCHW tensor
    ///
    /// Steps:
    /// 1. Resize to target dimensions
    /// 2. Convert to float and normalize to [0, 1]
    /// 3. Transpose from HWC to NCHW format
    ///
    /// Returns: Array4<f32> with shape [1, 3, height, width]
    pub fn preprocess(&self, image: &RgbImage) -> Array4<f32> {
        let _span = tracing::debug_span!("preprocess").entered();

        let resized = if image.dimensions() != (self.target_width, self.target_height) {
            imageops::resize(
                image,
                self.target_width,
                self.target_height,
                imageops::FilterType::Lanczos3,
            )
        } else {
            image.clone()
        };

        let (width, height) = resized.dimensions();
        Array4::from_shape_fn((1, 3, height as usize, width as usize), |(_, c, y, x)| {
            resized.get_pixel(x as u32, y as u32)[c] as f32 / 255.0
        })
    }

    /// Resize a model-resolution matte back to the frame resolution
    ///
    /// Values are clamped to [0, 1] after resampling.
    pub fn postprocess_matte(matte: &Mask, target_width: u32, target_height: u32) -> Result<Mask> {
        let _span = tracing::debug_span!("postprocess").entered();

        let (matte_height, matte_width) = matte.dim();
        if (matte_width as u32, matte_height as u32) == (target_width, target_height) {
            return Ok(matte.mapv(|v| v.clamp(0.0, 1.0)));
        }
        ensure!(
            matte_width > 0 && matte_height > 0,
            "model produced an empty matte"
        );

        let gray: ImageBuffer<Luma<f32>, Vec<f32>> =
            ImageBuffer::from_fn(matte_width as u32, matte_height as u32, |x, y| {
                Luma([matte[[y as usize, x as usize]]])
            });
        let resized = imageops::resize(
            &gray,
            target_width,
            target_height,
            imageops::FilterType::Triangle,
        );

        Ok(Array2::from_shape_fn(
            (target_height as usize, target_width as usize),
            |(y, x)| resized.get_pixel(x as u32, y as u32)[0].clamp(0.0, 1.0),
        ))
    }
}
