use crate::error::{MattingError, MattingResult};
use crate::segmentation::{Mask, MattingPredictor};
use image::{Rgb, RgbImage};

/// Neutral gray the foreground is composited over
pub const BACKGROUND: [u8; 3] = [127, 127, 127];

/// Result of compositing one predictor output
pub struct Composited {
    /// Predictor mask in [0, 1], the next current mask
    pub mask: Mask,
    pub composite: RgbImage,
    /// Complement of alpha, replicated over three channels
    pub matte: RgbImage,
}

/// Turns predictor outputs into composites and mattes
#[derive(Debug, Clone, Copy)]
pub struct Compositor {
    background: [f32; 3],
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new(BACKGROUND)
    }
}

impl Compositor {
    pub fn new(background: [u8; 3]) -> Self {
        Self {
            background: background.map(|c| c as f32 / 255.0),
        }
    }

    /// Convert `prob` through the predictor and composite it over `frame`
    pub fn composite_output<P: MattingPredictor>(
        &self,
        predictor: &P,
        prob: &P::Prob,
        frame: &RgbImage,
    ) -> MattingResult<Composited> {
        let mask = predictor.to_mask(prob)?;
        self.composite(frame, mask)
    }

    /// Blend `frame` against the background using `mask` as alpha
    ///
    /// `composite = frame * alpha + background * (1 - alpha)` and
    /// `matte = (1 - alpha) * 255`. The composite is rounded to the nearest
    /// integer, the matte is truncated.
    pub fn composite(&self, frame: &RgbImage, mask: Mask) -> MattingResult<Composited> {
        let _span = tracing::debug_span!("composite").entered();

        let (width, height) = frame.dimensions();
        if mask.dim() != (height as usize, width as usize) {
            return Err(MattingError::contract(format!(
                "predictor mask is {}x{}, frame is {}x{}",
                mask.dim().1,
                mask.dim().0,
                width,
                height
            )));
        }

        let mut composite = RgbImage::new(width, height);
        let mut matte = RgbImage::new(width, height);
        for (x, y, pixel) in frame.enumerate_pixels() {
            let alpha = mask[[y as usize, x as usize]];
            let inv = 1.0 - alpha;

            let blended: [u8; 3] = std::array::from_fn(|c| {
                let fg = pixel[c] as f32 / 255.0;
                to_u8((fg * alpha + self.background[c] * inv) * 255.0)
            });
            composite.put_pixel(x, y, Rgb(blended));

            let m = (inv * 255.0) as u8;
            matte.put_pixel(x, y, Rgb([m, m, m]));
        }

        Ok(Composited {
            mask,
            composite,
            matte,
        })
    }
}

// `as` saturates out-of-range floats and maps NaN to 0
fn to_u8(v: f32) -> u8 {
    v.round() as u8
}
