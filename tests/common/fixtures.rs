use anyhow::{bail, Result};
use image::{GrayImage, Luma, Rgb, RgbImage};
use ndarray::{Array2, ArrayView2};
use seedmatte::segmentation::{Mask, MattingPredictor, ObjectId};

/// A predictor call as seen by the scripted predictor
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Encode {
        frame: u8,
        objects: Vec<ObjectId>,
        seed_foreground: usize,
    },
    Reset {
        frame: u8,
    },
    Propagate {
        frame: u8,
    },
}

/// Predictor that replays the encoded seed as its prediction for every frame
///
/// Every call is logged; frames are identified by the red channel of their
/// top-left pixel (see `clip`).
#[derive(Default)]
pub struct ScriptedPredictor {
    pub calls: Vec<Call>,
    memory: Option<Mask>,
    /// Fail on the call with this zero-based index
    pub fail_at: Option<usize>,
    /// Return masks of this shape instead of the seed's
    pub mask_shape: Option<(usize, usize)>,
}

impl ScriptedPredictor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_at(call: usize) -> Self {
        Self {
            fail_at: Some(call),
            ..Self::default()
        }
    }

    pub fn with_mask_shape(height: usize, width: usize) -> Self {
        Self {
            mask_shape: Some((height, width)),
            ..Self::default()
        }
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|&c| pred(c)).count()
    }

    fn record(&mut self, call: Call) -> Result<Mask> {
        if self.fail_at == Some(self.calls.len()) {
            bail!("scripted failure at call {}", self.calls.len());
        }
        self.calls.push(call);
        match &self.memory {
            Some(mask) => Ok(mask.clone()),
            None => bail!("predictor used before encode"),
        }
    }
}

impl MattingPredictor for ScriptedPredictor {
    type Prob = Mask;

    fn encode(
        &mut self,
        image: &RgbImage,
        seed: ArrayView2<'_, f32>,
        objects: &[ObjectId],
    ) -> Result<Mask> {
        self.memory = Some(seed.mapv(|v| v / 255.0));
        self.record(Call::Encode {
            frame: frame_id(image),
            objects: objects.to_vec(),
            seed_foreground: seed.iter().filter(|&&v| v != 0.0).count(),
        })
    }

    fn reset_memory(&mut self, image: &RgbImage) -> Result<Mask> {
        self.record(Call::Reset {
            frame: frame_id(image),
        })
    }

    fn propagate(&mut self, image: &RgbImage) -> Result<Mask> {
        self.record(Call::Propagate {
            frame: frame_id(image),
        })
    }

    fn to_mask(&self, prob: &Mask) -> Result<Mask> {
        Ok(match self.mask_shape {
            Some(shape) => Array2::zeros(shape),
            None => prob.clone(),
        })
    }
}

pub fn frame_id(image: &RgbImage) -> u8 {
    image.get_pixel(0, 0)[0]
}

/// `count` frames whose top-left red value is the frame index
pub fn clip(count: usize, width: u32, height: u32) -> Vec<RgbImage> {
    (0..count)
        .map(|i| {
            RgbImage::from_fn(width, height, |x, y| {
                if (x, y) == (0, 0) {
                    Rgb([i as u8, 0, 0])
                } else {
                    Rgb([(x * 29 % 256) as u8, (y * 41 % 256) as u8, 200])
                }
            })
        })
        .collect()
}

pub fn uniform_mask(width: u32, height: u32, value: u8) -> GrayImage {
    GrayImage::from_pixel(width, height, Luma([value]))
}

/// Square of foreground in the middle of an otherwise empty mask
pub fn centered_square(width: u32, height: u32, half: u32) -> GrayImage {
    let (cx, cy) = (width / 2, height / 2);
    GrayImage::from_fn(width, height, |x, y| {
        if x.abs_diff(cx) <= half && y.abs_diff(cy) <= half {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}
