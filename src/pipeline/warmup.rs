use crate::segmentation::{MattingPredictor, TARGET_OBJECTS};
use anyhow::Result;
use image::RgbImage;
use ndarray::ArrayView2;

/// Number of times the first frame is replayed before real inference
pub const DEFAULT_WARMUP: usize = 10;

/// Largest accepted warm-up count
pub const MAX_WARMUP: usize = 10_000;

/// How the predictor is called at one position of the extended sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepMode {
    /// Encode the seed mask, then clear the memory the encode left behind
    Encode,
    /// Run the frame with cleared memory
    Warm,
    /// Normal propagation through the memory
    Live,
}

impl StepMode {
    /// Call `predictor` in this mode and return the output that counts
    ///
    /// For `Encode` that is the output of the memory-reset call that follows
    /// the encode, not of the encode itself.
    pub fn invoke<P: MattingPredictor>(
        self,
        predictor: &mut P,
        image: &RgbImage,
        seed: ArrayView2<'_, f32>,
    ) -> Result<P::Prob> {
        match self {
            StepMode::Encode => {
                predictor.encode(image, seed, &TARGET_OBJECTS)?;
                predictor.reset_memory(image)
            }
            StepMode::Warm => predictor.reset_memory(image),
            StepMode::Live => predictor.propagate(image),
        }
    }
}

/// One position of the extended sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarmupStep {
    /// Index in the extended sequence (`ti`)
    pub position: usize,
    /// Index of the real frame shown at this position
    pub frame_index: usize,
    pub mode: StepMode,
    /// Whether the result belongs in the output
    pub emit: bool,
}

/// Schedules predictor calls over `[frame 0; n_warmup] ++ frames`
///
/// Position 0 encodes, positions `1..=n_warmup` replay with cleared memory,
/// everything after propagates. Output starts at position `n_warmup`, so the
/// last replay of frame 0 is also its first emitted result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarmupSequencer {
    n_warmup: usize,
}

impl Default for WarmupSequencer {
    fn default() -> Self {
        Self::new(DEFAULT_WARMUP)
    }
}

impl WarmupSequencer {
    pub fn new(n_warmup: usize) -> Self {
        Self { n_warmup }
    }

    pub fn n_warmup(&self) -> usize {
        self.n_warmup
    }

    pub fn extended_len(&self, frames: usize) -> usize {
        self.n_warmup.saturating_add(frames)
    }

    pub fn mode(&self, position: usize) -> StepMode {
        if position == 0 {
            StepMode::Encode
        } else if position <= self.n_warmup {
            StepMode::Warm
        } else {
            StepMode::Live
        }
    }

    pub fn emits(&self, position: usize) -> bool {
        position >= self.n_warmup
    }

    pub fn frame_index(&self, position: usize) -> usize {
        position.saturating_sub(self.n_warmup)
    }

    pub fn step(&self, position: usize) -> WarmupStep {
        WarmupStep {
            position,
            frame_index: self.frame_index(position),
            mode: self.mode(position),
            emit: self.emits(position),
        }
    }

    /// Steps over the extended sequence built from `frames` real frames
    ///
    /// Empty when there are no frames: nothing is replayed without a first
    /// frame.
    pub fn steps(&self, frames: usize) -> impl Iterator<Item = WarmupStep> + '_ {
        let len = if frames == 0 {
            0
        } else {
            self.extended_len(frames)
        };
        (0..len).map(move |position| self.step(position))
    }
}
