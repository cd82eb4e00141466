use super::compositor::Compositor;
use super::warmup::WarmupSequencer;
use crate::config::{check_warmup, MattingConfig};
use crate::context::ExecutionContext;
use crate::error::{MattingError, MattingResult};
use crate::segmentation::{Mask, MaskMorphology, MattingPredictor};
use image::{GrayImage, RgbImage};
use std::time::{Duration, Instant};

/// Composites and mattes for the real frames of one run
#[derive(Debug, Clone, Default)]
pub struct MattingOutput {
    pub composites: Vec<RgbImage>,
    pub mattes: Vec<RgbImage>,
}

impl MattingOutput {
    pub fn len(&self) -> usize {
        self.composites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.composites.is_empty()
    }
}

/// Mutable state of a single run
struct RunState {
    /// Fed to the predictor on encode, replaced by every predictor output
    current_mask: Mask,
    output: MattingOutput,
    step_time: Duration,
    composite_time: Duration,
}

/// Drives a matting predictor over a clip from a single seed mask
pub struct MattingPipeline {
    context: ExecutionContext,
    sequencer: WarmupSequencer,
    morphology: MaskMorphology,
    compositor: Compositor,
}

impl MattingPipeline {
    pub fn new(config: MattingConfig, context: ExecutionContext) -> Self {
        Self {
            context,
            sequencer: WarmupSequencer::new(config.n_warmup),
            morphology: MaskMorphology::new(config.dilate, config.erode, config.seed),
            compositor: Compositor::default(),
        }
    }

    pub fn with_compositor(mut self, compositor: Compositor) -> Self {
        self.compositor = compositor;
        self
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    pub fn sequencer(&self) -> &WarmupSequencer {
        &self.sequencer
    }

    /// Matte `frames` starting from `seed`, the mask of the first frame
    ///
    /// Inputs are validated before the predictor is touched. Any predictor
    /// error aborts the run and nothing is returned for it.
    pub fn run<P: MattingPredictor>(
        &mut self,
        predictor: &mut P,
        frames: &[RgbImage],
        seed: &GrayImage,
    ) -> MattingResult<MattingOutput> {
        check_warmup(self.sequencer.n_warmup())?;
        validate_inputs(frames, seed)?;

        tracing::info!(
            "Matting {} frames with {} warm-up steps on {}",
            frames.len(),
            self.sequencer.n_warmup(),
            self.context
        );

        let mut state = RunState {
            current_mask: self.morphology.apply(seed),
            output: MattingOutput {
                composites: Vec::with_capacity(frames.len()),
                mattes: Vec::with_capacity(frames.len()),
            },
            step_time: Duration::ZERO,
            composite_time: Duration::ZERO,
        };

        for step in self.sequencer.steps(frames.len()) {
            let frame = &frames[step.frame_index];

            let step_start = Instant::now();
            let prob = {
                let _span = tracing::debug_span!(
                    "predictor_step",
                    position = step.position,
                    mode = ?step.mode
                )
                .entered();
                step.mode
                    .invoke(predictor, frame, state.current_mask.view())?
            };
            state.step_time += step_start.elapsed();

            let composite_start = Instant::now();
            let composited = self.compositor.composite_output(&*predictor, &prob, frame)?;
            state.composite_time += composite_start.elapsed();

            state.current_mask = composited.mask;

            if step.emit {
                state.output.composites.push(composited.composite);
                state.output.mattes.push(composited.matte);

                let emitted = state.output.len();
                if emitted % 30 == 0 {
                    log_progress(&state, step.position + 1, emitted, frames.len());
                }
            }
        }

        tracing::info!(
            "Matting finished: {} frames emitted, {} warm-up steps discarded",
            state.output.len(),
            self.sequencer.n_warmup()
        );

        Ok(state.output)
    }
}

fn log_progress(state: &RunState, steps: usize, emitted: usize, total: usize) {
    let avg_step_ms = state.step_time.as_secs_f64() * 1000.0 / steps as f64;
    let avg_composite_ms = state.composite_time.as_secs_f64() * 1000.0 / steps as f64;
    tracing::info!(
        "Frame {}/{}: step={:.1}ms, composite={:.1}ms",
        emitted,
        total,
        avg_step_ms,
        avg_composite_ms
    );
}

fn validate_inputs(frames: &[RgbImage], seed: &GrayImage) -> MattingResult<()> {
    let first = frames
        .first()
        .ok_or_else(|| MattingError::invalid_input("no frames to process"))?;

    let (width, height) = first.dimensions();
    if width == 0 || height == 0 {
        return Err(MattingError::invalid_input("frames have zero area"));
    }

    if let Some((index, frame)) = frames
        .iter()
        .enumerate()
        .find(|(_, frame)| frame.dimensions() != (width, height))
    {
        let (w, h) = frame.dimensions();
        return Err(MattingError::invalid_input(format!(
            "frame {index} is {w}x{h}, expected {width}x{height}"
        )));
    }

    if seed.dimensions() != (width, height) {
        let (w, h) = seed.dimensions();
        return Err(MattingError::invalid_input(format!(
            "seed mask is {w}x{h}, frames are {width}x{height}"
        )));
    }

    Ok(())
}
