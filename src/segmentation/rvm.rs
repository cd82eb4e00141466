use super::preprocess::Preprocessor;
use super::types::{Mask, MattingPredictor, ObjectId};
use crate::context::{Device, ExecutionContext};
use anyhow::{anyhow, ensure, Context, Result};
use image::RgbImage;
use ndarray::{arr1, Array4, ArrayView2, Axis, Ix4};
use ort::session::builder::{GraphOptimizationLevel, SessionBuilder};
use ort::session::Session;
use ort::value::TensorRef;
use std::path::Path;

/// Alpha produced by one RVM step, already at frame resolution
#[derive(Debug, Clone)]
pub struct RvmProb(Mask);

/// Recurrent hidden states carried between frames
struct Recurrent {
    r1: Array4<f32>,
    r2: Array4<f32>,
    r3: Array4<f32>,
    r4: Array4<f32>,
}

/// RobustVideoMatting predictor
///
/// The recurrent hidden states (r1-r4) act as the predictor memory:
/// `reset_memory` runs the frame from zeroed states and adopts the result,
/// `propagate` runs from and replaces the carried states. RVM has no mask
/// input, so `encode` clears the states and hands the normalized seed back as
/// the first probability.
pub struct RobustVideoMatting {
    session: Session,
    preprocessor: Preprocessor,
    width: u32,
    height: u32,
    state: Option<Recurrent>,

    // Downsample ratio for hidden states
    downsample_ratio: f32,
}

impl RobustVideoMatting {
    /// Create a new RVM predictor from an ONNX file
    ///
    /// # Arguments
    /// * `model_path` - Path to the ONNX model file
    /// * `context` - Device and precision the session is built for
    ///
    /// # Default Configuration
    /// - Input size: 512x512
    /// - Downsample ratio: 0.25 (hidden states are 1/4 of input resolution)
    pub fn new<P: AsRef<Path>>(model_path: P, context: &ExecutionContext) -> Result<Self> {
        let path = model_path.as_ref();

        tracing::info!("Loading RVM model from {} ({})", path.display(), context);

        let builder = Session::builder()
            .map_err(|e| anyhow!("failed to create session builder: {e}"))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| anyhow!("failed to set optimization level: {e}"))?
            .with_intra_threads(4)
            .map_err(|e| anyhow!("failed to set intra threads: {e}"))?;
        let session = with_device(builder, context)?
            .commit_from_file(path)
            .map_err(|e| anyhow!("{e}"))
            .with_context(|| format!("Failed to load model from {}", path.display()))?;

        tracing::info!("RVM model loaded successfully");

        let width = 512;
        let height = 512;

        Ok(Self {
            session,
            preprocessor: Preprocessor::new(width, height),
            width,
            height,
            state: None,
            downsample_ratio: 0.25,
        })
    }

    fn zero_state(&self) -> Recurrent {
        let h = (self.height as f32 * self.downsample_ratio) as usize;
        let w = (self.width as f32 * self.downsample_ratio) as usize;

        tracing::debug!("Initializing hidden states to {}x{}", w, h);

        Recurrent {
            r1: Array4::zeros((1, 16, h, w)),
            r2: Array4::zeros((1, 20, h / 2, w / 2)),
            r3: Array4::zeros((1, 24, h / 4, w / 4)),
            r4: Array4::zeros((1, 28, h / 8, w / 8)),
        }
    }

    /// Run one frame from `state`, returning the alpha and the next state
    fn run(&mut self, frame: &RgbImage, state: &Recurrent) -> Result<(Mask, Recurrent)> {
        let _span = tracing::debug_span!("rvm_step").entered();

        let src = self.preprocessor.preprocess(frame);
        let ratio = arr1(&[self.downsample_ratio]);

        let outputs = self
            .session
            .run(ort::inputs![
                "src" => TensorRef::from_array_view(src.view()).map_err(|e| anyhow!("{e}"))?,
                "r1i" => TensorRef::from_array_view(state.r1.view()).map_err(|e| anyhow!("{e}"))?,
                "r2i" => TensorRef::from_array_view(state.r2.view()).map_err(|e| anyhow!("{e}"))?,
                "r3i" => TensorRef::from_array_view(state.r3.view()).map_err(|e| anyhow!("{e}"))?,
                "r4i" => TensorRef::from_array_view(state.r4.view()).map_err(|e| anyhow!("{e}"))?,
                "downsample_ratio" => TensorRef::from_array_view(ratio.view()).map_err(|e| anyhow!("{e}"))?,
            ])
            .map_err(|e| anyhow!("{e}"))
            .context("Failed to run inference")?;

        let extract = |name: &str| -> Result<Array4<f32>> {
            outputs[name]
                .try_extract_array::<f32>()
                .map_err(|e| anyhow!("output '{name}' is not f32: {e}"))?
                .to_owned()
                .into_dimensionality::<Ix4>()
                .with_context(|| format!("output '{name}' is not 4-dimensional"))
        };

        // pha has shape [1, 1, H, W]
        let pha = extract("pha")?;
        ensure!(pha.shape()[1] == 1, "pha must have a single channel");
        let next = Recurrent {
            r1: extract("r1o")?,
            r2: extract("r2o")?,
            r3: extract("r3o")?,
            r4: extract("r4o")?,
        };
        drop(outputs);

        let matte = pha.index_axis_move(Axis(0), 0).index_axis_move(Axis(0), 0);
        let (frame_width, frame_height) = frame.dimensions();
        let matte = Preprocessor::postprocess_matte(&matte, frame_width, frame_height)?;

        Ok((matte, next))
    }
}

fn with_device(builder: SessionBuilder, context: &ExecutionContext) -> Result<SessionBuilder> {
    match context.device {
        Device::Cpu => {
            if context.is_half() {
                tracing::warn!("Half precision is not available on CPU, running fp32");
            }
            Ok(builder)
        }
        #[cfg(feature = "cuda")]
        Device::Cuda { device_id } => {
            use ort::execution_providers::CUDAExecutionProvider;
            if context.is_half() {
                tracing::warn!("CUDA provider runs the model at its exported precision");
            }
            builder
                .with_execution_providers([CUDAExecutionProvider::default()
                    .with_device_id(device_id)
                    .build()])
                .map_err(|e| anyhow!("failed to register CUDA provider: {e}"))
        }
        #[cfg(feature = "tensorrt")]
        Device::TensorRt { device_id } => {
            use ort::execution_providers::TensorRTExecutionProvider;
            builder
                .with_execution_providers([TensorRTExecutionProvider::default()
                    .with_device_id(device_id)
                    .with_fp16(context.is_half())
                    .build()])
                .map_err(|e| anyhow!("failed to register TensorRT provider: {e}"))
        }
        #[allow(unreachable_patterns)]
        device => Err(anyhow!("{device} support was not compiled in")),
    }
}

impl MattingPredictor for RobustVideoMatting {
    type Prob = RvmProb;

    fn encode(
        &mut self,
        _image: &RgbImage,
        seed: ArrayView2<'_, f32>,
        objects: &[ObjectId],
    ) -> Result<RvmProb> {
        ensure!(
            objects.len() == 1,
            "RVM tracks a single target, got {} objects",
            objects.len()
        );
        tracing::info!("Resetting RVM hidden states");
        self.state = None;

        Ok(RvmProb(seed.mapv(|v| (v / 255.0).clamp(0.0, 1.0))))
    }

    fn reset_memory(&mut self, image: &RgbImage) -> Result<RvmProb> {
        let zero = self.zero_state();
        let (matte, next) = self.run(image, &zero)?;
        self.state = Some(next);
        Ok(RvmProb(matte))
    }

    fn propagate(&mut self, image: &RgbImage) -> Result<RvmProb> {
        let state = match self.state.take() {
            Some(state) => state,
            None => self.zero_state(),
        };
        let (matte, next) = self.run(image, &state)?;
        self.state = Some(next);
        Ok(RvmProb(matte))
    }

    fn to_mask(&self, prob: &RvmProb) -> Result<Mask> {
        Ok(prob.0.clone())
    }
}
