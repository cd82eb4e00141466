use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use seedmatte::capture::{self, FrameSource, ImageSequence};
use seedmatte::output::{OutputSink, PngSequence};
use seedmatte::segmentation;
use seedmatte::{Device, ExecutionContext, MattingConfig, MattingPipeline, Precision};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DeviceArg {
    Cpu,
    Cuda,
    Tensorrt,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory of input frames, processed in file-name order
    #[arg(short, long)]
    frames: PathBuf,

    /// Seed mask for the first frame (grayscale, 255 = foreground)
    ///
    /// The bundled RVM model takes no mask input: the seed only primes the
    /// first warm-up step and does not steer the emitted frames.
    #[arg(short, long)]
    mask: PathBuf,

    /// Path to the matting model (ONNX file)
    #[arg(long)]
    model: String,

    /// Output directory for composites
    #[arg(long, default_value = "out/composites")]
    composites: PathBuf,

    /// Output directory for mattes
    #[arg(long, default_value = "out/mattes")]
    mattes: PathBuf,

    /// Times the first frame is replayed to warm up the model
    #[arg(long, default_value_t = 10)]
    n_warmup: usize,

    /// Erosion kernel size applied to the seed mask (0 disables)
    #[arg(long, default_value_t = 0)]
    r_erode: u32,

    /// Dilation kernel size applied to the seed mask (0 disables)
    #[arg(long, default_value_t = 0)]
    r_dilate: u32,

    /// Seed for kernel-size sampling
    #[arg(long)]
    seed: Option<u64>,

    /// Execution device
    #[arg(long, value_enum, default_value_t = DeviceArg::Cpu)]
    device: DeviceArg,

    /// Accelerator index for CUDA/TensorRT
    #[arg(long, default_value_t = 0)]
    device_id: i32,

    /// Run the model in half precision where supported
    #[arg(long)]
    half: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

impl Args {
    fn context(&self) -> ExecutionContext {
        let device = match self.device {
            DeviceArg::Cpu => Device::Cpu,
            DeviceArg::Cuda => Device::Cuda {
                device_id: self.device_id,
            },
            DeviceArg::Tensorrt => Device::TensorRt {
                device_id: self.device_id,
            },
        };
        let precision = if self.half {
            Precision::Half
        } else {
            Precision::Full
        };
        ExecutionContext::new(device, precision)
    }

    fn config(&self) -> Result<MattingConfig> {
        let mut config = MattingConfig::from_radii(self.r_erode, self.r_dilate, self.n_warmup)?;
        config.seed = self.seed;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    tracing::info!("seedmatte starting");
    tracing::info!(
        "Warm-up: {}, erode: {}, dilate: {}",
        args.n_warmup,
        args.r_erode,
        args.r_dilate
    );

    let context = args.context();
    let config = args.config().context("Invalid matting settings")?;

    let mut source = ImageSequence::open(&args.frames).context("Failed to open frames")?;
    let frames = source.read_all().context("Failed to read frames")?;
    let seed = capture::load_mask(&args.mask).context("Failed to load seed mask")?;

    let mut model = segmentation::create_default_model(&args.model, &context)
        .context("Failed to load matting model")?;

    let started = Instant::now();
    let mut pipeline = MattingPipeline::new(config, context);
    let output = pipeline
        .run(&mut model, &frames, &seed)
        .context("Matting failed")?;
    tracing::info!(
        "Matted {} frames in {:.1}s",
        output.len(),
        started.elapsed().as_secs_f64()
    );

    let mut composites =
        PngSequence::new(&args.composites).context("Failed to initialize composite output")?;
    composites
        .write_all(&output.composites)
        .context("Failed to write composites")?;

    let mut mattes = PngSequence::new(&args.mattes).context("Failed to initialize matte output")?;
    mattes
        .write_all(&output.mattes)
        .context("Failed to write mattes")?;

    tracing::info!(
        "Wrote {} composites and {} mattes",
        composites.frames_written(),
        mattes.frames_written()
    );

    Ok(())
}
