use super::FrameSource;
use anyhow::{bail, Context, Result};
use image::{GrayImage, RgbImage};
use std::path::{Path, PathBuf};

const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "bmp", "tif", "tiff"];

/// Frames stored as one image file each, read in file-name order
pub struct ImageSequence {
    paths: Vec<PathBuf>,
    next: usize,
    width: u32,
    height: u32,
}

impl ImageSequence {
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        tracing::info!("Opening image sequence in {}", dir.display());

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read frame directory {}", dir.display()))?
        {
            let path = entry?.path();
            if path.is_file() && is_image(&path) {
                paths.push(path);
            }
        }
        paths.sort();

        let Some(first) = paths.first() else {
            bail!("No image files found in {}", dir.display());
        };
        let (width, height) = image::image_dimensions(first)
            .with_context(|| format!("Failed to read {}", first.display()))?;

        tracing::info!("Found {} frames at {}x{}", paths.len(), width, height);

        Ok(Self {
            paths,
            next: 0,
            width,
            height,
        })
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

impl FrameSource for ImageSequence {
    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        let Some(path) = self.paths.get(self.next) else {
            return Ok(None);
        };
        self.next += 1;

        let frame = image::open(path)
            .with_context(|| format!("Failed to decode frame {}", path.display()))?
            .to_rgb8();

        Ok(Some(frame))
    }

    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Load a seed mask, converting it to 8-bit grayscale
pub fn load_mask<P: AsRef<Path>>(path: P) -> Result<GrayImage> {
    let path = path.as_ref();
    let mask = image::open(path)
        .with_context(|| format!("Failed to load mask {}", path.display()))?
        .to_luma8();
    tracing::info!("Loaded seed mask {}x{}", mask.width(), mask.height());
    Ok(mask)
}
