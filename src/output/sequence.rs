use super::OutputSink;
use anyhow::{Context, Result};
use image::RgbImage;
use std::path::{Path, PathBuf};

/// Writes frames as numbered PNG files (`00000.png`, `00001.png`, ...)
pub struct PngSequence {
    dir: PathBuf,
    written: usize,
}

impl PngSequence {
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

        tracing::info!("Writing PNG sequence to {}", dir.display());

        Ok(Self {
            dir: dir.to_path_buf(),
            written: 0,
        })
    }

    fn frame_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{index:05}.png"))
    }
}

impl OutputSink for PngSequence {
    fn write_frame(&mut self, frame: &RgbImage) -> Result<()> {
        let path = self.frame_path(self.written);
        frame
            .save_with_format(&path, image::ImageFormat::Png)
            .with_context(|| format!("Failed to write frame {}", path.display()))?;
        self.written += 1;
        Ok(())
    }

    fn frames_written(&self) -> usize {
        self.written
    }
}
