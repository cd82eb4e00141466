use crate::error::{MattingError, MattingResult};
use crate::pipeline::warmup::{DEFAULT_WARMUP, MAX_WARMUP};
use crate::segmentation::KernelRange;

/// Settings for one matting run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MattingConfig {
    /// Times the first frame is replayed before its result is trusted
    pub n_warmup: usize,
    /// Dilation of the seed mask, applied first
    pub dilate: Option<KernelRange>,
    /// Erosion of the seed mask, applied after dilation
    pub erode: Option<KernelRange>,
    /// Seed for kernel-size sampling; `None` uses OS entropy
    pub seed: Option<u64>,
}

impl Default for MattingConfig {
    fn default() -> Self {
        Self {
            n_warmup: DEFAULT_WARMUP,
            dilate: None,
            erode: None,
            seed: None,
        }
    }
}

impl MattingConfig {
    /// Build a config from plain kernel sizes; `0` disables a step
    pub fn from_radii(r_erode: u32, r_dilate: u32, n_warmup: usize) -> MattingResult<Self> {
        check_warmup(n_warmup)?;
        Ok(Self {
            n_warmup,
            dilate: optional_kernel(r_dilate)?,
            erode: optional_kernel(r_erode)?,
            seed: None,
        })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

pub(crate) fn check_warmup(n_warmup: usize) -> MattingResult<()> {
    if n_warmup > MAX_WARMUP {
        return Err(MattingError::config(format!(
            "n_warmup {n_warmup} exceeds the limit of {MAX_WARMUP}"
        )));
    }
    Ok(())
}

fn optional_kernel(size: u32) -> MattingResult<Option<KernelRange>> {
    if size == 0 {
        Ok(None)
    } else {
        KernelRange::fixed(size).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_settings() {
        let config = MattingConfig::default();
        assert_eq!(config.n_warmup, 10);
        assert!(config.dilate.is_none());
        assert!(config.erode.is_none());
    }

    #[test]
    fn zero_radius_disables_step() {
        let config = MattingConfig::from_radii(0, 7, 3).unwrap().with_seed(9);
        assert!(config.erode.is_none());
        assert_eq!(config.dilate, Some(KernelRange::fixed(7).unwrap()));
        assert_eq!(config.n_warmup, 3);
        assert_eq!(config.seed, Some(9));
    }

    #[test]
    fn oversized_warmup_is_rejected() {
        assert!(MattingConfig::from_radii(0, 0, MAX_WARMUP).is_ok());
        let err = MattingConfig::from_radii(0, 0, MAX_WARMUP + 1).unwrap_err();
        assert!(matches!(err, MattingError::Config(_)));
    }
}
