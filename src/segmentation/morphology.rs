use super::types::Mask;
use crate::error::{MattingError, MattingResult};
use image::GrayImage;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Inclusive range of structuring-element sizes to sample from
///
/// A plain radius maps to the degenerate range `[r, r]`, which always yields
/// the same kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelRange {
    min: u32,
    max: u32,
}

impl KernelRange {
    pub fn new(min: u32, max: u32) -> MattingResult<Self> {
        if min == 0 {
            return Err(MattingError::config("kernel size must be at least 1"));
        }
        if min > max {
            return Err(MattingError::config(format!(
                "kernel range is inverted: min {min} > max {max}"
            )));
        }
        Ok(Self { min, max })
    }

    pub fn fixed(size: u32) -> MattingResult<Self> {
        Self::new(size, size)
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    fn sample<R: Rng>(&self, rng: &mut R) -> u32 {
        rng.gen_range(self.min..=self.max)
    }
}

/// Optional randomized dilation/erosion of a seed mask
///
/// Dilation grows the "foreground or unknown" region (`mask != 0`), erosion
/// shrinks the strict foreground (`mask == 255`). Both produce a mask whose
/// values are exactly `0.0` or `255.0`.
pub struct MaskMorphology {
    dilate: Option<KernelRange>,
    erode: Option<KernelRange>,
    rng: StdRng,
}

impl MaskMorphology {
    /// `seed` fixes the kernel-size sampling; `None` draws from OS entropy
    pub fn new(dilate: Option<KernelRange>, erode: Option<KernelRange>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { dilate, erode, rng }
    }

    pub fn is_noop(&self) -> bool {
        self.dilate.is_none() && self.erode.is_none()
    }

    /// Apply the configured steps to a grayscale seed mask
    pub fn apply(&mut self, mask: &GrayImage) -> Mask {
        self.apply_array(gray_to_array(mask))
    }

    /// Apply the configured steps to a mask already in array form
    ///
    /// Dilation runs first; erosion then works on its result.
    pub fn apply_array(&mut self, mut mask: Mask) -> Mask {
        let _span = tracing::debug_span!("morphology").entered();

        if let Some(range) = self.dilate {
            let size = range.sample(&mut self.rng);
            tracing::debug!("Dilating seed mask with {}x{} ellipse", size, size);
            mask = dilate_mask(&mask, size as usize);
        }
        if let Some(range) = self.erode {
            let size = range.sample(&mut self.rng);
            tracing::debug!("Eroding seed mask with {}x{} ellipse", size, size);
            mask = erode_mask(&mask, size as usize);
        }

        mask
    }
}

/// Convert a grayscale image into a `[height, width]` float array
pub fn gray_to_array(mask: &GrayImage) -> Mask {
    let (width, height) = mask.dimensions();
    Array2::from_shape_fn((height as usize, width as usize), |(y, x)| {
        mask.get_pixel(x as u32, y as u32)[0] as f32
    })
}

/// Dilate the `mask != 0` indicator once with a `size`x`size` ellipse
pub fn dilate_mask(mask: &Mask, size: usize) -> Mask {
    let indicator = mask.mapv(|v| v != 0.0);
    to_mask(&dilate(&indicator, &ellipse_kernel(size)))
}

/// Erode the `mask == 255` indicator once with a `size`x`size` ellipse
pub fn erode_mask(mask: &Mask, size: usize) -> Mask {
    let indicator = mask.mapv(|v| v == 255.0);
    to_mask(&erode(&indicator, &ellipse_kernel(size)))
}

fn to_mask(indicator: &Array2<bool>) -> Mask {
    indicator.mapv(|v| if v { 255.0 } else { 0.0 })
}

/// Elliptical structuring element, laid out like OpenCV's `MORPH_ELLIPSE`
///
/// The anchor sits at `(size / 2, size / 2)`.
pub fn ellipse_kernel(size: usize) -> Array2<bool> {
    let mut kernel = Array2::from_elem((size, size), false);
    let r = (size / 2) as i64;
    let c = (size / 2) as i64;
    let inv_r2 = if r > 0 { 1.0 / (r * r) as f64 } else { 0.0 };

    for i in 0..size as i64 {
        let dy = i - r;
        if dy.abs() > r {
            continue;
        }
        let dx = (c as f64 * (((r * r - dy * dy) as f64) * inv_r2).sqrt()).round_ties_even() as i64;
        let j1 = (c - dx).max(0);
        let j2 = (c + dx + 1).min(size as i64);
        for j in j1..j2 {
            kernel[[i as usize, j as usize]] = true;
        }
    }

    kernel
}

/// Horizontal run of one kernel row, relative to the anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RowRun {
    dy: isize,
    lo: isize,
    hi: isize,
}

/// Decompose a kernel into one contiguous run per non-empty row
///
/// Ellipse rows are always contiguous, which keeps each neighbourhood test
/// down to one prefix-sum lookup per kernel row.
fn row_runs(kernel: &Array2<bool>) -> Vec<RowRun> {
    let (kh, kw) = kernel.dim();
    let (ay, ax) = ((kh / 2) as isize, (kw / 2) as isize);
    kernel
        .outer_iter()
        .enumerate()
        .filter_map(|(i, row)| {
            let lo = row.iter().position(|&v| v)?;
            let hi = row.iter().rposition(|&v| v)?;
            debug_assert!(row.slice(ndarray::s![lo..=hi]).iter().all(|&v| v));
            Some(RowRun {
                dy: i as isize - ay,
                lo: lo as isize - ax,
                hi: hi as isize - ax,
            })
        })
        .collect()
}

/// Per-row running count of set pixels, `prefix[[y, x]]` counts `src[[y, ..x]]`
fn row_prefix_sums(src: &Array2<bool>) -> Array2<u32> {
    let (h, w) = src.dim();
    let mut prefix = Array2::zeros((h, w + 1));
    for y in 0..h {
        for x in 0..w {
            prefix[[y, x + 1]] = prefix[[y, x]] + u32::from(src[[y, x]]);
        }
    }
    prefix
}

/// Count of set pixels and in-image pixels under each kernel row at `(y, x)`
///
/// Rows and columns outside the image are skipped.
fn row_counts<'a>(
    prefix: &'a Array2<u32>,
    runs: &'a [RowRun],
    y: usize,
    x: usize,
) -> impl Iterator<Item = (u32, u32)> + 'a {
    let (h, w1) = prefix.dim();
    let w = (w1 - 1) as isize;
    runs.iter().filter_map(move |run| {
        let ny = y as isize + run.dy;
        if ny < 0 || ny >= h as isize {
            return None;
        }
        let x0 = (x as isize + run.lo).max(0);
        let x1 = (x as isize + run.hi + 1).min(w);
        if x0 >= x1 {
            return None;
        }
        let row = ny as usize;
        let set = prefix[[row, x1 as usize]] - prefix[[row, x0 as usize]];
        Some((set, (x1 - x0) as u32))
    })
}

// Out-of-image neighbours are skipped: they never set a pixel on dilation and
// never clear one on erosion.
fn dilate(src: &Array2<bool>, kernel: &Array2<bool>) -> Array2<bool> {
    let runs = row_runs(kernel);
    let prefix = row_prefix_sums(src);
    Array2::from_shape_fn(src.dim(), |(y, x)| {
        row_counts(&prefix, &runs, y, x).any(|(set, _)| set > 0)
    })
}

fn erode(src: &Array2<bool>, kernel: &Array2<bool>) -> Array2<bool> {
    let runs = row_runs(kernel);
    let prefix = row_prefix_sums(src);
    Array2::from_shape_fn(src.dim(), |(y, x)| {
        row_counts(&prefix, &runs, y, x).all(|(set, len)| set == len)
    })
}
