//! 8×8 sample blocks and grayscale tile extraction.

use image::{GrayImage, Luma};
use nalgebra::SMatrix;

use crate::basis::BLOCK_SIZE;

/// 8×8 matrix of real-valued samples.
pub type SampleMatrix = SMatrix<f64, BLOCK_SIZE, BLOCK_SIZE>;

/// An 8×8 grid of real-valued samples, indexed by (row, col).
///
/// Holds either spatial samples or transform-domain coefficients; the two
/// are distinguished by usage, not by type.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    m: SampleMatrix,
}

impl Block {
    /// Build a block from a per-cell function of (row, col).
    pub fn from_fn(f: impl FnMut(usize, usize) -> f64) -> Self {
        Self {
            m: SampleMatrix::from_fn(f),
        }
    }

    /// A block with every sample set to `value`.
    pub fn splat(value: f64) -> Self {
        Self {
            m: SampleMatrix::repeat(value),
        }
    }

    pub fn from_matrix(m: SampleMatrix) -> Self {
        Self { m }
    }

    pub fn matrix(&self) -> &SampleMatrix {
        &self.m
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.m[(row, col)]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.m[(row, col)] = value;
    }

    /// Extract the 8×8 tile with top-left corner `(x0, y0)` from a grayscale
    /// image. Returns `None` when the tile does not fit inside the image.
    pub fn from_gray_region(img: &GrayImage, x0: u32, y0: u32) -> Option<Self> {
        let n = BLOCK_SIZE as u32;
        let (w, h) = img.dimensions();
        if x0.checked_add(n).is_none_or(|x| x > w) || y0.checked_add(n).is_none_or(|y| y > h) {
            return None;
        }
        Some(Self::from_fn(|row, col| {
            img.get_pixel(x0 + col as u32, y0 + row as u32)[0] as f64
        }))
    }

    /// Write the block into a grayscale image at `(x0, y0)`, rounding and
    /// clamping samples to [0, 255]. Out-of-image cells are skipped.
    pub fn write_to_gray(&self, img: &mut GrayImage, x0: u32, y0: u32) {
        let (w, h) = img.dimensions();
        for row in 0..BLOCK_SIZE {
            for col in 0..BLOCK_SIZE {
                let (Some(x), Some(y)) = (
                    x0.checked_add(col as u32),
                    y0.checked_add(row as u32),
                ) else {
                    continue;
                };
                if x < w && y < h {
                    let v = self.get(row, col).round().clamp(0.0, 255.0) as u8;
                    img.put_pixel(x, y, Luma([v]));
                }
            }
        }
    }
}
