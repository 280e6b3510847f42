//! Orthonormal DCT-II basis for 8×8 blocks.

use std::f64::consts::PI;

use nalgebra::SMatrix;

/// Fixed transform block dimension. Other sizes are out of scope.
pub const BLOCK_SIZE: usize = 8;

/// 8×8 matrix of basis values.
pub type BasisMatrix = SMatrix<f64, BLOCK_SIZE, BLOCK_SIZE>;

/// The orthonormal discrete-cosine basis, frequency-major:
/// `value(f, x) = α(f) · cos((2x + 1) · f · π / 16)` with `α(0) = √(1/8)`
/// and `α(f>0) = √(2/8)`.
///
/// Rows index frequency, columns index spatial position. Rows are pairwise
/// orthogonal with unit norm. Built once and shared by reference; entries
/// are kept at full f64 precision — rounding is a presentation concern only.
#[derive(Debug, Clone, PartialEq)]
pub struct DctBasis {
    m: BasisMatrix,
}

impl DctBasis {
    pub fn new() -> Self {
        let n = BLOCK_SIZE as f64;
        let m = BasisMatrix::from_fn(|f, x| {
            let alpha = if f == 0 {
                (1.0 / n).sqrt()
            } else {
                (2.0 / n).sqrt()
            };
            alpha * (((2 * x + 1) as f64 * f as f64 * PI) / (2.0 * n)).cos()
        });
        Self { m }
    }

    /// Basis value at frequency `f`, spatial position `x`.
    #[inline]
    pub fn value(&self, f: usize, x: usize) -> f64 {
        self.m[(f, x)]
    }

    /// The full basis matrix (frequency-major).
    pub fn matrix(&self) -> &BasisMatrix {
        &self.m
    }
}

impl Default for DctBasis {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rows_orthonormal() {
        let basis = DctBasis::new();
        for i in 0..BLOCK_SIZE {
            for j in 0..BLOCK_SIZE {
                let dot: f64 = (0..BLOCK_SIZE)
                    .map(|x| basis.value(i, x) * basis.value(j, x))
                    .sum();
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!(
                    (dot - expected).abs() < 1e-6,
                    "rows {} and {}: dot product {} (expected {})",
                    i,
                    j,
                    dot,
                    expected
                );
            }
        }
    }

    #[test]
    fn test_first_row_constant() {
        let basis = DctBasis::new();
        let expected = (1.0f64 / 8.0).sqrt();
        for x in 0..BLOCK_SIZE {
            assert_relative_eq!(basis.value(0, x), expected, epsilon = 1e-12);
        }
        // √(1/8) ≈ 0.3536
        assert_relative_eq!(expected, 0.3536, epsilon = 1e-4);
    }

    #[test]
    fn test_known_entry() {
        // value(1, 0) = √(2/8) · cos(π/16)
        let basis = DctBasis::new();
        let expected = 0.5 * (PI / 16.0).cos();
        assert_relative_eq!(basis.value(1, 0), expected, epsilon = 1e-12);
    }
}
