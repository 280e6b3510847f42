//! Forward / inverse 2D block transform.
//!
//! Used only to synthesize corrupted test blocks; the candidate search never
//! inspects the transform domain itself.

use crate::basis::DctBasis;
use crate::block::Block;

/// Forward 2D transform of a spatial block: `M · X · Mᵀ`.
pub fn forward(basis: &DctBasis, block: &Block) -> Block {
    let m = basis.matrix();
    Block::from_matrix(m * block.matrix() * m.transpose())
}

/// Inverse 2D transform of a coefficient block: `Mᵀ · X · M`.
pub fn inverse(basis: &DctBasis, coeffs: &Block) -> Block {
    let m = basis.matrix();
    Block::from_matrix(m.transpose() * coeffs.matrix() * m)
}
