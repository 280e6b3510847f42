//! dctloc — localize corrupted DCT coefficient pairs in 8×8 image blocks.
//!
//! Given three known-good spatial samples from one column of an uncorrupted
//! block plus the corrupted block, narrows down which two transform
//! coefficients were altered, without re-inspecting the frequency domain.
//! The pipeline stages are:
//!
//! 1. **Basis** – the fixed orthonormal discrete-cosine basis, built once.
//! 2. **Relation** – closed-form 2×2 solve expressing one sample row's basis
//!    restriction as a combination of the other two, with an adaptive
//!    acceptance tolerance.
//! 3. **Search** – enumeration of all 28 unordered coefficient pairs,
//!    keeping those consistent with the observed reconstruction errors.
//!
//! The forward/inverse block transform (`transform`) exists only to
//! synthesize corrupted test blocks and is not on the search path.
//!
//! # Quick start
//!
//! ```
//! use dctloc::{search_block_column, Block, DctBasis, SampleTriple};
//!
//! let basis = DctBasis::new();
//! let triple = SampleTriple::new(2, 4, 7).unwrap();
//! let reference = Block::splat(128.0);
//! let report = search_block_column(&basis, &reference, &reference, triple, 2).unwrap();
//! assert_eq!(report.candidates.len(), 28); // zero errors rule nothing out
//! ```
//!
//! The search itself assumes exactly two coefficients were altered; deciding
//! *whether* a block is corrupted is out of scope. Everything is synchronous
//! and allocation-light; the basis is immutable and shared by reference.

pub mod basis;
pub mod block;
pub mod relation;
pub mod search;
pub mod transform;

pub use basis::{BasisMatrix, DctBasis, BLOCK_SIZE};
pub use block::{Block, SampleMatrix};
pub use relation::{
    solve_relation, CoeffPair, IndexError, RelationVector, SampleTriple, TOLERANCE_SCALE,
};
pub use search::{candidate_pairs, search_block_column, ColumnReport};
