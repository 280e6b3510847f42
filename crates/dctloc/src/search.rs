//! Candidate-pair search over one block column.
//!
//! Enumerates all 28 unordered coefficient pairs, derives the linear
//! relation for each and keeps the pairs whose predicted error at row `w`
//! matches the observed error within the adaptive tolerance.

use serde::{Deserialize, Serialize};

use crate::basis::{DctBasis, BLOCK_SIZE};
use crate::block::Block;
use crate::relation::{solve_relation, CoeffPair, IndexError, SampleTriple};

/// Result of one column search, with the inputs recorded for traceability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnReport {
    /// Column the samples were taken from. Not used numerically.
    pub column: usize,
    pub triple: SampleTriple,
    /// Observed errors `(e_u, e_v, e_w)` = reference − corrupted.
    pub errors: [f64; 3],
    /// Coefficient pairs consistent with the observed errors, ascending.
    pub candidates: Vec<CoeffPair>,
}

/// Enumerate the coefficient pairs consistent with the observed errors.
///
/// `reference` and `corrupted` hold the samples at rows `(u, v, w)` of one
/// fixed column, in triple order. A pair is accepted when the magnitude of
/// `e_w − (c1·e_u + c2·e_v)` is within the relation's tolerance; pairs whose
/// restriction is singular are skipped as inconclusive.
///
/// When exactly two coefficients were altered, the true pair always
/// satisfies the relation and is therefore included whenever its system is
/// non-singular.
pub fn candidate_pairs(
    basis: &DctBasis,
    reference: [f64; 3],
    corrupted: [f64; 3],
    triple: SampleTriple,
) -> Vec<CoeffPair> {
    let e_u = reference[0] - corrupted[0];
    let e_v = reference[1] - corrupted[1];
    let e_w = reference[2] - corrupted[2];

    let mut accepted = Vec::new();
    let mut skipped = 0usize;
    for pair in CoeffPair::enumerate() {
        let Some(rel) = solve_relation(basis, pair, triple) else {
            tracing::trace!("pair ({}, {}) skipped: singular restriction", pair.k, pair.p);
            skipped += 1;
            continue;
        };
        let mismatch = e_w - rel.predict(e_u, e_v);
        let tol = rel.tolerance();
        // Absolute comparison: a signed one would also admit arbitrarily
        // large negative mismatches.
        if mismatch.abs() <= tol {
            tracing::debug!(
                "pair ({}, {}) accepted: mismatch {:.3e} within {:.3e}",
                pair.k,
                pair.p,
                mismatch,
                tol
            );
            accepted.push(pair);
        }
    }
    tracing::info!(
        "{} of {} pairs consistent with observed errors ({} inconclusive)",
        accepted.len(),
        BLOCK_SIZE * (BLOCK_SIZE - 1) / 2,
        skipped
    );
    accepted
}

/// Run the search on one column of a reference / corrupted block pair.
///
/// Extracts the three samples at the triple's rows from both blocks and
/// records column, triple and observed errors alongside the candidates.
/// Fails fast when `column` is out of range; both blocks are read-only.
pub fn search_block_column(
    basis: &DctBasis,
    reference: &Block,
    corrupted: &Block,
    triple: SampleTriple,
    column: usize,
) -> Result<ColumnReport, IndexError> {
    if column >= BLOCK_SIZE {
        return Err(IndexError::OutOfRange {
            name: "column",
            value: column,
            limit: BLOCK_SIZE,
        });
    }
    let rows = [triple.u, triple.v, triple.w];
    let refs = rows.map(|r| reference.get(r, column));
    let corr = rows.map(|r| corrupted.get(r, column));
    let candidates = candidate_pairs(basis, refs, corr, triple);
    Ok(ColumnReport {
        column,
        triple,
        errors: [refs[0] - corr[0], refs[1] - corr[1], refs[2] - corr[2]],
        candidates,
    })
}
