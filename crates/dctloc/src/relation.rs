//! Linear-relation solver over basis restrictions, with adaptive tolerance.
//!
//! If exactly two transform coefficients `(k, p)` of a block column were
//! altered, the reconstruction errors observed at any three spatial rows
//! `(u, v, w)` of that column are linearly dependent: there is a unique
//! `(c1, c2)` with `e_w = c1·e_u + c2·e_v`, and it depends only on the basis
//! values at those five indices. This module derives that relation vector
//! from a closed-form 2×2 solve.

use serde::{Deserialize, Serialize};

use crate::basis::{DctBasis, BLOCK_SIZE};

// ── Error type ─────────────────────────────────────────────────────────────

/// Precondition violations on coefficient / sample indices.
///
/// These are caller bugs and are reported fail-fast. They are never used for
/// the singular-system outcome, which is an expected algebraic degeneracy
/// signaled by `None` from [`solve_relation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexError {
    /// An index is outside `[0, BLOCK_SIZE)`.
    OutOfRange {
        name: &'static str,
        value: usize,
        limit: usize,
    },
    /// Indices that must be pairwise distinct coincide.
    DuplicateIndices { name: &'static str },
}

impl std::fmt::Display for IndexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfRange { name, value, limit } => {
                write!(f, "index {} out of range: {} (limit {})", name, value, limit)
            }
            Self::DuplicateIndices { name } => {
                write!(f, "indices {} must be pairwise distinct", name)
            }
        }
    }
}

impl std::error::Error for IndexError {}

// ── Index types ────────────────────────────────────────────────────────────

/// Unordered pair of candidate coefficient indices, stored with `k < p`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CoeffPair {
    pub k: usize,
    pub p: usize,
}

impl CoeffPair {
    /// Build a pair from two distinct coefficient indices in
    /// `[0, BLOCK_SIZE)`. Order is normalized so that `k < p`.
    pub fn new(k: usize, p: usize) -> Result<Self, IndexError> {
        for (name, value) in [("k", k), ("p", p)] {
            if value >= BLOCK_SIZE {
                return Err(IndexError::OutOfRange {
                    name,
                    value,
                    limit: BLOCK_SIZE,
                });
            }
        }
        if k == p {
            return Err(IndexError::DuplicateIndices { name: "(k, p)" });
        }
        let (k, p) = if k < p { (k, p) } else { (p, k) };
        Ok(Self { k, p })
    }

    /// All 28 unordered pairs with `k < p`, in ascending order.
    pub fn enumerate() -> impl Iterator<Item = Self> {
        (0..BLOCK_SIZE).flat_map(|k| (k + 1..BLOCK_SIZE).map(move |p| Self { k, p }))
    }
}

/// Three pairwise-distinct spatial row indices serving as reference sample
/// positions for one search invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleTriple {
    pub u: usize,
    pub v: usize,
    pub w: usize,
}

impl SampleTriple {
    pub fn new(u: usize, v: usize, w: usize) -> Result<Self, IndexError> {
        for (name, value) in [("u", u), ("v", v), ("w", w)] {
            if value >= BLOCK_SIZE {
                return Err(IndexError::OutOfRange {
                    name,
                    value,
                    limit: BLOCK_SIZE,
                });
            }
        }
        if u == v || u == w || v == w {
            return Err(IndexError::DuplicateIndices { name: "(u, v, w)" });
        }
        Ok(Self { u, v, w })
    }
}

// ── Relation vector ────────────────────────────────────────────────────────

/// Scale factor of the adaptive acceptance threshold.
pub const TOLERANCE_SCALE: f64 = 0.01;

/// Determinant magnitudes below this are treated as singular.
const SINGULARITY_EPS: f64 = 1e-12;

/// The coefficients `(c1, c2)` expressing row `w`'s basis restriction as a
/// combination of rows `u` and `v`: `value(k, w) = c1·value(k, u) +
/// c2·value(k, v)`, and likewise for coefficient `p`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelationVector {
    pub c1: f64,
    pub c2: f64,
}

impl RelationVector {
    /// Predicted error at row `w` from the observed errors at rows `u`, `v`.
    #[inline]
    pub fn predict(&self, e_u: f64, e_v: f64) -> f64 {
        self.c1 * e_u + self.c2 * e_v
    }

    /// Adaptive acceptance threshold: `0.01 · (1 + |c1| + |c2|)`.
    ///
    /// Noise in the observed pixel errors is amplified by exactly `c1` and
    /// `c2` when projected through the relation, so the slack must scale
    /// with their magnitudes. Non-decreasing in `|c1|` and `|c2|`.
    #[inline]
    pub fn tolerance(&self) -> f64 {
        TOLERANCE_SCALE * (1.0 + self.c1.abs() + self.c2.abs())
    }
}

// ── Solver ─────────────────────────────────────────────────────────────────

/// Closed-form solve of `c = a · B⁻¹` for a 2×2 restriction `B` (rows `u`,
/// `v`) and target row `a` (row `w`).
///
/// Returns `None` when `B` is singular, i.e. rows `u` and `v` are linearly
/// dependent on the restricted coefficient pair and no relation exists.
pub(crate) fn relation_from_restriction(b: [[f64; 2]; 2], a: [f64; 2]) -> Option<RelationVector> {
    let det = b[0][0] * b[1][1] - b[0][1] * b[1][0];
    if det.abs() < SINGULARITY_EPS {
        return None;
    }
    Some(RelationVector {
        c1: (a[0] * b[1][1] - a[1] * b[1][0]) / det,
        c2: (-a[0] * b[0][1] + a[1] * b[0][0]) / det,
    })
}

/// Derive the relation vector for candidate coefficient pair `(k, p)` and
/// sample rows `(u, v, w)`.
///
/// The 2×2 system restricts spatial rows `u` and `v` to the frequency pair:
/// `B = [[value(k, u), value(p, u)], [value(k, v), value(p, v)]]` with
/// target `a = [value(k, w), value(p, w)]`. `None` signals a singular
/// restriction — "this pair cannot be evaluated with this triple", which
/// callers must treat as inconclusive, not as ruling the pair out.
pub fn solve_relation(
    basis: &DctBasis,
    pair: CoeffPair,
    triple: SampleTriple,
) -> Option<RelationVector> {
    let CoeffPair { k, p } = pair;
    let SampleTriple { u, v, w } = triple;
    let b = [
        [basis.value(k, u), basis.value(p, u)],
        [basis.value(k, v), basis.value(p, v)],
    ];
    let a = [basis.value(k, w), basis.value(p, w)];
    relation_from_restriction(b, a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_coeff_pair_preconditions() {
        assert!(CoeffPair::new(0, 8).is_err());
        assert!(CoeffPair::new(9, 1).is_err());
        assert_eq!(
            CoeffPair::new(3, 3),
            Err(IndexError::DuplicateIndices { name: "(k, p)" })
        );
        // Order is normalized
        let pair = CoeffPair::new(5, 2).unwrap();
        assert_eq!((pair.k, pair.p), (2, 5));
    }

    #[test]
    fn test_sample_triple_preconditions() {
        assert!(SampleTriple::new(2, 4, 8).is_err());
        assert!(SampleTriple::new(2, 2, 7).is_err());
        assert!(SampleTriple::new(2, 4, 4).is_err());
        assert!(SampleTriple::new(7, 4, 7).is_err());
        assert!(SampleTriple::new(2, 4, 7).is_ok());
    }

    #[test]
    fn test_enumerate_pairs() {
        let pairs: Vec<CoeffPair> = CoeffPair::enumerate().collect();
        assert_eq!(pairs.len(), 28);
        assert_eq!((pairs[0].k, pairs[0].p), (0, 1));
        assert_eq!((pairs[27].k, pairs[27].p), (6, 7));
        assert!(pairs.iter().all(|pr| pr.k < pr.p));
    }

    #[test]
    fn test_recovers_chosen_combination() {
        // Synthetic restriction where the target row is a known combination
        // of the two base rows: a = 0.25·b_row0 − 0.75·b_row1.
        let b = [[1.0, 3.0], [2.0, -1.0]];
        let a = [
            0.25 * b[0][0] - 0.75 * b[1][0],
            0.25 * b[0][1] - 0.75 * b[1][1],
        ];
        let rel = relation_from_restriction(b, a).expect("system is non-singular");
        assert_relative_eq!(rel.c1, 0.25, epsilon = 1e-4);
        assert_relative_eq!(rel.c2, -0.75, epsilon = 1e-4);
    }

    #[test]
    fn test_degenerate_restriction_yields_none() {
        // Rows proportional: no relation derivable, and no numeric error.
        let b = [[1.0, 2.0], [2.0, 4.0]];
        assert_eq!(relation_from_restriction(b, [0.5, 0.5]), None);
        // All-zero restriction
        assert_eq!(relation_from_restriction([[0.0; 2]; 2], [1.0, 1.0]), None);
    }

    #[test]
    fn test_singular_pair_on_real_basis() {
        // value(4, x) has the same magnitude and sign at x = 0 and x = 3,
        // and row 0 is constant, so the (0, 4) restriction of rows 0 and 3
        // is rank one.
        let basis = DctBasis::new();
        let pair = CoeffPair::new(0, 4).unwrap();
        let triple = SampleTriple::new(0, 3, 6).unwrap();
        assert_eq!(solve_relation(&basis, pair, triple), None);
    }

    #[test]
    fn test_relation_identity_on_basis() {
        // The relation must reproduce row w's restriction from rows u and v
        // for both coefficients of the pair.
        let basis = DctBasis::new();
        let triple = SampleTriple::new(2, 4, 7).unwrap();
        for pair in CoeffPair::enumerate() {
            let Some(rel) = solve_relation(&basis, pair, triple) else {
                continue;
            };
            for f in [pair.k, pair.p] {
                let predicted = rel.c1 * basis.value(f, triple.u) + rel.c2 * basis.value(f, triple.v);
                assert_relative_eq!(basis.value(f, triple.w), predicted, epsilon = 1e-4);
            }
        }
    }

    #[test]
    fn test_tolerance_monotone() {
        let base = RelationVector { c1: 0.0, c2: 0.0 };
        assert_relative_eq!(base.tolerance(), 0.01, epsilon = 1e-12);

        let mut prev = base.tolerance();
        for i in 1..10 {
            let t = RelationVector {
                c1: i as f64 * 0.5,
                c2: 0.0,
            }
            .tolerance();
            assert!(t >= prev);
            prev = t;
        }
        // Sign of the components is irrelevant
        let pos = RelationVector { c1: 1.5, c2: 2.0 }.tolerance();
        let neg = RelationVector { c1: -1.5, c2: -2.0 }.tolerance();
        assert_relative_eq!(pos, neg, epsilon = 1e-12);
        // And monotone in |c2| with c1 held fixed
        let lo = RelationVector { c1: 1.5, c2: 0.5 }.tolerance();
        assert!(pos > lo);
    }
}
