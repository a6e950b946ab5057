pub mod banded;
#[cfg(feature = "simd")]
pub mod global_simd;
#[cfg(feature = "simd")]
pub mod local_simd;
pub mod scalar_ref;
#[cfg(feature = "simd")]
mod simd_utils;

#[cfg(feature = "simd")]
use super::matrix::ScoringMatrix;

/// Stays clear of overflow when penalties are subtracted repeatedly.
pub(crate) const NEG_INF: i32 = i32::MIN / 4;

// DP rows are target positions (i), columns query positions (j).
// Bits 0-1: H direction
pub(crate) const DIR_DIAG: u8 = 0;
pub(crate) const DIR_DEL: u8 = 1; // E (vertical gap, consumes target)
pub(crate) const DIR_INS: u8 = 2; // F (horizontal gap, consumes query)
pub(crate) const DIR_MASK: u8 = 0b11;
// Set when E/F at this cell extended an existing gap rather than opening one.
pub(crate) const E_EXTENDED: u8 = 1 << 2;
pub(crate) const F_EXTENDED: u8 = 1 << 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Gaps {
    pub open: i32,
    pub extend: i32,
}

impl Gaps {
    pub fn new(open: i32, extend: i32) -> Self {
        Self { open, extend }
    }

    /// Cost of the first base of a gap.
    #[inline]
    pub fn first(&self) -> i32 {
        self.open.saturating_add(self.extend)
    }

    /// Cost of a gap of `len` bases: `open + len * extend`, capped at
    /// `-NEG_INF` so boundary cells never sit below the DP floor.
    #[inline]
    pub fn run(&self, len: usize) -> i32 {
        let len = i32::try_from(len).unwrap_or(i32::MAX);
        self.open
            .saturating_add(self.extend.saturating_mul(len))
            .min(-NEG_INF)
    }
}

/// Conservative bound keeping i16 striped scores away from wrap-around.
#[cfg(feature = "simd")]
const SIMD_MAX_SAFE_SCORE: i32 = 15000;

/// True when every reachable score of an `m x n` alignment fits the i16 lanes.
#[cfg(feature = "simd")]
pub(crate) fn simd_safe(m: usize, n: usize, matrix: &ScoringMatrix, gaps: Gaps) -> bool {
    let per_step = matrix.max_abs_score().max(gaps.first());
    let steps = i32::try_from(m + n).unwrap_or(i32::MAX);
    per_step.saturating_mul(steps) <= SIMD_MAX_SAFE_SCORE
}
