use crate::align::encode::ALPHABET_SIZE;
use crate::align::matrix::ScoringMatrix;
use wide::i16x16;

pub const LANES: usize = 16;

#[inline]
pub fn shift_left(v: i16x16, insert: i16) -> i16x16 {
    let mut arr = v.to_array();
    for i in (1..LANES).rev() {
        arr[i] = arr[i - 1];
    }
    arr[0] = insert;
    i16x16::from(arr)
}

/// Striped query profile: for each target symbol, `seg_len` vectors where
/// lane `l` of segment `s` scores query position `l * seg_len + s`.
pub fn build_profile(query: &[u8], matrix: &ScoringMatrix) -> Vec<i16x16> {
    let m = query.len();
    let seg_len = m.div_ceil(LANES);
    let mut profile = vec![i16x16::splat(0); ALPHABET_SIZE * seg_len];
    for a in 0..ALPHABET_SIZE {
        for seg in 0..seg_len {
            let mut lane_vals = [0i16; LANES];
            for (lane, slot) in lane_vals.iter_mut().enumerate() {
                let idx = lane * seg_len + seg;
                *slot = if idx < m {
                    matrix.score(query[idx], a as u8) as i16
                } else {
                    0
                };
            }
            profile[a * seg_len + seg] = i16x16::from(lane_vals);
        }
    }
    profile
}

/// Per-lane clamp for the last segment: valid lanes pass through, lanes past
/// the query end are pinned to `fill`.
pub fn tail_clamp(m: usize, seg_len: usize, fill: i16) -> i16x16 {
    let last_seg = seg_len.saturating_sub(1);
    let mut arr = [i16::MAX; LANES];
    for (lane, slot) in arr.iter_mut().enumerate() {
        if lane * seg_len + last_seg >= m {
            *slot = fill;
        }
    }
    i16x16::from(arr)
}
