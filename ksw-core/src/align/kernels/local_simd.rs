use super::simd_utils::{build_profile, shift_left, tail_clamp, LANES};
use super::Gaps;
use crate::align::matrix::ScoringMatrix;
use wide::i16x16;

/// Striped Smith-Waterman score pass. Returns the best score and the
/// (query, target) cell where it is first reached; `(0, 0, 0)` when nothing
/// scores above zero.
pub fn align_local_score(
    query: &[u8],
    target: &[u8],
    matrix: &ScoringMatrix,
    gaps: Gaps,
) -> (i32, usize, usize) {
    let m = query.len();
    if m == 0 || target.is_empty() {
        return (0, 0, 0);
    }

    let seg_len = m.div_ceil(LANES);
    let profile = build_profile(query, matrix);

    let neg_inf = i16::MIN / 2;
    let v_zero = i16x16::splat(0);
    let v_neg_inf = i16x16::splat(neg_inf);
    // The kernel subtracts positive penalties; opening charges open + extend.
    let v_gap_o = i16x16::splat(gaps.first() as i16);
    let v_gap_e = i16x16::splat(gaps.extend as i16);

    let mut h_prev = vec![v_zero; seg_len];
    let mut h = vec![v_zero; seg_len];
    let mut e = vec![v_neg_inf; seg_len];

    let last_seg = seg_len - 1;
    let needs_mask = m % LANES != 0;
    // H invalid lanes → 0 (local alignment floors at zero).
    // E invalid lanes → neg_inf (gap scores stay suppressed).
    let v_clamp_h = tail_clamp(m, seg_len, 0);
    let v_clamp_e = tail_clamp(m, seg_len, neg_inf);

    let mut max_score: i16 = 0;
    let mut end_q: usize = 0;
    let mut end_t: usize = 0;

    for (t_idx, &tb) in target.iter().enumerate() {
        let mut v_f = v_neg_inf;
        let mut v_h_diag = shift_left(h_prev[last_seg], 0);
        let prof_base = tb as usize * seg_len;

        for i in 0..seg_len {
            let v_h_old = h_prev[i];
            let v_e = e[i];

            let mut v_h = v_h_diag + profile[prof_base + i];
            v_h = v_h.max(v_e).max(v_f).max(v_zero);
            if i == last_seg && needs_mask {
                v_h = v_h.min(v_clamp_h);
            }
            h[i] = v_h;

            let v_h_gap = v_h - v_gap_o;
            let mut v_e_new = (v_e - v_gap_e).max(v_h_gap);
            if i == last_seg && needs_mask {
                v_e_new = v_e_new.min(v_clamp_e);
            }
            e[i] = v_e_new;
            v_f = (v_f - v_gap_e).max(v_h_gap);

            v_h_diag = v_h_old;
        }

        // Lazy F loop
        for _ in 0..LANES {
            v_f = shift_left(v_f, neg_inf);
            for i in 0..seg_len {
                let mut v_h_i = h[i].max(v_f);
                if i == last_seg && needs_mask {
                    v_h_i = v_h_i.min(v_clamp_h);
                }
                h[i] = v_h_i;
                let v_h_gap = v_h_i - v_gap_o;
                // H raised by F may open a vertical gap on the next row.
                let mut v_e_i = e[i].max(v_h_gap);
                if i == last_seg && needs_mask {
                    v_e_i = v_e_i.min(v_clamp_e);
                }
                e[i] = v_e_i;
                v_f = (v_f - v_gap_e).max(v_h_gap);
            }
            if !v_f.to_array().iter().any(|&v| v > 0) {
                break;
            }
        }

        for (i, h_vec) in h.iter().enumerate() {
            for (lane, &val) in h_vec.to_array().iter().enumerate() {
                let q_idx = lane * seg_len + i;
                if q_idx >= m {
                    continue;
                }
                // Prefer the smallest query index among equal maxima in a row.
                if val > max_score || (val == max_score && val > 0 && t_idx == end_t && q_idx < end_q)
                {
                    max_score = val;
                    end_q = q_idx;
                    end_t = t_idx;
                }
            }
        }

        std::mem::swap(&mut h_prev, &mut h);
    }

    (max_score as i32, end_q, end_t)
}
