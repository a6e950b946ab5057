use super::simd_utils::{build_profile, shift_left, tail_clamp, LANES};
use super::Gaps;
use crate::align::matrix::ScoringMatrix;
use wide::i16x16;

/// Striped Needleman-Wunsch score pass over non-empty sequences.
pub fn align_global_score(
    query: &[u8],
    target: &[u8],
    matrix: &ScoringMatrix,
    gaps: Gaps,
) -> i32 {
    let m = query.len();
    let n = target.len();
    if m == 0 || n == 0 {
        let len = m.max(n);
        return if len == 0 { 0 } else { -gaps.run(len) };
    }

    let seg_len = m.div_ceil(LANES);
    let profile = build_profile(query, matrix);

    let neg_inf = i16::MIN / 2;
    let v_neg_inf = i16x16::splat(neg_inf);
    let gap_first = gaps.first() as i16;
    let gap_extend = gaps.extend as i16;
    let v_gap_o = i16x16::splat(gap_first);
    let v_gap_e = i16x16::splat(gap_extend);

    let mut h_prev = vec![v_neg_inf; seg_len];
    let mut h = vec![v_neg_inf; seg_len];
    let mut e = vec![v_neg_inf; seg_len];

    let last_seg = seg_len - 1;
    let needs_mask = m % LANES != 0;
    // Valid lanes get i16::MAX (no-op under min), invalid lanes get neg_inf.
    let v_clamp = tail_clamp(m, seg_len, neg_inf);

    // Row above the first target base: query prefix fully inserted.
    for seg in 0..seg_len {
        let mut lane_vals = [neg_inf; LANES];
        for (lane, slot) in lane_vals.iter_mut().enumerate() {
            let idx = lane * seg_len + seg;
            if idx < m {
                *slot = (-gaps.run(idx + 1)) as i16;
            }
        }
        let v = i16x16::from(lane_vals);
        h_prev[seg] = v;
        e[seg] = v - v_gap_o;
    }

    let mut h_left_prev: i16 = 0;

    for (t_idx, &tb) in target.iter().enumerate() {
        let mut v_f = v_neg_inf;
        let mut v_h_diag = shift_left(h_prev[last_seg], h_left_prev);
        let prof_base = tb as usize * seg_len;
        // H in the virtual column left of the query for this row.
        let h_left = (-gaps.run(t_idx + 1)) as i16;
        v_f = v_f.max(shift_left(v_neg_inf, h_left) - v_gap_o);

        for i in 0..seg_len {
            let v_h_old = h_prev[i];
            let v_e = e[i];

            let mut v_h = v_h_diag + profile[prof_base + i];
            v_h = v_h.max(v_e).max(v_f);
            if i == last_seg && needs_mask {
                v_h = v_h.min(v_clamp);
            }
            h[i] = v_h;

            let v_h_gap = v_h - v_gap_o;
            let mut v_e_new = (v_e - v_gap_e).max(v_h_gap);
            if i == last_seg && needs_mask {
                v_e_new = v_e_new.min(v_clamp);
            }
            e[i] = v_e_new;
            v_f = (v_f - v_gap_e).max(v_h_gap);

            v_h_diag = v_h_old;
        }

        for _ in 0..LANES {
            v_f = shift_left(v_f, neg_inf);
            for i in 0..seg_len {
                let mut v_h_i = h[i].max(v_f);
                if i == last_seg && needs_mask {
                    v_h_i = v_h_i.min(v_clamp);
                }
                h[i] = v_h_i;
                let v_h_gap = v_h_i - v_gap_o;
                let mut v_e_i = e[i].max(v_h_gap);
                if i == last_seg && needs_mask {
                    v_e_i = v_e_i.min(v_clamp);
                }
                e[i] = v_e_i;
                v_f = (v_f - v_gap_e).max(v_h_gap);
            }
        }

        h_left_prev = h_left;
        std::mem::swap(&mut h_prev, &mut h);
    }

    let last_idx = m - 1;
    let seg = last_idx % seg_len;
    let lane = last_idx / seg_len;
    h_prev[seg].to_array()[lane] as i32
}
