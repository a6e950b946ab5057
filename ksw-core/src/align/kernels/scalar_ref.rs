//! Full-matrix scalar kernels: the reference recurrence for the vectorized
//! backend and its traceback path.

use super::{Gaps, DIR_DEL, DIR_DIAG, DIR_INS, DIR_MASK, E_EXTENDED, F_EXTENDED, NEG_INF};
use crate::align::matrix::ScoringMatrix;
use crate::align::types::CigarOp;
use crate::align::workspace::Workspace;

/// Smith-Waterman score pass; same contract as the striped kernel.
pub fn local_score(
    query: &[u8],
    target: &[u8],
    matrix: &ScoringMatrix,
    gaps: Gaps,
    ws: &mut Workspace,
) -> (i32, usize, usize) {
    let m = query.len();
    if m == 0 || target.is_empty() {
        return (0, 0, 0);
    }
    let (h_row, e_row) = ws.rows(m + 1, 0, NEG_INF);

    let mut max_score = 0;
    let mut end_i = 0usize;
    let mut end_j = 0usize;

    for (i, &t) in target.iter().enumerate() {
        let mut h_diag = 0;
        let mut h_left = 0;
        let mut f = NEG_INF;
        for j in 1..=m {
            let h_up = h_row[j];
            e_row[j] = (e_row[j] - gaps.extend).max(h_up - gaps.first());
            f = (f - gaps.extend).max(h_left - gaps.first());
            let h = (h_diag + matrix.score(query[j - 1], t))
                .max(e_row[j])
                .max(f)
                .max(0);
            h_row[j] = h;
            if h > max_score {
                max_score = h;
                end_i = i;
                end_j = j - 1;
            }
            h_diag = h_up;
            h_left = h;
        }
    }

    (max_score, end_j, end_i)
}

/// Global-from-origin DP; returns the first cell (target-major) whose score
/// reaches `goal`, as zero-based (query, target) offsets.
pub fn anchored_reach(
    query: &[u8],
    target: &[u8],
    matrix: &ScoringMatrix,
    gaps: Gaps,
    goal: i32,
    ws: &mut Workspace,
) -> Option<(usize, usize)> {
    let m = query.len();
    let (h_row, e_row) = ws.rows(m + 1, NEG_INF, NEG_INF);
    h_row[0] = 0;
    for (j, h) in h_row.iter_mut().enumerate().skip(1) {
        *h = -gaps.run(j);
    }

    for (i, &t) in target.iter().enumerate() {
        let mut h_diag = h_row[0];
        let mut h_left = -gaps.run(i + 1);
        h_row[0] = h_left;
        let mut f = NEG_INF;
        for j in 1..=m {
            let h_up = h_row[j];
            e_row[j] = (e_row[j] - gaps.extend).max(h_up - gaps.first());
            f = (f - gaps.extend).max(h_left - gaps.first());
            let h = (h_diag + matrix.score(query[j - 1], t))
                .max(e_row[j])
                .max(f);
            h_row[j] = h;
            if h >= goal {
                return Some((j - 1, i));
            }
            h_diag = h_up;
            h_left = h;
        }
    }
    None
}

/// Needleman-Wunsch with traceback. Leaves one op per aligned base, in
/// forward order, in `ws.ops` and returns the score.
///
/// Tie-breaking: DIAG > DEL > INS when choosing H, open > extend for gaps.
pub fn global_traceback(
    query: &[u8],
    target: &[u8],
    matrix: &ScoringMatrix,
    gaps: Gaps,
    ws: &mut Workspace,
) -> i32 {
    let m = query.len();
    let n = target.len();
    let width = m + 1;
    let score;
    {
        let (h_row, e_row, trace) = ws.rows_with_trace(width, NEG_INF, NEG_INF, (n + 1) * width);
        h_row[0] = 0;
        for (j, h) in h_row.iter_mut().enumerate().skip(1) {
            *h = -gaps.run(j);
        }

        for i in 1..=n {
            let t = target[i - 1];
            let mut h_diag = h_row[0];
            let mut h_left = -gaps.run(i);
            h_row[0] = h_left;
            let mut f = NEG_INF;
            for j in 1..=m {
                let h_up = h_row[j];
                let e_ext = e_row[j] - gaps.extend;
                let e_open = h_up - gaps.first();
                let e_from_ext = e_ext > e_open;
                e_row[j] = if e_from_ext { e_ext } else { e_open };
                let f_ext = f - gaps.extend;
                let f_open = h_left - gaps.first();
                let f_from_ext = f_ext > f_open;
                f = if f_from_ext { f_ext } else { f_open };

                let mut h = h_diag + matrix.score(query[j - 1], t);
                let mut d = DIR_DIAG;
                if e_row[j] > h {
                    h = e_row[j];
                    d = DIR_DEL;
                }
                if f > h {
                    h = f;
                    d = DIR_INS;
                }
                let mut bits = d;
                if e_from_ext {
                    bits |= E_EXTENDED;
                }
                if f_from_ext {
                    bits |= F_EXTENDED;
                }
                trace[i * width + j] = bits;
                h_row[j] = h;
                h_diag = h_up;
                h_left = h;
            }
        }
        score = h_row[m];
    }

    ws.reserve_ops(m + n);
    let Workspace { trace, ops, .. } = ws;
    let mut i = n;
    let mut j = m;
    // State: 0 = in H, 1 = in E (Del), 2 = in F (Ins)
    let mut state = 0u8;
    while i > 0 || j > 0 {
        if i == 0 {
            ops.extend(std::iter::repeat(CigarOp::Ins).take(j));
            break;
        }
        if j == 0 {
            ops.extend(std::iter::repeat(CigarOp::Del).take(i));
            break;
        }
        let bits = trace[i * width + j];
        match state {
            0 => match bits & DIR_MASK {
                DIR_DEL => state = 1,
                DIR_INS => state = 2,
                _ => {
                    ops.push(CigarOp::Match);
                    i -= 1;
                    j -= 1;
                }
            },
            1 => {
                ops.push(CigarOp::Del);
                i -= 1;
                if bits & E_EXTENDED == 0 {
                    state = 0;
                }
            }
            _ => {
                ops.push(CigarOp::Ins);
                j -= 1;
                if bits & F_EXTENDED == 0 {
                    state = 0;
                }
            }
        }
    }
    ops.reverse();
    score
}

/// Re-scores an alignment from its CIGAR under the affine model.
pub fn score_cigar(
    query: &[u8],
    target: &[u8],
    ops: &[(CigarOp, usize)],
    matrix: &ScoringMatrix,
    gaps: Gaps,
) -> i32 {
    let mut qi = 0usize;
    let mut ti = 0usize;
    let mut score = 0;
    for &(op, len) in ops {
        match op {
            CigarOp::Match => {
                for _ in 0..len {
                    score += matrix.score(query[qi], target[ti]);
                    qi += 1;
                    ti += 1;
                }
            }
            CigarOp::Ins => {
                score -= gaps.run(len);
                qi += len;
            }
            CigarOp::Del => {
                score -= gaps.run(len);
                ti += len;
            }
        }
    }
    score
}
