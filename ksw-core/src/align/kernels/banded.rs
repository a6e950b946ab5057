use super::{Gaps, DIR_DEL, DIR_DIAG, DIR_INS, DIR_MASK, E_EXTENDED, F_EXTENDED, NEG_INF};
use crate::align::matrix::ScoringMatrix;
use crate::align::types::{Cigar, CigarOp};
use crate::align::workspace::Workspace;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExtendHit {
    /// Best score over all cells, including the start score.
    pub best: i32,
    /// Zero-based query offset of `best`, or -1 if nothing beat the start.
    pub query_end: i32,
    /// Zero-based target offset of `best`, or -1 if nothing beat the start.
    pub target_end: i32,
    /// Best score with the whole query consumed, or -1 if never reached.
    /// Unlike klib's `gscore` it is not floored at zero, so it may be negative.
    pub end_score: i32,
    /// Target offset of `end_score`, or -1.
    pub end_target: i32,
}

#[inline]
fn band_lo(i: usize, w: usize) -> usize {
    i.saturating_sub(w)
}

#[inline]
fn band_hi(i: usize, w: usize, m: usize) -> usize {
    i.saturating_add(w).min(m)
}

/// Banded Needleman-Wunsch with traceback, emitting a run-length CIGAR.
///
/// The band is widened to `|m - n|` when narrower so the end cell is always
/// reachable. With `right_align` set, gaps win ties against the diagonal so
/// they land at their rightmost equivalent position.
pub fn banded_global(
    query: &[u8],
    target: &[u8],
    matrix: &ScoringMatrix,
    gaps: Gaps,
    band_width: usize,
    right_align: bool,
    ws: &mut Workspace,
) -> (i32, Cigar) {
    let m = query.len();
    let n = target.len();
    let w = band_width.max(m.abs_diff(n));
    let width = (2 * w + 1).min(m + 1);

    let (h_row, e_row, trace) = ws.rows_with_trace(m + 1, NEG_INF, NEG_INF, (n + 1) * width);
    h_row[0] = 0;
    for (j, h) in h_row.iter_mut().enumerate().take(band_hi(0, w, m) + 1).skip(1) {
        *h = -gaps.run(j);
    }

    for i in 1..=n {
        let t = target[i - 1];
        let lo = band_lo(i, w);
        let hi = band_hi(i, w, m);
        let (mut h_diag, mut h_left, start) = if lo == 0 {
            let boundary = -gaps.run(i);
            let diag = h_row[0];
            h_row[0] = boundary;
            (diag, boundary, 1)
        } else {
            (h_row[lo - 1], NEG_INF, lo)
        };
        let mut f = NEG_INF;
        for j in start..=hi {
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
            let take_del = if right_align { e_row[j] >= h } else { e_row[j] > h };
            if take_del {
                h = e_row[j];
                d = DIR_DEL;
            }
            let take_ins = if right_align { f >= h } else { f > h };
            if take_ins {
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
            trace[i * width + (j - lo)] = bits;
            h_row[j] = h;
            h_diag = h_up;
            h_left = h;
        }
    }
    let score = h_row[m];

    let mut rev = Cigar::default();
    let mut i = n;
    let mut j = m;
    let mut state = 0u8; // 0=H, 1=E(Del), 2=F(Ins)
    while i > 0 || j > 0 {
        if i == 0 {
            rev.push(CigarOp::Ins, j);
            break;
        }
        if j == 0 {
            rev.push(CigarOp::Del, i);
            break;
        }
        let bits = trace[i * width + (j - band_lo(i, w))];
        match state {
            0 => match bits & DIR_MASK {
                DIR_DEL => state = 1,
                DIR_INS => state = 2,
                _ => {
                    rev.push(CigarOp::Match, 1);
                    i -= 1;
                    j -= 1;
                }
            },
            1 => {
                rev.push(CigarOp::Del, 1);
                i -= 1;
                if bits & E_EXTENDED == 0 {
                    state = 0;
                }
            }
            _ => {
                rev.push(CigarOp::Ins, 1);
                j -= 1;
                if bits & F_EXTENDED == 0 {
                    state = 0;
                }
            }
        }
    }
    rev.ops.reverse();
    (score, rev)
}

/// Extends from the start of both sequences given an upstream score `h0`.
///
/// Each cell holds `h0` plus the best global score of the two prefixes
/// (within the band). With `zdrop` set, extension stops once the best score
/// of a row falls more than `zdrop` below the running best, after
/// discounting the diagonal offset between the two cells.
#[allow(clippy::too_many_arguments)]
pub fn banded_extend(
    query: &[u8],
    target: &[u8],
    matrix: &ScoringMatrix,
    gaps: Gaps,
    band_width: usize,
    zdrop: Option<i32>,
    h0: i32,
    ws: &mut Workspace,
) -> ExtendHit {
    let m = query.len();
    let n = target.len();
    let w = band_width;
    let mut hit = ExtendHit {
        best: h0,
        query_end: -1,
        target_end: -1,
        end_score: -1,
        end_target: -1,
    };
    if m == 0 || n == 0 {
        return hit;
    }

    let (h_row, e_row) = ws.rows(m + 1, NEG_INF, NEG_INF);
    h_row[0] = h0;
    for (j, h) in h_row.iter_mut().enumerate().take(band_hi(0, w, m) + 1).skip(1) {
        *h = h0 - gaps.run(j);
    }

    let mut end_seen = false;
    for i in 1..=n {
        let t = target[i - 1];
        let lo = band_lo(i, w);
        let hi = band_hi(i, w, m);
        if lo > hi {
            break;
        }
        let (mut h_diag, mut h_left, start) = if lo == 0 {
            let boundary = h0 - gaps.run(i);
            let diag = h_row[0];
            h_row[0] = boundary;
            (diag, boundary, 1)
        } else {
            (h_row[lo - 1], NEG_INF, lo)
        };
        let mut f = NEG_INF;
        let mut row_max = NEG_INF;
        let mut row_j = 0usize;
        for j in start..=hi {
            let h_up = h_row[j];
            e_row[j] = (e_row[j] - gaps.extend).max(h_up - gaps.first());
            f = (f - gaps.extend).max(h_left - gaps.first());
            let h = (h_diag + matrix.score(query[j - 1], t))
                .max(e_row[j])
                .max(f);
            h_row[j] = h;
            if h > row_max {
                row_max = h;
                row_j = j;
            }
            h_diag = h_up;
            h_left = h;
        }

        if hi == m && (!end_seen || h_row[m] > hit.end_score) {
            end_seen = true;
            hit.end_score = h_row[m];
            hit.end_target = (i - 1) as i32;
        }

        if row_max > hit.best {
            hit.best = row_max;
            hit.query_end = row_j as i32 - 1;
            hit.target_end = i as i32 - 1;
        } else if let Some(zdrop) = zdrop {
            let di = (i as i32 - 1) - hit.target_end;
            let dj = (row_j as i32 - 1) - hit.query_end;
            let drop = if di > dj {
                hit.best - row_max - (di - dj) * gaps.extend
            } else {
                hit.best - row_max - (dj - di) * gaps.extend
            };
            if drop > zdrop {
                break;
            }
        }
    }
    hit
}
