use log::{debug, error, trace};

use super::backend::{Backend, RawEdits, RawKind, RawRequest, RawResult};
use super::cigar::{normalize, trim_deletion_flanks};
use super::encode::{decode_nt4, EncodedSeq};
use super::kernels::Gaps;
use super::matrix::ScoringMatrix;
use super::types::{AlignmentResult, Cigar, Extent, Mode, Span};
use super::validate::ValidatedConfig;
use super::workspace::Workspace;
use crate::error::{KswError, KswResult};

/// Aligns pairs under one validated configuration, reusing its workspace.
pub struct Aligner {
    matrix: ScoringMatrix,
    config: ValidatedConfig,
    backend: Backend,
    ws: Workspace,
}

fn run_length(edits: Option<RawEdits<'_>>) -> Cigar {
    match edits {
        Some(RawEdits::PerBase(ops)) => normalize(ops),
        Some(RawEdits::RunLength(cigar)) => cigar,
        None => Cigar::default(),
    }
}

fn extent_of(raw: &RawResult<'_>) -> Option<Extent> {
    if !raw.reached() || raw.query_begin > raw.query_end || raw.target_begin > raw.target_end {
        return None;
    }
    Some(Extent {
        query: Span::new(raw.query_begin as usize, raw.query_end as usize),
        target: Span::new(raw.target_begin as usize, raw.target_end as usize),
    })
}

fn no_alignment(score: i32, want_cigar: bool) -> AlignmentResult {
    AlignmentResult {
        score,
        extent: None,
        cigar: want_cigar.then(Cigar::default),
    }
}

impl Aligner {
    pub fn new(matrix: ScoringMatrix, config: ValidatedConfig) -> Self {
        let backend = Backend::new(config.backend(), config.params());
        debug!(
            "aligner ready: mode {}, backend {}",
            config.mode(),
            backend.kind()
        );
        Self {
            matrix,
            config,
            backend,
            ws: Workspace::new(),
        }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.ws
    }

    /// Aligns one pair. The only error is a failed internal cross-check.
    pub fn align(
        &mut self,
        query: &EncodedSeq,
        target: &EncodedSeq,
        want_cigar: bool,
    ) -> KswResult<AlignmentResult> {
        trace!(
            "aligning query of {} bases against target of {} bases",
            query.len(),
            target.len()
        );
        let (q, t) = (query.codes(), target.codes());
        match self.config.mode() {
            Mode::Local => self.align_local(q, t, want_cigar),
            Mode::Glocal => self.align_glocal(q, t, want_cigar),
            Mode::Extension => self.align_extension(q, t, want_cigar),
            Mode::Global => self.align_global(q, t, want_cigar),
        }
    }

    fn align_local(&mut self, q: &[u8], t: &[u8], want_cigar: bool) -> KswResult<AlignmentResult> {
        let req = RawRequest {
            kind: RawKind::Local,
            query: q,
            target: t,
            edits: false,
        };
        let raw = self.backend.raw_align(&self.matrix, req, &mut self.ws)?;
        let score = raw.score;
        let Some(extent) = extent_of(&raw).filter(|_| score > 0) else {
            return Ok(no_alignment(score, want_cigar));
        };
        let cigar = if want_cigar {
            Some(self.realign_window(score, 0, q, t, extent)?)
        } else {
            None
        };
        Ok(AlignmentResult {
            score,
            extent: Some(extent),
            cigar,
        })
    }

    fn align_glocal(&mut self, q: &[u8], t: &[u8], want_cigar: bool) -> KswResult<AlignmentResult> {
        let req = RawRequest {
            kind: RawKind::Global,
            query: q,
            target: t,
            edits: true,
        };
        let raw = self.backend.raw_align(&self.matrix, req, &mut self.ws)?;
        let global_score = raw.score;
        let mut cigar = run_length(raw.edits);

        let trim = trim_deletion_flanks(&mut cigar);
        let params = self.config.params();
        let score = global_score + trim.refund(Gaps::new(params.gap_open, params.gap_extend));
        let (_, target_used) = cigar.consumed();
        let extent = if q.is_empty() || target_used == 0 {
            None
        } else {
            Some(Extent {
                query: Span::new(0, q.len() - 1),
                target: Span::new(trim.leading, trim.leading + target_used - 1),
            })
        };
        Ok(AlignmentResult {
            score,
            extent,
            cigar: want_cigar.then_some(cigar),
        })
    }

    fn align_extension(
        &mut self,
        q: &[u8],
        t: &[u8],
        want_cigar: bool,
    ) -> KswResult<AlignmentResult> {
        let req = RawRequest {
            kind: RawKind::Extend,
            query: q,
            target: t,
            edits: false,
        };
        let raw = self.backend.raw_align(&self.matrix, req, &mut self.ws)?;
        let best = raw.score;
        let end_score = raw.end_score.unwrap_or(-1);
        let Some(extent) = extent_of(&raw) else {
            return Ok(no_alignment(end_score, want_cigar));
        };
        let cigar = if want_cigar {
            let h0 = self.config.params().start_score;
            Some(self.realign_window(best, h0, q, t, extent)?)
        } else {
            None
        };
        Ok(AlignmentResult {
            score: best,
            extent: Some(extent),
            cigar,
        })
    }

    fn align_global(&mut self, q: &[u8], t: &[u8], want_cigar: bool) -> KswResult<AlignmentResult> {
        let req = RawRequest {
            kind: RawKind::Global,
            query: q,
            target: t,
            edits: want_cigar,
        };
        let raw = self.backend.raw_align(&self.matrix, req, &mut self.ws)?;
        let extent = extent_of(&raw);
        let score = raw.score;
        let cigar = want_cigar.then(|| run_length(raw.edits));
        Ok(AlignmentResult {
            score,
            extent,
            cigar,
        })
    }

    /// Globally re-aligns the window a score pass reported and checks that
    /// it reproduces `score` (less the start score `h0`).
    fn realign_window(
        &mut self,
        score: i32,
        h0: i32,
        q: &[u8],
        t: &[u8],
        extent: Extent,
    ) -> KswResult<Cigar> {
        let (qs, ts) = (extent.query, extent.target);
        let (wq, wt) = (&q[qs.begin..=qs.end], &t[ts.begin..=ts.end]);
        let req = RawRequest {
            kind: RawKind::Global,
            query: wq,
            target: wt,
            edits: true,
        };
        let raw = self.backend.raw_align(&self.matrix, req, &mut self.ws)?;
        if raw.score != score - h0 {
            let err = KswError::ScoreMismatch {
                first: score - h0,
                second: raw.score,
                query_begin: qs.begin,
                query_end: qs.end,
                target_begin: ts.begin,
                target_end: ts.end,
                query: decode_nt4(wq),
                target: decode_nt4(wt),
            };
            error!("{err}");
            return Err(err);
        }
        Ok(run_length(raw.edits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::encode::encode_nt4;
    use crate::align::types::AlignmentParams;
    use crate::align::validate::validate;

    fn aligner(mode: Mode, backend: Option<&str>, params: AlignmentParams) -> Aligner {
        let matrix = ScoringMatrix::build(params.match_score as i8, params.mismatch as i8);
        Aligner::new(matrix, validate(mode as i32, backend, params).unwrap())
    }

    fn run(a: &mut Aligner, q: &str, t: &str) -> AlignmentResult {
        a.align(&encode_nt4(q.as_bytes()), &encode_nt4(t.as_bytes()), true)
            .unwrap()
    }

    #[test]
    fn local_window_and_cigar() {
        let mut a = aligner(Mode::Local, None, AlignmentParams::default());
        let res = run(&mut a, "TTACGTACGTTT", "GACGTACGTG");
        assert_eq!(res.score, 8);
        let ext = res.extent.unwrap();
        assert_eq!((ext.query.begin, ext.query.end), (2, 9));
        assert_eq!((ext.target.begin, ext.target.end), (1, 8));
        assert_eq!(res.cigar.unwrap().to_string(), "8M");
    }

    #[test]
    fn local_nothing_positive() {
        let mut a = aligner(Mode::Local, None, AlignmentParams::default());
        let res = run(&mut a, "AAAA", "CCCC");
        assert_eq!(res.score, 0);
        assert_eq!(res.extent, None);
        assert_eq!(res.cigar, Some(Cigar::default()));
    }

    #[test]
    fn local_without_cigar_skips_realignment() {
        let mut a = aligner(Mode::Local, None, AlignmentParams::default());
        let res = a
            .align(&encode_nt4(b"ACGT"), &encode_nt4(b"ACGT"), false)
            .unwrap();
        assert_eq!(res.score, 4);
        assert_eq!(res.cigar, None);
    }

    #[test]
    fn glocal_trims_target_flanks() {
        let mut a = aligner(Mode::Glocal, None, AlignmentParams::default());
        let res = run(&mut a, "CGT", "ACGTA");
        let ext = res.extent.unwrap();
        assert_eq!((ext.query.begin, ext.query.end), (0, 2));
        assert_eq!((ext.target.begin, ext.target.end), (1, 3));
        assert_eq!(res.score, 3);
        assert_eq!(res.cigar.unwrap().to_string(), "3M");
    }

    #[test]
    fn extension_start_score_carried() {
        let params = AlignmentParams::default().with_start_score(10);
        let mut a = aligner(Mode::Extension, None, params);
        let res = run(&mut a, "ACGTGGGG", "ACGTCCCC");
        assert_eq!(res.score, 14);
        let ext = res.extent.unwrap();
        assert_eq!((ext.query.end, ext.target.end), (3, 3));
        assert_eq!(res.cigar.unwrap().to_string(), "4M");
    }

    #[test]
    fn global_empty_target_is_one_gap() {
        let mut a = aligner(Mode::Global, Some("banded"), AlignmentParams::default());
        let res = run(&mut a, "ACG", "");
        assert_eq!(res.score, -(5 + 3 * 2));
        assert_eq!(res.extent, None);
        assert_eq!(res.cigar.unwrap().to_string(), "3I");
    }

    #[test]
    fn workspace_reused_across_pairs() {
        let mut a = aligner(Mode::Global, None, AlignmentParams::default());
        run(&mut a, "ACGTACGTACGT", "ACGTACGTACGT");
        let grown = a.workspace().grow_events();
        run(&mut a, "ACGTACGTACGT", "ACGTACGTACGA");
        assert_eq!(a.workspace().grow_events(), grown);
    }

    #[test]
    fn window_score_disagreement_is_reported() {
        let mut a = aligner(Mode::Local, None, AlignmentParams::default());
        let (q, t) = (encode_nt4(b"TTACGTACGTTT"), encode_nt4(b"GACGTACGTG"));
        let res = a.align(&q, &t, false).unwrap();
        let extent = res.extent.unwrap();

        let err = a
            .realign_window(res.score + 1, 0, q.codes(), t.codes(), extent)
            .unwrap_err();
        assert!(err.is_internal());
        let KswError::ScoreMismatch {
            first,
            second,
            query_begin,
            target_end,
            ref query,
            ref target,
            ..
        } = err
        else {
            panic!("expected a score mismatch, got {err:?}");
        };
        assert_eq!((first, second), (9, 8));
        assert_eq!((query_begin, target_end), (2, 8));
        assert_eq!((query.as_str(), target.as_str()), ("ACGTACGT", "ACGTACGT"));

        let msg = err.to_string();
        assert!(msg.contains("prev_score: 9 new_score: 8"), "{msg}");
        assert!(msg.contains("qlb: 2 qle: 9 tlb: 1 tle: 8"), "{msg}");
        assert!(msg.contains("query: ACGTACGT"), "{msg}");
    }

    #[test]
    fn extension_start_score_offsets_window_check() {
        let params = AlignmentParams::default().with_start_score(10);
        let mut a = aligner(Mode::Extension, None, params);
        let (q, t) = (encode_nt4(b"ACGT"), encode_nt4(b"ACGT"));
        let extent = a.align(&q, &t, false).unwrap().extent.unwrap();
        assert!(a.realign_window(14, 10, q.codes(), t.codes(), extent).is_ok());
        let err = a
            .realign_window(14, 0, q.codes(), t.codes(), extent)
            .unwrap_err();
        assert!(matches!(err, KswError::ScoreMismatch { first: 14, second: 4, .. }));
    }
}
