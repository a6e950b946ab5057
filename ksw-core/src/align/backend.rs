use log::debug;

use super::kernels::banded::{banded_extend, banded_global};
use super::kernels::{scalar_ref, Gaps};
use super::matrix::ScoringMatrix;
use super::types::{AlignmentParams, BackendKind, Cigar, CigarOp, Mode};
use super::workspace::Workspace;
use crate::error::{KswError, KswResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RawKind {
    Local,
    Global,
    /// One-sided extension from the start of both sequences.
    Extend,
}

#[derive(Clone, Copy, Debug)]
pub struct RawRequest<'a> {
    pub kind: RawKind,
    pub query: &'a [u8],
    pub target: &'a [u8],
    /// Ask for an edit script. Only honored by global requests.
    pub edits: bool,
}

#[derive(Debug, PartialEq, Eq)]
pub enum RawEdits<'w> {
    /// One op per aligned base, borrowed from the workspace.
    PerBase(&'w [CigarOp]),
    RunLength(Cigar),
}

#[derive(Debug, PartialEq, Eq)]
pub struct RawResult<'w> {
    pub score: i32,
    pub query_begin: i32,
    pub query_end: i32,
    pub target_begin: i32,
    pub target_end: i32,
    /// Extension only: best score with the whole query consumed, -1 if never reached.
    pub end_score: Option<i32>,
    pub edits: Option<RawEdits<'w>>,
}

impl RawResult<'_> {
    fn unreached(score: i32) -> Self {
        Self {
            score,
            query_begin: -1,
            query_end: -1,
            target_begin: -1,
            target_end: -1,
            end_score: None,
            edits: None,
        }
    }

    /// True when all four coordinates were reached.
    pub fn reached(&self) -> bool {
        self.query_begin >= 0
            && self.query_end >= 0
            && self.target_begin >= 0
            && self.target_end >= 0
    }
}

/// Last zero-based offset of a sequence, -1 when empty.
fn last_index(len: usize) -> i32 {
    len as i32 - 1
}

#[derive(Clone, Debug)]
pub struct BandedBackend {
    gaps: Gaps,
    band_width: usize,
    zdrop: Option<i32>,
    right_align: bool,
    start_score: i32,
}

impl BandedBackend {
    pub fn new(params: &AlignmentParams) -> Self {
        Self {
            gaps: Gaps::new(params.gap_open, params.gap_extend),
            band_width: usize::try_from(params.band_width).unwrap_or(0),
            zdrop: params.zdrop,
            right_align: params.right_align_gaps,
            start_score: params.start_score,
        }
    }

    fn raw_align<'w>(
        &self,
        matrix: &ScoringMatrix,
        req: RawRequest<'_>,
        ws: &'w mut Workspace,
    ) -> KswResult<RawResult<'w>> {
        match req.kind {
            RawKind::Local => Err(KswError::UnsupportedMode {
                mode: Mode::Local,
                backend: BackendKind::Banded,
            }),
            RawKind::Global => {
                let (score, cigar) = banded_global(
                    req.query,
                    req.target,
                    matrix,
                    self.gaps,
                    self.band_width,
                    self.right_align,
                    ws,
                );
                Ok(RawResult {
                    score,
                    query_begin: 0,
                    query_end: last_index(req.query.len()),
                    target_begin: 0,
                    target_end: last_index(req.target.len()),
                    end_score: None,
                    edits: req.edits.then_some(RawEdits::RunLength(cigar)),
                })
            }
            RawKind::Extend => {
                let hit = banded_extend(
                    req.query,
                    req.target,
                    matrix,
                    self.gaps,
                    self.band_width,
                    self.zdrop,
                    self.start_score,
                    ws,
                );
                let begin = if hit.query_end < 0 { -1 } else { 0 };
                Ok(RawResult {
                    score: hit.best,
                    query_begin: begin,
                    query_end: hit.query_end,
                    target_begin: begin,
                    target_end: hit.target_end,
                    end_score: Some(hit.end_score),
                    edits: None,
                })
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct VectorizedBackend {
    gaps: Gaps,
}

impl VectorizedBackend {
    pub fn new(params: &AlignmentParams) -> Self {
        Self {
            gaps: Gaps::new(params.gap_open, params.gap_extend),
        }
    }

    fn local_score(
        &self,
        matrix: &ScoringMatrix,
        query: &[u8],
        target: &[u8],
        ws: &mut Workspace,
    ) -> (i32, usize, usize) {
        #[cfg(feature = "simd")]
        {
            if super::kernels::simd_safe(query.len(), target.len(), matrix, self.gaps) {
                return super::kernels::local_simd::align_local_score(
                    query, target, matrix, self.gaps,
                );
            }
        }
        scalar_ref::local_score(query, target, matrix, self.gaps, ws)
    }

    fn raw_align<'w>(
        &self,
        matrix: &ScoringMatrix,
        req: RawRequest<'_>,
        ws: &'w mut Workspace,
    ) -> KswResult<RawResult<'w>> {
        match req.kind {
            RawKind::Extend => Err(KswError::UnsupportedMode {
                mode: Mode::Extension,
                backend: BackendKind::Vectorized,
            }),
            RawKind::Local => {
                let (score, qe, te) = self.local_score(matrix, req.query, req.target, ws);
                if score <= 0 {
                    return Ok(RawResult::unreached(score.max(0)));
                }
                // The start is where a backward pass from the end first
                // recovers the full score.
                let (rq, rt) = ws.take_reversed(&req.query[..=qe], &req.target[..=te]);
                let start = scalar_ref::anchored_reach(&rq, &rt, matrix, self.gaps, score, ws);
                ws.restore_reversed(rq, rt);
                let Some((dq, dt)) = start else {
                    return Ok(RawResult::unreached(score));
                };
                Ok(RawResult {
                    score,
                    query_begin: (qe - dq) as i32,
                    query_end: qe as i32,
                    target_begin: (te - dt) as i32,
                    target_end: te as i32,
                    end_score: None,
                    edits: None,
                })
            }
            RawKind::Global => {
                let (m, n) = (req.query.len(), req.target.len());
                let mut result = RawResult {
                    score: 0,
                    query_begin: 0,
                    query_end: last_index(m),
                    target_begin: 0,
                    target_end: last_index(n),
                    end_score: None,
                    edits: None,
                };
                #[cfg(feature = "simd")]
                {
                    let safe = super::kernels::simd_safe(m, n, matrix, self.gaps);
                    if !req.edits && m > 0 && n > 0 && safe {
                        result.score = super::kernels::global_simd::align_global_score(
                            req.query,
                            req.target,
                            matrix,
                            self.gaps,
                        );
                        return Ok(result);
                    }
                }
                result.score =
                    scalar_ref::global_traceback(req.query, req.target, matrix, self.gaps, ws);
                if req.edits {
                    result.edits = Some(RawEdits::PerBase(ws.ops.as_slice()));
                }
                Ok(result)
            }
        }
    }
}

/// Closed set of backends, chosen once per run.
#[derive(Clone, Debug)]
pub enum Backend {
    Banded(BandedBackend),
    Vectorized(VectorizedBackend),
}

impl Backend {
    pub fn new(kind: BackendKind, params: &AlignmentParams) -> Self {
        debug!("using {} backend", kind);
        match kind {
            BackendKind::Banded => Backend::Banded(BandedBackend::new(params)),
            BackendKind::Vectorized => Backend::Vectorized(VectorizedBackend::new(params)),
        }
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            Backend::Banded(_) => BackendKind::Banded,
            Backend::Vectorized(_) => BackendKind::Vectorized,
        }
    }

    pub fn raw_align<'w>(
        &self,
        matrix: &ScoringMatrix,
        req: RawRequest<'_>,
        ws: &'w mut Workspace,
    ) -> KswResult<RawResult<'w>> {
        match self {
            Backend::Banded(b) => b.raw_align(matrix, req, ws),
            Backend::Vectorized(v) => v.raw_align(matrix, req, ws),
        }
    }
}
