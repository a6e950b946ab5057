use std::fmt;
use std::str::FromStr;

use crate::error::KswError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Best-scoring sub-alignment of both sequences.
    Local = 0,
    /// Whole query against any substring of the target.
    Glocal = 1,
    /// Anchored at the start of both sequences, free end.
    Extension = 2,
    /// Whole query against whole target.
    Global = 3,
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::Local, Mode::Glocal, Mode::Extension, Mode::Global];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Local => "local",
            Mode::Glocal => "glocal",
            Mode::Extension => "extend",
            Mode::Global => "global",
        }
    }
}

impl TryFrom<i32> for Mode {
    type Error = KswError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Mode::Local),
            1 => Ok(Mode::Glocal),
            2 => Ok(Mode::Extension),
            3 => Ok(Mode::Global),
            _ => Err(KswError::InvalidMode { value }),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// Bounded-bandwidth scalar recurrence: extension and global.
    Banded,
    /// Striped SIMD recurrence: local, glocal and global.
    Vectorized,
}

impl BackendKind {
    pub const ALL: [BackendKind; 2] = [BackendKind::Banded, BackendKind::Vectorized];

    pub fn supports(&self, mode: Mode) -> bool {
        match self {
            BackendKind::Banded => matches!(mode, Mode::Extension | Mode::Global),
            BackendKind::Vectorized => matches!(mode, Mode::Local | Mode::Glocal | Mode::Global),
        }
    }

    /// Backend used when none is requested explicitly.
    pub fn default_for(mode: Mode) -> Self {
        match mode {
            Mode::Extension => BackendKind::Banded,
            _ => BackendKind::Vectorized,
        }
    }
}

impl FromStr for BackendKind {
    type Err = KswError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "banded" => Ok(BackendKind::Banded),
            "vectorized" => Ok(BackendKind::Vectorized),
            _ => Err(KswError::InvalidBackend {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Banded => f.write_str("banded"),
            BackendKind::Vectorized => f.write_str("vectorized"),
        }
    }
}

/// CIGAR operations consume sequence coordinates.
/// Ins consumes query (gap in target), Del consumes target (gap in query).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CigarOp {
    /// Consumes query and target; match or mismatch.
    Match,
    /// Consumes query, gap in target.
    Ins,
    /// Consumes target, gap in query.
    Del,
}

impl CigarOp {
    pub fn as_char(&self) -> char {
        match self {
            CigarOp::Match => 'M',
            CigarOp::Ins => 'I',
            CigarOp::Del => 'D',
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Cigar {
    pub ops: Vec<(CigarOp, usize)>,
}

impl Cigar {
    pub fn push(&mut self, op: CigarOp, len: usize) {
        if len == 0 {
            return;
        }
        if let Some((last_op, last_len)) = self.ops.last_mut() {
            if *last_op == op {
                *last_len += len;
                return;
            }
        }
        self.ops.push((op, len));
    }

    pub fn len(&self) -> usize {
        self.ops.iter().map(|(_, n)| *n).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Bases consumed on (query, target).
    pub fn consumed(&self) -> (usize, usize) {
        let mut q = 0usize;
        let mut t = 0usize;
        for &(op, len) in &self.ops {
            match op {
                CigarOp::Match => {
                    q += len;
                    t += len;
                }
                CigarOp::Ins => q += len,
                CigarOp::Del => t += len,
            }
        }
        (q, t)
    }
}

impl fmt::Display for Cigar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ops.is_empty() {
            return f.write_str("*");
        }
        for (op, len) in &self.ops {
            write!(f, "{}{}", len, op.as_char())?;
        }
        Ok(())
    }
}

/// Zero-based inclusive interval on one sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    pub begin: usize,
    pub end: usize,
}

#[allow(clippy::len_without_is_empty)]
impl Span {
    pub fn new(begin: usize, end: usize) -> Self {
        debug_assert!(begin <= end);
        Self { begin, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.begin + 1
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Extent {
    pub query: Span,
    pub target: Span,
}

/// Canonical per-pair result. `extent` is `None` when no alignment exists.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlignmentResult {
    pub score: i32,
    pub extent: Option<Extent>,
    pub cigar: Option<Cigar>,
}

pub const DEFAULT_MATCH: i32 = 1;
pub const DEFAULT_MISMATCH: i32 = 3;
pub const DEFAULT_GAP_OPEN: i32 = 5;
pub const DEFAULT_GAP_EXTEND: i32 = 2;
/// Effectively unbanded; quartered so doubling it cannot overflow.
pub const DEFAULT_BAND_WIDTH: i32 = i32::MAX / 4;

/// Scores and penalties are positive magnitudes; a gap of length `L` costs
/// `gap_open + L * gap_extend`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlignmentParams {
    pub match_score: i32,
    pub mismatch: i32,
    pub gap_open: i32,
    pub gap_extend: i32,
    pub band_width: i32,
    pub zdrop: Option<i32>,
    pub right_align_gaps: bool,
    pub start_score: i32,
}

impl Default for AlignmentParams {
    fn default() -> Self {
        Self {
            match_score: DEFAULT_MATCH,
            mismatch: DEFAULT_MISMATCH,
            gap_open: DEFAULT_GAP_OPEN,
            gap_extend: DEFAULT_GAP_EXTEND,
            band_width: DEFAULT_BAND_WIDTH,
            zdrop: None,
            right_align_gaps: false,
            start_score: 0,
        }
    }
}

impl AlignmentParams {
    pub fn simple(match_score: i32, mismatch: i32, gap_open: i32, gap_extend: i32) -> Self {
        Self {
            match_score,
            mismatch,
            gap_open,
            gap_extend,
            ..Self::default()
        }
    }

    pub fn with_band_width(mut self, band_width: i32) -> Self {
        self.band_width = band_width;
        self
    }

    pub fn with_zdrop(mut self, zdrop: i32) -> Self {
        self.zdrop = Some(zdrop);
        self
    }

    pub fn with_right_align_gaps(mut self, right_align_gaps: bool) -> Self {
        self.right_align_gaps = right_align_gaps;
        self
    }

    pub fn with_start_score(mut self, start_score: i32) -> Self {
        self.start_score = start_score;
        self
    }
}
