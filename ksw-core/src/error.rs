use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::align::types::{BackendKind, Mode};

#[derive(Debug, Error)]
pub enum KswError {
    #[error("Alignment mode (-M) was not valid ([0-3]), found {value}.")]
    InvalidMode { value: i32 },

    #[error("Backend (-B) was not valid (banded or vectorized), found '{value}'.")]
    InvalidBackend { value: String },

    #[error("{name} ({flag}) must be {requirement}, found {value}.")]
    InvalidParameter {
        name: &'static str,
        flag: &'static str,
        requirement: &'static str,
        value: i32,
    },

    #[error("Alignment mode (-M) {mode} is not supported by the {backend} backend.")]
    UnsupportedMode { mode: Mode, backend: BackendKind },

    #[error("{name} ({flag}) requires the banded backend, found {backend}.")]
    BandedOnly {
        name: &'static str,
        flag: &'static str,
        backend: BackendKind,
    },

    #[error("could not open scoring matrix {path}: {source}")]
    MatrixOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("error reading scoring matrix: {0}")]
    MatrixIo(#[source] io::Error),

    #[error("invalid scoring matrix value '{token}' at line {line}")]
    MatrixParse { token: String, line: usize },

    #[error("Too many values in scoring matrix (want 16 or 25)")]
    MatrixTooManyValues,

    #[error("Incorrect # of values (found {found}, want 16 or 25) in scoring matrix")]
    MatrixValueCount { found: usize },

    #[error(
        "Bug: prev_score: {first} new_score: {second}\n\
         \tqlb: {query_begin} qle: {query_end} tlb: {target_begin} tle: {target_end}\n\
         \tquery: {query}\n\
         \ttarget: {target}"
    )]
    ScoreMismatch {
        first: i32,
        second: i32,
        query_begin: usize,
        query_end: usize,
        target_begin: usize,
        target_end: usize,
        query: String,
        target: String,
    },

    #[error("input error: {0}")]
    Io(#[from] io::Error),

    #[error("output error: {0}")]
    Output(#[from] csv::Error),
}

impl KswError {
    /// True for failures of the dispatcher's own invariants rather than bad input.
    pub fn is_internal(&self) -> bool {
        matches!(self, KswError::ScoreMismatch { .. })
    }
}

pub type KswResult<T> = Result<T, KswError>;
