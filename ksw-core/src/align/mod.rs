pub mod backend;
pub mod cigar;
pub mod coords;
pub mod dispatch;
pub mod encode;
pub mod kernels;
pub mod matrix;
pub mod types;
pub mod validate;
pub mod workspace;

pub use coords::CoordFormat;
pub use dispatch::Aligner;
pub use encode::{decode_nt4, encode_nt4, EncodedSeq};
pub use matrix::ScoringMatrix;
pub use types::{
    AlignmentParams, AlignmentResult, BackendKind, Cigar, CigarOp, Extent, Mode, Span,
};
pub use validate::{validate, ValidatedConfig};

#[cfg(test)]
mod tests;
