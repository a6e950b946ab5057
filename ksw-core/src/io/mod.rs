pub mod pairs;
pub mod writer;

pub use pairs::{PairReader, SeqPair};
pub use writer::{OutputOptions, ResultWriter};
