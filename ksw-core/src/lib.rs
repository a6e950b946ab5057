pub mod align;
pub mod error;
pub mod io;

pub use error::{KswError, KswResult};
