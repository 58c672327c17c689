//! Per-evaluation scratch directories and the source files written into them.

mod source;
mod workspace;

pub use source::*;
pub use workspace::*;
