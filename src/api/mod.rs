//! Purpose: Define the public Rust API boundary for least.
//! Exports: The three path helpers plus the path, accessor and error types they use.
//! Role: Public, additive-only surface; `core` stays private behind these re-exports.
//! Invariants: Helpers only talk to containers through `PathAccessor`.
//! Invariants: Helpers never catch, wrap, or log accessor errors.

mod accumulate;
mod assign;
mod pluck;

pub use crate::core::accessor::{JsonAccessor, MAX_INDEX_GAP, PathAccessor};
#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::path::{IntoPath, PathDescriptor, Segment};
pub use accumulate::{Accumulator, accumulate};
pub use assign::{Assigner, assign};
pub use pluck::{Plucker, pluck_and_assign};
