//! Purpose: Library crate behind the `least` CLI: path-addressed assign, pluck and accumulate helpers.
//! Exports: `api` (helpers, path descriptors, the `PathAccessor` seam, errors).
//! Role: Small, synchronous building blocks meant to be used as callbacks and fold steps.
//! Invariants: Helpers mutate only the target or accumulator they are handed.
//! Invariants: Library code does not log; the binary owns tracing setup.
pub mod api;
mod core;
