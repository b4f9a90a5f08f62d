//! Umbrella crate for the `layered-crf` workspace.
//!
//! Re-exports the grid primitives, the graph-store contract, the default
//! models and the layered builder, so a single dependency covers building,
//! filling and sampling a layered grid model.

pub use lgm_core::*;
pub use lgm_graph::*;
pub use lgm_layered::*;
pub use lgm_train::*;
