//! Pairwise graph storage.
//!
//! [`PairwiseGraph`] is the narrow contract the layered builder writes
//! through: node/edge creation, per-node and per-edge potentials, and a
//! mutable group tag per edge. [`DenseGraph`] is a plain in-memory store
//! implementing it.

mod dense;
mod graph;
mod potential;

pub use dense::DenseGraph;
pub use graph::{EdgeId, EdgeRecord, GroupId, NodeId, PairwiseGraph};
pub use potential::EdgePotential;
