//! Layered pairwise graphical models over a 2D pixel grid.
//!
//! A [`LayeredGraph`] writes a stack of `layers` copies of a `width x height`
//! grid into a borrowed [`PairwiseGraph`](lgm_graph::PairwiseGraph) store:
//! - Node ids are fixed by [`GridIndexer`]; layer 0 is the base layer.
//! - Edge families are chosen with [`EdgeTypes`]: horizontal/vertical
//!   ([`EdgeTypes::GRID`]), both diagonals ([`EdgeTypes::DIAG`]) and links
//!   between the same pixel in adjacent layers ([`EdgeTypes::LINK`]).
//! - Within-layer edges start in [`INTRA_LAYER_GROUP`], links in
//!   [`LINK_GROUP`].
//!
//! On top of the structure the builder fills node potentials from score
//! arrays, fills edge potentials from [`EdgeModel`](lgm_train::EdgeModel) and
//! [`LinkModel`](lgm_train::LinkModel) implementations, regroups edges that
//! cross a straight line, and streams per-edge training samples to an
//! [`EdgeTrainer`](lgm_train::EdgeTrainer).
//!
//! Model-driven operations require a prior [`LayeredGraph::build_graph`] with
//! the size of their inputs; the direct score fills build on demand.

mod fill;
mod groups;
mod indexer;
mod layered;
mod sample;
mod topology;

pub use groups::GroupSelector;
pub use indexer::{GridCoord, GridIndexer};
pub use layered::{LayeredConfig, LayeredGraph};
pub use topology::{EdgeKind, EdgeTypes, INTRA_LAYER_GROUP, LINK_GROUP, edge_count};
