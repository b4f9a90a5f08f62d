use lgm_core::Error;

use crate::EdgePotential;

pub type NodeId = usize;
pub type EdgeId = usize;
pub type GroupId = u8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeRecord {
    pub a: NodeId,
    pub b: NodeId,
    pub group: GroupId,
}

/// Storage backend for a pairwise graphical model.
///
/// Node and edge ids are handed out densely in creation order, starting from
/// zero after every [`PairwiseGraph::reset`]. Edge endpoints never change once
/// created; only the group tag and the potentials are mutable.
pub trait PairwiseGraph {
    fn reset(&mut self);

    fn num_nodes(&self) -> usize;

    fn num_edges(&self) -> usize;

    fn add_node(&mut self, num_states: usize) -> NodeId;

    fn node_states(&self, node: NodeId) -> Result<usize, Error>;

    fn add_edge(&mut self, a: NodeId, b: NodeId, group: GroupId) -> Result<EdgeId, Error>;

    /// `pot` must hold one score per state of `node`.
    fn set_node_potential(&mut self, node: NodeId, pot: &[f32]) -> Result<(), Error>;

    /// `pot` must be `states(a) x states(b)` for the edge `(a, b)`.
    fn set_edge_potential(&mut self, edge: EdgeId, pot: &EdgePotential) -> Result<(), Error>;

    fn edge(&self, edge: EdgeId) -> Result<EdgeRecord, Error>;

    fn set_edge_group(&mut self, edge: EdgeId, group: GroupId) -> Result<(), Error>;

    fn edges(&self) -> impl Iterator<Item = (EdgeId, EdgeRecord)> + '_ {
        (0..self.num_edges()).filter_map(move |e| self.edge(e).ok().map(|rec| (e, rec)))
    }
}
