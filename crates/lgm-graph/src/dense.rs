use lgm_core::Error;

use crate::{EdgeId, EdgePotential, EdgeRecord, GroupId, NodeId, PairwiseGraph};

#[derive(Debug, Clone)]
struct NodeSlot {
    num_states: usize,
    potential: Option<Vec<f32>>,
}

#[derive(Debug, Clone)]
struct EdgeSlot {
    record: EdgeRecord,
    potential: Option<EdgePotential>,
}

/// Vector-backed [`PairwiseGraph`].
#[derive(Debug, Clone, Default)]
pub struct DenseGraph {
    nodes: Vec<NodeSlot>,
    edges: Vec<EdgeSlot>,
}

impl DenseGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(nodes),
            edges: Vec::with_capacity(edges),
        }
    }

    pub fn node_potential(&self, node: NodeId) -> Option<&[f32]> {
        self.nodes.get(node)?.potential.as_deref()
    }

    pub fn edge_potential(&self, edge: EdgeId) -> Option<&EdgePotential> {
        self.edges.get(edge)?.potential.as_ref()
    }

    pub fn edges_in_group(&self, group: GroupId) -> usize {
        self.edges
            .iter()
            .filter(|slot| slot.record.group == group)
            .count()
    }

    fn node(&self, node: NodeId) -> Result<&NodeSlot, Error> {
        self.nodes.get(node).ok_or(Error::NodeOutOfRange(node))
    }
}

impl PairwiseGraph for DenseGraph {
    fn reset(&mut self) {
        self.nodes.clear();
        self.edges.clear();
    }

    fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    fn num_edges(&self) -> usize {
        self.edges.len()
    }

    fn add_node(&mut self, num_states: usize) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(NodeSlot {
            num_states,
            potential: None,
        });
        id
    }

    fn node_states(&self, node: NodeId) -> Result<usize, Error> {
        Ok(self.node(node)?.num_states)
    }

    fn add_edge(&mut self, a: NodeId, b: NodeId, group: GroupId) -> Result<EdgeId, Error> {
        self.node(a)?;
        self.node(b)?;
        if a == b {
            return Err(Error::SelfLoop(a));
        }

        let id = self.edges.len();
        self.edges.push(EdgeSlot {
            record: EdgeRecord { a, b, group },
            potential: None,
        });
        Ok(id)
    }

    fn set_node_potential(&mut self, node: NodeId, pot: &[f32]) -> Result<(), Error> {
        let slot = self.nodes.get_mut(node).ok_or(Error::NodeOutOfRange(node))?;
        if pot.len() != slot.num_states {
            return Err(Error::StateCountMismatch {
                expected: slot.num_states,
                actual: pot.len(),
            });
        }

        slot.potential = Some(pot.to_vec());
        Ok(())
    }

    fn set_edge_potential(&mut self, edge: EdgeId, pot: &EdgePotential) -> Result<(), Error> {
        let record = self.edge(edge)?;
        let expected = (
            self.node(record.a)?.num_states,
            self.node(record.b)?.num_states,
        );
        if pot.shape() != expected {
            return Err(Error::ShapeMismatch {
                expected,
                actual: pot.shape(),
            });
        }

        self.edges[edge].potential = Some(pot.clone());
        Ok(())
    }

    fn edge(&self, edge: EdgeId) -> Result<EdgeRecord, Error> {
        self.edges
            .get(edge)
            .map(|slot| slot.record)
            .ok_or(Error::EdgeOutOfRange(edge))
    }

    fn set_edge_group(&mut self, edge: EdgeId, group: GroupId) -> Result<(), Error> {
        let slot = self.edges.get_mut(edge).ok_or(Error::EdgeOutOfRange(edge))?;
        slot.record.group = group;
        Ok(())
    }
}
