use lgm_core::Error;
use lgm_graph::{EdgeId, EdgeRecord, PairwiseGraph};
use log::debug;

use crate::indexer::{GridCoord, GridIndexer};
use crate::topology::{self, EdgeKind, EdgeTypes};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayeredConfig {
    /// Stacked copies of the grid; layer 0 is the base layer.
    pub layers: u16,
    pub edge_types: EdgeTypes,
    /// States per node, shared by every layer.
    pub num_states: usize,
}

impl Default for LayeredConfig {
    fn default() -> Self {
        Self {
            layers: 1,
            edge_types: EdgeTypes::GRID,
            num_states: 2,
        }
    }
}

impl LayeredConfig {
    pub fn with_layers(mut self, layers: u16) -> Self {
        self.layers = layers;
        self
    }

    pub fn with_edge_types(mut self, edge_types: EdgeTypes) -> Self {
        self.edge_types = edge_types;
        self
    }

    pub fn with_num_states(mut self, num_states: usize) -> Self {
        self.num_states = num_states;
        self
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.layers == 0 {
            return Err(Error::InvalidLayerCount);
        }
        if self.num_states == 0 {
            return Err(Error::InvalidStateCount);
        }
        Ok(())
    }
}

/// Multi-layer 2D grid model written into a borrowed graph store.
///
/// Node coordinates and edge kinds are recovered from ids through
/// [`GridIndexer`], so group changes made on the store are seen by every
/// later pass.
#[derive(Debug)]
pub struct LayeredGraph<'g, G: PairwiseGraph> {
    pub(crate) graph: &'g mut G,
    pub(crate) config: LayeredConfig,
    pub(crate) size: Option<(usize, usize)>,
}

impl<'g, G: PairwiseGraph> LayeredGraph<'g, G> {
    pub fn new(graph: &'g mut G, config: LayeredConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            graph,
            config,
            size: None,
        })
    }

    /// Replaces whatever the store holds with a `width x height` layered grid.
    pub fn build_graph(&mut self, width: usize, height: usize) -> Result<(), Error> {
        let layers = self.config.layers as usize;
        if width == 0
            || height == 0
            || width
                .checked_mul(height)
                .and_then(|n| n.checked_mul(layers))
                .is_none()
        {
            return Err(Error::InvalidDimensions { width, height });
        }

        let ix = GridIndexer::new(width, height, layers);
        let num_states = self.config.num_states;

        self.graph.reset();
        self.size = None;

        for _ in 0..ix.num_nodes() {
            self.graph.add_node(num_states);
        }

        let graph = &mut *self.graph;
        topology::for_each_edge(&ix, self.config.edge_types, |a, b, kind| {
            graph.add_edge(a, b, kind.default_group()).map(|_| ())
        })?;

        self.size = Some((width, height));
        debug!(
            "built {}x{} graph with {} layer(s), edges {}: {} nodes, {} edges",
            width,
            height,
            ix.layers(),
            self.config.edge_types,
            self.graph.num_nodes(),
            self.graph.num_edges()
        );
        Ok(())
    }

    /// Built grid size as `(width, height)`, `None` before the first build.
    pub fn size(&self) -> Option<(usize, usize)> {
        self.size
    }

    pub fn config(&self) -> &LayeredConfig {
        &self.config
    }

    pub fn layers(&self) -> usize {
        self.config.layers as usize
    }

    pub fn edge_types(&self) -> EdgeTypes {
        self.config.edge_types
    }

    pub fn num_states(&self) -> usize {
        self.config.num_states
    }

    pub fn graph(&self) -> &G {
        &*self.graph
    }

    pub fn graph_mut(&mut self) -> &mut G {
        &mut *self.graph
    }

    pub fn indexer(&self) -> Option<GridIndexer> {
        self.size
            .map(|(w, h)| GridIndexer::new(w, h, self.config.layers as usize))
    }

    pub fn edge_kind(&self, edge: EdgeId) -> Result<EdgeKind, Error> {
        let ix = self.built_indexer()?;
        let (_, _, kind) = locate_edge(&ix, edge, self.graph.edge(edge)?)?;
        Ok(kind)
    }

    pub(crate) fn built_indexer(&self) -> Result<GridIndexer, Error> {
        self.indexer().ok_or(Error::NotBuilt)
    }

    pub(crate) fn ensure_grid(&self, actual: (usize, usize)) -> Result<GridIndexer, Error> {
        let ix = self.built_indexer()?;
        let expected = (ix.width(), ix.height());
        if actual != expected {
            return Err(Error::GridMismatch { expected, actual });
        }
        Ok(ix)
    }
}

// Edges not joining adjacent grid positions are reported as out of range.
pub(crate) fn locate_edge(
    ix: &GridIndexer,
    id: EdgeId,
    rec: EdgeRecord,
) -> Result<(GridCoord, GridCoord, EdgeKind), Error> {
    let a = ix.checked_coord(rec.a)?;
    let b = ix.checked_coord(rec.b)?;
    let kind = EdgeKind::between(a, b).ok_or(Error::EdgeOutOfRange(id))?;
    Ok((a, b, kind))
}

#[cfg(test)]
mod tests {
    use lgm_core::Error;
    use lgm_graph::{DenseGraph, PairwiseGraph};

    use crate::{EdgeKind, EdgeTypes, INTRA_LAYER_GROUP, LINK_GROUP, LayeredConfig, LayeredGraph};

    fn config(layers: u16, edge_types: EdgeTypes) -> LayeredConfig {
        LayeredConfig::default()
            .with_layers(layers)
            .with_edge_types(edge_types)
    }

    #[test]
    fn build_creates_every_node_and_edge() {
        let mut store = DenseGraph::new();
        let mut g = LayeredGraph::new(&mut store, config(2, EdgeTypes::ALL)).expect("valid config");
        g.build_graph(3, 2).expect("valid size");

        assert_eq!(g.size(), Some((3, 2)));
        assert_eq!(g.graph().num_nodes(), 12);
        // 7 grid + 4 diagonal per layer, 6 links.
        assert_eq!(g.graph().num_edges(), 2 * 11 + 6);
        for (_, rec) in g.graph().edges() {
            assert_ne!(rec.a, rec.b);
            assert!(rec.b < g.graph().num_nodes());
        }
    }

    #[test]
    fn links_start_in_group_one() {
        let mut store = DenseGraph::new();
        let mut g = LayeredGraph::new(&mut store, config(3, EdgeTypes::GRID | EdgeTypes::LINK))
            .expect("valid config");
        g.build_graph(2, 2).expect("valid size");

        for (id, rec) in g.graph().edges() {
            let kind = g.edge_kind(id).expect("built edge");
            if kind == EdgeKind::Link {
                assert_eq!(rec.group, LINK_GROUP);
            } else {
                assert_eq!(rec.group, INTRA_LAYER_GROUP);
            }
        }
        assert_eq!(store.edges_in_group(LINK_GROUP), 8);
    }

    #[test]
    fn rebuild_replaces_previous_structure() {
        let mut store = DenseGraph::new();
        let mut g = LayeredGraph::new(&mut store, config(2, EdgeTypes::ALL)).expect("valid config");
        g.build_graph(6, 5).expect("valid size");
        g.build_graph(2, 1).expect("valid size");

        assert_eq!(g.size(), Some((2, 1)));
        assert_eq!(g.graph().num_nodes(), 4);
        // one horizontal edge per layer plus two links
        assert_eq!(g.graph().num_edges(), 4);
    }

    #[test]
    fn repeated_builds_are_identical() {
        let mut first = DenseGraph::new();
        let mut second = DenseGraph::new();
        let cfg = config(2, EdgeTypes::ALL);

        LayeredGraph::new(&mut first, cfg)
            .and_then(|mut g| g.build_graph(4, 3))
            .expect("valid build");
        let mut g = LayeredGraph::new(&mut second, cfg).expect("valid config");
        g.build_graph(4, 3).expect("valid build");
        g.build_graph(4, 3).expect("valid rebuild");

        let a: Vec<_> = first.edges().collect();
        let b: Vec<_> = second.edges().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn invalid_sizes_and_configs_are_rejected() {
        let mut store = DenseGraph::new();
        assert_eq!(
            LayeredGraph::new(&mut store, config(0, EdgeTypes::GRID)).err(),
            Some(Error::InvalidLayerCount)
        );

        let mut g = LayeredGraph::new(&mut store, LayeredConfig::default()).expect("valid config");
        g.build_graph(2, 2).expect("valid size");
        assert_eq!(
            g.build_graph(0, 3),
            Err(Error::InvalidDimensions {
                width: 0,
                height: 3
            })
        );
        // the failed call did not touch the existing structure
        assert_eq!(g.size(), Some((2, 2)));
        assert_eq!(g.graph().num_edges(), 4);
    }

    #[test]
    fn oversized_grids_are_rejected_before_reset() {
        let mut store = DenseGraph::new();
        let mut g = LayeredGraph::new(&mut store, config(3, EdgeTypes::ALL)).expect("valid config");
        g.build_graph(2, 2).expect("valid size");

        let width = usize::MAX / 2 + 1;
        assert_eq!(
            g.build_graph(width, 2),
            Err(Error::InvalidDimensions { width, height: 2 })
        );
        // fits as a single layer, overflows once three layers are stacked
        let width = usize::MAX / 4;
        assert_eq!(
            g.build_graph(width, 2),
            Err(Error::InvalidDimensions { width, height: 2 })
        );
        assert_eq!(g.size(), Some((2, 2)));
        assert_eq!(g.graph().num_nodes(), 12);
    }

    #[test]
    fn zero_states_are_reported_as_such() {
        let mut store = DenseGraph::new();
        assert_eq!(
            LayeredGraph::new(&mut store, LayeredConfig::default().with_num_states(0)).err(),
            Some(Error::InvalidStateCount)
        );
    }

    #[test]
    fn edge_kind_needs_a_build() {
        let mut store = DenseGraph::new();
        let g = LayeredGraph::new(&mut store, LayeredConfig::default()).expect("valid config");
        assert_eq!(g.edge_kind(0), Err(Error::NotBuilt));
    }
}
