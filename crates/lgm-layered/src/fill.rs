//! Node and edge potential filling.
//!
//! Node potentials come straight from dense score arrays. Edge potentials
//! come from models evaluated on the endpoint features; these are computed in
//! parallel over edges and written back once every potential is known, so a
//! failing model or shape check leaves the store untouched.

use lgm_core::{Error, FeatureSource, ImageView};
use lgm_graph::{EdgeId, EdgePotential, PairwiseGraph};
use lgm_train::{
    ContrastPottsModel, DEFAULT_CONTRAST_BETA, EdgeModel, LinkModel, NeutralLinkModel,
    potts_potential,
};
use log::debug;
use rayon::prelude::*;

use crate::indexer::GridIndexer;
use crate::layered::{LayeredGraph, locate_edge};

/// Score mass spread uniformly over the occlusion states of intermediate
/// layers.
const INTERMEDIATE_LAYER_MASS: f32 = 100.0;

impl<G: PairwiseGraph> LayeredGraph<'_, G> {
    pub fn set_graph(&mut self, pot_base: &ImageView<'_, f32>) -> Result<(), Error> {
        self.set_graph_layered(pot_base, None)
    }

    /// Fills every node potential from per-pixel score arrays.
    ///
    /// `pot_base` carries one channel per base state and `pot_occl` one
    /// channel per occlusion state; together they must cover
    /// [`LayeredConfig::num_states`](crate::LayeredConfig::num_states).
    /// Nodes are laid out as:
    /// - layer 0: base scores in states `[0, n_base)`, zero elsewhere;
    /// - top layer: occlusion scores in states `[n_base, num_states)`, zero
    ///   elsewhere;
    /// - layers in between: a uniform score over the occlusion states.
    ///
    /// Without occlusion scores the upper layers receive zero vectors.
    ///
    /// The graph is (re)built from the size of `pot_base` if it has not been
    /// built yet or was built with a different size.
    pub fn set_graph_layered(
        &mut self,
        pot_base: &ImageView<'_, f32>,
        pot_occl: Option<&ImageView<'_, f32>>,
    ) -> Result<(), Error> {
        let n_base = pot_base.channels();
        let n_occl = pot_occl.map_or(0, |p| p.channels());
        let num_states = self.config.num_states;
        if n_base + n_occl != num_states {
            return Err(Error::StateCountMismatch {
                expected: num_states,
                actual: n_base + n_occl,
            });
        }

        if let Some(occl) = pot_occl
            && occl.size() != pot_base.size()
        {
            return Err(Error::GridMismatch {
                expected: pot_base.size(),
                actual: occl.size(),
            });
        }

        if self.size != Some(pot_base.size()) {
            self.build_graph(pot_base.width(), pot_base.height())?;
        }
        let ix = self.built_indexer()?;

        let top = ix.layers() - 1;
        let mut base_pot = vec![0.0f32; num_states];
        let mut top_pot = vec![0.0f32; num_states];
        let mut mid_pot = vec![0.0f32; num_states];
        if n_occl > 0 {
            mid_pot[n_base..].fill(INTERMEDIATE_LAYER_MASS / n_occl as f32);
        }

        for y in 0..ix.height() {
            for x in 0..ix.width() {
                let src = pot_base.pixel(x, y).ok_or(Error::OutOfBounds)?;
                base_pot[..n_base].copy_from_slice(src);
                self.graph.set_node_potential(ix.id(0, y, x), &base_pot)?;

                if top == 0 {
                    continue;
                }

                if let Some(p) = pot_occl {
                    let src = p.pixel(x, y).ok_or(Error::OutOfBounds)?;
                    top_pot[n_base..].copy_from_slice(src);
                }
                for layer in 1..top {
                    self.graph.set_node_potential(ix.id(layer, y, x), &mid_pot)?;
                }
                self.graph.set_node_potential(ix.id(top, y, x), &top_pot)?;
            }
        }

        debug!(
            "filled {} node potentials ({} base + {} occlusion states)",
            ix.num_nodes(),
            n_base,
            n_occl
        );
        Ok(())
    }

    /// Links without a `link_model` get the all-ones potential.
    pub fn fill_edges<F, E>(
        &mut self,
        edge_model: &E,
        link_model: Option<&dyn LinkModel>,
        features: &F,
        params: &[f32],
        edge_weight: f32,
        link_weight: f32,
    ) -> Result<(), Error>
    where
        F: FeatureSource + ?Sized,
        E: EdgeModel + ?Sized,
    {
        let ix = self.ensure_grid(features.size())?;
        let link_model = link_model.unwrap_or(&NeutralLinkModel);
        let pots = self.compute_edge_potentials(
            &ix,
            features,
            edge_model,
            params,
            edge_weight,
            Some((link_model, link_weight)),
        )?;
        self.write_edge_potentials(pots)
    }

    pub fn add_default_edges_model(&mut self, val: f32, weight: f32) -> Result<(), Error> {
        let ix = self.built_indexer()?;
        let pot = potts_potential(val, self.config.num_states).powf(weight);

        let mut targets = Vec::new();
        for (id, rec) in self.graph.edges() {
            let (_, _, kind) = locate_edge(&ix, id, rec)?;
            if !kind.is_link() {
                targets.push(id);
            }
        }

        for &id in &targets {
            self.graph.set_edge_potential(id, &pot)?;
        }
        debug!("set default potts potential on {} edges", targets.len());
        Ok(())
    }

    pub fn add_default_edges_model_from_features<F>(
        &mut self,
        features: &F,
        val: f32,
        weight: f32,
    ) -> Result<(), Error>
    where
        F: FeatureSource + ?Sized,
    {
        let ix = self.ensure_grid(features.size())?;
        let pots = self.compute_edge_potentials(
            &ix,
            features,
            &ContrastPottsModel,
            &[val, DEFAULT_CONTRAST_BETA],
            weight,
            None,
        )?;
        self.write_edge_potentials(pots)
    }

    // links are skipped when `links` is None
    fn compute_edge_potentials<F, E>(
        &self,
        ix: &GridIndexer,
        features: &F,
        edge_model: &E,
        params: &[f32],
        edge_weight: f32,
        links: Option<(&dyn LinkModel, f32)>,
    ) -> Result<Vec<(EdgeId, EdgePotential)>, Error>
    where
        F: FeatureSource + ?Sized,
        E: EdgeModel + ?Sized,
    {
        let num_states = self.config.num_states;
        let expected = (num_states, num_states);
        let edges: Vec<_> = self.graph.edges().collect();

        let computed: Vec<Option<(EdgeId, EdgePotential)>> = edges
            .par_iter()
            .map(|&(id, rec)| {
                let (a, b, kind) = locate_edge(ix, id, rec)?;
                let pot = if kind.is_link() {
                    let Some((model, weight)) = links else {
                        return Ok(None);
                    };
                    let f = features.feature(a.x, a.y);
                    model.link_potential(&f, &f, num_states).powf(weight)
                } else {
                    let f1 = features.feature(a.x, a.y);
                    let f2 = features.feature(b.x, b.y);
                    edge_model
                        .edge_potential(&f1, &f2, params, num_states)
                        .powf(edge_weight)
                };

                if pot.shape() != expected {
                    return Err(Error::ShapeMismatch {
                        expected,
                        actual: pot.shape(),
                    });
                }
                Ok(Some((id, pot)))
            })
            .collect::<Result<_, Error>>()?;

        Ok(computed.into_iter().flatten().collect())
    }

    fn write_edge_potentials(&mut self, pots: Vec<(EdgeId, EdgePotential)>) -> Result<(), Error> {
        for (id, pot) in &pots {
            self.graph.set_edge_potential(*id, pot)?;
        }
        debug!("filled {} edge potentials", pots.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use lgm_core::{ChannelStack, Error, FeatureSource, Image, ImageView};
    use lgm_graph::{DenseGraph, EdgePotential, PairwiseGraph};
    use lgm_train::{ContrastPottsModel, EdgeModel, LinkModel, potts_potential};

    use crate::{EdgeKind, EdgeTypes, LayeredConfig, LayeredGraph};

    /// Potential whose every entry is the sum of both feature vectors.
    struct SumModel;

    impl EdgeModel for SumModel {
        fn edge_potential(
            &self,
            f1: &[u8],
            f2: &[u8],
            params: &[f32],
            num_states: usize,
        ) -> EdgePotential {
            let sum: u32 = f1.iter().chain(f2).map(|&v| v as u32).sum();
            let scale = params.first().copied().unwrap_or(1.0);
            EdgePotential::filled(num_states, num_states, sum as f32 * scale)
        }
    }

    struct ConstLink(f32);

    impl LinkModel for ConstLink {
        fn link_potential(&self, f1: &[u8], f2: &[u8], num_states: usize) -> EdgePotential {
            assert_eq!(f1, f2);
            EdgePotential::filled(num_states, num_states, self.0)
        }
    }

    struct WrongShape;

    impl EdgeModel for WrongShape {
        fn edge_potential(&self, _: &[u8], _: &[u8], _: &[f32], _: usize) -> EdgePotential {
            EdgePotential::filled(1, 1, 1.0)
        }
    }

    #[test]
    fn direct_fill_copies_scores_exactly() {
        let scores = Image::from_vec(
            2,
            2,
            2,
            vec![
                0.1f32, 0.9, 0.2, 0.8, // row 0
                0.3, 0.7, 0.4, 0.6, // row 1
            ],
        )
        .expect("valid scores");
        let mut store = DenseGraph::new();
        let mut g = LayeredGraph::new(&mut store, LayeredConfig::default()).expect("valid config");

        g.set_graph(&scores.as_view()).expect("matching states");

        assert_eq!(g.size(), Some((2, 2)));
        for y in 0..2 {
            for x in 0..2 {
                let id = y * 2 + x;
                assert_eq!(
                    store.node_potential(id),
                    scores.pixel(x, y),
                    "node ({x}, {y})"
                );
            }
        }
    }

    #[test]
    fn direct_fill_reads_padded_views() {
        // 2x2 scores, 2 states, one padding pixel per row
        let buffer = vec![
            0.1f32, 0.9, 0.2, 0.8, -1.0, -1.0, // row 0
            0.3, 0.7, 0.4, 0.6, -1.0, -1.0, // row 1
        ];
        let padded = ImageView::from_slice(2, 2, 2, 3, &buffer).expect("valid view");
        let mut store = DenseGraph::new();
        let mut g = LayeredGraph::new(&mut store, LayeredConfig::default()).expect("valid config");

        g.set_graph(&padded).expect("matching states");

        assert_eq!(store.node_potential(1), Some(&[0.2f32, 0.8][..]));
        assert_eq!(store.node_potential(2), Some(&[0.3f32, 0.7][..]));
    }

    #[test]
    fn layered_fill_places_base_occlusion_and_intermediate_scores() {
        let base = Image::from_vec(1, 1, 2, vec![0.25f32, 0.75]).expect("valid base");
        let occl = Image::from_vec(1, 1, 2, vec![0.5f32, 0.125]).expect("valid occlusion");
        let cfg = LayeredConfig::default()
            .with_layers(3)
            .with_num_states(4)
            .with_edge_types(EdgeTypes::LINK);
        let mut store = DenseGraph::new();
        let mut g = LayeredGraph::new(&mut store, cfg).expect("valid config");

        g.set_graph_layered(&base.as_view(), Some(&occl.as_view()))
            .expect("matching states");

        assert_eq!(store.node_potential(0), Some(&[0.25f32, 0.75, 0.0, 0.0][..]));
        assert_eq!(store.node_potential(1), Some(&[0.0f32, 0.0, 50.0, 50.0][..]));
        assert_eq!(store.node_potential(2), Some(&[0.0f32, 0.0, 0.5, 0.125][..]));
    }

    #[test]
    fn state_and_size_mismatches_fail_before_any_write() {
        let base = Image::new_fill(2, 2, 3, 0.5f32);
        let small = Image::new_fill(1, 2, 1, 0.5f32);
        let cfg = LayeredConfig::default().with_layers(2).with_num_states(4);
        let mut store = DenseGraph::new();
        let mut g = LayeredGraph::new(&mut store, cfg).expect("valid config");

        assert_eq!(
            g.set_graph(&base.as_view()),
            Err(Error::StateCountMismatch {
                expected: 4,
                actual: 3
            })
        );
        assert_eq!(
            g.set_graph_layered(&base.as_view(), Some(&small.as_view())),
            Err(Error::GridMismatch {
                expected: (2, 2),
                actual: (1, 2)
            })
        );
        assert_eq!(g.size(), None);
        assert_eq!(store.num_nodes(), 0);
    }

    #[test]
    fn direct_fill_rebuilds_on_new_size() {
        let mut store = DenseGraph::new();
        let mut g = LayeredGraph::new(&mut store, LayeredConfig::default()).expect("valid config");
        g.build_graph(5, 5).expect("valid size");

        let scores = Image::new_fill(3, 1, 2, 1.0f32);
        g.set_graph(&scores.as_view()).expect("matching states");

        assert_eq!(g.size(), Some((3, 1)));
        assert_eq!(store.num_nodes(), 3);
        assert!((0..3).all(|id| store.node_potential(id).is_some()));
    }

    #[test]
    fn model_fill_uses_edge_and_link_models_with_weights() {
        let features = Image::from_vec(2, 1, 1, vec![1u8, 2]).expect("valid features");
        let cfg = LayeredConfig::default()
            .with_layers(2)
            .with_edge_types(EdgeTypes::GRID | EdgeTypes::LINK);
        let mut store = DenseGraph::new();
        let mut g = LayeredGraph::new(&mut store, cfg).expect("valid config");
        g.build_graph(2, 1).expect("valid size");

        g.fill_edges(
            &SumModel,
            Some(&ConstLink(4.0)),
            &features.as_view(),
            &[1.0],
            2.0,
            0.5,
        )
        .expect("matching grid");

        let num_edges = g.graph().num_edges();
        assert_eq!(num_edges, 4);
        for id in 0..num_edges {
            let pot = store_pot(&g, id);
            match g.edge_kind(id).expect("built edge") {
                // (1 + 2)^2
                EdgeKind::Horizontal => assert!((pot.get(0, 1) - 9.0).abs() < 1e-5),
                // 4^0.5
                EdgeKind::Link => assert!((pot.get(1, 0) - 2.0).abs() < 1e-5),
                other => panic!("unexpected edge kind {other:?}"),
            }
        }
    }

    fn store_pot(g: &LayeredGraph<'_, DenseGraph>, id: usize) -> EdgePotential {
        g.graph()
            .edge_potential(id)
            .cloned()
            .expect("every edge is filled")
    }

    #[test]
    fn model_fill_without_link_model_uses_neutral_links() {
        let features = Image::new_fill(2, 2, 3, 7u8);
        let cfg = LayeredConfig::default()
            .with_layers(2)
            .with_edge_types(EdgeTypes::ALL);
        let mut store = DenseGraph::new();
        let mut g = LayeredGraph::new(&mut store, cfg).expect("valid config");
        g.build_graph(2, 2).expect("valid size");

        g.fill_edges(&SumModel, None, &features, &[], 1.0, 3.0)
            .expect("matching grid");

        for id in 0..g.graph().num_edges() {
            let pot = store_pot(&g, id);
            if g.edge_kind(id).expect("built edge").is_link() {
                assert!(pot.data().iter().all(|&v| v == 1.0));
            } else {
                assert_eq!(pot.get(0, 0), 42.0);
            }
        }
    }

    #[test]
    fn model_fill_checks_grid_and_shape_before_writing() {
        let features = Image::new_fill(3, 3, 1, 0u8);
        let mut store = DenseGraph::new();
        let mut g = LayeredGraph::new(&mut store, LayeredConfig::default()).expect("valid config");

        assert_eq!(
            g.fill_edges(&SumModel, None, &features, &[], 1.0, 1.0),
            Err(Error::NotBuilt)
        );

        g.build_graph(2, 2).expect("valid size");
        assert_eq!(
            g.fill_edges(&SumModel, None, &features, &[], 1.0, 1.0),
            Err(Error::GridMismatch {
                expected: (2, 2),
                actual: (3, 3)
            })
        );

        let small = Image::new_fill(2, 2, 1, 0u8);
        assert_eq!(
            g.fill_edges(&WrongShape, None, &small, &[], 1.0, 1.0),
            Err(Error::ShapeMismatch {
                expected: (2, 2),
                actual: (1, 1)
            })
        );
        assert!((0..4).all(|id| g.graph().edge_potential(id).is_none()));
    }

    fn filled_potentials<F>(features: &F, contrast: bool) -> Vec<EdgePotential>
    where
        F: FeatureSource + ?Sized,
    {
        let cfg = LayeredConfig::default()
            .with_layers(2)
            .with_edge_types(EdgeTypes::ALL);
        let mut store = DenseGraph::new();
        let mut g = LayeredGraph::new(&mut store, cfg).expect("valid config");
        g.build_graph(3, 2).expect("valid size");
        if contrast {
            g.add_default_edges_model_from_features(features, 5.0, 1.0)
                .expect("matching grid");
        } else {
            g.fill_edges(&ContrastPottsModel, None, features, &[5.0, 0.05], 2.0, 1.0)
                .expect("matching grid");
        }

        (0..store.num_edges())
            .map(|id| {
                store
                    .edge_potential(id)
                    .cloned()
                    .unwrap_or_else(|| EdgePotential::new(0, 0))
            })
            .collect()
    }

    #[test]
    fn stacked_planes_fill_like_interleaved_features() {
        let interleaved = Image::from_vec(
            3,
            2,
            2,
            vec![0u8, 9, 4, 9, 30, 1, 2, 2, 8, 40, 31, 0],
        )
        .expect("valid features");
        let p0 = Image::from_vec(3, 2, 1, vec![0u8, 4, 30, 2, 8, 31]).expect("valid plane");
        let p1 = Image::from_vec(3, 2, 1, vec![9u8, 9, 1, 2, 40, 0]).expect("valid plane");
        let stack = ChannelStack::new(vec![p0.as_view(), p1.as_view()]).expect("valid stack");

        for contrast in [false, true] {
            let a = filled_potentials(&interleaved.as_view(), contrast);
            let b = filled_potentials(&stack, contrast);
            assert_eq!(a.len(), 2 * 11 + 6);
            assert_eq!(a, b, "contrast default model: {contrast}");
        }
        // differing neighbours must actually produce distinct potentials
        let a = filled_potentials(&stack, false);
        assert_ne!(a[0], a[1]);
    }

    #[test]
    fn default_models_leave_links_alone() {
        let features = Image::from_vec(2, 1, 1, vec![0u8, 0]).expect("valid features");
        let cfg = LayeredConfig::default()
            .with_layers(2)
            .with_edge_types(EdgeTypes::GRID | EdgeTypes::LINK);
        let mut store = DenseGraph::new();
        let mut g = LayeredGraph::new(&mut store, cfg).expect("valid config");
        g.build_graph(2, 1).expect("valid size");

        g.add_default_edges_model(4.0, 1.0).expect("built graph");
        for id in 0..g.graph().num_edges() {
            let filled = g.graph().edge_potential(id);
            if g.edge_kind(id).expect("built edge").is_link() {
                assert!(filled.is_none());
            } else {
                assert_eq!(filled, Some(&potts_potential(4.0, 2)));
            }
        }

        // identical features: the contrast model reduces to plain Potts
        g.add_default_edges_model_from_features(&features, 9.0, 0.5)
            .expect("matching grid");
        let pot = store_pot(&g, 0);
        assert!((pot.get(1, 1) - 3.0).abs() < 1e-5);
        assert_eq!(pot.get(0, 1), 1.0);
    }
}
