use lgm_graph::EdgePotential;

/// Computes the potential of a within-layer edge from its endpoint features.
///
/// `params` is model specific. Implementations are called concurrently from
/// several threads and must not rely on call order.
pub trait EdgeModel: Sync {
    fn edge_potential(
        &self,
        f1: &[u8],
        f2: &[u8],
        params: &[f32],
        num_states: usize,
    ) -> EdgePotential;
}

/// Computes the potential of an inter-layer link from the features of the
/// shared pixel as seen from both layers.
pub trait LinkModel: Sync {
    fn link_potential(&self, f1: &[u8], f2: &[u8], num_states: usize) -> EdgePotential;
}

/// Accumulates `(feature pair, label pair)` samples for within-layer edges.
pub trait EdgeTrainer {
    fn add_feature_vecs(&mut self, f1: &[u8], f2: &[u8], gt1: u8, gt2: u8);
}

/// Accumulates `(feature pair, label pair)` samples for inter-layer links.
pub trait LinkTrainer {
    fn add_feature_vecs(&mut self, f1: &[u8], f2: &[u8], gt1: u8, gt2: u8);
}
