//! Data-independent and contrast-sensitive Potts models.

use lgm_graph::EdgePotential;

use crate::{EdgeModel, LinkModel};

/// Default `beta` of [`ContrastPottsModel`] when `params[1]` is absent.
pub const DEFAULT_CONTRAST_BETA: f32 = 0.01;

/// `val` on the diagonal, `1` elsewhere.
pub fn potts_potential(val: f32, num_states: usize) -> EdgePotential {
    EdgePotential::from_fn(num_states, num_states, |i, j| if i == j { val } else { 1.0 })
}

/// Data-independent smoothness: `params[0]` is the diagonal value
/// (defaults to `1`, no smoothing).
#[derive(Debug, Clone, Copy, Default)]
pub struct PottsModel;

impl EdgeModel for PottsModel {
    fn edge_potential(
        &self,
        _f1: &[u8],
        _f2: &[u8],
        params: &[f32],
        num_states: usize,
    ) -> EdgePotential {
        potts_potential(params.first().copied().unwrap_or(1.0), num_states)
    }
}

/// Contrast-sensitive smoothness.
///
/// The diagonal is `1 + (val - 1) * exp(-beta * d^2)` with `d` the Euclidean
/// distance between the two feature vectors, so smoothing fades across strong
/// feature changes. `params = [val, beta]`; `beta` defaults to
/// [`DEFAULT_CONTRAST_BETA`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ContrastPottsModel;

impl EdgeModel for ContrastPottsModel {
    fn edge_potential(
        &self,
        f1: &[u8],
        f2: &[u8],
        params: &[f32],
        num_states: usize,
    ) -> EdgePotential {
        let val = params.first().copied().unwrap_or(1.0);
        let beta = params.get(1).copied().unwrap_or(DEFAULT_CONTRAST_BETA);
        let d2 = squared_distance(f1, f2);
        potts_potential(1.0 + (val - 1.0) * (-beta * d2).exp(), num_states)
    }
}

/// All-ones link potential: the layers do not constrain each other.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeutralLinkModel;

impl LinkModel for NeutralLinkModel {
    fn link_potential(&self, _f1: &[u8], _f2: &[u8], num_states: usize) -> EdgePotential {
        EdgePotential::filled(num_states, num_states, 1.0)
    }
}

fn squared_distance(f1: &[u8], f2: &[u8]) -> f32 {
    debug_assert_eq!(f1.len(), f2.len());
    f1.iter()
        .zip(f2)
        .map(|(&a, &b)| {
            let d = a as f32 - b as f32;
            d * d
        })
        .sum()
}
