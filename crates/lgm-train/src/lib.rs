//! Edge and link potential models.
//!
//! Learning edge potentials is left to implementors of the traits in this
//! crate. What ships here are the data-independent and contrast-sensitive
//! Potts models used as defaults, a neutral link model, and a trainer that
//! only records the samples it is fed.

mod collect;
mod model;
mod potts;

pub use collect::{PairSample, SampleCollector};
pub use model::{EdgeModel, EdgeTrainer, LinkModel, LinkTrainer};
pub use potts::{
    ContrastPottsModel, DEFAULT_CONTRAST_BETA, NeutralLinkModel, PottsModel, potts_potential,
};
