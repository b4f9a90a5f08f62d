use lgm_core::{Error, FeatureSource, ImageView};
use lgm_graph::PairwiseGraph;
use lgm_train::{EdgeTrainer, LinkTrainer};
use log::debug;

use crate::layered::{LayeredGraph, locate_edge};

impl<G: PairwiseGraph> LayeredGraph<'_, G> {
    /// One sample per built edge, links included, in edge id order.
    pub fn add_feature_vecs<T, F>(
        &self,
        trainer: &mut T,
        features: &F,
        gt: &ImageView<'_, u8>,
    ) -> Result<usize, Error>
    where
        T: EdgeTrainer + ?Sized,
        F: FeatureSource + ?Sized,
    {
        self.visit_samples(features, gt, |_, f1, f2, gt1, gt2| {
            trainer.add_feature_vecs(f1, f2, gt1, gt2);
        })
    }

    /// Like [`Self::add_feature_vecs`], but links go to `link_trainer`.
    pub fn add_feature_vecs_split<T, L, F>(
        &self,
        edge_trainer: &mut T,
        link_trainer: &mut L,
        features: &F,
        gt: &ImageView<'_, u8>,
    ) -> Result<usize, Error>
    where
        T: EdgeTrainer + ?Sized,
        L: LinkTrainer + ?Sized,
        F: FeatureSource + ?Sized,
    {
        self.visit_samples(features, gt, |is_link, f1, f2, gt1, gt2| {
            if is_link {
                link_trainer.add_feature_vecs(f1, f2, gt1, gt2);
            } else {
                edge_trainer.add_feature_vecs(f1, f2, gt1, gt2);
            }
        })
    }

    fn visit_samples<F, V>(
        &self,
        features: &F,
        gt: &ImageView<'_, u8>,
        mut visit: V,
    ) -> Result<usize, Error>
    where
        F: FeatureSource + ?Sized,
        V: FnMut(bool, &[u8], &[u8], u8, u8),
    {
        let ix = self.ensure_grid(features.size())?;
        self.ensure_grid(gt.size())?;
        if gt.channels() != 1 {
            return Err(Error::SizeMismatch {
                expected: 1,
                actual: gt.channels(),
            });
        }

        let mut count = 0;
        for (id, rec) in self.graph.edges() {
            let (a, b, kind) = locate_edge(&ix, id, rec)?;
            let f1 = features.feature(a.x, a.y);
            let f2 = features.feature(b.x, b.y);
            let gt1 = *gt.get(a.x, a.y).ok_or(Error::OutOfBounds)?;
            let gt2 = *gt.get(b.x, b.y).ok_or(Error::OutOfBounds)?;
            visit(kind.is_link(), &f1, &f2, gt1, gt2);
            count += 1;
        }

        debug!("extracted {} edge samples", count);
        Ok(count)
    }
}
