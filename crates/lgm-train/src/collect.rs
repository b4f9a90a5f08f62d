use crate::{EdgeTrainer, LinkTrainer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairSample {
    pub f1: Vec<u8>,
    pub f2: Vec<u8>,
    pub gt1: u8,
    pub gt2: u8,
}

/// Trainer that keeps every sample it receives, in arrival order.
#[derive(Debug, Clone, Default)]
pub struct SampleCollector {
    samples: Vec<PairSample>,
}

impl SampleCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn samples(&self) -> &[PairSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Row-major `num_states x num_states` co-occurrence counts of the label
    /// pairs seen so far. Labels outside `[0, num_states)` are skipped.
    pub fn label_pair_counts(&self, num_states: usize) -> Vec<usize> {
        let mut counts = vec![0usize; num_states * num_states];
        for s in &self.samples {
            let (i, j) = (s.gt1 as usize, s.gt2 as usize);
            if i < num_states && j < num_states {
                counts[i * num_states + j] += 1;
            }
        }
        counts
    }

    fn push(&mut self, f1: &[u8], f2: &[u8], gt1: u8, gt2: u8) {
        self.samples.push(PairSample {
            f1: f1.to_vec(),
            f2: f2.to_vec(),
            gt1,
            gt2,
        });
    }
}

impl EdgeTrainer for SampleCollector {
    fn add_feature_vecs(&mut self, f1: &[u8], f2: &[u8], gt1: u8, gt2: u8) {
        self.push(f1, f2, gt1, gt2);
    }
}

impl LinkTrainer for SampleCollector {
    fn add_feature_vecs(&mut self, f1: &[u8], f2: &[u8], gt1: u8, gt2: u8) {
        self.push(f1, f2, gt1, gt2);
    }
}

#[cfg(test)]
mod tests {
    use super::SampleCollector;
    use crate::EdgeTrainer;

    #[test]
    fn collects_in_order_and_counts_label_pairs() {
        let mut c = SampleCollector::new();
        EdgeTrainer::add_feature_vecs(&mut c, &[1, 2], &[3, 4], 0, 1);
        EdgeTrainer::add_feature_vecs(&mut c, &[5, 6], &[7, 8], 1, 1);
        EdgeTrainer::add_feature_vecs(&mut c, &[0, 0], &[0, 0], 9, 0);

        assert_eq!(c.len(), 3);
        assert_eq!(c.samples()[1].f2, vec![7, 8]);
        assert_eq!(c.label_pair_counts(2), vec![0, 1, 0, 1]);

        c.clear();
        assert!(c.is_empty());
    }
}
