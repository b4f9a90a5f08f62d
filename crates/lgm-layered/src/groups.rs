use lgm_core::{Error, LineEq, Point2f};
use lgm_graph::{EdgePotential, GroupId, PairwiseGraph};
use log::debug;

use crate::layered::{LayeredGraph, locate_edge};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupSelector {
    Group(GroupId),
    All,
}

impl GroupSelector {
    pub fn matches(self, group: GroupId) -> bool {
        match self {
            GroupSelector::Group(g) => g == group,
            GroupSelector::All => true,
        }
    }
}

impl From<GroupId> for GroupSelector {
    fn from(group: GroupId) -> Self {
        GroupSelector::Group(group)
    }
}

impl From<Option<GroupId>> for GroupSelector {
    fn from(group: Option<GroupId>) -> Self {
        group.map_or(GroupSelector::All, GroupSelector::Group)
    }
}

impl<G: PairwiseGraph> LayeredGraph<'_, G> {
    /// `x` is the pixel column, `y` the row. Links are never moved.
    pub fn define_edge_group(
        &mut self,
        a: f32,
        b: f32,
        c: f32,
        group: GroupId,
    ) -> Result<usize, Error> {
        let line = LineEq::new(a, b, c)?;
        self.define_edge_group_by_line(&line, group)
    }

    pub fn define_edge_group_by_line(
        &mut self,
        line: &LineEq,
        group: GroupId,
    ) -> Result<usize, Error> {
        let ix = self.built_indexer()?;

        let mut crossing = Vec::new();
        for (id, rec) in self.graph.edges() {
            let (pa, pb, kind) = locate_edge(&ix, id, rec)?;
            if kind.is_link() {
                continue;
            }
            let (p, q) = (Point2f::from_pixel(pa.x, pa.y), Point2f::from_pixel(pb.x, pb.y));
            if line.separates(p, q) {
                crossing.push(id);
            }
        }

        for &id in &crossing {
            self.graph.set_edge_group(id, group)?;
        }
        debug!(
            "moved {} edges crossing {:?} to group {}",
            crossing.len(),
            line,
            group
        );
        Ok(crossing.len())
    }

    pub fn set_edges(
        &mut self,
        selector: GroupSelector,
        pot: &EdgePotential,
    ) -> Result<usize, Error> {
        let num_states = self.config.num_states;
        if pot.shape() != (num_states, num_states) {
            return Err(Error::ShapeMismatch {
                expected: (num_states, num_states),
                actual: pot.shape(),
            });
        }
        self.built_indexer()?;

        let targets: Vec<_> = self
            .graph
            .edges()
            .filter(|(_, rec)| selector.matches(rec.group))
            .map(|(id, _)| id)
            .collect();

        for &id in &targets {
            self.graph.set_edge_potential(id, pot)?;
        }
        debug!("set potential on {} edges ({:?})", targets.len(), selector);
        Ok(targets.len())
    }
}
