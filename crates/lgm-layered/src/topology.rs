use core::fmt;
use core::ops::{BitOr, BitOrAssign};

use lgm_core::Error;
use lgm_graph::{GroupId, NodeId};

use crate::indexer::{GridCoord, GridIndexer};

pub const INTRA_LAYER_GROUP: GroupId = 0;
pub const LINK_GROUP: GroupId = 1;

// Forward neighbor offsets (dx, dy): each undirected edge is emitted once,
// from its lower-id endpoint.
const GRID_OFFSETS: [(isize, usize); 2] = [(1, 0), (0, 1)];
const DIAG_OFFSETS: [(isize, usize); 2] = [(1, 1), (-1, 1)];

/// Set of edge families to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EdgeTypes(u8);

impl EdgeTypes {
    pub const NONE: Self = Self(0);
    /// Horizontal and vertical edges.
    pub const GRID: Self = Self(1);
    /// Both diagonals.
    pub const DIAG: Self = Self(2);
    /// Inter-layer links.
    pub const LINK: Self = Self(4);
    pub const ALL: Self = Self(7);

    /// Unknown bits are dropped.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & Self::ALL.0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for EdgeTypes {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for EdgeTypes {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for EdgeTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }

        let mut first = true;
        for (flag, name) in [
            (Self::GRID, "grid"),
            (Self::DIAG, "diag"),
            (Self::LINK, "link"),
        ] {
            if self.contains(flag) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    Horizontal,
    Vertical,
    Diagonal,
    Link,
}

impl EdgeKind {
    pub fn is_link(self) -> bool {
        self == EdgeKind::Link
    }

    pub fn default_group(self) -> GroupId {
        if self.is_link() {
            LINK_GROUP
        } else {
            INTRA_LAYER_GROUP
        }
    }

    /// `None` if `a` and `b` are not adjacent.
    pub fn between(a: GridCoord, b: GridCoord) -> Option<Self> {
        if a.layer != b.layer {
            let same_pixel = a.x == b.x && a.y == b.y;
            return (same_pixel && a.layer.abs_diff(b.layer) == 1).then_some(EdgeKind::Link);
        }

        match (a.x.abs_diff(b.x), a.y.abs_diff(b.y)) {
            (1, 0) => Some(EdgeKind::Horizontal),
            (0, 1) => Some(EdgeKind::Vertical),
            (1, 1) => Some(EdgeKind::Diagonal),
            _ => None,
        }
    }
}

pub fn edge_count(width: usize, height: usize, layers: usize, types: EdgeTypes) -> usize {
    if width == 0 || height == 0 || layers == 0 {
        return 0;
    }

    let mut per_layer = 0;
    if types.contains(EdgeTypes::GRID) {
        per_layer += (width - 1) * height + width * (height - 1);
    }
    if types.contains(EdgeTypes::DIAG) {
        per_layer += 2 * (width - 1) * (height - 1);
    }

    let mut total = per_layer * layers;
    if types.contains(EdgeTypes::LINK) {
        total += (layers - 1) * width * height;
    }
    total
}

/// Visits every edge of the layered grid in build order.
///
/// Order: layers, then rows, then columns; per node the right and lower
/// neighbors (GRID), the lower-right and lower-left neighbors (DIAG), then the
/// link down to the previous layer (LINK). Every emitted pair has `a < b`.
pub(crate) fn for_each_edge<F>(ix: &GridIndexer, types: EdgeTypes, mut visit: F) -> Result<(), Error>
where
    F: FnMut(NodeId, NodeId, EdgeKind) -> Result<(), Error>,
{
    let (width, height) = (ix.width(), ix.height());

    for layer in 0..ix.layers() {
        for y in 0..height {
            for x in 0..width {
                let idx = ix.id(layer, y, x);

                if types.contains(EdgeTypes::GRID) {
                    for (dx, dy) in GRID_OFFSETS {
                        if let Some(n) = forward_neighbor(ix, layer, x, y, dx, dy) {
                            let kind = if dy == 0 {
                                EdgeKind::Horizontal
                            } else {
                                EdgeKind::Vertical
                            };
                            visit(idx, n, kind)?;
                        }
                    }
                }

                if types.contains(EdgeTypes::DIAG) {
                    for (dx, dy) in DIAG_OFFSETS {
                        if let Some(n) = forward_neighbor(ix, layer, x, y, dx, dy) {
                            visit(idx, n, EdgeKind::Diagonal)?;
                        }
                    }
                }

                if layer > 0 && types.contains(EdgeTypes::LINK) {
                    visit(idx - ix.layer_size(), idx, EdgeKind::Link)?;
                }
            }
        }
    }

    Ok(())
}

fn forward_neighbor(
    ix: &GridIndexer,
    layer: usize,
    x: usize,
    y: usize,
    dx: isize,
    dy: usize,
) -> Option<NodeId> {
    let nx = x.checked_add_signed(dx)?;
    let ny = y + dy;
    if nx >= ix.width() || ny >= ix.height() {
        return None;
    }
    Some(ix.id(layer, ny, nx))
}
