use lgm_core::Error;
use lgm_graph::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCoord {
    pub layer: usize,
    pub y: usize,
    pub x: usize,
}

/// Bijection between `(layer, y, x)` and linear node ids.
///
/// Ids are row-major with layers outermost:
/// `id = layer * height * width + y * width + x`. The base layer therefore
/// occupies `[0, width * height)` and the same pixel one layer up is always
/// `layer_size()` ids further.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridIndexer {
    width: usize,
    height: usize,
    layers: usize,
}

impl GridIndexer {
    pub fn new(width: usize, height: usize, layers: usize) -> Self {
        Self {
            width,
            height,
            layers,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn layers(&self) -> usize {
        self.layers
    }

    pub fn layer_size(&self) -> usize {
        self.width * self.height
    }

    pub fn num_nodes(&self) -> usize {
        self.layer_size() * self.layers
    }

    /// # Panics
    /// If any coordinate is out of range.
    pub fn id(&self, layer: usize, y: usize, x: usize) -> NodeId {
        assert!(
            layer < self.layers && y < self.height && x < self.width,
            "grid coordinate ({layer}, {y}, {x}) out of range"
        );
        layer * self.layer_size() + y * self.width + x
    }

    /// # Panics
    /// If `id` is not a node of this grid.
    pub fn coord(&self, id: NodeId) -> GridCoord {
        assert!(id < self.num_nodes(), "node id {id} out of range");
        self.decompose(id)
    }

    pub fn checked_coord(&self, id: NodeId) -> Result<GridCoord, Error> {
        if id >= self.num_nodes() {
            return Err(Error::NodeOutOfRange(id));
        }
        Ok(self.decompose(id))
    }

    /// Same pixel, one layer up.
    pub fn next_layer(&self, id: NodeId) -> Option<NodeId> {
        let up = id.checked_add(self.layer_size())?;
        (up < self.num_nodes()).then_some(up)
    }

    /// Same pixel, one layer down.
    pub fn prev_layer(&self, id: NodeId) -> Option<NodeId> {
        if id >= self.num_nodes() {
            return None;
        }
        id.checked_sub(self.layer_size())
    }

    fn decompose(&self, id: NodeId) -> GridCoord {
        let layer_size = self.layer_size();
        let in_layer = id % layer_size;
        GridCoord {
            layer: id / layer_size,
            y: in_layer / self.width,
            x: in_layer % self.width,
        }
    }
}
