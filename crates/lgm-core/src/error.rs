use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid grid dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    #[error("a layered graph needs at least one layer")]
    InvalidLayerCount,
    #[error("nodes need at least one state")]
    InvalidStateCount,
    #[error("size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("grid mismatch: expected {}x{}, got {}x{}", expected.0, expected.1, actual.0, actual.1)]
    GridMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },
    #[error("potential shape mismatch: expected {}x{}, got {}x{}", expected.0, expected.1, actual.0, actual.1)]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },
    #[error("state count mismatch: expected {expected}, got {actual}")]
    StateCountMismatch { expected: usize, actual: usize },
    #[error("degenerate line: A and B are both zero")]
    DegenerateLine,
    #[error("graph topology has not been built")]
    NotBuilt,
    #[error("node {0} is out of range")]
    NodeOutOfRange(usize),
    #[error("edge {0} is out of range")]
    EdgeOutOfRange(usize),
    #[error("edge endpoints must be distinct nodes (got {0} twice)")]
    SelfLoop(usize),
    #[error("invalid stride")]
    InvalidStride,
    #[error("out of bounds")]
    OutOfBounds,
}
