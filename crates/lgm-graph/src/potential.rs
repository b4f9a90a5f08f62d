use lgm_core::Error;

/// Row-major `rows x cols` pairwise potential.
///
/// Entry `(i, j)` scores state `i` at the first endpoint of an edge together
/// with state `j` at the second endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgePotential {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl EdgePotential {
    pub fn filled(rows: usize, cols: usize, value: f32) -> Self {
        Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    pub fn new(rows: usize, cols: usize) -> Self {
        Self::filled(rows, cols, 0.0)
    }

    pub fn from_vec(rows: usize, cols: usize, data: Vec<f32>) -> Result<Self, Error> {
        if data.len() != rows * cols {
            return Err(Error::SizeMismatch {
                expected: rows * cols,
                actual: data.len(),
            });
        }
        Ok(Self { rows, cols, data })
    }

    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> f32) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for i in 0..rows {
            for j in 0..cols {
                data.push(f(i, j));
            }
        }
        Self { rows, cols, data }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn get(&self, i: usize, j: usize) -> f32 {
        assert!(i < self.rows && j < self.cols, "potential index out of bounds");
        self.data[i * self.cols + j]
    }

    pub fn set(&mut self, i: usize, j: usize, value: f32) {
        assert!(i < self.rows && j < self.cols, "potential index out of bounds");
        self.data[i * self.cols + j] = value;
    }

    /// Entry-wise `p^weight`.
    pub fn powf(mut self, weight: f32) -> Self {
        if weight != 1.0 {
            for v in &mut self.data {
                *v = v.powf(weight);
            }
        }
        self
    }

    pub fn transpose(&self) -> Self {
        Self::from_fn(self.cols, self.rows, |i, j| self.get(j, i))
    }
}
