use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point2f {
    pub x: f32,
    pub y: f32,
}

impl Point2f {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Pixel `(col, row)` as a point, column on the x axis.
    pub fn from_pixel(col: usize, row: usize) -> Self {
        Self {
            x: col as f32,
            y: row as f32,
        }
    }
}

/// Implicit line `a*x + b*y + c = 0`, with `a` and `b` not both zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineEq {
    a: f32,
    b: f32,
    c: f32,
}

impl LineEq {
    pub fn new(a: f32, b: f32, c: f32) -> Result<Self, Error> {
        if a == 0.0 && b == 0.0 {
            return Err(Error::DegenerateLine);
        }
        Ok(Self { a, b, c })
    }

    /// Line through two distinct points.
    pub fn through(p: Point2f, q: Point2f) -> Result<Self, Error> {
        let a = q.y - p.y;
        let b = p.x - q.x;
        Self::new(a, b, -(a * p.x + b * p.y))
    }

    pub fn coefficients(&self) -> (f32, f32, f32) {
        (self.a, self.b, self.c)
    }

    pub fn eval(&self, p: Point2f) -> f32 {
        self.a * p.x + self.b * p.y + self.c
    }

    /// Sign of [`LineEq::eval`]: `-1`, `0` on the line, `1`.
    pub fn side(&self, p: Point2f) -> i8 {
        let v = self.eval(p);
        if v > 0.0 {
            1
        } else if v < 0.0 {
            -1
        } else {
            0
        }
    }

    /// True when `p` and `q` are not in the same class of
    /// [`LineEq::side`]. A point on the line never shares a side with a
    /// point off it.
    pub fn separates(&self, p: Point2f, q: Point2f) -> bool {
        self.side(p) != self.side(q)
    }
}
