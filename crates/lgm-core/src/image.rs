use crate::Error;

/// Dense, row-major, channel-interleaved 2D array.
///
/// Pixel `(x, y)` occupies `data[(y * width + x) * channels..][..channels]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Image<T> {
    width: usize,
    height: usize,
    channels: usize,
    data: Vec<T>,
}

impl<T> Image<T> {
    pub fn from_vec(width: usize, height: usize, channels: usize, data: Vec<T>) -> Result<Self, Error> {
        if channels == 0 {
            return Err(Error::SizeMismatch {
                expected: 1,
                actual: 0,
            });
        }

        let expected = width
            .checked_mul(height)
            .and_then(|px| px.checked_mul(channels))
            .ok_or(Error::SizeMismatch {
                expected: usize::MAX,
                actual: data.len(),
            })?;

        if data.len() != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<&[T]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = (y * self.width + x) * self.channels;
        self.data.get(start..start + self.channels)
    }

    pub fn as_view(&self) -> ImageView<'_, T> {
        ImageView {
            width: self.width,
            height: self.height,
            channels: self.channels,
            stride: self.width,
            data: &self.data,
        }
    }
}

impl<T: Clone> Image<T> {
    pub fn new_fill(width: usize, height: usize, channels: usize, value: T) -> Self {
        let len = width
            .checked_mul(height)
            .and_then(|px| px.checked_mul(channels))
            .expect("image size overflow");
        Self {
            width,
            height,
            channels,
            data: vec![value; len],
        }
    }
}

/// Borrowed view over a channel-interleaved array.
///
/// `stride` is measured in pixels, so a row starts every
/// `stride * channels` elements.
#[derive(Debug, Clone, Copy)]
pub struct ImageView<'a, T> {
    width: usize,
    height: usize,
    channels: usize,
    stride: usize,
    data: &'a [T],
}

impl<'a, T> ImageView<'a, T> {
    pub fn from_slice(
        width: usize,
        height: usize,
        channels: usize,
        stride: usize,
        data: &'a [T],
    ) -> Result<Self, Error> {
        if stride < width || channels == 0 {
            return Err(Error::InvalidStride);
        }

        let min_len = min_required_len(width, height, stride, channels).ok_or(
            Error::SizeMismatch {
                expected: usize::MAX,
                actual: data.len(),
            },
        )?;

        if data.len() < min_len {
            return Err(Error::SizeMismatch {
                expected: min_len,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            channels,
            stride,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// All channels of pixel `(x, y)`.
    pub fn pixel(&self, x: usize, y: usize) -> Option<&'a [T]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = (y * self.stride + x) * self.channels;
        self.data.get(start..start + self.channels)
    }

    /// First channel of pixel `(x, y)`.
    pub fn get(&self, x: usize, y: usize) -> Option<&'a T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get((y * self.stride + x) * self.channels)
    }
}

fn min_required_len(width: usize, height: usize, stride: usize, channels: usize) -> Option<usize> {
    if width == 0 || height == 0 {
        return Some(0);
    }

    let rows_before_last = height.checked_sub(1)?;
    let base = rows_before_last.checked_mul(stride)?;
    base.checked_add(width)?.checked_mul(channels)
}
