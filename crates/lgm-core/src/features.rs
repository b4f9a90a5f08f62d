//! Per-pixel feature vectors.
//!
//! Features come either as one multi-channel array (a pixel's channels form
//! its vector) or as a stack of single-channel arrays (the i-th plane holds
//! the i-th feature). Both are consumed through [`FeatureSource`].

use std::borrow::Cow;

use crate::{Error, Image, ImageView};

/// Anything addressable by `(x, y)` to a fixed-length `u8` feature vector.
pub trait FeatureSource: Sync {
    fn width(&self) -> usize;

    fn height(&self) -> usize;

    fn num_features(&self) -> usize;

    /// Feature vector of pixel `(x, y)`.
    ///
    /// # Panics
    /// If `(x, y)` lies outside the source.
    fn feature(&self, x: usize, y: usize) -> Cow<'_, [u8]>;

    fn size(&self) -> (usize, usize) {
        (self.width(), self.height())
    }
}

impl FeatureSource for ImageView<'_, u8> {
    fn width(&self) -> usize {
        ImageView::width(self)
    }

    fn height(&self) -> usize {
        ImageView::height(self)
    }

    fn num_features(&self) -> usize {
        self.channels()
    }

    fn feature(&self, x: usize, y: usize) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.pixel(x, y).expect("feature lookup out of bounds"))
    }
}

impl FeatureSource for Image<u8> {
    fn width(&self) -> usize {
        Image::width(self)
    }

    fn height(&self) -> usize {
        Image::height(self)
    }

    fn num_features(&self) -> usize {
        self.channels()
    }

    fn feature(&self, x: usize, y: usize) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.pixel(x, y).expect("feature lookup out of bounds"))
    }
}

/// Feature vectors gathered across equally sized single-channel planes.
#[derive(Debug, Clone)]
pub struct ChannelStack<'a> {
    width: usize,
    height: usize,
    planes: Vec<ImageView<'a, u8>>,
}

impl<'a> ChannelStack<'a> {
    pub fn new(planes: Vec<ImageView<'a, u8>>) -> Result<Self, Error> {
        let Some(first) = planes.first() else {
            return Err(Error::SizeMismatch {
                expected: 1,
                actual: 0,
            });
        };
        let (width, height) = first.size();

        for plane in &planes {
            if plane.channels() != 1 {
                return Err(Error::SizeMismatch {
                    expected: 1,
                    actual: plane.channels(),
                });
            }
            if plane.size() != (width, height) {
                return Err(Error::GridMismatch {
                    expected: (width, height),
                    actual: plane.size(),
                });
            }
        }

        Ok(Self {
            width,
            height,
            planes,
        })
    }

    pub fn planes(&self) -> &[ImageView<'a, u8>] {
        &self.planes
    }
}

impl FeatureSource for ChannelStack<'_> {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn num_features(&self) -> usize {
        self.planes.len()
    }

    fn feature(&self, x: usize, y: usize) -> Cow<'_, [u8]> {
        Cow::Owned(
            self.planes
                .iter()
                .map(|plane| *plane.get(x, y).expect("feature lookup out of bounds"))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{ChannelStack, FeatureSource};
    use crate::{Error, Image};

    #[test]
    fn interleaved_and_stacked_sources_agree() {
        let rgb = Image::from_vec(2, 1, 3, vec![10u8, 20, 30, 40, 50, 60]).expect("valid image");
        let r = Image::from_vec(2, 1, 1, vec![10u8, 40]).expect("valid plane");
        let g = Image::from_vec(2, 1, 1, vec![20u8, 50]).expect("valid plane");
        let b = Image::from_vec(2, 1, 1, vec![30u8, 60]).expect("valid plane");
        let stack =
            ChannelStack::new(vec![r.as_view(), g.as_view(), b.as_view()]).expect("valid stack");

        let view = rgb.as_view();
        assert_eq!(view.num_features(), 3);
        assert_eq!(stack.num_features(), 3);
        for x in 0..2 {
            assert_eq!(view.feature(x, 0), stack.feature(x, 0));
        }
        assert_eq!(&*stack.feature(1, 0), &[40, 50, 60]);
    }

    #[test]
    fn stack_rejects_mismatched_planes() {
        let a = Image::new_fill(2, 2, 1, 0u8);
        let b = Image::new_fill(3, 2, 1, 0u8);
        let rgb = Image::new_fill(2, 2, 3, 0u8);

        assert_eq!(
            ChannelStack::new(vec![a.as_view(), b.as_view()]).err(),
            Some(Error::GridMismatch {
                expected: (2, 2),
                actual: (3, 2)
            })
        );
        assert!(ChannelStack::new(vec![rgb.as_view()]).is_err());
        assert!(ChannelStack::new(Vec::new()).is_err());
    }
}
