//! Foundational primitives for layered grid graphical models.
//!
//! ## Arrays
//! [`Image`] is a dense, row-major array with interleaved channels. It holds
//! per-pixel score vectors (one channel per state), ground-truth labels
//! (single channel) and feature vectors (one channel per feature).
//! [`ImageView`] borrows such an array with a pixel stride that may exceed the
//! width, so padded buffers are addressable without copying.
//!
//! ## Coordinates
//! `x` is the pixel column and `y` the pixel row. Geometry in [`LineEq`] uses
//! the same convention, with integer coordinates at pixel centers.

mod error;
mod features;
mod geom;
mod image;

pub use error::Error;
pub use features::{ChannelStack, FeatureSource};
pub use geom::{LineEq, Point2f};
pub use image::{Image, ImageView};
