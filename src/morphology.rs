//! Binary morphology and distance maps on slice masks.
//!
//! Masks go through `imageproc` as grayscale images. A radius-one dilation
//! under the L1 norm is the cross, under the L-infinity norm the 3x3 ball.

use image::GrayImage;
use imageproc::distance_transform::{Norm, euclidean_squared_distance_transform};
use imageproc::morphology;
use ndarray::Array2;

use crate::enums::StructuringElement;
use crate::slice::Mask;

/// Distance norm whose unit ball is `element`.
fn norm_of(element: StructuringElement) -> Norm {
    match element {
        StructuringElement::Cross => Norm::L1,
        StructuringElement::Ball => Norm::LInf,
    }
}

/// Dilation kernel for one worker.
///
/// Built once per worker thread and reused for every job that worker runs.
#[derive(Debug, Clone)]
pub struct Morphology {
    element: StructuringElement,
    norm: Norm,
}

impl Morphology {
    pub fn new(element: StructuringElement) -> Self {
        Self {
            element,
            norm: norm_of(element),
        }
    }

    pub fn element(&self) -> StructuringElement {
        self.element
    }

    /// One step of dilation; pixels outside the mask bounds count as background.
    pub fn dilate(&self, seed: &Mask) -> Mask {
        if seed.data().is_empty() {
            return seed.clone();
        }
        let dilated: GrayImage = morphology::dilate(&seed.to_luma(), self.norm, 1);
        Mask::from_luma(seed.bounds().origin, &dilated)
    }

    /// One dilation step of `seed` restricted to `mask`.
    pub fn conditional_dilate(&self, seed: &Mask, mask: &Mask) -> Mask {
        self.dilate(seed).and(mask)
    }

    /// Successive conditional dilations of `begin` inside `end` until nothing changes.
    ///
    /// The fixed point appears exactly once, as the last generation.
    pub fn dilation_sequence(&self, begin: &Mask, end: &Mask) -> Vec<Mask> {
        let mut sequence = vec![self.conditional_dilate(begin, end)];
        loop {
            let Some(last) = sequence.last() else {
                break;
            };
            let next = self.conditional_dilate(last, end);
            if &next == last {
                break;
            }
            sequence.push(next);
        }
        sequence
    }
}

/// Euclidean distance from every pixel to the nearest set pixel of `mask`, in
/// index units. Set pixels are at `0`.
///
/// Returns `None` for a clear mask.
pub fn distance_map(mask: &Mask) -> Option<Array2<f64>> {
    if mask.is_clear() {
        return None;
    }
    let squared = euclidean_squared_distance_transform(&mask.to_luma());
    let (rows, cols) = mask.data().dim();
    Some(Array2::from_shape_fn((rows, cols), |(r, c)| {
        squared.get_pixel(c as u32, r as u32)[0].sqrt()
    }))
}
