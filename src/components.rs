//! Connected components of one label within one slice.

use image::Luma;
use imageproc::region_labelling::{Connectivity, connected_components};
use ndarray::{Array2, Array3, Axis, s};

use crate::enums::StructuringElement;
use crate::geometry::{SliceBox, slice_axes};
use crate::slice::{ComponentSlice, Mask};

/// Labels the connected regions of `foreground`.
///
/// Ids start at 1 and are handed out in raster order of each region's first
/// pixel. Connectivity follows the structuring element: 4-neighbours for a
/// cross, 8-neighbours for a ball.
pub fn label_components(foreground: &Mask, element: StructuringElement) -> ComponentSlice {
    let origin = foreground.bounds().origin;
    if foreground.is_clear() {
        return ComponentSlice::new(foreground.bounds());
    }
    let connectivity = match element {
        StructuringElement::Cross => Connectivity::Four,
        StructuringElement::Ball => Connectivity::Eight,
    };
    let ids = connected_components(&foreground.to_luma(), connectivity, Luma([0u8]));
    let (rows, cols) = foreground.data().dim();
    let data = Array2::from_shape_fn((rows, cols), |(r, c)| {
        ids.get_pixel(c as u32, r as u32)[0]
    });
    ComponentSlice::from_array(origin, data)
}

/// Components of `label` on slice `index` along `axis`, restricted to `extent`.
///
/// The extent is clipped to the volume; a slice index outside the volume
/// yields an empty component slice over the clipped extent.
pub fn extract_components(
    data: &Array3<u16>,
    axis: usize,
    index: i64,
    label: u16,
    extent: SliceBox,
    element: StructuringElement,
) -> ComponentSlice {
    let plane_bounds = {
        let dim = data.shape();
        let [a, b] = slice_axes(axis);
        SliceBox::new([0, 0], [dim[a], dim[b]])
    };
    let clipped = extent.intersect(&plane_bounds);
    if index < 0 || index as usize >= data.len_of(Axis(axis)) || clipped.is_empty() {
        return ComponentSlice::new(clipped);
    }

    let plane = data.index_axis(Axis(axis), index as usize);
    let [rows, cols] = plane_bounds.local_ranges(&clipped);
    let foreground = plane.slice(s![rows, cols]).mapv(|v| v == label);
    label_components(&Mask::from_array(clipped.origin, foreground), element)
}
