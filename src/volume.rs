use std::collections::BTreeSet;

use crate::enums::Orientation;

use image::ImageBuffer;
use image::Luma;
use ndarray::Array3;
use ndarray::ArrayView2;
use ndarray::s;
use rayon::prelude::*;

/// A label volume: `0` is background, every other value a region label.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabeledVolume {
    pub data: Array3<u16>,
    /// Voxel spacing, carried along for callers; the interpolation works in index space.
    pub spacing: (f32, f32, f32),
}

impl LabeledVolume {
    pub fn new(data: Array3<u16>, spacing: (f32, f32, f32)) -> Self {
        Self { data, spacing }
    }

    /// Get the dimensions of the volume (depth, height, width)
    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    /// Get a reference to the underlying data
    pub fn data(&self) -> &Array3<u16> {
        &self.data
    }

    /// Get a mutable reference to the underlying data
    pub fn data_mut(&mut self) -> &mut Array3<u16> {
        &mut self.data
    }

    /// Distinct non-zero labels present in the volume, in increasing order.
    pub fn labels(&self) -> BTreeSet<u16> {
        self.data.iter().copied().filter(|&v| v != 0).collect()
    }

    /// Number of slices perpendicular to `orientation`.
    pub fn extent(&self, orientation: Orientation) -> usize {
        let dim = self.data.dim();
        match orientation {
            Orientation::Axial => dim.0,
            Orientation::Coronal => dim.1,
            Orientation::Sagittal => dim.2,
        }
    }

    pub fn get_slice_from_axis(
        &self,
        index: usize,
        orientation: &Orientation,
    ) -> Option<ArrayView2<'_, u16>> {
        if !self.is_valid_index(index, orientation) {
            return None;
        }
        let slice_result = match orientation {
            Orientation::Axial => self.data().slice(s![index, .., ..]),
            Orientation::Coronal => self.data().slice(s![.., index, ..]),
            Orientation::Sagittal => self.data().slice(s![.., .., index]),
        };
        Some(slice_result)
    }

    /// Renders a slice as 8-bit grayscale, spreading labels evenly over `1..=255`.
    pub fn slice_image(
        &self,
        index: usize,
        orientation: Orientation,
    ) -> Option<ImageBuffer<Luma<u8>, Vec<u8>>> {
        let slice = self.get_slice_from_axis(index, &orientation)?;
        let max_label = self.data.iter().copied().max().unwrap_or(0);
        Self::slice_to_image(&slice, max_label)
    }

    #[inline]
    fn label_to_u8(value: u16, max_label: u16) -> u8 {
        if value == 0 || max_label == 0 {
            return 0;
        }
        ((value as f32 / max_label as f32) * 255.0).clamp(1.0, 255.0) as u8
    }

    fn slice_to_image(
        slice: &ArrayView2<'_, u16>,
        max_label: u16,
    ) -> Option<ImageBuffer<Luma<u8>, Vec<u8>>> {
        let (height, width) = slice.dim();
        let pixel_data: Vec<u8> = slice
            .into_par_iter()
            .map(|&v| Self::label_to_u8(v, max_label))
            .collect();
        ImageBuffer::from_raw(width as u32, height as u32, pixel_data)
    }

    fn is_valid_index(&self, index: usize, orientation: &Orientation) -> bool {
        index < self.extent(*orientation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn volume() -> LabeledVolume {
        let mut data = Array3::<u16>::zeros((2, 3, 4));
        data[[1, 2, 3]] = 4;
        data[[0, 1, 1]] = 2;
        LabeledVolume::new(data, (0.5, 0.5, 2.0))
    }

    #[test]
    fn test_labels_and_extent() {
        let volume = volume();
        assert_eq!(volume.labels().into_iter().collect::<Vec<_>>(), vec![2, 4]);
        assert_eq!(volume.extent(Orientation::Axial), 2);
        assert_eq!(volume.extent(Orientation::Sagittal), 4);
    }

    #[test]
    fn test_slice_image_dimensions_and_levels() {
        let volume = volume();
        let image = volume
            .slice_image(3, Orientation::Sagittal)
            .expect("index is within the volume");
        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(image.get_pixel(2, 1).0, [255]);
        assert_eq!(image.get_pixel(0, 0).0, [0]);

        let image = volume
            .slice_image(0, Orientation::Axial)
            .expect("index is within the volume");
        assert_eq!(image.get_pixel(1, 1).0, [127]);
    }

    #[test]
    fn test_slice_out_of_range() {
        assert!(volume().slice_image(3, Orientation::Coronal).is_none());
        assert!(volume().get_slice_from_axis(2, &Orientation::Axial).is_none());
    }
}
