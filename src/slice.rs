//! 2-D buffers positioned in slice index space.

use image::{GrayImage, Luma};
use ndarray::{Array2, ArrayView2, Zip, s};

use crate::geometry::SliceBox;

/// A 2-D buffer covering `bounds`; indices outside read as the default value.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceImage<T> {
    bounds: SliceBox,
    data: Array2<T>,
}

/// Connected-component ids of one label in one slice, `0` being background.
pub type ComponentSlice = SliceImage<u32>;

/// Binary slice mask.
pub type Mask = SliceImage<bool>;

impl<T: Clone + Default + PartialEq> SliceImage<T> {
    /// Buffer over `bounds` filled with the default value.
    pub fn new(bounds: SliceBox) -> Self {
        Self {
            bounds,
            data: Array2::from_elem((bounds.size[0], bounds.size[1]), T::default()),
        }
    }

    pub fn from_array(origin: [i64; 2], data: Array2<T>) -> Self {
        let (rows, cols) = data.dim();
        Self {
            bounds: SliceBox::new(origin, [rows, cols]),
            data,
        }
    }

    pub fn bounds(&self) -> SliceBox {
        self.bounds
    }

    pub fn data(&self) -> &Array2<T> {
        &self.data
    }

    pub fn get(&self, index: [i64; 2]) -> Option<&T> {
        let [r, c] = self.bounds.local(index)?;
        self.data.get([r, c])
    }

    /// Value at `index`, or the default when it lies outside the buffer.
    pub fn value(&self, index: [i64; 2]) -> T {
        self.get(index).cloned().unwrap_or_default()
    }

    /// Stores `value` at `index`; indices outside the buffer are ignored.
    pub fn set(&mut self, index: [i64; 2], value: T) {
        if let Some([r, c]) = self.bounds.local(index) {
            self.data[[r, c]] = value;
        }
    }

    /// View of the part of the buffer covered by `region`, which must lie within it.
    pub fn view(&self, region: &SliceBox) -> ArrayView2<'_, T> {
        let [rows, cols] = self.bounds.local_ranges(region);
        self.data.slice(s![rows, cols])
    }

    /// Copy of this buffer moved by `translation`, resampled onto `bounds`.
    ///
    /// Pixel `p` of `self` lands on `p + translation`; whatever falls outside
    /// `bounds` is dropped.
    pub fn translated(&self, translation: [i64; 2], bounds: SliceBox) -> Self {
        let mut result = Self::new(bounds);
        let moved = self.bounds.translated(translation);
        let overlap = moved.intersect(&bounds);
        if overlap.is_empty() {
            return result;
        }
        let [dst_rows, dst_cols] = bounds.local_ranges(&overlap);
        let [src_rows, src_cols] = moved.local_ranges(&overlap);
        result
            .data
            .slice_mut(s![dst_rows, dst_cols])
            .assign(&self.data.slice(s![src_rows, src_cols]));
        result
    }

    /// Same pixels, re-addressed so that the buffer starts at `origin`.
    pub fn relocated(self, origin: [i64; 2]) -> Self {
        Self {
            bounds: SliceBox::new(origin, self.bounds.size),
            data: self.data,
        }
    }

    pub fn indexed_iter(&self) -> impl Iterator<Item = ([i64; 2], &T)> + '_ {
        let origin = self.bounds.origin;
        self.data
            .indexed_iter()
            .map(move |((r, c), v)| ([origin[0] + r as i64, origin[1] + c as i64], v))
    }
}

impl ComponentSlice {
    /// Binary mask of the pixels carrying `id`, over the same bounds.
    pub fn mask_of(&self, id: u32) -> Mask {
        SliceImage {
            bounds: self.bounds,
            data: self.data.mapv(|v| v == id),
        }
    }

    /// Tight box around the pixels carrying `id`.
    pub fn bounding_box_of(&self, id: u32) -> Option<SliceBox> {
        let mut bounds = SliceBox::default();
        for (index, &v) in self.indexed_iter() {
            if v == id {
                bounds.expand(index);
            }
        }
        (!bounds.is_empty()).then_some(bounds)
    }

    /// Integer centroid of the pixels carrying any of `ids`.
    pub fn centroid(&self, ids: &[u32]) -> Option<[i64; 2]> {
        let mut sum = [0i64; 2];
        let mut count = 0i64;
        for (index, &v) in self.indexed_iter() {
            if v != 0 && ids.contains(&v) {
                sum[0] += index[0];
                sum[1] += index[1];
                count += 1;
            }
        }
        (count > 0).then(|| [sum[0] / count, sum[1] / count])
    }
}

impl Mask {
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    pub fn is_clear(&self) -> bool {
        !self.data.iter().any(|&v| v)
    }

    /// Pixelwise AND; both masks must share bounds.
    pub fn and(&self, other: &Mask) -> Mask {
        SliceImage {
            bounds: self.bounds,
            data: Zip::from(&self.data)
                .and(&other.data)
                .map_collect(|&a, &b| a && b),
        }
    }

    /// Pixelwise OR; both masks must share bounds.
    pub fn or(&self, other: &Mask) -> Mask {
        SliceImage {
            bounds: self.bounds,
            data: Zip::from(&self.data)
                .and(&other.data)
                .map_collect(|&a, &b| a || b),
        }
    }

    /// Number of pixels set in exactly one of the two masks.
    pub fn symmetric_difference_count(&self, other: &Mask) -> usize {
        Zip::from(&self.data)
            .and(&other.data)
            .fold(0, |acc, &a, &b| acc + usize::from(a != b))
    }

    /// Component slice carrying `id` wherever the mask is set.
    pub fn to_components(&self, id: u32) -> ComponentSlice {
        SliceImage {
            bounds: self.bounds,
            data: self.data.mapv(|v| if v { id } else { 0 }),
        }
    }

    pub(crate) fn data_mut(&mut self) -> &mut Array2<bool> {
        &mut self.data
    }

    /// Grayscale image of the mask, set pixels at `255`.
    pub fn to_luma(&self) -> GrayImage {
        let (rows, cols) = self.data.dim();
        GrayImage::from_fn(cols as u32, rows as u32, |x, y| {
            Luma([if self.data[[y as usize, x as usize]] { 255 } else { 0 }])
        })
    }

    /// Mask at `origin` of the non-zero pixels of `image`.
    pub fn from_luma(origin: [i64; 2], image: &GrayImage) -> Mask {
        let (cols, rows) = image.dimensions();
        let data = Array2::from_shape_fn((rows as usize, cols as usize), |(r, c)| {
            image.get_pixel(c as u32, r as u32)[0] != 0
        });
        Mask::from_array(origin, data)
    }
}
