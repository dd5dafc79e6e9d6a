//! Index-space boxes for volumes and their slices.
//!
//! Slices live in a signed 2-D index space so that shapes translated during
//! alignment may temporarily sit at negative or out-of-volume coordinates.
//! All boxes are half-open: `origin..origin + size` along every dimension.

use std::ops::Range;

/// Axis-aligned box in slice index space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SliceBox {
    pub origin: [i64; 2],
    pub size: [usize; 2],
}

impl SliceBox {
    pub fn new(origin: [i64; 2], size: [usize; 2]) -> Self {
        Self { origin, size }
    }

    /// Box covering exactly one pixel.
    pub fn unit(index: [i64; 2]) -> Self {
        Self::new(index, [1, 1])
    }

    pub fn is_empty(&self) -> bool {
        self.size[0] == 0 || self.size[1] == 0
    }

    pub fn len(&self) -> usize {
        self.size[0] * self.size[1]
    }

    pub fn end(&self, d: usize) -> i64 {
        self.origin[d] + self.size[d] as i64
    }

    pub fn contains(&self, index: [i64; 2]) -> bool {
        (0..2).all(|d| index[d] >= self.origin[d] && index[d] < self.end(d))
    }

    /// Grows the box so that it includes `index`.
    pub fn expand(&mut self, index: [i64; 2]) {
        if self.is_empty() {
            *self = Self::unit(index);
            return;
        }
        for d in 0..2 {
            if index[d] < self.origin[d] {
                self.size[d] += (self.origin[d] - index[d]) as usize;
                self.origin[d] = index[d];
            } else if index[d] >= self.end(d) {
                self.size[d] = (index[d] - self.origin[d] + 1) as usize;
            }
        }
    }

    /// Smallest box containing both boxes. Empty boxes are ignored.
    pub fn union(&self, other: &SliceBox) -> SliceBox {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let mut result = *self;
        result.expand(other.origin);
        result.expand([other.end(0) - 1, other.end(1) - 1]);
        result
    }

    /// Overlap of both boxes; the size is zero along any disjoint dimension.
    pub fn intersect(&self, other: &SliceBox) -> SliceBox {
        let mut result = SliceBox::default();
        for d in 0..2 {
            let start = self.origin[d].max(other.origin[d]);
            let end = self.end(d).min(other.end(d));
            result.origin[d] = start;
            result.size[d] = (end - start).max(0) as usize;
        }
        result
    }

    pub fn translated(&self, translation: [i64; 2]) -> SliceBox {
        SliceBox::new(
            [
                self.origin[0] + translation[0],
                self.origin[1] + translation[1],
            ],
            self.size,
        )
    }

    /// Array position of `index` inside this box.
    pub fn local(&self, index: [i64; 2]) -> Option<[usize; 2]> {
        self.contains(index).then(|| {
            [
                (index[0] - self.origin[0]) as usize,
                (index[1] - self.origin[1]) as usize,
            ]
        })
    }

    /// Array ranges addressing `inner`, which must lie within this box.
    pub fn local_ranges(&self, inner: &SliceBox) -> [Range<usize>; 2] {
        [0, 1].map(|d| {
            let start = (inner.origin[d] - self.origin[d]) as usize;
            start..start + inner.size[d]
        })
    }
}

/// Axis-aligned box in volume index space, axes ordered `(depth, height, width)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VoxelBox {
    pub origin: [i64; 3],
    pub size: [usize; 3],
}

impl VoxelBox {
    pub fn new(origin: [i64; 3], size: [usize; 3]) -> Self {
        Self { origin, size }
    }

    /// Box covering a whole volume of the given dimensions.
    pub fn whole(dim: (usize, usize, usize)) -> Self {
        Self::new([0, 0, 0], [dim.0, dim.1, dim.2])
    }

    pub fn unit(index: [i64; 3]) -> Self {
        Self::new(index, [1, 1, 1])
    }

    pub fn is_empty(&self) -> bool {
        self.size.iter().any(|&s| s == 0)
    }

    pub fn end(&self, d: usize) -> i64 {
        self.origin[d] + self.size[d] as i64
    }

    pub fn contains(&self, index: [i64; 3]) -> bool {
        (0..3).all(|d| index[d] >= self.origin[d] && index[d] < self.end(d))
    }

    pub fn expand(&mut self, index: [i64; 3]) {
        if self.is_empty() {
            *self = Self::unit(index);
            return;
        }
        for d in 0..3 {
            if index[d] < self.origin[d] {
                self.size[d] += (self.origin[d] - index[d]) as usize;
                self.origin[d] = index[d];
            } else if index[d] >= self.end(d) {
                self.size[d] = (index[d] - self.origin[d] + 1) as usize;
            }
        }
    }

    pub fn intersect(&self, other: &VoxelBox) -> VoxelBox {
        let mut result = VoxelBox::default();
        for d in 0..3 {
            let start = self.origin[d].max(other.origin[d]);
            let end = self.end(d).min(other.end(d));
            result.origin[d] = start;
            result.size[d] = (end - start).max(0) as usize;
        }
        result
    }

    /// Cross-section of this box perpendicular to `axis`.
    pub fn project(&self, axis: usize) -> SliceBox {
        let [a, b] = slice_axes(axis);
        SliceBox::new([self.origin[a], self.origin[b]], [self.size[a], self.size[b]])
    }

    /// Where `index` falls along `axis`: `-1` before the box, `1` past it, `0` within.
    pub fn side(&self, axis: usize, index: i64) -> i32 {
        if index < self.origin[axis] {
            -1
        } else if index >= self.end(axis) {
            1
        } else {
            0
        }
    }
}

/// The two volume axes spanning a slice perpendicular to `axis`, in increasing order.
pub fn slice_axes(axis: usize) -> [usize; 2] {
    match axis {
        0 => [1, 2],
        1 => [0, 2],
        _ => [0, 1],
    }
}

/// Volume index of slice pixel `pixel` on slice `index` along `axis`.
pub fn voxel_index(axis: usize, index: i64, pixel: [i64; 2]) -> [i64; 3] {
    let [a, b] = slice_axes(axis);
    let mut voxel = [0; 3];
    voxel[axis] = index;
    voxel[a] = pixel[0];
    voxel[b] = pixel[1];
    voxel
}
