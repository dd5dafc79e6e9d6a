//! Shared output volume written by concurrently running jobs.

use std::sync::{Mutex, PoisonError};

use ndarray::Array3;

use crate::geometry::{VoxelBox, voxel_index};
use crate::slice::Mask;

/// Output labels behind one lock, with writes clipped to the requested region.
///
/// Every write keeps the larger of the stored and the written label, so the
/// final content does not depend on the order in which jobs commit.
#[derive(Debug)]
pub struct LabelCanvas {
    data: Mutex<Array3<u16>>,
    requested: VoxelBox,
}

impl LabelCanvas {
    pub fn new(dim: (usize, usize, usize), requested: VoxelBox) -> Self {
        Self {
            data: Mutex::new(Array3::zeros(dim)),
            requested,
        }
    }

    pub fn requested(&self) -> &VoxelBox {
        &self.requested
    }

    /// Writes `label` on slice `index` along `axis` wherever `shape` is set and
    /// the stored label is smaller. Returns the number of voxels changed.
    pub fn commit_if_greater(&self, axis: usize, index: i64, shape: &Mask, label: u16) -> usize {
        if self.requested.side(axis, index) != 0 {
            return 0;
        }
        let region = shape.bounds().intersect(&self.requested.project(axis));
        if region.is_empty() {
            return 0;
        }
        let pixels: Vec<[usize; 3]> = shape
            .indexed_iter()
            .filter(|&(pixel, &set)| set && region.contains(pixel))
            .map(|(pixel, _)| voxel_index(axis, index, pixel).map(|v| v as usize))
            .collect();

        let mut data = self.data.lock().unwrap_or_else(PoisonError::into_inner);
        let mut written = 0;
        for voxel in pixels {
            let current = &mut data[voxel];
            if *current < label {
                *current = label;
                written += 1;
            }
        }
        written
    }

    pub fn into_inner(self) -> Array3<u16> {
        self.data.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}
