//! Detection of the annotated cross-sections of every label.
//!
//! A voxel marks its slice as annotated along axis `a` when both of its
//! neighbours along `a` are background while along each other axis both
//! neighbours carry the voxel's own label. That singles out true cross
//! sections drawn into the volume rather than flat faces of solid regions.

use std::collections::{BTreeMap, BTreeSet};

use ndarray::Array3;

use crate::geometry::VoxelBox;

/// Per axis and label, the ordered slice indices usable as interpolation endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabeledSliceIndex {
    axes: [BTreeMap<u16, BTreeSet<i64>>; 3],
}

impl LabeledSliceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `index` as an annotated slice of `label` along `axis`.
    ///
    /// Background and axes beyond the third are ignored.
    pub fn insert(&mut self, axis: usize, label: u16, index: i64) {
        if label == 0 {
            return;
        }
        if let Some(labels) = self.axes.get_mut(axis) {
            labels.entry(label).or_default().insert(index);
        }
    }

    pub fn slices(&self, axis: usize, label: u16) -> Option<&BTreeSet<i64>> {
        self.axes.get(axis)?.get(&label)
    }

    /// Labels with slice sets along `axis`, in increasing label order.
    pub fn labels(&self, axis: usize) -> impl Iterator<Item = (u16, &BTreeSet<i64>)> + '_ {
        self.axes
            .get(axis)
            .into_iter()
            .flat_map(|labels| labels.iter().map(|(&label, set)| (label, set)))
    }

    /// Whether some label accepted by `wanted` has two or more slices along `axis`.
    pub fn has_pairs(&self, axis: usize, wanted: impl Fn(u16) -> bool) -> bool {
        self.labels(axis)
            .any(|(label, set)| wanted(label) && set.len() > 1)
    }

    pub fn is_empty(&self) -> bool {
        self.axes.iter().all(|labels| labels.values().all(BTreeSet::is_empty))
    }
}

/// Result of one detection pass.
#[derive(Debug, Clone, Default)]
pub struct SliceOrientations {
    pub slices: LabeledSliceIndex,
    /// Box enclosing every voxel of each label inside the scanned region.
    pub bounding_boxes: BTreeMap<u16, VoxelBox>,
}

/// Scans `region` of `data` once, collecting annotated slices and label bounding boxes.
///
/// Neighbours outside `region` count as background. With `axis` set, slices
/// are only recorded along that axis; bounding boxes are always complete.
pub fn detect_slice_orientations(
    data: &Array3<u16>,
    region: &VoxelBox,
    axis: Option<usize>,
) -> SliceOrientations {
    let mut result = SliceOrientations::default();
    let value_at = |index: [i64; 3]| -> u16 {
        if region.contains(index) {
            data[[index[0] as usize, index[1] as usize, index[2] as usize]]
        } else {
            0
        }
    };

    for z in region.origin[0]..region.end(0) {
        for y in region.origin[1]..region.end(1) {
            for x in region.origin[2]..region.end(2) {
                let index = [z, y, x];
                let value = value_at(index);
                if value == 0 {
                    continue;
                }
                result
                    .bounding_boxes
                    .entry(value)
                    .and_modify(|b| b.expand(index))
                    .or_insert_with(|| VoxelBox::unit(index));

                let mut isolated = 0;
                let mut adjacent = 0;
                let mut isolated_axis = 0;
                for a in 0..3 {
                    let mut prev = index;
                    prev[a] -= 1;
                    let mut next = index;
                    next[a] += 1;
                    let (before, after) = (value_at(prev), value_at(next));
                    if before == 0 && after == 0 {
                        isolated_axis = a;
                        isolated += 1;
                    } else if before == value && after == value {
                        adjacent += 1;
                    }
                }
                if isolated == 1 && adjacent == 2 && axis.is_none_or(|a| a == isolated_axis) {
                    result
                        .slices
                        .insert(isolated_axis, value, index[isolated_axis]);
                }
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::s;

    #[test]
    fn test_detects_isolated_slices_and_boxes() {
        let mut data = Array3::<u16>::zeros((6, 5, 5));
        data.slice_mut(s![1, 1..4, 1..4]).fill(3);
        data.slice_mut(s![4, 1..4, 1..4]).fill(3);
        let found = detect_slice_orientations(&data, &VoxelBox::whole(data.dim()), None);
        let expected: BTreeSet<i64> = [1, 4].into_iter().collect();
        assert_eq!(found.slices.slices(0, 3), Some(&expected));
        assert!(found.slices.slices(1, 3).is_none());
        assert_eq!(found.bounding_boxes[&3], VoxelBox::new([1, 1, 1], [4, 3, 3]));
    }

    #[test]
    fn test_solid_block_has_no_isolated_slices() {
        let mut data = Array3::<u16>::zeros((6, 5, 5));
        data.slice_mut(s![1..5, 1..4, 1..4]).fill(2);
        let found = detect_slice_orientations(&data, &VoxelBox::whole(data.dim()), None);
        assert!(found.slices.is_empty());
        assert!(found.bounding_boxes.contains_key(&2));
    }

    #[test]
    fn test_axis_filter_keeps_boxes() {
        let mut data = Array3::<u16>::zeros((5, 5, 5));
        data.slice_mut(s![.., 2, ..]).fill(1);
        let found = detect_slice_orientations(&data, &VoxelBox::whole(data.dim()), Some(0));
        assert!(found.slices.is_empty());
        let found = detect_slice_orientations(&data, &VoxelBox::whole(data.dim()), Some(1));
        assert_eq!(found.slices.slices(1, 1).map(BTreeSet::len), Some(1));
        assert_eq!(found.bounding_boxes.len(), 1);
    }

    #[test]
    fn test_has_pairs_respects_filter() {
        let mut index = LabeledSliceIndex::new();
        index.insert(2, 4, 0);
        index.insert(2, 4, 9);
        index.insert(2, 5, 3);
        index.insert(2, 0, 1);
        assert!(index.has_pairs(2, |_| true));
        assert!(!index.has_pairs(2, |label| label == 5));
        assert!(!index.has_pairs(0, |_| true));
        assert!(index.slices(2, 0).is_none());
    }
}
