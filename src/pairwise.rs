//! Interpolation between two corresponding regions, including one-sided fades.

use tracing::trace;

use crate::align::{AlignmentConfig, align};
use crate::canvas::LabelCanvas;
use crate::enums::MedianMethod;
use crate::geometry::SliceBox;
use crate::median::median_shape;
use crate::morphology::Morphology;
use crate::slice::ComponentSlice;

/// Everything a worker needs to run interpolations for one label along one axis.
pub struct JobContext<'a> {
    pub axis: usize,
    pub label: u16,
    pub canvas: &'a LabelCanvas,
    pub morphology: &'a Morphology,
    pub median_method: MedianMethod,
    pub alignment: &'a AlignmentConfig,
}

/// Splits `translation` into the shifts applied to the first and second slice.
///
/// The first shift takes half of every component; the odd remainder of the
/// first component is carried into the next odd component. A carry left over
/// at the end is returned so the midpoint index can be rounded the same way.
/// The two shifts always differ by exactly `translation`.
pub fn split_translation(translation: [i64; 2]) -> ([i64; 2], [i64; 2], bool) {
    let mut first = [0; 2];
    let mut second = [0; 2];
    let mut carry = false;
    for d in 0..2 {
        let t = translation[d];
        first[d] = if !carry {
            carry = t % 2 != 0;
            t / 2
        } else if t % 2 == 0 {
            t / 2
        } else {
            carry = false;
            t / 2 + t.signum()
        };
        second[d] = first[d] - t;
    }
    (first, second, carry)
}

impl JobContext<'_> {
    /// Writes the median of two regions at the slice halfway between `i` and
    /// `j`, then recurses into both halves while they are more than a slice apart.
    ///
    /// `translation` pairs pixel `p` of `first` with pixel `p + translation` of
    /// `second`. Halves lying entirely beyond one side of the requested region
    /// are not visited.
    #[allow(clippy::too_many_arguments)]
    pub fn interpolate_one_to_one(
        &self,
        i: i64,
        j: i64,
        first: &ComponentSlice,
        first_id: u32,
        second: &ComponentSlice,
        second_id: u32,
        translation: [i64; 2],
        recursive: bool,
    ) {
        let (first_shift, second_shift, carry) = split_translation(translation);
        let mut frame = first
            .bounds()
            .translated(first_shift)
            .union(&second.bounds().translated(second_shift));

        if !recursive {
            let (Some(a), Some(b)) = (
                first.bounding_box_of(first_id),
                second.bounding_box_of(second_id),
            ) else {
                return;
            };
            frame = a.translated(first_shift).union(&b.translated(second_shift));
        }

        let first_mask = first.mask_of(first_id).translated(first_shift, frame);
        let second_mask = second.mask_of(second_id).translated(second_shift, frame);
        let median = median_shape(&first_mask, &second_mask, self.median_method, self.morphology);

        let mid = (i + j + i64::from(carry)) / 2;
        let written = self.canvas.commit_if_greater(self.axis, mid, &median, self.label);
        trace!(
            axis = self.axis,
            label = self.label,
            i,
            j,
            mid,
            written,
            "Committed median slice"
        );
        if median.is_clear() || (i - j).abs() <= 2 {
            return;
        }

        let middle = median.to_components(1);
        let requested = self.canvas.requested();
        let side = |index: i64| requested.side(self.axis, index);
        if (i - mid).abs() > 1 && (side(i) + side(mid)).abs() <= 1 {
            self.interpolate_one_to_one(i, mid, first, first_id, &middle, 1, first_shift, true);
        }
        if (j - mid).abs() > 1 && (side(j) + side(mid)).abs() <= 1 {
            self.interpolate_one_to_one(j, mid, second, second_id, &middle, 1, second_shift, true);
        }
    }

    /// Fades region `id` of `slice` (at index `from`) out towards index `to`.
    ///
    /// The counterpart is a single phantom pixel placed where the region best
    /// covers it, so concave shapes shrink towards a point inside them.
    pub fn extrapolate(&self, from: i64, to: i64, slice: &ComponentSlice, id: u32) {
        let Some(centroid) = slice.centroid(&[id]) else {
            return;
        };
        let mut phantom =
            ComponentSlice::new(SliceBox::new([centroid[0] - 1, centroid[1] - 1], [3, 3]));
        phantom.set(centroid, id);

        let t = align(slice, id, &phantom, &[id], self.alignment);
        let origin = phantom.bounds().origin;
        let phantom = phantom.relocated([origin[0] - t[0], origin[1] - t[1]]);
        self.interpolate_one_to_one(from, to, slice, id, &phantom, id, [0, 0], false);
    }
}
