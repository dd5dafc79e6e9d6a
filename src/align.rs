//! Discrete translation search between regions of two slices.
//!
//! A translation `t` pairs pixel `p` of the source slice with pixel `p + t`
//! of the target slice. The search is a breadth-first walk over translations
//! seeded at zero and at the centroid offset, so among equally scoring
//! translations the one closest to a seed wins.

use std::collections::VecDeque;

use ndarray::{Array2, Zip};

use crate::enums::AlignmentMode;
use crate::geometry::SliceBox;
use crate::slice::ComponentSlice;

/// Tunables of the translation search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignmentConfig {
    pub mode: AlignmentMode,
    /// Candidates always explored, capped by the number of possible translations.
    pub min_iterations: usize,
    /// Budget for heuristic expansion, raised to the square root of the number
    /// of possible translations for large slices.
    pub max_iterations: usize,
    /// A candidate keeps expanding while its score exceeds this fraction of the best.
    pub improvement_ratio: f64,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            mode: AlignmentMode::Heuristic,
            min_iterations: 8,
            max_iterations: 216,
            improvement_ratio: 0.9,
        }
    }
}

/// Number of source pixels of `source_id` whose translated counterpart carries
/// one of `target_ids`.
///
/// Zero when any target id is not touched at all: a split or merge has to
/// reach every participating region.
pub fn overlap_score(
    source: &ComponentSlice,
    source_id: u32,
    target: &ComponentSlice,
    target_ids: &[u32],
    translation: [i64; 2],
) -> usize {
    let overlap = source
        .bounds()
        .translated(translation)
        .intersect(&target.bounds());
    if overlap.is_empty() || target_ids.is_empty() {
        return 0;
    }
    let source_region = overlap.translated([-translation[0], -translation[1]]);

    let mut counts = vec![0usize; target_ids.len()];
    Zip::from(&source.view(&source_region))
        .and(&target.view(&overlap))
        .for_each(|&s, &t| {
            if s == source_id {
                if let Some(x) = target_ids.iter().position(|&id| id == t) {
                    counts[x] += 1;
                }
            }
        });

    if counts.contains(&0) {
        0
    } else {
        counts.iter().sum()
    }
}

/// Translation of the target frame that best overlaps `source_id` with `target_ids`.
///
/// Returns the zero vector when no translation overlaps at all.
pub fn align(
    source: &ComponentSlice,
    source_id: u32,
    target: &ComponentSlice,
    target_ids: &[u32],
    config: &AlignmentConfig,
) -> [i64; 2] {
    let (Some(source_centroid), Some(target_centroid)) =
        (source.centroid(&[source_id]), target.centroid(target_ids))
    else {
        return [0, 0];
    };
    let centroid_offset = [
        target_centroid[0] - source_centroid[0],
        target_centroid[1] - source_centroid[1],
    ];

    // every translation with a non-empty overlap of the two buffers
    let (sb, tb) = (source.bounds(), target.bounds());
    let search = SliceBox::new(
        [0, 1].map(|d| tb.origin[d] - sb.origin[d] - sb.size[d] as i64 + 1),
        [0, 1].map(|d| (sb.size[d] + tb.size[d]).saturating_sub(1)),
    );
    if search.is_empty() {
        return [0, 0];
    }
    let mut searched = Array2::from_elem((search.size[0], search.size[1]), false);
    let mut visit = |t: [i64; 2], queue: &mut VecDeque<[i64; 2]>| -> bool {
        match search.local(t) {
            Some([r, c]) if !searched[[r, c]] => {
                searched[[r, c]] = true;
                queue.push_back(t);
                true
            }
            _ => false,
        }
    };

    let mut queue = VecDeque::new();
    visit([0, 0], &mut queue);
    visit(centroid_offset, &mut queue);

    let min_iterations = config.min_iterations.min(search.len());
    let max_iterations = config
        .max_iterations
        .max((search.len() as f64).sqrt() as usize);
    let mut best = [0, 0];
    let mut best_score = 0;
    let mut iterations = 0;

    while let Some(t) = queue.pop_front() {
        let score = overlap_score(source, source_id, target, target_ids, t);
        if score > best_score {
            best_score = score;
            best = t;
        }

        let expand = config.mode == AlignmentMode::Exhaustive
            || best_score == 0
            || iterations <= min_iterations
            || (score as f64 > best_score as f64 * config.improvement_ratio
                && iterations <= max_iterations);
        if !expand {
            continue;
        }
        for d in 0..2 {
            for step in [-1, 1] {
                let mut neighbour = t;
                neighbour[d] += step;
                if visit(neighbour, &mut queue) {
                    iterations += 1;
                }
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(bounds: SliceBox, at: [i64; 2], side: usize, id: u32) -> ComponentSlice {
        let mut slice = ComponentSlice::new(bounds);
        for r in 0..side as i64 {
            for c in 0..side as i64 {
                slice.set([at[0] + r, at[1] + c], id);
            }
        }
        slice
    }

    #[test]
    fn test_overlap_requires_every_target() {
        let bounds = SliceBox::new([0, 0], [6, 6]);
        let source = square(bounds, [0, 0], 3, 1);
        let mut target = square(bounds, [0, 0], 2, 1);
        target.set([5, 5], 2);
        assert_eq!(overlap_score(&source, 1, &target, &[1], [0, 0]), 4);
        assert_eq!(overlap_score(&source, 1, &target, &[1, 2], [0, 0]), 0);
        assert_eq!(overlap_score(&source, 1, &target, &[1, 2], [3, 3]), 0);
    }

    #[test]
    fn test_align_recovers_shift() {
        let bounds = SliceBox::new([0, 0], [12, 12]);
        let source = square(bounds, [1, 2], 4, 1);
        let target = square(bounds, [5, 3], 4, 7);
        let config = AlignmentConfig::default();
        assert_eq!(align(&source, 1, &target, &[7], &config), [4, 1]);
    }

    #[test]
    fn test_align_prefers_zero_on_ties() {
        let bounds = SliceBox::new([0, 0], [8, 8]);
        let source = square(bounds, [2, 2], 3, 1);
        let target = square(bounds, [2, 2], 3, 1);
        let config = AlignmentConfig {
            mode: AlignmentMode::Exhaustive,
            ..AlignmentConfig::default()
        };
        assert_eq!(align(&source, 1, &target, &[1], &config), [0, 0]);
    }

    #[test]
    fn test_align_without_target_pixels() {
        let source = square(SliceBox::new([0, 0], [4, 4]), [0, 0], 2, 1);
        let target = ComponentSlice::from_array([0, 0], Array2::zeros((4, 4)));
        assert_eq!(
            align(&source, 1, &target, &[1], &AlignmentConfig::default()),
            [0, 0]
        );
    }
}
