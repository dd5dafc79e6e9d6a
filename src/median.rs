//! Median shape between two aligned single-region masks.

use crate::enums::MedianMethod;
use crate::morphology::{Morphology, distance_map};
use crate::slice::Mask;

/// Histogram bins per unit of distance.
const DISTANCE_FRACTIONING: f64 = 10.0;

/// Shape halfway between `first` and `second`, which must share bounds.
///
/// An empty intersection has no meaningful median and is returned as is.
pub fn median_shape(
    first: &Mask,
    second: &Mask,
    method: MedianMethod,
    morphology: &Morphology,
) -> Mask {
    let intersection = first.and(second);
    if intersection.is_clear() {
        return intersection;
    }
    match method {
        MedianMethod::DilationSequence => by_dilation(&intersection, first, second, morphology),
        MedianMethod::DistanceTransform => by_distance(intersection, first, second),
    }
}

/// Unions the dilation sequences from the intersection towards each mask,
/// generation by generation, and picks the generation equally far from both.
fn by_dilation(intersection: &Mask, first: &Mask, second: &Mask, morphology: &Morphology) -> Mask {
    let mut towards_first = morphology.dilation_sequence(intersection, first);
    let mut towards_second = morphology.dilation_sequence(intersection, second);
    // first runs from its mask down to the intersection
    towards_first.reverse();
    if towards_first.len() < towards_second.len() {
        std::mem::swap(&mut towards_first, &mut towards_second);
    }
    let ratio = towards_second.len() as f32 / towards_first.len() as f32;

    let candidates: Vec<Mask> = towards_first
        .iter()
        .enumerate()
        .map(|(x, generation)| generation.or(&towards_second[(ratio * x as f32) as usize]))
        .collect();

    let mut best_index = 0;
    let mut best_score = first.bounds().len();
    for (x, candidate) in candidates.iter().enumerate() {
        let score = candidate
            .symmetric_difference_count(first)
            .abs_diff(candidate.symmetric_difference_count(second));
        if score < best_score {
            best_score = score;
            best_index = x;
        }
    }
    candidates
        .into_iter()
        .nth(best_index)
        .unwrap_or_else(|| intersection.clone())
}

/// Thresholds the distance map of the intersection where the exclusive
/// pixels of both masks are balanced.
fn by_distance(intersection: Mask, first: &Mask, second: &Mask) -> Mask {
    let Some(field) = distance_map(&intersection) else {
        return intersection;
    };

    let union = first.or(second);
    let mut first_hist: Vec<u64> = Vec::new();
    let mut second_hist: Vec<u64> = Vec::new();
    for ((&a, &b), &d) in first
        .data()
        .iter()
        .zip(second.data().iter())
        .zip(field.iter())
    {
        let hist = match (a, b) {
            (true, false) => &mut first_hist,
            (false, true) => &mut second_hist,
            _ => continue,
        };
        let bin = (DISTANCE_FRACTIONING * d) as usize;
        if bin >= hist.len() {
            hist.resize(bin + 1, 0);
        }
        hist[bin] += 1;
    }

    let bins = first_hist.len().max(second_hist.len());
    if bins == 0 {
        return intersection;
    }
    first_hist.resize(bins, 0);
    second_hist.resize(bins, 0);
    let cumulative = |hist: &[u64]| -> Vec<i64> {
        hist.iter()
            .scan(0i64, |sum, &n| {
                *sum += n as i64;
                Some(*sum)
            })
            .collect()
    };
    let (first_sum, second_sum) = (cumulative(&first_hist), cumulative(&second_hist));
    let (first_total, second_total) = (first_sum[bins - 1], second_sum[bins - 1]);

    // first bin wins ties
    let mut best_bin = 0;
    let mut best_diff = i64::MAX;
    for b in 0..bins {
        let first_side = (first_total - first_sum[b] + second_sum[b]).abs();
        let second_side = (second_total - second_sum[b] + first_sum[b]).abs();
        let diff = (first_side - second_side).abs();
        if diff < best_diff {
            best_diff = diff;
            best_bin = b;
        }
    }

    let threshold = best_bin as f64 / DISTANCE_FRACTIONING;
    let mut median = union;
    median
        .data_mut()
        .zip_mut_with(&field, |set, &d| *set = *set && d <= threshold);
    median
}
