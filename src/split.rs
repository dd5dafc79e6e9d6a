//! Partition of one region among several corresponding regions.
//!
//! Each target region seeds a claim where it overlaps the (translated)
//! source region. Claims then grow by conditional dilation inside the source
//! region; a pixel reached by several claims in the same round goes to the
//! claim that comes first in target order.

use ndarray::{Array2, Zip};
use tracing::trace;

use crate::morphology::Morphology;
use crate::pairwise::JobContext;
use crate::slice::{ComponentSlice, Mask};

/// Splits region `source_id` of `source` into one part per target id.
///
/// `translation` pairs source pixel `p` with target pixel `p + translation`.
/// The parts are pairwise disjoint, carry `source_id` and share the bounds of
/// `source`. Pixels no claim can reach stay unassigned.
pub fn split_region(
    source: &ComponentSlice,
    source_id: u32,
    target: &ComponentSlice,
    target_ids: &[u32],
    translation: [i64; 2],
    morphology: &Morphology,
) -> Vec<ComponentSlice> {
    let bounds = source.bounds();
    let mask = source.mask_of(source_id);
    let moved = target.translated([-translation[0], -translation[1]], bounds);

    // 0 is unclaimed, x + 1 is owned by target x
    let mut owner = Array2::<usize>::zeros((bounds.size[0], bounds.size[1]));
    let mut claims: Vec<Mask> = target_ids.iter().map(|_| Mask::new(bounds)).collect();
    Zip::from(&mut owner)
        .and(mask.data())
        .and(moved.data())
        .for_each(|owner, &inside, &t| {
            if !inside {
                return;
            }
            if let Some(x) = target_ids.iter().position(|&id| id == t) {
                *owner = x + 1;
            }
        });
    for (x, claim) in claims.iter_mut().enumerate() {
        Zip::from(claim.data_mut())
            .and(&owner)
            .for_each(|set, &o| *set = o == x + 1);
    }

    let mut unclaimed = count_unclaimed(&mask, &owner);
    let mut rounds = 0;
    while unclaimed > 0 {
        for claim in claims.iter_mut() {
            *claim = morphology.conditional_dilate(claim, &mask);
        }
        Zip::indexed(&mut owner)
            .and(mask.data())
            .for_each(|(r, c), owner, &inside| {
                if !inside {
                    return;
                }
                if *owner == 0 {
                    if let Some(x) = claims.iter().position(|claim| claim.data()[[r, c]]) {
                        *owner = x + 1;
                    }
                }
                for (x, claim) in claims.iter_mut().enumerate() {
                    if *owner != x + 1 {
                        claim.data_mut()[[r, c]] = false;
                    }
                }
            });
        rounds += 1;

        let remaining = count_unclaimed(&mask, &owner);
        if remaining == unclaimed {
            break;
        }
        unclaimed = remaining;
    }
    trace!(source_id, parts = target_ids.len(), rounds, unclaimed, "Split region");

    (1..=target_ids.len())
        .map(|x| {
            ComponentSlice::from_array(
                bounds.origin,
                owner.mapv(|o| if o == x { source_id } else { 0 }),
            )
        })
        .collect()
}

fn count_unclaimed(mask: &Mask, owner: &Array2<usize>) -> usize {
    Zip::from(mask.data())
        .and(owner)
        .fold(0, |acc, &inside, &o| acc + usize::from(inside && o == 0))
}

impl JobContext<'_> {
    /// Interpolates region `source_id` at `i` towards several regions at `j`
    /// by splitting it and interpolating each part with its own target.
    #[allow(clippy::too_many_arguments)]
    pub fn interpolate_one_to_many(
        &self,
        i: i64,
        j: i64,
        source: &ComponentSlice,
        source_id: u32,
        target: &ComponentSlice,
        target_ids: &[u32],
        translation: [i64; 2],
    ) {
        let parts = split_region(
            source,
            source_id,
            target,
            target_ids,
            translation,
            self.morphology,
        );
        for (part, &target_id) in parts.iter().zip(target_ids) {
            self.interpolate_one_to_one(
                i,
                j,
                part,
                source_id,
                target,
                target_id,
                translation,
                false,
            );
        }
    }
}
