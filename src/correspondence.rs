//! Classification of region correspondences across a gap.
//!
//! Overlaying the two slices without translation yields pairs of component
//! ids `(first, second)`. The pairs are consumed into immutable groups before
//! any interpolation runs, so dispatch never mutates the set it walks.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;

use crate::slice::ComponentSlice;

/// Which of the two slices of a job a region belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    First,
    Second,
}

/// One unit of work between two slices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Correspondence {
    /// A region with no counterpart; it fades out towards the other slice.
    Extrapolate { side: Side, id: u32 },
    /// Two regions overlapping only each other.
    OneToOne { first: u32, second: u32 },
    /// Region `id` on `side` corresponds to several regions on the other side.
    OneToMany {
        side: Side,
        id: u32,
        partners: Vec<u32>,
    },
}

/// Component id pairs seen when overlaying the slices, minus spurious ones.
///
/// A pair with background on one side is dropped when that region also
/// overlaps some region of the other slice elsewhere.
pub fn observed_pairs(first: &ComponentSlice, second: &ComponentSlice) -> BTreeSet<(u32, u32)> {
    let mut seen = BTreeSet::new();
    let mut touching = BTreeSet::new();
    let bounds = first.bounds().union(&second.bounds());
    for r in bounds.origin[0]..bounds.end(0) {
        for c in bounds.origin[1]..bounds.end(1) {
            let pair = (first.value([r, c]), second.value([r, c]));
            match pair {
                (0, 0) => {}
                (a, b) => {
                    seen.insert(pair);
                    if a != 0 && b != 0 {
                        touching.insert((a, 0));
                        touching.insert((0, b));
                    }
                }
            }
        }
    }
    seen.difference(&touching).copied().collect()
}

/// Partitions `pairs` into correspondence groups.
///
/// Groups come out as extrapolations, then 1-to-1 matches, then 1-to-N and
/// M-to-1 groups found in one ordered sweep, and finally whatever M-to-N
/// tangle remains, cut into 1-to-N groups by first-slice region.
pub fn resolve(pairs: BTreeSet<(u32, u32)>) -> Vec<Correspondence> {
    let mut groups = Vec::new();
    let mut remaining = BTreeSet::new();
    for pair in pairs {
        match pair {
            (0, 0) => {}
            (id, 0) => groups.push(Correspondence::Extrapolate {
                side: Side::First,
                id,
            }),
            (0, id) => groups.push(Correspondence::Extrapolate {
                side: Side::Second,
                id,
            }),
            _ => {
                remaining.insert(pair);
            }
        }
    }

    let mut first_counts: BTreeMap<u32, usize> = BTreeMap::new();
    let mut second_counts: BTreeMap<u32, usize> = BTreeMap::new();
    for &(a, b) in &remaining {
        *first_counts.entry(a).or_default() += 1;
        *second_counts.entry(b).or_default() += 1;
    }
    let count = |counts: &BTreeMap<u32, usize>, id: u32| counts.get(&id).copied().unwrap_or(0);

    let unique: Vec<(u32, u32)> = remaining
        .iter()
        .filter(|&&(a, b)| count(&first_counts, a) == 1 && count(&second_counts, b) == 1)
        .copied()
        .collect();
    for (first, second) in unique {
        remaining.remove(&(first, second));
        first_counts.remove(&first);
        second_counts.remove(&second);
        groups.push(Correspondence::OneToOne { first, second });
    }

    // a single sweep in pair order; counts shrink as groups are taken out
    let mut cursor: Option<(u32, u32)> = None;
    loop {
        let next = match cursor {
            None => remaining.iter().next(),
            Some(c) => remaining
                .range((Bound::Excluded(c), Bound::Unbounded))
                .next(),
        };
        let Some(&(a, b)) = next else {
            break;
        };
        cursor = Some((a, b));

        let (members, group): (Vec<(u32, u32)>, _) = if count(&first_counts, a) == 1 {
            let members: Vec<_> = remaining.iter().filter(|p| p.1 == b).copied().collect();
            let partners = members.iter().map(|p| p.0).collect();
            (
                members,
                Correspondence::OneToMany {
                    side: Side::Second,
                    id: b,
                    partners,
                },
            )
        } else if count(&second_counts, b) == 1 {
            let members: Vec<_> = remaining.iter().filter(|p| p.0 == a).copied().collect();
            let partners = members.iter().map(|p| p.1).collect();
            (
                members,
                Correspondence::OneToMany {
                    side: Side::First,
                    id: a,
                    partners,
                },
            )
        } else {
            continue;
        };

        for member in members {
            remaining.remove(&member);
            if let Some(n) = first_counts.get_mut(&member.0) {
                *n = n.saturating_sub(1);
            }
            if let Some(n) = second_counts.get_mut(&member.1) {
                *n = n.saturating_sub(1);
            }
        }
        groups.push(group);
    }

    while let Some(&(a, _)) = remaining.iter().next() {
        let partners = remaining
            .iter()
            .filter(|p| p.0 == a)
            .map(|p| p.1)
            .collect();
        remaining.retain(|p| p.0 != a);
        groups.push(Correspondence::OneToMany {
            side: Side::First,
            id: a,
            partners,
        });
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn pairs(list: &[(u32, u32)]) -> BTreeSet<(u32, u32)> {
        list.iter().copied().collect()
    }

    #[test]
    fn test_observed_pairs_drop_spurious_background() {
        let first = ComponentSlice::from_array([0, 0], array![[1, 1, 0], [0, 0, 2]]);
        let second = ComponentSlice::from_array([0, 0], array![[0, 3, 3], [0, 0, 0]]);
        assert_eq!(
            observed_pairs(&first, &second),
            pairs(&[(1, 3), (2, 0)])
        );
    }

    #[test]
    fn test_extrapolation_and_one_to_one() {
        let groups = resolve(pairs(&[(1, 0), (0, 4), (2, 5)]));
        assert_eq!(
            groups,
            vec![
                Correspondence::Extrapolate {
                    side: Side::Second,
                    id: 4
                },
                Correspondence::Extrapolate {
                    side: Side::First,
                    id: 1
                },
                Correspondence::OneToOne {
                    first: 2,
                    second: 5
                },
            ]
        );
    }

    #[test]
    fn test_one_to_many_and_many_to_one() {
        let groups = resolve(pairs(&[(1, 2), (1, 3), (4, 6), (5, 6)]));
        assert_eq!(
            groups,
            vec![
                Correspondence::OneToMany {
                    side: Side::First,
                    id: 1,
                    partners: vec![2, 3]
                },
                Correspondence::OneToMany {
                    side: Side::Second,
                    id: 6,
                    partners: vec![4, 5]
                },
            ]
        );
    }

    #[test]
    fn test_many_to_many_is_cut_by_first_region() {
        let groups = resolve(pairs(&[(1, 3), (1, 4), (2, 3), (2, 4)]));
        assert_eq!(
            groups,
            vec![
                Correspondence::OneToMany {
                    side: Side::First,
                    id: 1,
                    partners: vec![3, 4]
                },
                Correspondence::OneToMany {
                    side: Side::First,
                    id: 2,
                    partners: vec![3, 4]
                },
            ]
        );
    }

    #[test]
    fn test_every_pair_lands_in_exactly_one_group() {
        let input = pairs(&[(1, 5), (2, 5), (2, 6), (3, 6), (3, 7), (4, 8)]);
        let mut covered = BTreeSet::new();
        for group in resolve(input.clone()) {
            match group {
                Correspondence::OneToOne { first, second } => {
                    assert!(covered.insert((first, second)));
                }
                Correspondence::OneToMany { side, id, partners } => {
                    for p in partners {
                        let pair = match side {
                            Side::First => (id, p),
                            Side::Second => (p, id),
                        };
                        assert!(covered.insert(pair));
                    }
                }
                Correspondence::Extrapolate { .. } => unreachable!(),
            }
        }
        assert_eq!(covered, input);
    }
}
