use label_interpolation::components::extract_components;
use label_interpolation::morphology::Morphology;
use label_interpolation::split::split_region;
use label_interpolation::{
    InterpolatorConfig, LabeledSliceIndex, LabeledVolume, MedianMethod, MorphologicalInterpolator,
    SliceBox, StructuringElement, VoxelBox,
};
use ndarray::{Array3, Axis, s};

fn disk(data: &mut Array3<u16>, z: usize, center: (i64, i64), radius: i64, label: u16) {
    let (_, rows, cols) = data.dim();
    for r in 0..rows {
        for c in 0..cols {
            let (dr, dc) = (r as i64 - center.0, c as i64 - center.1);
            if dr * dr + dc * dc <= radius * radius {
                data[[z, r, c]] = label;
            }
        }
    }
}

fn run(volume: &LabeledVolume, config: InterpolatorConfig) -> LabeledVolume {
    MorphologicalInterpolator::new(config)
        .interpolate(volume)
        .expect("interpolation should succeed")
}

fn count(volume: &LabeledVolume, z: usize, label: u16) -> usize {
    volume
        .data
        .index_axis(Axis(0), z)
        .iter()
        .filter(|&&v| v == label)
        .count()
}

/// Splits, merges, fades and shifted regions of three labels.
fn mixed_volume() -> LabeledVolume {
    let mut data = Array3::<u16>::zeros((11, 16, 24));
    disk(&mut data, 0, (8, 7), 4, 1);
    disk(&mut data, 5, (8, 3), 2, 1);
    disk(&mut data, 5, (8, 10), 2, 1);
    data.slice_mut(s![0, 2..7, 14..22]).fill(2);
    data.slice_mut(s![10, 8..13, 16..22]).fill(2);
    data.slice_mut(s![5, 12..15, 14..17]).fill(3);
    data.slice_mut(s![10, 1..4, 2..6]).fill(3);
    LabeledVolume::new(data, (0.8, 0.8, 2.0))
}

#[test]
fn test_thread_count_does_not_change_result() {
    let volume = mixed_volume();
    for element in [StructuringElement::Cross, StructuringElement::Ball] {
        for method in [MedianMethod::DistanceTransform, MedianMethod::DilationSequence] {
            let config = InterpolatorConfig::default()
                .with_structuring_element(element)
                .with_median_method(method);
            let single = run(&volume, config.clone().with_threads(1));
            let parallel = run(&volume, config.with_threads(4));
            assert_eq!(single, parallel, "{element:?} / {method:?}");
        }
    }
}

#[test]
fn test_original_voxels_take_precedence() {
    let volume = mixed_volume();
    let result = run(&volume, InterpolatorConfig::default());
    for (index, &input) in volume.data.indexed_iter() {
        if input != 0 {
            assert_eq!(result.data[index], input, "voxel {index:?}");
        }
    }
    assert!(count(&result, 2, 1) > 0);
    assert!(count(&result, 7, 2) > 0);
}

#[test]
fn test_identical_disks_are_reproduced() {
    let mut data = Array3::<u16>::zeros((5, 17, 17));
    disk(&mut data, 0, (8, 8), 5, 7);
    disk(&mut data, 4, (8, 8), 5, 7);
    let volume = LabeledVolume::new(data, (1.0, 1.0, 1.0));
    let result = run(&volume, InterpolatorConfig::default().with_label(7).with_axis(0));

    let expected = volume.data.index_axis(Axis(0), 0);
    for z in 1..4 {
        assert_eq!(result.data.index_axis(Axis(0), z), expected, "slice {z}");
    }
}

#[test]
fn test_larger_label_wins_overlaps() {
    let mut data = Array3::<u16>::zeros((6, 8, 12));
    data.slice_mut(s![0, 2..6, 2..7]).fill(1);
    data.slice_mut(s![4, 2..6, 2..7]).fill(1);
    data.slice_mut(s![1, 2..6, 5..10]).fill(2);
    data.slice_mut(s![5, 2..6, 5..10]).fill(2);
    let volume = LabeledVolume::new(data, (1.0, 1.0, 1.0));

    for threads in [1, 3] {
        let result = run(&volume, InterpolatorConfig::default().with_threads(threads));
        for z in 2..4 {
            assert_eq!(result.data[[z, 3, 3]], 1);
            assert_eq!(result.data[[z, 3, 6]], 2);
            assert_eq!(result.data[[z, 3, 8]], 2);
        }
    }
}

#[test]
fn test_dense_label_is_left_alone() {
    let mut data = Array3::<u16>::zeros((6, 8, 8));
    data.slice_mut(s![.., 2..6, 2..6]).fill(4);
    let volume = LabeledVolume::new(data, (1.0, 1.0, 1.0));
    assert_eq!(run(&volume, InterpolatorConfig::default()), volume);
    assert_eq!(run(&volume, InterpolatorConfig::default().with_axis(0)), volume);
}

#[test]
fn test_region_without_counterpart_fades_out() {
    let mut data = Array3::<u16>::zeros((5, 12, 20));
    data.slice_mut(s![0, 3..9, 1..7]).fill(1);
    data.slice_mut(s![4, 3..9, 12..18]).fill(1);
    let volume = LabeledVolume::new(data, (1.0, 1.0, 1.0));
    let result = run(&volume, InterpolatorConfig::default());

    let left = |z: usize| result.data.slice(s![z, .., ..10]).iter().filter(|&&v| v == 1).count();
    assert!(left(2) > 0);
    assert!(left(2) < 36);
    assert!(left(1) >= left(2));
    assert!(left(2) >= left(3));
    for z in 1..4 {
        for ((r, c), &v) in result.data.slice(s![z, .., ..10]).indexed_iter() {
            if v == 1 {
                let inside = (3..9usize).contains(&r) && (1..7usize).contains(&c);
                assert!(inside, "slice {z} at {r},{c}");
            }
        }
    }
}

#[test]
fn test_split_claims_partition_the_region() {
    let mut data = Array3::<u16>::zeros((5, 8, 16));
    data.slice_mut(s![0, 2..6, 2..14]).fill(1);
    data.slice_mut(s![4, 2..6, 2..6]).fill(1);
    data.slice_mut(s![4, 2..6, 10..14]).fill(1);
    let extent = SliceBox::new([0, 0], [8, 16]);
    let first = extract_components(&data, 0, 0, 1, extent, StructuringElement::Cross);
    let second = extract_components(&data, 0, 4, 1, extent, StructuringElement::Cross);

    let morphology = Morphology::new(StructuringElement::Cross);
    let parts = split_region(&first, 1, &second, &[1, 2], [0, 0], &morphology);
    let (a, b) = (parts[0].mask_of(1), parts[1].mask_of(1));
    assert_eq!(a.and(&b).count(), 0);
    assert_eq!(a.or(&b), first.mask_of(1));
    assert!(a.count() > 0 && b.count() > 0);

    let volume = LabeledVolume::new(data, (1.0, 1.0, 1.0));
    let result = run(&volume, InterpolatorConfig::default());
    assert_eq!(result.data[[2, 3, 3]], 1);
    assert_eq!(result.data[[2, 3, 12]], 1);
}

#[test]
fn test_two_regions_merge_into_one() {
    let mut data = Array3::<u16>::zeros((5, 8, 16));
    data.slice_mut(s![0, 2..6, 2..6]).fill(1);
    data.slice_mut(s![0, 2..6, 10..14]).fill(1);
    data.slice_mut(s![4, 2..6, 2..14]).fill(1);
    let volume = LabeledVolume::new(data, (1.0, 1.0, 1.0));

    for method in [MedianMethod::DistanceTransform, MedianMethod::DilationSequence] {
        let result = run(&volume, InterpolatorConfig::default().with_median_method(method));
        for z in 1..4 {
            assert_eq!(result.data[[z, 3, 3]], 1, "{method:?} slice {z}");
            assert_eq!(result.data[[z, 3, 12]], 1, "{method:?} slice {z}");
            assert!(result.data.slice(s![z, 6.., ..]).iter().all(|&v| v == 0));
        }
    }
}

#[test]
fn test_writes_stay_inside_requested_region() {
    let mut data = Array3::<u16>::zeros((7, 10, 8));
    data.slice_mut(s![0, 2..8, 2..6]).fill(1);
    data.slice_mut(s![6, 2..8, 2..6]).fill(1);
    let volume = LabeledVolume::new(data, (1.0, 1.0, 1.0));
    let requested = VoxelBox::new([0, 0, 0], [7, 5, 8]);
    let result = run(&volume, InterpolatorConfig::default().with_requested_region(requested));

    for z in 1..6 {
        assert_eq!(result.data[[z, 3, 3]], 1, "slice {z}");
        assert!(result.data.slice(s![z, 5.., ..]).iter().all(|&v| v == 0));
    }
    assert_eq!(result.data[[0, 7, 3]], 1);
}

#[test]
fn test_custom_slice_positions_bypass_detection() {
    let mut data = Array3::<u16>::zeros((7, 8, 8));
    data.slice_mut(s![0..2, 2..6, 2..6]).fill(1);
    data.slice_mut(s![6, 2..6, 2..6]).fill(1);
    let volume = LabeledVolume::new(data, (1.0, 1.0, 1.0));
    assert_eq!(run(&volume, InterpolatorConfig::default()), volume);

    let mut positions = LabeledSliceIndex::new();
    positions.insert(0, 1, 1);
    positions.insert(0, 1, 6);
    let result = run(&volume, InterpolatorConfig::default().with_slice_positions(positions));
    for z in 2..6 {
        assert_eq!(count(&result, z, 1), 16, "slice {z}");
    }
}
