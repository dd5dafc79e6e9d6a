//! Orchestration of a whole interpolation run.
//!
//! Detection and job building run on the calling thread. Jobs of one axis are
//! then executed on a rayon pool, every worker owning its own [`Morphology`]
//! kernel, and all of them writing into one [`LabelCanvas`]. Finally the
//! non-zero input voxels are laid over the result.

use std::collections::BTreeMap;
use std::sync::Arc;

use ndarray::Zip;
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use tracing::{debug, info, trace, warn};

use crate::align::{AlignmentConfig, align};
use crate::canvas::LabelCanvas;
use crate::components::extract_components;
use crate::correspondence::{Correspondence, Side, observed_pairs, resolve};
use crate::enums::{AlignmentMode, MedianMethod, StructuringElement};
use crate::error::{InterpolationError, Result};
use crate::geometry::VoxelBox;
use crate::morphology::Morphology;
use crate::orientation::{LabeledSliceIndex, detect_slice_orientations};
use crate::pairwise::JobContext;
use crate::slice::ComponentSlice;
use crate::volume::LabeledVolume;

/// Settings of an interpolation run.
#[derive(Debug, Clone, Default)]
pub struct InterpolatorConfig {
    /// Only interpolate this label; `None` or `Some(0)` means every label.
    pub label: Option<u16>,
    /// Only interpolate along this axis; `None` means every axis with work.
    pub axis: Option<usize>,
    pub structuring_element: StructuringElement,
    pub median_method: MedianMethod,
    pub alignment: AlignmentConfig,
    /// Worker count; `None` uses the rayon default.
    pub threads: Option<usize>,
    /// Part of the volume that may be written; `None` is the whole volume.
    pub requested_region: Option<VoxelBox>,
    /// Annotated slices to use instead of detecting them.
    pub slice_positions: Option<LabeledSliceIndex>,
}

impl InterpolatorConfig {
    pub fn with_label(mut self, label: u16) -> Self {
        self.label = Some(label);
        self
    }

    pub fn with_axis(mut self, axis: usize) -> Self {
        self.axis = Some(axis);
        self
    }

    pub fn with_structuring_element(mut self, element: StructuringElement) -> Self {
        self.structuring_element = element;
        self
    }

    pub fn with_median_method(mut self, method: MedianMethod) -> Self {
        self.median_method = method;
        self
    }

    pub fn with_alignment_mode(mut self, mode: AlignmentMode) -> Self {
        self.alignment.mode = mode;
        self
    }

    pub fn with_alignment(mut self, alignment: AlignmentConfig) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn with_requested_region(mut self, region: VoxelBox) -> Self {
        self.requested_region = Some(region);
        self
    }

    pub fn with_slice_positions(mut self, positions: LabeledSliceIndex) -> Self {
        self.slice_positions = Some(positions);
        self
    }

    /// Whether `label` passes the label filter.
    pub fn wants(&self, label: u16) -> bool {
        match self.label {
            None | Some(0) => true,
            Some(wanted) => wanted == label,
        }
    }
}

/// Two consecutive annotated slices of one label along one axis.
#[derive(Debug, Clone)]
pub struct InterpolationJob {
    pub axis: usize,
    pub label: u16,
    pub first: i64,
    pub second: i64,
    pub first_slice: Arc<ComponentSlice>,
    pub second_slice: Arc<ComponentSlice>,
}

/// Fills the gaps between annotated slices of a label volume.
#[derive(Debug, Clone, Default)]
pub struct MorphologicalInterpolator {
    config: InterpolatorConfig,
}

impl MorphologicalInterpolator {
    pub fn new(config: InterpolatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &InterpolatorConfig {
        &self.config
    }

    /// Runs the interpolation and returns a new volume with the same spacing.
    ///
    /// # Errors
    ///
    /// Fails when the volume is empty, the requested region misses the volume
    /// or the worker pool cannot be built.
    pub fn interpolate(&self, volume: &LabeledVolume) -> Result<LabeledVolume> {
        let dim = volume.dim();
        let whole = VoxelBox::whole(dim);
        if whole.is_empty() {
            return Err(InterpolationError::EmptyVolume(dim));
        }
        let requested = match self.config.requested_region {
            Some(region) => {
                let clipped = region.intersect(&whole);
                if clipped.is_empty() {
                    return Err(InterpolationError::RegionOutOfBounds {
                        requested: region,
                        volume: whole,
                    });
                }
                clipped
            }
            None => whole,
        };
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.config.threads.unwrap_or(0))
            .build()?;

        info!(
            ?dim,
            label = ?self.config.label,
            axis = ?self.config.axis,
            threads = pool.current_num_threads(),
            "Starting interpolation"
        );

        let detected = detect_slice_orientations(volume.data(), &requested, self.config.axis);
        let custom = self.config.slice_positions.is_some();
        if detected.bounding_boxes.is_empty() && !custom {
            info!("No labeled voxels in the requested region, nothing to interpolate");
            return Ok(volume.clone());
        }
        let slices = match &self.config.slice_positions {
            Some(positions) => positions,
            None => &detected.slices,
        };

        let axes: Vec<usize> = match self.config.axis {
            None => (0..3)
                .filter(|&axis| slices.has_pairs(axis, |label| self.config.wants(label)))
                .collect(),
            Some(axis) if axis < 3 => vec![axis],
            Some(axis) => {
                warn!(axis, "Axis out of range, nothing to interpolate");
                Vec::new()
            }
        };

        let canvas = LabelCanvas::new(dim, requested);
        for axis in axes {
            let extents = (!custom).then_some(&detected.bounding_boxes);
            let jobs = self.build_jobs(volume, axis, slices, extents, &requested);
            debug!(axis, jobs = jobs.len(), "Built interpolation jobs");

            let config = &self.config;
            let canvas = &canvas;
            pool.install(|| {
                jobs.par_iter().for_each_init(
                    || Morphology::new(config.structuring_element),
                    |morphology, job| {
                        let context = JobContext {
                            axis: job.axis,
                            label: job.label,
                            canvas,
                            morphology,
                            median_method: config.median_method,
                            alignment: &config.alignment,
                        };
                        interpolate_between(job, &context);
                    },
                );
            });
        }

        let mut data = canvas.into_inner();
        Zip::from(&mut data)
            .and(volume.data())
            .par_for_each(|out, &input| {
                if input != 0 {
                    *out = input;
                }
            });
        info!("Finished interpolation");
        Ok(LabeledVolume::new(data, volume.spacing))
    }

    /// Jobs for every pair of consecutive, non-adjacent annotated slices along `axis`.
    ///
    /// Slices are cut to the label's bounding box, or to the requested region
    /// when `extents` is `None`. Pairs with both slices beyond the same side of
    /// the requested region are skipped.
    pub fn build_jobs(
        &self,
        volume: &LabeledVolume,
        axis: usize,
        slices: &LabeledSliceIndex,
        extents: Option<&BTreeMap<u16, VoxelBox>>,
        requested: &VoxelBox,
    ) -> Vec<InterpolationJob> {
        let mut jobs = Vec::new();
        for (label, indices) in slices.labels(axis) {
            if !self.config.wants(label) {
                continue;
            }
            let extent = match extents {
                Some(boxes) => match boxes.get(&label) {
                    Some(bounds) => bounds.project(axis),
                    None => continue,
                },
                None => requested.project(axis),
            };
            debug!(axis, label, slices = ?indices, "Annotated slices");

            let extract = |index: i64| {
                Arc::new(extract_components(
                    volume.data(),
                    axis,
                    index,
                    label,
                    extent,
                    self.config.structuring_element,
                ))
            };
            let mut indices = indices.iter().copied();
            let Some(mut prev) = indices.next() else {
                continue;
            };
            let mut prev_slice = extract(prev);
            for next in indices {
                let next_slice = extract(next);
                let sides = requested.side(axis, prev) + requested.side(axis, next);
                if prev + 1 < next && sides.abs() <= 1 {
                    jobs.push(InterpolationJob {
                        axis,
                        label,
                        first: prev,
                        second: next,
                        first_slice: Arc::clone(&prev_slice),
                        second_slice: Arc::clone(&next_slice),
                    });
                }
                prev = next;
                prev_slice = next_slice;
            }
        }
        jobs
    }
}

/// Resolves the correspondences of one job and dispatches each group.
fn interpolate_between(job: &InterpolationJob, context: &JobContext) {
    let (i, j) = (job.first, job.second);
    let (first, second) = (job.first_slice.as_ref(), job.second_slice.as_ref());
    let groups = resolve(observed_pairs(first, second));
    trace!(axis = job.axis, label = job.label, i, j, groups = groups.len(), "Interpolating job");

    for group in groups {
        trace!(?group, "Dispatching correspondence");
        match group {
            Correspondence::Extrapolate {
                side: Side::First,
                id,
            } => context.extrapolate(i, j, first, id),
            Correspondence::Extrapolate {
                side: Side::Second,
                id,
            } => context.extrapolate(j, i, second, id),
            Correspondence::OneToOne {
                first: first_id,
                second: second_id,
            } => {
                let t = align(first, first_id, second, &[second_id], context.alignment);
                context.interpolate_one_to_one(i, j, first, first_id, second, second_id, t, false);
            }
            Correspondence::OneToMany {
                side: Side::First,
                id,
                partners,
            } => {
                let t = align(first, id, second, &partners, context.alignment);
                context.interpolate_one_to_many(i, j, first, id, second, &partners, t);
            }
            Correspondence::OneToMany {
                side: Side::Second,
                id,
                partners,
            } => {
                let t = align(second, id, first, &partners, context.alignment);
                context.interpolate_one_to_many(j, i, second, id, first, &partners, t);
            }
        }
    }
}
