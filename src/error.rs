//! Fatal errors of an interpolation run.
//!
//! Degenerate geometry inside a single job is not an error: the job simply
//! contributes no voxels. Only failures that make the whole run meaningless
//! surface here.

use thiserror::Error;

use crate::geometry::VoxelBox;

#[derive(Debug, Error)]
pub enum InterpolationError {
    /// The worker pool could not be created.
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// The input volume has a zero extent along some axis.
    #[error("Volume has no voxels: dimensions {0:?}")]
    EmptyVolume((usize, usize, usize)),

    /// The requested region does not overlap the volume.
    #[error("Requested region {requested:?} lies outside volume {volume:?}")]
    RegionOutOfBounds {
        requested: VoxelBox,
        volume: VoxelBox,
    },
}

/// Result type for interpolation runs.
pub type Result<T> = std::result::Result<T, InterpolationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = InterpolationError::EmptyVolume((0, 4, 4));
        assert_eq!(err.to_string(), "Volume has no voxels: dimensions (0, 4, 4)");
    }

    #[test]
    fn test_region_out_of_bounds_mentions_both_boxes() {
        let err = InterpolationError::RegionOutOfBounds {
            requested: VoxelBox::new([10, 0, 0], [1, 1, 1]),
            volume: VoxelBox::whole((2, 2, 2)),
        };
        let text = err.to_string();
        assert!(text.contains("origin: [10, 0, 0]"));
        assert!(text.contains("size: [2, 2, 2]"));
    }
}
