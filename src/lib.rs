//! # Label-interpolation library
//!
//! This crate fills the gaps between sparsely annotated slices of a label
//! volume with morphological interpolation. A label map in which only every
//! few slices were drawn becomes a volume whose regions change smoothly from
//! one annotated slice to the next.
//!
//! Annotated slices are found automatically: a slice counts as annotated for a
//! label when the label forms a cross-section one voxel thick along an axis.
//! Between two annotated slices of the same label the engine
//!  - matches connected regions by overlap (one-to-one, splits, merges, and
//!    regions without a counterpart, which fade out halfway),
//!  - aligns matched regions with a discrete translation search,
//!  - writes the median shape at the middle slice and recurses into both halves.
//!
//! Jobs run in parallel using rayon. The result does not depend on the number
//! of threads: wherever labels compete for a voxel the larger label wins, and
//! the original non-zero voxels always survive.
//!
//! Volumes can be loaded from a folder of DICOM label-map slices, and any slice
//! can be rendered as a grayscale image in the three medical axes:
//!  - Axial
//!  - Coronal
//!  - Sagittal
//!
//! # Examples
//!
//! ## Interpolating between two annotated slices
//!
//! ```
//! # use label_interpolation::{InterpolatorConfig, LabeledVolume, MorphologicalInterpolator};
//! # use ndarray::{Array3, s};
//! let mut data = Array3::<u16>::zeros((5, 8, 8));
//! data.slice_mut(s![0, 2..6, 2..6]).fill(1);
//! data.slice_mut(s![4, 2..6, 2..6]).fill(1);
//! let volume = LabeledVolume::new(data, (1.0, 1.0, 3.0));
//!
//! let result = MorphologicalInterpolator::new(InterpolatorConfig::default())
//!     .interpolate(&volume)
//!     .expect("interpolation should succeed");
//! assert_eq!(result.data[[2, 3, 3]], 1);
//! ```
//!
//! ## Reading DICOM label maps and exporting a slice
//!
//! ```no_run
//! # use label_interpolation::{MorphologicalInterpolator, Orientation, SortBy, VolumeLoader};
//! let volume = VolumeLoader::load_from_directory("labels", SortBy::InstanceNumber)
//!     .expect("should have loaded files from directory");
//! let result = MorphologicalInterpolator::default()
//!     .interpolate(&volume)
//!     .expect("interpolation should succeed");
//! let image = result
//!     .slice_image(result.dim().2 / 2, Orientation::Sagittal)
//!     .expect("should have returned image at center of volume");
//! image.save("result.png").expect("should have written the image");
//! ```

pub mod align;
pub mod canvas;
pub mod components;
pub mod correspondence;
pub mod enums;
pub mod error;
pub mod geometry;
pub mod interpolator;
pub mod median;
pub mod morphology;
pub mod orientation;
pub mod pairwise;
pub mod slice;
pub mod split;
pub mod volume;
pub mod volume_loader;

pub use align::AlignmentConfig;
pub use enums::{AlignmentMode, MedianMethod, Orientation, SortBy, StructuringElement};
pub use error::{InterpolationError, Result};
pub use geometry::{SliceBox, VoxelBox};
pub use interpolator::{InterpolatorConfig, MorphologicalInterpolator};
pub use orientation::LabeledSliceIndex;
pub use volume::LabeledVolume;
pub use volume_loader::{VolumeLoader, VolumeLoaderError};
