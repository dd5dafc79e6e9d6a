use crate::{enums::SortBy, volume::LabeledVolume};

use dicom::{
    object::{FileDicomObject, InMemDicomObject, open_file},
    pixeldata::{ConvertOptions, ModalityLutOption, PixelDecoder, VoiLutOption},
};
use dicom_dictionary_std::tags;
use ndarray::{Array2, Array3, Axis, s};
use std::{cmp::Ordering, fs, path::Path};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum VolumeLoaderError {
    #[error("No valid DICOM images found")]
    NoValidImages,

    #[error("Inconsistent image dimensions: expected {expected:?}, found {found:?}")]
    InconsistentDimensions {
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("Missing spacing information")]
    MissingSpacing,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("DICOM error: {0}")]
    Dicom(#[from] dicom::object::ReadError),
}

type DicomFile = FileDicomObject<InMemDicomObject>;

/// One decoded slice of a label map and its position in the stack.
#[derive(Debug)]
struct LabelSlice {
    position: Option<f32>,
    labels: Array2<u16>,
}

/// Reads label maps stored as single-frame DICOM slices.
///
/// Stored pixel values are taken verbatim as labels: no modality rescale and
/// no VOI windowing is applied.
pub struct VolumeLoader;

impl VolumeLoader {
    /// Load a label volume from a directory containing .dcm files
    pub fn load_from_directory(
        path: impl AsRef<Path>,
        sort_by: SortBy,
    ) -> Result<LabeledVolume, VolumeLoaderError> {
        let mut paths: Vec<_> = fs::read_dir(path.as_ref())?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension()
                    .and_then(|s| s.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("dcm"))
            })
            .collect();
        // `SortBy::None` keeps this order
        paths.sort();

        let objects = paths
            .iter()
            .map(open_file)
            .collect::<Result<Vec<_>, _>>()?;
        Self::load_from_objects(&objects, sort_by)
    }

    /// Load a label volume from already opened DICOM objects
    ///
    /// # Errors
    ///
    /// Returns error if no slice decodes, slice sizes differ or no object
    /// carries pixel spacing and slice thickness
    pub fn load_from_objects(
        objects: &[DicomFile],
        sort_by: SortBy,
    ) -> Result<LabeledVolume, VolumeLoaderError> {
        let mut slices: Vec<_> = objects
            .iter()
            .filter_map(|object| Self::read_slice(object, sort_by))
            .collect();
        let skipped = objects.len() - slices.len();
        if skipped > 0 {
            warn!(skipped, "Skipped DICOM objects without decodable pixel data or sort key");
        }

        Self::order_slices(&mut slices, sort_by);
        let data = Self::stack(&slices)?;
        let spacing = objects
            .iter()
            .find_map(Self::spacing)
            .ok_or(VolumeLoaderError::MissingSpacing)?;
        debug!(dim = ?data.dim(), ?spacing, "Loaded label volume");

        Ok(LabeledVolume::new(data, spacing))
    }

    fn read_slice(object: &DicomFile, sort_by: SortBy) -> Option<LabelSlice> {
        let position = match sort_by {
            SortBy::ImagePositionPatient => object
                .element(tags::IMAGE_POSITION_PATIENT)
                .ok()?
                .to_multi_float32()
                .ok()?
                .get(2)
                .copied(),
            SortBy::TablePosition => object
                .element(tags::TABLE_POSITION)
                .ok()?
                .to_float32()
                .ok(),
            SortBy::InstanceNumber => object
                .element(tags::INSTANCE_NUMBER)
                .ok()?
                .to_int::<i32>()
                .ok()
                .map(|n| n as f32),
            SortBy::None => None,
        };

        // stored values are the labels
        let options = ConvertOptions::new()
            .with_modality_lut(ModalityLutOption::None)
            .with_voi_lut(VoiLutOption::Identity);
        let labels = object
            .decode_pixel_data()
            .ok()?
            .to_ndarray_with_options::<u16>(&options)
            .ok()?
            .slice_move(s![0, .., .., 0]);
        Some(LabelSlice { position, labels })
    }

    /// Ascending positions, except patient positions which run head first.
    fn order_slices(slices: &mut [LabelSlice], sort_by: SortBy) {
        let ascending = |a: &LabelSlice, b: &LabelSlice| {
            a.position
                .partial_cmp(&b.position)
                .unwrap_or(Ordering::Equal)
        };
        match sort_by {
            SortBy::None => {}
            SortBy::ImagePositionPatient => slices.sort_by(|a, b| ascending(b, a)),
            SortBy::TablePosition | SortBy::InstanceNumber => slices.sort_by(ascending),
        }
    }

    /// Stacks the slices along the first axis after checking they share one size.
    fn stack(slices: &[LabelSlice]) -> Result<Array3<u16>, VolumeLoaderError> {
        let Some(expected) = slices.first().map(|slice| slice.labels.dim()) else {
            return Err(VolumeLoaderError::NoValidImages);
        };
        if let Some(found) = slices
            .iter()
            .map(|slice| slice.labels.dim())
            .find(|&dim| dim != expected)
        {
            return Err(VolumeLoaderError::InconsistentDimensions { expected, found });
        }

        let mut data = Array3::<u16>::zeros((slices.len(), expected.0, expected.1));
        for (mut plane, slice) in data.axis_iter_mut(Axis(0)).zip(slices) {
            plane.assign(&slice.labels);
        }
        Ok(data)
    }

    fn spacing(object: &DicomFile) -> Option<(f32, f32, f32)> {
        let pixel_spacing = object
            .element(tags::PIXEL_SPACING)
            .ok()?
            .to_multi_float32()
            .ok()?;
        let slice_thickness = object
            .element(tags::SLICE_THICKNESS)
            .ok()?
            .to_float32()
            .ok()?;
        Some((*pixel_spacing.first()?, *pixel_spacing.get(1)?, slice_thickness))
    }
}
