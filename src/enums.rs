use clap::ValueEnum;

/// Anatomical plane of a slice, named after the volume axis it is perpendicular to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Orientation {
    Axial,
    Coronal,
    Sagittal,
}

impl Orientation {
    /// Volume axis perpendicular to the plane, in `(depth, height, width)` order.
    pub fn axis(self) -> usize {
        match self {
            Orientation::Axial => 0,
            Orientation::Coronal => 1,
            Orientation::Sagittal => 2,
        }
    }
}

/// Neighbourhood used for dilation and for deciding pixel connectivity.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StructuringElement {
    /// Face-connected (4-neighbourhood in a slice).
    #[default]
    Cross,
    /// Fully connected (8-neighbourhood in a slice).
    Ball,
}

/// How the shape halfway between two aligned regions is computed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MedianMethod {
    /// Balance histograms of distances from the intersection.
    #[default]
    DistanceTransform,
    /// Pick the best generation of two conditional dilation sequences.
    DilationSequence,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum AlignmentMode {
    /// Breadth-first search that stops expanding once scores fall off.
    #[default]
    Heuristic,
    /// Visit every translation with a non-empty overlap.
    Exhaustive,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortBy {
    #[default]
    ImagePositionPatient,
    TablePosition,
    InstanceNumber,
    None,
}
