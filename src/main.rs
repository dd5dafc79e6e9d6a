use std::fs;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use label_interpolation::{
    AlignmentMode, InterpolatorConfig, MedianMethod, MorphologicalInterpolator, Orientation,
    SortBy, StructuringElement, VolumeLoader,
};

#[derive(Parser, Debug)]
#[command(name = "label-interpolation")]
#[command(about = "Fill the gaps between annotated slices of a DICOM label map")]
struct Args {
    /// Directory containing the label map as .dcm slices
    input: PathBuf,

    /// Directory receiving one PNG per slice of the interpolated volume
    #[arg(short, long, default_value = "interpolated")]
    output: PathBuf,

    /// How the DICOM slices are ordered into a volume
    #[arg(long, value_enum, default_value_t = SortBy::ImagePositionPatient)]
    sort_by: SortBy,

    /// Only interpolate along the axis perpendicular to this plane
    #[arg(long, value_enum)]
    axis: Option<Orientation>,

    /// Only interpolate this label (0 means all labels)
    #[arg(long)]
    label: Option<u16>,

    #[arg(long, value_enum, default_value_t = StructuringElement::Cross)]
    structuring_element: StructuringElement,

    #[arg(long, value_enum, default_value_t = MedianMethod::DistanceTransform)]
    median_method: MedianMethod,

    /// Search every translation instead of stopping once overlaps fall off
    #[arg(long)]
    exhaustive: bool,

    /// Worker threads (defaults to one per core)
    #[arg(long)]
    threads: Option<usize>,

    /// Plane of the exported PNG slices
    #[arg(long, value_enum, default_value_t = Orientation::Axial)]
    view: Orientation,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let args = Args::parse();
    let volume = VolumeLoader::load_from_directory(&args.input, args.sort_by)?;
    info!(dim = ?volume.dim(), labels = volume.labels().len(), "Loaded label map");

    let mut config = InterpolatorConfig::default()
        .with_structuring_element(args.structuring_element)
        .with_median_method(args.median_method);
    config.label = args.label;
    config.axis = args.axis.map(Orientation::axis);
    config.threads = args.threads;
    if args.exhaustive {
        config = config.with_alignment_mode(AlignmentMode::Exhaustive);
    }

    let result = MorphologicalInterpolator::new(config).interpolate(&volume)?;

    fs::create_dir_all(&args.output)?;
    let count = result.extent(args.view);
    for index in 0..count {
        if let Some(image) = result.slice_image(index, args.view) {
            image.save(args.output.join(format!("slice_{index:04}.png")))?;
        }
    }
    info!(count, output = %args.output.display(), "Wrote slices");
    Ok(())
}
