use clap::Parser;
use std::path::PathBuf;

use demgrid::types::Dataset;

#[derive(Parser)]
#[command(name = "demgrid", version, about = "DEMGRID CLI")]
pub struct CliArgs {
    /// GeoJSON FeatureCollection of region boundaries
    #[arg(short, long)]
    pub boundaries: PathBuf,

    /// Directory of cached GeoTIFF tiles, named `<tile_id>.tif`
    #[arg(short, long)]
    pub tiles: PathBuf,

    /// Output directory for artifacts and the manifest
    #[arg(short, long)]
    pub output: PathBuf,

    /// Elevation dataset (srtm30, srtm90 or cop90)
    #[arg(short, long, value_enum, default_value_t = Dataset::Srtm30)]
    pub dataset: Dataset,

    /// Display pixel budget for the long side of each exported grid
    #[arg(short, long, default_value_t = 512)]
    pub pixels: usize,

    /// Format-generation counter encoded in artifact names
    #[arg(short, long, default_value_t = 1)]
    pub generation: u32,

    /// Process only the named region (default: every region in the collection)
    #[arg(short, long)]
    pub region: Option<String>,

    /// Skip export validation (diagnostics only)
    #[arg(long, default_value_t = false)]
    pub no_validate: bool,

    /// Batch mode: continue with remaining regions when one fails
    #[arg(long, default_value_t = false)]
    pub keep_going: bool,

    /// Enable logging
    #[arg(long, default_value_t = false)]
    pub log: bool,
}
