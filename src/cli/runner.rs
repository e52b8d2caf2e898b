use tracing::info;

use demgrid::acquire::DirectoryFetcher;
use demgrid::api::process_regions;
use demgrid::core::params::PipelineParams;
use demgrid::io::load_regions;

use super::args::CliArgs;
use super::errors::AppError;

pub fn run(args: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.log {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    }

    if args.pixels == 0 {
        return Err(AppError::ZeroPixelBudget.into());
    }

    let mut regions = load_regions(&args.boundaries).map_err(AppError::from)?;
    if regions.is_empty() {
        return Err(AppError::EmptyCollection {
            path: args.boundaries.display().to_string(),
        }
        .into());
    }

    if let Some(wanted) = &args.region {
        regions.retain(|r| &r.region_id == wanted);
        if regions.is_empty() {
            return Err(AppError::UnknownRegion {
                region: wanted.clone(),
            }
            .into());
        }
    }

    let params = PipelineParams {
        dataset: args.dataset,
        pixel_budget: args.pixels,
        generation: args.generation,
        validate: !args.no_validate,
        ..PipelineParams::default()
    };

    let fetcher = DirectoryFetcher::new(&args.tiles);
    info!(
        "processing {} region(s) from {:?} into {:?}",
        regions.len(),
        args.boundaries,
        args.output
    );

    let report = process_regions(&regions, &fetcher, &params, &args.output, args.keep_going)?;
    info!(
        "done: processed={} errors={}",
        report.processed, report.errors
    );
    Ok(())
}
