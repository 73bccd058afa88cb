mod batch;
mod error;
mod sun_table;
mod tiles;

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Local;
use clap::Parser;
use env_logger::Builder;
use log::LevelFilter;
use rayon::ThreadPoolBuilder;

use pcd_core::{bounds::Bounds, pointcloud::point::GROUND_CLASSIFICATION};
use pcd_exporter::OutputFormat;
use pcd_parser::footprint::DEFAULT_HEIGHT_PROPERTY;
use pcd_transformer::{transform::height::DEFAULT_MAX_HEIGHT, PreprocessTransformBuilder};

use crate::{
    batch::{run_batch, BatchConfig, BatchSummary},
    error::AppError,
    sun_table::{load_sun_table, SunRun},
    tiles::PathTemplate,
};

#[derive(Parser, Debug)]
#[command(
    name = "shadecast",
    about = "Classifies lidar canopy points by building shade for a table of sun positions",
    version
)]
struct Cli {
    /// Tile ids to process. Discovered from the --points template when omitted.
    #[arg(short, long, num_args = 1.., value_name = "ID")]
    tile: Vec<String>,

    /// Point cloud path, `{tile}` is replaced by the tile id (.las, .laz, .csv, .txt).
    #[arg(long, default_value = "las/{tile}.las", value_name = "TEMPLATE")]
    points: String,

    /// Building footprint GeoJSON path.
    #[arg(
        long,
        default_value = "buildings/buildingsTile{tile}.geojson",
        value_name = "TEMPLATE"
    )]
    buildings: String,

    /// Footprints used for the building test instead of --buildings.
    #[arg(long, value_name = "TEMPLATE")]
    building_mask: Option<String>,

    /// CSV (label,azimuth,amplitude) or JSON array of sun positions.
    #[arg(long, value_name = "FILE", conflicts_with_all = ["azimuth", "amplitude"])]
    sun_table: Option<PathBuf>,

    /// Sun azimuth in degrees, counterclockwise with north at 90.
    #[arg(long, requires = "amplitude", allow_negative_numbers = true)]
    azimuth: Option<f64>,

    /// Sun elevation above the horizon in degrees.
    #[arg(long, requires = "azimuth", allow_negative_numbers = true)]
    amplitude: Option<f64>,

    /// Output label for a single --azimuth/--amplitude run.
    #[arg(long, default_value = "run")]
    label: String,

    #[arg(short, long, default_value = "output", value_name = "DIR")]
    output: PathBuf,

    /// csv or json
    #[arg(long, default_value = "csv")]
    format: OutputFormat,

    #[arg(long, default_value_t = GROUND_CLASSIFICATION)]
    ground_class: u8,

    /// Points at or above this normalized height are dropped.
    #[arg(long, default_value_t = DEFAULT_MAX_HEIGHT)]
    max_height: f64,

    /// Feature property holding the roof height.
    #[arg(long, default_value = DEFAULT_HEIGHT_PROPERTY)]
    height_property: String,

    /// Clip points and footprints to this rectangle.
    #[arg(long, value_name = "XMIN,XMAX,YMIN,YMAX", allow_hyphen_values = true)]
    bounds: Option<Bounds>,

    #[arg(long, default_value_t = num_cpus::get())]
    threads: usize,

    #[arg(short, long)]
    verbose: bool,
}

fn init_logger(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, level)
        .init();
}

fn sun_runs(args: &Cli) -> Result<Vec<SunRun>, AppError> {
    match (&args.sun_table, args.azimuth, args.amplitude) {
        (Some(path), _, _) => load_sun_table(path),
        (None, Some(azimuth), Some(amplitude)) => {
            Ok(vec![SunRun::new(args.label.clone(), azimuth, amplitude)])
        }
        _ => Err(AppError::Config(
            "either --sun-table or --azimuth with --amplitude is required".to_string(),
        )),
    }
}

fn run(args: Cli) -> Result<BatchSummary, AppError> {
    if !(args.max_height.is_finite() && args.max_height > 0.0) {
        return Err(AppError::Config(format!(
            "--max-height must be a positive number, got {}",
            args.max_height
        )));
    }
    if args.threads == 0 {
        return Err(AppError::Config("--threads must be at least 1".to_string()));
    }

    let runs = sun_runs(&args)?;
    log::info!("sun runs: {}", runs.len());

    let points = PathTemplate::new(args.points);
    let tiles = if args.tile.is_empty() {
        points.discover()?
    } else {
        args.tile
    };
    log::info!("tiles: {:?}", tiles);

    let config = BatchConfig {
        points,
        buildings: PathTemplate::new(args.buildings),
        building_mask: args.building_mask.map(PathTemplate::new),
        output: args.output,
        format: args.format,
        preprocess: PreprocessTransformBuilder {
            bounds: args.bounds,
            ground_class: args.ground_class,
            canopy_only: true,
            max_height: Some(args.max_height),
        },
        height_property: args.height_property,
    };
    log::info!("output folder: {:?}", config.output);
    if let Some(bounds) = &config.preprocess.bounds {
        log::info!("bounds: {}", bounds);
    }

    let pool = ThreadPoolBuilder::new().num_threads(args.threads).build()?;
    log::info!("threads: {}", args.threads);

    Ok(pool.install(|| run_batch(&config, &tiles, &runs)))
}

fn main() -> ExitCode {
    let args = Cli::parse();
    init_logger(args.verbose);

    let start = std::time::Instant::now();
    log::info!("start processing...");

    let summary = match run(args) {
        Ok(summary) => summary,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    summary.log();
    log::info!("Elapsed: {:?}", start.elapsed());

    if summary.succeeded() == 0 {
        log::error!("No run succeeded");
        return ExitCode::FAILURE;
    }
    log::info!("Finish processing");
    ExitCode::SUCCESS
}
