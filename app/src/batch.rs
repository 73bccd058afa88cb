use std::{collections::BTreeMap, path::PathBuf, time::Instant};

use rayon::prelude::*;

use pcd_core::{footprint::BuildingFootprint, pointcloud::point::PointCloud};
use pcd_exporter::{write_run_subsets, OutputFormat};
use pcd_parser::{footprint::FootprintParser, parsers::parser_for_path};
use pcd_shadow::{ClassificationLabel, Classifier, HullSet};
use pcd_transformer::{PointCloudTransformer, PreprocessTransformBuilder, Transformer as _};

use crate::{error::AppError, sun_table::SunRun, tiles::PathTemplate};

pub struct BatchConfig {
    pub points: PathTemplate,
    pub buildings: PathTemplate,
    /// Footprints for the building test. Falls back to `buildings`.
    pub building_mask: Option<PathTemplate>,
    pub output: PathBuf,
    pub format: OutputFormat,
    pub preprocess: PreprocessTransformBuilder,
    pub height_property: String,
}

/// Everything about a tile that does not depend on the sun.
pub struct PreparedTile {
    pub points: PointCloud,
    pub footprints: Vec<BuildingFootprint>,
    pub buildings: HullSet,
}

#[derive(Debug)]
pub struct RunStats {
    pub counts: BTreeMap<ClassificationLabel, usize>,
    /// Footprints without a building hull for this tile.
    pub skipped_building_hulls: usize,
    /// Footprints without a shadow hull for this run.
    pub skipped_shadow_hulls: usize,
    pub files: Vec<PathBuf>,
}

#[derive(Debug)]
pub struct RunReport {
    pub tile: String,
    pub label: String,
    pub result: Result<RunStats, AppError>,
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub runs: Vec<RunReport>,
    pub failed_tiles: Vec<(String, AppError)>,
}

impl BatchSummary {
    pub fn succeeded(&self) -> usize {
        self.runs.iter().filter(|r| r.result.is_ok()).count()
    }

    pub fn failed_runs(&self) -> impl Iterator<Item = &RunReport> {
        self.runs.iter().filter(|r| r.result.is_err())
    }

    pub fn log(&self) {
        for (tile, error) in &self.failed_tiles {
            log::error!("tile {} failed: {}", tile, error);
        }
        for report in self.failed_runs() {
            if let Err(error) = &report.result {
                log::error!("tile {} run {} failed: {}", report.tile, report.label, error);
            }
        }
        let (building_hulls, shadow_hulls) = self
            .runs
            .iter()
            .filter_map(|r| r.result.as_ref().ok())
            .fold((0, 0), |(b, s), stats| {
                (
                    b + stats.skipped_building_hulls,
                    s + stats.skipped_shadow_hulls,
                )
            });
        log::info!(
            "{} runs succeeded, {} runs failed, {} tiles failed",
            self.succeeded(),
            self.failed_runs().count(),
            self.failed_tiles.len()
        );
        if building_hulls + shadow_hulls > 0 {
            log::warn!(
                "skipped {} building hulls and {} shadow hulls over all runs",
                building_hulls,
                shadow_hulls
            );
        }
    }
}

/// Processes every tile against every sun run. Tiles run in parallel, and
/// within a tile the sun runs share the prepared cloud and hulls.
pub fn run_batch(config: &BatchConfig, tiles: &[String], runs: &[SunRun]) -> BatchSummary {
    let results: Vec<(String, Result<Vec<RunReport>, AppError>)> = tiles
        .par_iter()
        .map(|tile| (tile.clone(), process_tile(config, tile, runs)))
        .collect();

    let mut summary = BatchSummary::default();
    for (tile, result) in results {
        match result {
            Ok(reports) => summary.runs.extend(reports),
            Err(error) => summary.failed_tiles.push((tile, error)),
        }
    }
    summary
}

pub fn process_tile(
    config: &BatchConfig,
    tile: &str,
    runs: &[SunRun],
) -> Result<Vec<RunReport>, AppError> {
    let prepared = prepare_tile(config, tile)?;

    let reports = runs
        .par_iter()
        .map(|run| RunReport {
            tile: tile.to_string(),
            label: run.label.clone(),
            result: classify_run(config, tile, &prepared, run),
        })
        .collect();
    Ok(reports)
}

pub fn prepare_tile(config: &BatchConfig, tile: &str) -> Result<PreparedTile, AppError> {
    let start = Instant::now();
    let points_path = config.points.resolve(tile);
    let point_cloud = parser_for_path(&points_path)?.parse()?;
    log::info!(
        "tile {}: read {} points from {:?} in {:?}",
        tile,
        point_cloud.len(),
        points_path,
        start.elapsed()
    );

    let start = Instant::now();
    let transformer = PointCloudTransformer::new(&config.preprocess);
    let points = transformer.execute(point_cloud)?;
    let volume = &points.metadata.bounding_volume;
    log::info!(
        "tile {}: {} canopy points after preprocessing in {:?}",
        tile,
        points.metadata.point_count,
        start.elapsed()
    );
    if !points.is_empty() {
        log::debug!(
            "tile {}: canopy extent {:?} - {:?}",
            tile,
            volume.min,
            volume.max
        );
    }

    let bounds = config.preprocess.bounds;
    let parser = FootprintParser::new(config.height_property.as_str());
    let mut footprints = parser.parse_path(&config.buildings.resolve(tile))?;
    if let Some(bounds) = &bounds {
        footprints = footprints.retain_within(bounds);
    }
    let footprints = footprints.footprints;

    let buildings = match &config.building_mask {
        Some(mask) => {
            let parser = FootprintParser::outlines(config.height_property.as_str());
            let mut outlines = parser.parse_path(&mask.resolve(tile))?;
            if let Some(bounds) = &bounds {
                outlines = outlines.retain_within(bounds);
            }
            HullSet::buildings(&outlines.footprints)
        }
        None => HullSet::buildings(&footprints),
    };
    log::info!(
        "tile {}: {} footprints, {} building hulls",
        tile,
        footprints.len(),
        buildings.index.len()
    );

    Ok(PreparedTile {
        points,
        footprints,
        buildings,
    })
}

fn classify_run(
    config: &BatchConfig,
    tile: &str,
    prepared: &PreparedTile,
    run: &SunRun,
) -> Result<RunStats, AppError> {
    let start = Instant::now();
    let sun = run.sun_position()?;

    let shadows = HullSet::shadows(&prepared.footprints, &sun);
    let classifier = Classifier::from_sets(sun, &prepared.buildings, &shadows);
    let classified = classifier.classify(&prepared.points);
    let files = write_run_subsets(
        &config.output,
        &run.label,
        tile,
        &classified,
        config.format,
    )?;

    let counts = classified.counts();
    log::info!(
        "tile {} run {}: {:?} in {:?}",
        tile,
        run.label,
        counts,
        start.elapsed()
    );

    Ok(RunStats {
        counts,
        skipped_building_hulls: prepared.buildings.warnings.len(),
        skipped_shadow_hulls: shadows.warnings.len(),
        files,
    })
}
