use std::path::PathBuf;

use thiserror::Error;

use pcd_exporter::ExportError;
use pcd_parser::ParseError;
use pcd_shadow::ShadowError;
use pcd_transformer::TransformError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Failed to parse input: {0}")]
    Parse(#[from] ParseError),

    #[error("Failed to preprocess tile: {0}")]
    Transform(#[from] TransformError),

    #[error("Invalid sun position: {0}")]
    Shadow(#[from] ShadowError),

    #[error("Failed to export: {0}")]
    Export(#[from] ExportError),

    #[error("Failed to read sun table {path:?}: {message}")]
    SunTable { path: PathBuf, message: String },

    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("No tiles found matching {0}")]
    NoTiles(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
