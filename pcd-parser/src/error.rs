use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("LAS error: {0}")]
    Las(#[from] las::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("Unsupported extension: {0:?}")]
    UnsupportedExtension(String),

    #[error("No input file given")]
    NoInput,

    #[error("Required attribute '{0}' is missing in CSV headers")]
    MissingColumn(&'static str),

    #[error("{path:?} line {line}: failed to parse '{field}' from {value:?}")]
    InvalidField {
        path: PathBuf,
        line: u64,
        field: &'static str,
        value: String,
    },

    #[error("Expected a GeoJSON FeatureCollection")]
    NotFeatureCollection,
}

/// Why a single footprint feature was rejected. The rest of the file is still loaded.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FootprintError {
    #[error("height property '{0}' is missing")]
    MissingHeight(String),

    #[error("height property '{property}' is not a finite non-negative number: {value}")]
    InvalidHeight { property: String, value: String },

    #[error("feature has no geometry")]
    MissingGeometry,

    #[error("unsupported geometry type: {0}")]
    UnsupportedGeometry(String),

    #[error("geometry has no vertices")]
    EmptyGeometry,
}
