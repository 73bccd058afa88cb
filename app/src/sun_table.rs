use std::{ffi::OsStr, fs, path::Path};

use serde::{Deserialize, Serialize};

use pcd_shadow::{ShadowError, SunPosition};

use crate::error::AppError;

/// One row of the sun table. `label` tags the output files of the run,
/// e.g. `2022_06_21_0800`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SunRun {
    pub label: String,
    pub azimuth: f64,
    pub amplitude: f64,
}

impl SunRun {
    pub fn new(label: impl Into<String>, azimuth: f64, amplitude: f64) -> Self {
        Self {
            label: label.into(),
            azimuth,
            amplitude,
        }
    }

    pub fn sun_position(&self) -> Result<SunPosition, ShadowError> {
        SunPosition::new(self.azimuth, self.amplitude)
    }
}

/// Reads a sun table from CSV (`label,azimuth,amplitude`) or from a JSON
/// array of objects with the same keys, chosen by file extension.
pub fn load_sun_table(path: &Path) -> Result<Vec<SunRun>, AppError> {
    let error = |message: String| AppError::SunTable {
        path: path.to_path_buf(),
        message,
    };

    let extension = path
        .extension()
        .and_then(OsStr::to_str)
        .map(str::to_ascii_lowercase);

    let runs: Vec<SunRun> = match extension.as_deref() {
        Some("json") => {
            let text = fs::read_to_string(path).map_err(|e| error(e.to_string()))?;
            serde_json::from_str(&text).map_err(|e| error(e.to_string()))?
        }
        Some("csv") | Some("txt") => {
            let mut reader = csv::ReaderBuilder::new()
                .trim(csv::Trim::All)
                .from_path(path)
                .map_err(|e| error(e.to_string()))?;
            reader
                .deserialize()
                .collect::<Result<_, _>>()
                .map_err(|e| error(e.to_string()))?
        }
        _ => return Err(error("expected a .csv or .json file".to_string())),
    };

    if runs.is_empty() {
        return Err(error("no rows".to_string()));
    }

    let mut labels: Vec<&str> = runs.iter().map(|r| r.label.as_str()).collect();
    labels.sort_unstable();
    if let Some(pair) = labels.windows(2).find(|pair| pair[0] == pair[1]) {
        return Err(error(format!("duplicate label {:?}", pair[0])));
    }

    Ok(runs)
}
