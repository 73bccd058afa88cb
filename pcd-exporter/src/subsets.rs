use std::{
    fs::{self, File},
    io::{BufWriter, Write as _},
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use pcd_shadow::{ClassificationLabel, ClassifiedPoint, ClassifiedPointCloud};

use crate::error::ExportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format: {}", other)),
        }
    }
}

const HEADERS: [&str; 6] = ["X", "Y", "Z", "intens", "groundX", "groundY"];

/// One row of a subset file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubsetRecord {
    #[serde(rename = "X")]
    pub x: f64,
    #[serde(rename = "Y")]
    pub y: f64,
    #[serde(rename = "Z")]
    pub z: f64,
    #[serde(rename = "intens")]
    pub intensity: u16,
    #[serde(rename = "groundX")]
    pub ground_x: f64,
    #[serde(rename = "groundY")]
    pub ground_y: f64,
}

impl From<&ClassifiedPoint> for SubsetRecord {
    fn from(p: &ClassifiedPoint) -> Self {
        Self {
            x: p.point.x,
            y: p.point.y,
            z: p.point.z,
            intensity: p.point.attributes.intensity,
            ground_x: p.ground_x,
            ground_y: p.ground_y,
        }
    }
}

pub fn subset_path(
    output_dir: &Path,
    run_label: &str,
    tile: &str,
    label: ClassificationLabel,
    format: OutputFormat,
) -> PathBuf {
    output_dir.join(format!(
        "{}_tile{}_{}.{}",
        run_label,
        tile,
        label.category(),
        format.extension()
    ))
}

/// Writes one file per label for a run and returns the written paths in
/// label order. Labels without points still get a file.
pub fn write_run_subsets(
    output_dir: &Path,
    run_label: &str,
    tile: &str,
    classified: &ClassifiedPointCloud,
    format: OutputFormat,
) -> Result<Vec<PathBuf>, ExportError> {
    fs::create_dir_all(output_dir).map_err(|source| ExportError::Io {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::with_capacity(ClassificationLabel::ALL.len());
    for (label, points) in classified.partition() {
        let path = subset_path(output_dir, run_label, tile, label, format);
        let records: Vec<SubsetRecord> = points.into_iter().map(SubsetRecord::from).collect();

        match format {
            OutputFormat::Csv => write_csv(&path, &records)?,
            OutputFormat::Json => write_json(&path, &records)?,
        }
        log::debug!("Wrote {} points to {:?}", records.len(), path);
        written.push(path);
    }

    Ok(written)
}

fn create(path: &Path) -> Result<BufWriter<File>, ExportError> {
    let file = File::create(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufWriter::new(file))
}

fn write_csv(path: &Path, records: &[SubsetRecord]) -> Result<(), ExportError> {
    let csv_error = |source: csv::Error| ExportError::Csv {
        path: path.to_path_buf(),
        source,
    };

    // Headers are written by hand so that empty subsets still carry them.
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(create(path)?);
    writer.write_record(HEADERS).map_err(csv_error)?;
    for record in records {
        writer.serialize(record).map_err(csv_error)?;
    }
    writer.flush().map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_json(path: &Path, records: &[SubsetRecord]) -> Result<(), ExportError> {
    let mut writer = create(path)?;
    serde_json::to_writer(&mut writer, records).map_err(|source| ExportError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use pcd_core::pointcloud::point::{Point, PointAttributes};

    use super::*;

    fn classified() -> ClassifiedPointCloud {
        let point = |x: f64, intensity: u16, label| ClassifiedPoint {
            point: Point::new(
                x,
                2.0,
                3.5,
                PointAttributes {
                    intensity,
                    ..Default::default()
                },
            ),
            ground_x: x + 1.0,
            ground_y: -1.5,
            label,
        };
        ClassifiedPointCloud {
            points: vec![
                point(1.0, 10, ClassificationLabel::InShadow),
                point(2.0, 20, ClassificationLabel::ShadingGround),
                point(3.0, 30, ClassificationLabel::InShadow),
            ],
        }
    }

    #[test]
    fn writes_one_csv_per_label() {
        let dir = tempfile::tempdir().unwrap();
        let written =
            write_run_subsets(dir.path(), "0621_1200", "987210", &classified(), OutputFormat::Csv)
                .unwrap();

        let names: Vec<String> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                "0621_1200_tile987210_inBuilding.csv",
                "0621_1200_tile987210_inShade.csv",
                "0621_1200_tile987210_shadingFacade.csv",
                "0621_1200_tile987210_shadingGround.csv",
            ]
        );

        let empty = fs::read_to_string(&written[0]).unwrap();
        assert_eq!(empty.trim_end(), "X,Y,Z,intens,groundX,groundY");

        let mut reader = csv::Reader::from_path(&written[1]).unwrap();
        let rows: Vec<SubsetRecord> = reader.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].x, 1.0);
        assert_eq!(rows[1].intensity, 30);
        assert_eq!(rows[1].ground_x, 4.0);
        assert_eq!(rows[1].ground_y, -1.5);
    }

    #[test]
    fn writes_json_arrays() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("out");
        let written =
            write_run_subsets(&out, "run", "1", &classified(), OutputFormat::Json).unwrap();
        assert_eq!(written.len(), 4);

        let text = fs::read_to_string(&written[3]).unwrap();
        let rows: Vec<serde_json::Value> = serde_json::from_str(&text).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["X"], 2.0);
        assert_eq!(rows[0]["intens"], 20);
        assert_eq!(rows[0]["groundX"], 3.0);

        let text = fs::read_to_string(&written[2]).unwrap();
        assert_eq!(text, "[]");
    }

    #[test]
    fn output_format_parsing() {
        assert_eq!("CSV".parse::<OutputFormat>(), Ok(OutputFormat::Csv));
        assert_eq!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
