use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    str::FromStr,
};

use csv::ReaderBuilder;

use pcd_core::pointcloud::point::{Point, PointAttributes, PointCloud};

use super::{Parser, ParserProvider};
use crate::error::ParseError;

pub struct CsvParserProvider {
    pub filenames: Vec<PathBuf>,
}

impl ParserProvider for CsvParserProvider {
    fn get_parser(&self) -> Box<dyn Parser> {
        Box::new(CsvParser {
            filenames: self.filenames.clone(),
        })
    }
}

pub struct CsvParser {
    pub filenames: Vec<PathBuf>,
}

const ATTRIBUTE_NAMES: [&str; 7] = [
    "x",
    "y",
    "z",
    "intensity",
    "classification",
    "return_number",
    "number_of_returns",
];

// Column names written by other lidar tooling.
const ALIASES: [(&str, &str); 5] = [
    ("intens", "intensity"),
    ("class", "classification"),
    ("returnnumber", "return_number"),
    ("numberofreturns", "number_of_returns"),
    ("numreturns", "number_of_returns"),
];

impl Parser for CsvParser {
    fn parse(&self) -> Result<PointCloud, ParseError> {
        if self.filenames.is_empty() {
            return Err(ParseError::NoInput);
        }

        let mut points = Vec::new();
        for filename in &self.filenames {
            let start = std::time::Instant::now();
            parse_file(filename, &mut points)?;
            log::debug!("Read {:?} in {:?}", filename, start.elapsed());
        }

        Ok(PointCloud::new(points))
    }
}

fn parse_file(path: &Path, points: &mut Vec<Point>) -> Result<(), ParseError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let field_mapping = create_field_mapping(reader.headers()?)?;

    let mut dropped = 0usize;
    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let (record, mapping) = (&record, &field_mapping);
        let field = move |name: &'static str| FieldReader {
            path,
            line,
            record,
            mapping,
            name,
        };

        let attributes = PointAttributes {
            intensity: field("intensity").parse_optional()?.unwrap_or(0),
            classification: field("classification").parse_optional()?.unwrap_or(0),
            return_number: field("return_number").parse_optional()?.unwrap_or(0),
            number_of_returns: field("number_of_returns").parse_optional()?.unwrap_or(0),
        };
        let point = Point {
            x: field("x").parse_required()?,
            y: field("y").parse_required()?,
            z: field("z").parse_required()?,
            attributes,
        };

        if point.is_finite() {
            points.push(point);
        } else {
            dropped += 1;
        }
    }

    if dropped > 0 {
        log::warn!(
            "{:?}: dropped {} points with non-finite coordinates",
            path,
            dropped
        );
    }

    Ok(())
}

fn normalize(name: &str) -> String {
    name.to_lowercase().replace(['_', '-', ' '], "")
}

fn create_field_mapping(
    headers: &csv::StringRecord,
) -> Result<HashMap<&'static str, usize>, ParseError> {
    let mut mapping = HashMap::new();

    for (index, header) in headers.iter().enumerate() {
        let normalized_header = normalize(header);
        let attribute = ATTRIBUTE_NAMES
            .iter()
            .find(|attr| normalize(attr) == normalized_header)
            .copied()
            .or_else(|| {
                ALIASES
                    .iter()
                    .find(|(alias, _)| *alias == normalized_header)
                    .map(|(_, attr)| *attr)
            });
        if let Some(attr) = attribute {
            mapping.entry(attr).or_insert(index);
        }
    }

    for attr_name in ["x", "y", "z"] {
        if !mapping.contains_key(attr_name) {
            return Err(ParseError::MissingColumn(attr_name));
        }
    }

    Ok(mapping)
}

struct FieldReader<'a> {
    path: &'a Path,
    line: u64,
    record: &'a csv::StringRecord,
    mapping: &'a HashMap<&'static str, usize>,
    name: &'static str,
}

impl FieldReader<'_> {
    fn value(&self) -> Option<&str> {
        self.mapping
            .get(self.name)
            .and_then(|&index| self.record.get(index))
            .filter(|v| !v.is_empty())
    }

    fn invalid(&self, value: &str) -> ParseError {
        ParseError::InvalidField {
            path: self.path.to_path_buf(),
            line: self.line,
            field: self.name,
            value: value.to_string(),
        }
    }

    fn parse_required<T: FromStr>(&self) -> Result<T, ParseError> {
        let value = self.value().ok_or_else(|| self.invalid(""))?;
        value.parse::<T>().map_err(|_| self.invalid(value))
    }

    // Integer attributes sometimes come out of dataframes as "2.0".
    fn parse_optional<T: FromStr + TryFrom<u64>>(&self) -> Result<Option<T>, ParseError> {
        let Some(value) = self.value() else {
            return Ok(None);
        };
        if let Ok(v) = value.parse::<T>() {
            return Ok(Some(v));
        }
        match value.parse::<f64>() {
            Ok(f) if f.fract() == 0.0 && f >= 0.0 => T::try_from(f as u64)
                .map(Some)
                .map_err(|_| self.invalid(value)),
            _ => Err(self.invalid(value)),
        }
    }
}
