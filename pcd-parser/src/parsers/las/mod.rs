use std::path::PathBuf;

use las::Reader;

use pcd_core::pointcloud::point::{Point, PointAttributes, PointCloud};

use super::{Parser, ParserProvider};
use crate::error::ParseError;

pub struct LasParserProvider {
    pub filenames: Vec<PathBuf>,
}

impl ParserProvider for LasParserProvider {
    fn get_parser(&self) -> Box<dyn Parser> {
        Box::new(LasParser {
            filenames: self.filenames.clone(),
        })
    }
}

pub struct LasParser {
    pub filenames: Vec<PathBuf>,
}

impl Parser for LasParser {
    fn parse(&self) -> Result<PointCloud, ParseError> {
        if self.filenames.is_empty() {
            return Err(ParseError::NoInput);
        }

        let mut points = Vec::new();
        let mut dropped = 0usize;

        for filename in &self.filenames {
            let start = std::time::Instant::now();
            let mut reader = Reader::from_path(filename)?;
            log::debug!(
                "{:?}: {} points in header",
                filename,
                reader.header().number_of_points()
            );

            for las_point in reader.points() {
                let point = convert_las_point(las_point?);
                if point.is_finite() {
                    points.push(point);
                } else {
                    dropped += 1;
                }
            }
            log::debug!("Read {:?} in {:?}", filename, start.elapsed());
        }

        if dropped > 0 {
            log::warn!("Dropped {} points with non-finite coordinates", dropped);
        }

        Ok(PointCloud::new(points))
    }
}

pub fn convert_las_point(las_point: las::Point) -> Point {
    let attributes = PointAttributes {
        intensity: las_point.intensity,
        classification: u8::from(las_point.classification),
        return_number: las_point.return_number,
        number_of_returns: las_point.number_of_returns,
    };

    Point {
        x: las_point.x,
        y: las_point.y,
        z: las_point.z,
        attributes,
    }
}
