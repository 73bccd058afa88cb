use std::{fs, path::Path};

use geojson::{feature::Id, Feature, GeoJson};
use serde_json::Value as JsonValue;

use pcd_core::{bounds::Bounds, footprint::BuildingFootprint};

use crate::error::{FootprintError, ParseError};

pub const DEFAULT_HEIGHT_PROPERTY: &str = "heightroof";

/// Building footprints read from one GeoJSON file.
///
/// Features that cannot be turned into a footprint are kept in `rejected`
/// with their index in the collection, so callers decide how loud to be.
#[derive(Debug, Clone, Default)]
pub struct Footprints {
    pub footprints: Vec<BuildingFootprint>,
    pub rejected: Vec<(usize, FootprintError)>,
}

impl Footprints {
    pub fn retain_within(self, bounds: &Bounds) -> Self {
        Self {
            footprints: pcd_core::footprint::retain_within(self.footprints, bounds),
            rejected: self.rejected,
        }
    }
}

pub struct FootprintParser {
    pub height_property: String,
    /// When false, a missing height reads as 0. Used for building masks,
    /// where only the outline matters.
    pub height_required: bool,
}

impl Default for FootprintParser {
    fn default() -> Self {
        Self::new(DEFAULT_HEIGHT_PROPERTY)
    }
}

impl FootprintParser {
    pub fn new(height_property: impl Into<String>) -> Self {
        Self {
            height_property: height_property.into(),
            height_required: true,
        }
    }

    pub fn outlines(height_property: impl Into<String>) -> Self {
        Self {
            height_required: false,
            ..Self::new(height_property)
        }
    }

    pub fn parse_path(&self, path: &Path) -> Result<Footprints, ParseError> {
        let text = fs::read_to_string(path)?;
        let footprints = self.parse_str(&text)?;
        for (index, error) in &footprints.rejected {
            log::warn!("{:?}: feature {} rejected: {}", path, index, error);
        }
        Ok(footprints)
    }

    pub fn parse_str(&self, text: &str) -> Result<Footprints, ParseError> {
        let collection = match text.parse::<GeoJson>()? {
            GeoJson::FeatureCollection(collection) => collection,
            _ => return Err(ParseError::NotFeatureCollection),
        };

        let mut result = Footprints::default();
        for (index, feature) in collection.features.iter().enumerate() {
            match self.parse_feature(feature) {
                Ok(footprint) => result.footprints.push(footprint),
                Err(e) => result.rejected.push((index, e)),
            }
        }

        Ok(result)
    }

    pub fn parse_feature(&self, feature: &Feature) -> Result<BuildingFootprint, FootprintError> {
        let height = self.height(feature)?;
        let geometry = feature
            .geometry
            .as_ref()
            .ok_or(FootprintError::MissingGeometry)?;

        let mut vertices = Vec::new();
        match &geometry.value {
            geojson::Value::Polygon(rings) => {
                for ring in rings {
                    push_positions(ring, &mut vertices);
                }
            }
            geojson::Value::MultiPolygon(polygons) => {
                for rings in polygons {
                    for ring in rings {
                        push_positions(ring, &mut vertices);
                    }
                }
            }
            other => {
                return Err(FootprintError::UnsupportedGeometry(
                    geometry_type(other).to_string(),
                ))
            }
        }

        if vertices.is_empty() {
            return Err(FootprintError::EmptyGeometry);
        }

        Ok(BuildingFootprint::new(feature_id(feature), vertices, height))
    }

    fn height(&self, feature: &Feature) -> Result<f64, FootprintError> {
        let value = match feature
            .property(&self.height_property)
            .filter(|v| !v.is_null())
        {
            Some(value) => value,
            None if !self.height_required => return Ok(0.0),
            None => return Err(FootprintError::MissingHeight(self.height_property.clone())),
        };

        // NYC building data ships heights both as numbers and as strings.
        let height = match value {
            JsonValue::Number(n) => n.as_f64(),
            JsonValue::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };

        match height {
            Some(h) if h.is_finite() && h >= 0.0 => Ok(h),
            _ => Err(FootprintError::InvalidHeight {
                property: self.height_property.clone(),
                value: value.to_string(),
            }),
        }
    }
}

fn push_positions(ring: &[Vec<f64>], vertices: &mut Vec<[f64; 2]>) {
    for position in ring {
        if let [x, y, ..] = position.as_slice() {
            if x.is_finite() && y.is_finite() {
                vertices.push([*x, *y]);
            }
        }
    }
}

fn geometry_type(value: &geojson::Value) -> &'static str {
    match value {
        geojson::Value::Point(_) => "Point",
        geojson::Value::MultiPoint(_) => "MultiPoint",
        geojson::Value::LineString(_) => "LineString",
        geojson::Value::MultiLineString(_) => "MultiLineString",
        geojson::Value::Polygon(_) => "Polygon",
        geojson::Value::MultiPolygon(_) => "MultiPolygon",
        geojson::Value::GeometryCollection(_) => "GeometryCollection",
    }
}

fn feature_id(feature: &Feature) -> Option<String> {
    match &feature.id {
        Some(Id::String(s)) => Some(s.clone()),
        Some(Id::Number(n)) => Some(n.to_string()),
        None => feature
            .property("bin")
            .or_else(|| feature.property("doitt_id"))
            .map(|v| match v {
                JsonValue::String(s) => s.clone(),
                other => other.to_string(),
            }),
    }
}
