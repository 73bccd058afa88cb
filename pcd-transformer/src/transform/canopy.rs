use rayon::prelude::*;

use pcd_core::pointcloud::point::{Point, PointCloud};

use super::Transform;
use crate::error::TransformError;

/// Keeps returns that are followed by later returns of the same pulse.
///
/// Solid surfaces (roofs, ground, single-return facades) produce one return
/// or are the last of many, so they drop out and foliage stays. Fire escapes
/// and power lines survive too.
pub struct CanopyTransform;

impl CanopyTransform {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CanopyTransform {
    fn default() -> Self {
        Self
    }
}

impl Transform for CanopyTransform {
    fn name(&self) -> &'static str {
        "canopy"
    }

    fn transform(&self, point_cloud: PointCloud) -> Result<PointCloud, TransformError> {
        let points: Vec<Point> = point_cloud
            .points
            .into_par_iter()
            .filter(Point::is_canopy)
            .collect();
        Ok(PointCloud::new(points))
    }
}
