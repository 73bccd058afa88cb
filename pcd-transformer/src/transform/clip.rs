use rayon::prelude::*;

use pcd_core::{
    bounds::Bounds,
    pointcloud::point::{Point, PointCloud},
};

use super::Transform;
use crate::error::TransformError;

pub struct ClipTransform {
    pub bounds: Bounds,
}

impl ClipTransform {
    pub fn new(bounds: Bounds) -> Self {
        Self { bounds }
    }
}

impl Transform for ClipTransform {
    fn name(&self) -> &'static str {
        "clip"
    }

    fn transform(&self, point_cloud: PointCloud) -> Result<PointCloud, TransformError> {
        let bounds = self.bounds;
        let points: Vec<Point> = point_cloud
            .points
            .into_par_iter()
            .filter(|p| bounds.contains(p.x, p.y))
            .collect();
        Ok(PointCloud::new(points))
    }
}
