use rayon::prelude::*;

use pcd_core::pointcloud::point::{Point, PointCloud};

use super::Transform;
use crate::error::TransformError;

pub const DEFAULT_MAX_HEIGHT: f64 = 1000.0;

/// Drops returns at or above `max_height` (birds, atmospheric noise).
/// Expects ground-normalized heights.
pub struct HeightCapTransform {
    pub max_height: f64,
}

impl Default for HeightCapTransform {
    fn default() -> Self {
        Self {
            max_height: DEFAULT_MAX_HEIGHT,
        }
    }
}

impl HeightCapTransform {
    pub fn new(max_height: f64) -> Self {
        Self { max_height }
    }
}

impl Transform for HeightCapTransform {
    fn name(&self) -> &'static str {
        "height-cap"
    }

    fn transform(&self, point_cloud: PointCloud) -> Result<PointCloud, TransformError> {
        let max_height = self.max_height;
        let points: Vec<Point> = point_cloud
            .points
            .into_par_iter()
            .filter(|p| p.z < max_height)
            .collect();
        Ok(PointCloud::new(points))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cap_is_exclusive() {
        let at = |z: f64| Point {
            z,
            ..Default::default()
        };
        let pc = PointCloud::new(vec![at(999.9), at(1000.0), at(-2.0)]);
        let capped = HeightCapTransform::default().transform(pc).unwrap();
        let zs: Vec<f64> = capped.points.iter().map(|p| p.z).collect();
        assert_eq!(zs, vec![999.9, -2.0]);
    }
}
