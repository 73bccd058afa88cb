use rayon::prelude::*;

use pcd_core::pointcloud::point::{Point, PointCloud, GROUND_CLASSIFICATION};

use super::Transform;
use crate::error::TransformError;

/// Mean z of the points carrying `ground_class`, `None` when there are none.
pub fn ground_elevation(points: &[Point], ground_class: u8) -> Option<f64> {
    let (sum, count) = points
        .iter()
        .filter(|p| p.is_ground(ground_class))
        .fold((0.0, 0usize), |(sum, count), p| (sum + p.z, count + 1));

    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Turns absolute elevations into heights above the tile's mean ground level.
pub struct GroundNormalizeTransform {
    pub ground_class: u8,
}

impl Default for GroundNormalizeTransform {
    fn default() -> Self {
        Self {
            ground_class: GROUND_CLASSIFICATION,
        }
    }
}

impl GroundNormalizeTransform {
    pub fn new(ground_class: u8) -> Self {
        Self { ground_class }
    }
}

impl Transform for GroundNormalizeTransform {
    fn name(&self) -> &'static str {
        "ground-normalize"
    }

    fn transform(&self, point_cloud: PointCloud) -> Result<PointCloud, TransformError> {
        let elevation = ground_elevation(&point_cloud.points, self.ground_class).ok_or(
            TransformError::NoGroundPoints {
                ground_class: self.ground_class,
            },
        )?;
        log::debug!("ground elevation: {:.3}", elevation);

        let points = point_cloud
            .points
            .into_par_iter()
            .map(|p| p.with_z(p.z - elevation))
            .collect();

        Ok(PointCloud::new(points))
    }
}

#[cfg(test)]
mod tests {
    use pcd_core::pointcloud::point::PointAttributes;

    use super::*;

    fn make_point(z: f64, classification: u8) -> Point {
        Point::new(
            0.0,
            0.0,
            z,
            PointAttributes {
                classification,
                ..Default::default()
            },
        )
    }

    #[test]
    fn ground_points_average_to_zero() {
        let pc = PointCloud::new(vec![
            make_point(10.3, 2),
            make_point(45.0, 1),
            make_point(11.1, 2),
            make_point(9.7, 2),
            make_point(30.0, 5),
        ]);

        let normalized = GroundNormalizeTransform::default().transform(pc).unwrap();
        let ground_mean = ground_elevation(&normalized.points, 2).unwrap();
        assert!(ground_mean.abs() < 1e-9);

        // mean ground was 10.366..., non-ground heights shift by the same amount
        let expected = 45.0 - (10.3 + 11.1 + 9.7) / 3.0;
        assert!((normalized.points[1].z - expected).abs() < 1e-9);
        assert_eq!(normalized.len(), 5);
    }

    #[test]
    fn no_ground_points_is_an_error() {
        let pc = PointCloud::new(vec![make_point(10.0, 1), make_point(12.0, 5)]);
        let result = GroundNormalizeTransform::default().transform(pc);
        assert_eq!(
            result.unwrap_err(),
            TransformError::NoGroundPoints { ground_class: 2 }
        );
    }

    #[test]
    fn custom_ground_class() {
        let pc = PointCloud::new(vec![make_point(3.0, 8), make_point(5.0, 1)]);
        let normalized = GroundNormalizeTransform::new(8).transform(pc).unwrap();
        assert_eq!(normalized.points[0].z, 0.0);
        assert_eq!(normalized.points[1].z, 2.0);
    }
}
