use pcd_core::pointcloud::point::PointCloud;

use crate::error::TransformError;

pub mod canopy;
pub mod clip;
pub mod ground;
pub mod height;

/// One preprocessing step. Consumes a cloud and hands back a new one.
pub trait Transform: Send + Sync {
    fn name(&self) -> &'static str;

    fn transform(&self, point_cloud: PointCloud) -> Result<PointCloud, TransformError>;
}

pub struct CompositeTransform {
    transforms: Vec<Box<dyn Transform>>,
}

impl CompositeTransform {
    pub fn new(transforms: Vec<Box<dyn Transform>>) -> Self {
        Self { transforms }
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}

impl Transform for CompositeTransform {
    fn name(&self) -> &'static str {
        "composite"
    }

    fn transform(&self, point_cloud: PointCloud) -> Result<PointCloud, TransformError> {
        let mut intermediate = point_cloud;

        for transform in &self.transforms {
            let before = intermediate.len();
            intermediate = transform.transform(intermediate)?;
            log::debug!(
                "{}: {} -> {} points",
                transform.name(),
                before,
                intermediate.len()
            );
        }

        Ok(intermediate)
    }
}
