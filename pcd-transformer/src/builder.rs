use pcd_core::bounds::Bounds;

use crate::transform::{
    canopy::CanopyTransform, clip::ClipTransform, ground::GroundNormalizeTransform,
    height::HeightCapTransform, CompositeTransform, Transform,
};

pub trait TransformBuilder {
    fn build(&self) -> Box<dyn Transform>;
}

/// Per-tile preprocessing ahead of shadow classification:
/// clip -> ground normalize -> canopy -> height cap.
///
/// Ground elevation is estimated before the canopy filter, since ground
/// returns are almost always single returns and would be filtered out.
#[derive(Debug, Clone)]
pub struct PreprocessTransformBuilder {
    pub bounds: Option<Bounds>,
    pub ground_class: u8,
    pub canopy_only: bool,
    pub max_height: Option<f64>,
}

impl Default for PreprocessTransformBuilder {
    fn default() -> Self {
        Self {
            bounds: None,
            ground_class: pcd_core::pointcloud::point::GROUND_CLASSIFICATION,
            canopy_only: true,
            max_height: Some(crate::transform::height::DEFAULT_MAX_HEIGHT),
        }
    }
}

impl TransformBuilder for PreprocessTransformBuilder {
    fn build(&self) -> Box<dyn Transform> {
        let mut transforms: Vec<Box<dyn Transform>> = Vec::new();

        if let Some(bounds) = self.bounds {
            transforms.push(Box::new(ClipTransform::new(bounds)));
        }
        transforms.push(Box::new(GroundNormalizeTransform::new(self.ground_class)));
        if self.canopy_only {
            transforms.push(Box::new(CanopyTransform::new()));
        }
        if let Some(max_height) = self.max_height {
            transforms.push(Box::new(HeightCapTransform::new(max_height)));
        }

        Box::new(CompositeTransform::new(transforms))
    }
}
