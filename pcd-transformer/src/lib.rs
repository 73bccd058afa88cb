pub mod builder;
pub mod error;
pub mod runner;
pub mod transform;

pub use builder::{PreprocessTransformBuilder, TransformBuilder};
pub use error::TransformError;
pub use runner::{PointCloudTransformer, Transformer};
