//! Sun-shadow geometry for lidar tiles: projects points and building
//! footprints onto the ground along the sun direction and labels every
//! point as inside a building, inside a building's shadow, shading a facade
//! or shading the ground.

pub mod classifier;
pub mod error;
pub mod hull;
pub mod index;
pub mod sun;

pub use classifier::{ClassificationLabel, ClassifiedPoint, ClassifiedPointCloud, Classifier};
pub use error::ShadowError;
pub use hull::{Hull, HullSet, HullWarning};
pub use index::HullIndex;
pub use sun::SunPosition;
