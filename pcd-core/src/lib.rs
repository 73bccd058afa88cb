pub mod bounds;
pub mod footprint;
pub mod pointcloud;
