pub mod error;
pub mod subsets;

pub use error::ExportError;
pub use subsets::{subset_path, write_run_subsets, OutputFormat, SubsetRecord};
