pub mod error;
pub mod footprint;
pub mod parsers;

pub use error::{FootprintError, ParseError};
