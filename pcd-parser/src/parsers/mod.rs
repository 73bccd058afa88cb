use std::{ffi::OsStr, path::Path};

use pcd_core::pointcloud::point::PointCloud;

use crate::error::ParseError;

pub mod csv;
pub mod las;

pub trait ParserProvider {
    fn get_parser(&self) -> Box<dyn Parser>;
}

pub trait Parser {
    fn parse(&self) -> Result<PointCloud, ParseError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extension {
    Las,
    Laz,
    Csv,
    Txt,
}

pub fn get_extension(extension: &str) -> Result<Extension, ParseError> {
    match extension.to_ascii_lowercase().as_str() {
        "las" => Ok(Extension::Las),
        "laz" => Ok(Extension::Laz),
        "csv" => Ok(Extension::Csv),
        "txt" => Ok(Extension::Txt),
        other => Err(ParseError::UnsupportedExtension(other.to_string())),
    }
}

pub fn extension_of(path: &Path) -> Result<Extension, ParseError> {
    let extension = path
        .extension()
        .and_then(OsStr::to_str)
        .ok_or_else(|| ParseError::UnsupportedExtension(path.display().to_string()))?;
    get_extension(extension)
}

/// Picks the parser matching the extension of `path`.
pub fn parser_for_path(path: &Path) -> Result<Box<dyn Parser>, ParseError> {
    let filenames = vec![path.to_path_buf()];
    let parser = match extension_of(path)? {
        Extension::Las | Extension::Laz => las::LasParserProvider { filenames }.get_parser(),
        Extension::Csv | Extension::Txt => csv::CsvParserProvider { filenames }.get_parser(),
    };
    Ok(parser)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_lookup() {
        assert_eq!(get_extension("LAZ").unwrap(), Extension::Laz);
        assert_eq!(
            extension_of(Path::new("las/25252.las")).unwrap(),
            Extension::Las
        );
        assert!(matches!(
            get_extension("e57"),
            Err(ParseError::UnsupportedExtension(_))
        ));
        assert!(extension_of(Path::new("las/25252")).is_err());
    }
}
