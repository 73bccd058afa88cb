use std::path::PathBuf;

use glob::glob;

use crate::error::AppError;

const PLACEHOLDER: &str = "{tile}";

/// A path with a `{tile}` placeholder, e.g. `las/{tile}.las`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate(String);

impl PathTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    pub fn has_placeholder(&self) -> bool {
        self.0.contains(PLACEHOLDER)
    }

    pub fn resolve(&self, tile: &str) -> PathBuf {
        PathBuf::from(self.0.replace(PLACEHOLDER, tile))
    }

    /// Finds tile ids by globbing the template with `*` in place of the
    /// placeholder. Returns them sorted and deduplicated.
    pub fn discover(&self) -> Result<Vec<String>, AppError> {
        let Some((prefix, suffix)) = self.0.split_once(PLACEHOLDER) else {
            return Err(AppError::Config(format!(
                "template {:?} has no {} placeholder",
                self.0, PLACEHOLDER
            )));
        };
        if suffix.contains(PLACEHOLDER) {
            return Err(AppError::Config(format!(
                "template {:?} repeats the {} placeholder",
                self.0, PLACEHOLDER
            )));
        }

        let pattern = format!(
            "{}*{}",
            glob::Pattern::escape(prefix),
            glob::Pattern::escape(suffix)
        );
        let mut tiles = Vec::new();
        for entry in glob(&pattern)? {
            match entry {
                Ok(path) => {
                    let path = path.to_string_lossy();
                    if let Some(tile) = path
                        .strip_prefix(prefix)
                        .and_then(|rest| rest.strip_suffix(suffix))
                        .filter(|tile| !tile.is_empty())
                    {
                        tiles.push(tile.to_string());
                    }
                }
                Err(e) => log::warn!("Skipping unreadable path: {}", e),
            }
        }

        tiles.sort();
        tiles.dedup();
        if tiles.is_empty() {
            return Err(AppError::NoTiles(pattern));
        }
        Ok(tiles)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn resolve_replaces_placeholder() {
        let template = PathTemplate::new("buildings/buildingsTile{tile}.geojson");
        assert_eq!(
            template.resolve("987210"),
            PathBuf::from("buildings/buildingsTile987210.geojson")
        );
        assert!(template.has_placeholder());
        assert!(!PathTemplate::new("mask.geojson").has_placeholder());
    }

    #[test]
    fn discover_tiles_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let las_dir = dir.path().join("las");
        fs::create_dir_all(&las_dir).unwrap();
        for name in ["25252.las", "987210.las", "notes.txt"] {
            fs::write(las_dir.join(name), b"").unwrap();
        }

        let template = PathTemplate::new(format!("{}/{{tile}}.las", las_dir.display()));
        assert_eq!(template.discover().unwrap(), vec!["25252", "987210"]);
    }

    #[test]
    fn discover_without_matches() {
        let dir = tempfile::tempdir().unwrap();
        let template = PathTemplate::new(format!("{}/{{tile}}.laz", dir.path().display()));
        assert!(matches!(template.discover(), Err(AppError::NoTiles(_))));
        assert!(matches!(
            PathTemplate::new("points.las").discover(),
            Err(AppError::Config(_))
        ));
    }
}
