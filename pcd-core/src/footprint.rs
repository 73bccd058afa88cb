use crate::bounds::Bounds;

/// A building outline at ground level with its roof height.
///
/// `vertices` holds every position of every ring of the source geometry, in
/// file order. Only the vertex set matters downstream, since hulls are convex.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingFootprint {
    pub id: Option<String>,
    pub vertices: Vec<[f64; 2]>,
    pub height: f64,
}

impl BuildingFootprint {
    pub fn new(id: Option<String>, vertices: Vec<[f64; 2]>, height: f64) -> Self {
        Self {
            id,
            vertices,
            height,
        }
    }

    /// Mean of the vertices, `None` for an empty footprint.
    pub fn centroid(&self) -> Option<[f64; 2]> {
        if self.vertices.is_empty() {
            return None;
        }
        let n = self.vertices.len() as f64;
        let (sx, sy) = self
            .vertices
            .iter()
            .fold((0.0, 0.0), |(sx, sy), v| (sx + v[0], sy + v[1]));
        Some([sx / n, sy / n])
    }

    pub fn display_id(&self, index: usize) -> String {
        match &self.id {
            Some(id) => id.clone(),
            None => format!("#{}", index),
        }
    }
}

/// Keeps footprints whose centroid falls strictly inside `bounds`.
pub fn retain_within(
    footprints: Vec<BuildingFootprint>,
    bounds: &Bounds,
) -> Vec<BuildingFootprint> {
    footprints
        .into_iter()
        .filter(|f| match f.centroid() {
            Some([x, y]) => bounds.strictly_contains(x, y),
            None => false,
        })
        .collect()
}
