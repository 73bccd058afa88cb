use geo::{
    algorithm::orient::{Direction, Orient},
    Area, BoundingRect, ConvexHull, Coord, Intersects, MultiPoint, Point, Polygon,
};

use pcd_core::footprint::BuildingFootprint;

use crate::{error::ShadowError, index::HullIndex, sun::SunPosition};

/// Convex polygon on the ground plane, exterior ring counterclockwise.
#[derive(Debug, Clone)]
pub struct Hull {
    polygon: Polygon<f64>,
    /// Index of the footprint this hull was built from.
    pub source: usize,
}

impl Hull {
    /// Hull of the footprint itself.
    pub fn building(footprint: &BuildingFootprint, source: usize) -> Result<Self, ShadowError> {
        check_distinct(&footprint.vertices)?;
        let polygon = convex_hull(footprint.vertices.iter().copied())?;
        Ok(Self { polygon, source })
    }

    /// Hull of the footprint together with its roof outline projected onto
    /// the ground, i.e. the area the building covers plus the area it shades.
    pub fn shadow(
        footprint: &BuildingFootprint,
        sun: &SunPosition,
        source: usize,
    ) -> Result<Self, ShadowError> {
        check_distinct(&footprint.vertices)?;
        let projected = footprint
            .vertices
            .iter()
            .map(|&[x, y]| sun.project_to_ground(x, y, footprint.height));
        let polygon = convex_hull(footprint.vertices.iter().copied().chain(projected))?;
        Ok(Self { polygon, source })
    }

    pub fn polygon(&self) -> &Polygon<f64> {
        &self.polygon
    }

    pub fn area(&self) -> f64 {
        self.polygon.unsigned_area()
    }

    /// Boundary-inclusive point containment.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.polygon.intersects(&Coord { x, y })
    }

    /// Axis-aligned bounds as `([min_x, min_y], [max_x, max_y])`.
    pub fn envelope(&self) -> ([f64; 2], [f64; 2]) {
        match self.polygon.bounding_rect() {
            Some(rect) => ([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]),
            // Construction guarantees a non-empty exterior.
            None => ([0.0, 0.0], [0.0, 0.0]),
        }
    }
}

fn check_distinct(vertices: &[[f64; 2]]) -> Result<(), ShadowError> {
    let mut distinct = vertices.to_vec();
    distinct.sort_by(|a, b| a[0].total_cmp(&b[0]).then(a[1].total_cmp(&b[1])));
    distinct.dedup();
    if distinct.len() < 3 {
        return Err(ShadowError::DegenerateHull {
            distinct: distinct.len(),
        });
    }
    Ok(())
}

fn convex_hull(vertices: impl Iterator<Item = [f64; 2]>) -> Result<Polygon<f64>, ShadowError> {
    let vertices: Vec<[f64; 2]> = vertices.collect();
    if vertices.iter().flatten().any(|v| !v.is_finite()) {
        return Err(ShadowError::NonFiniteVertex);
    }
    let points: MultiPoint<f64> = vertices.into_iter().map(|[x, y]| Point::new(x, y)).collect();
    let hull = points.convex_hull().orient(Direction::Default);
    if hull.unsigned_area() <= 0.0 {
        return Err(ShadowError::CollinearHull);
    }
    Ok(hull)
}

/// A footprint that could not be turned into a hull.
#[derive(Debug, Clone, PartialEq)]
pub struct HullWarning {
    pub footprint: usize,
    pub id: Option<String>,
    pub error: ShadowError,
}

/// Hulls for one set of footprints, indexed for point queries.
pub struct HullSet {
    pub index: HullIndex,
    pub warnings: Vec<HullWarning>,
}

impl HullSet {
    pub fn buildings(footprints: &[BuildingFootprint]) -> Self {
        Self::build(footprints, "building", |footprint, i| {
            Hull::building(footprint, i)
        })
    }

    pub fn shadows(footprints: &[BuildingFootprint], sun: &SunPosition) -> Self {
        Self::build(footprints, "shadow", |footprint, i| {
            Hull::shadow(footprint, sun, i)
        })
    }

    fn build<F>(footprints: &[BuildingFootprint], kind: &str, make: F) -> Self
    where
        F: Fn(&BuildingFootprint, usize) -> Result<Hull, ShadowError>,
    {
        let mut hulls = Vec::with_capacity(footprints.len());
        let mut warnings = Vec::new();

        for (i, footprint) in footprints.iter().enumerate() {
            match make(footprint, i) {
                Ok(hull) => hulls.push(hull),
                Err(error) => {
                    log::warn!(
                        "Skipping {} hull for building {}: {}",
                        kind,
                        footprint.display_id(i),
                        error
                    );
                    warnings.push(HullWarning {
                        footprint: i,
                        id: footprint.id.clone(),
                        error,
                    });
                }
            }
        }

        Self {
            index: HullIndex::new(hulls),
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: f64, height: f64) -> BuildingFootprint {
        BuildingFootprint::new(
            Some("sq".to_string()),
            vec![
                [0.0, 0.0],
                [size, 0.0],
                [size, size],
                [0.0, size],
                [0.0, 0.0],
            ],
            height,
        )
    }

    #[test]
    fn building_hull_covers_footprint() {
        let footprint = square(10.0, 20.0);
        let hull = Hull::building(&footprint, 0).unwrap();
        assert!((hull.area() - 100.0).abs() < 1e-9);
        for &[x, y] in &footprint.vertices {
            assert!(hull.contains(x, y));
        }
        assert!(hull.contains(5.0, 5.0));
        assert!(hull.contains(10.0, 5.0));
        assert!(!hull.contains(10.5, 5.0));
        assert!(hull.polygon().signed_area() > 0.0);
    }

    #[test]
    fn shadow_hull_contains_footprint_and_projection() {
        let footprint = square(10.0, 10.0);
        let sun = SunPosition::new(0.0, 45.0).unwrap();
        let hull = Hull::shadow(&footprint, &sun, 3).unwrap();
        assert_eq!(hull.source, 3);

        // footprint swept 10 units towards -y
        assert!((hull.area() - 200.0).abs() < 1e-6);
        for &[x, y] in &footprint.vertices {
            assert!(hull.contains(x, y));
            let [gx, gy] = sun.project_to_ground(x, y, footprint.height);
            assert!(hull.contains(gx, gy));
        }
        assert!(hull.contains(5.0, -5.0));
        assert!(!hull.contains(5.0, 11.0));
        assert!(hull.polygon().signed_area() > 0.0);

        let (min, max) = hull.envelope();
        assert!((min[1] + 10.0).abs() < 1e-9);
        assert!((max[1] - 10.0).abs() < 1e-9);
    }

    #[test]
    fn shadow_area_grows_with_height() {
        let sun = SunPosition::new(37.0, 25.0).unwrap();
        let mut previous = 0.0;
        for height in [0.0, 5.0, 10.0, 40.0] {
            let area = Hull::shadow(&square(10.0, height), &sun, 0).unwrap().area();
            assert!(area > previous || height == 0.0);
            previous = area;
        }
    }

    #[test]
    fn zero_height_shadow_equals_footprint() {
        let sun = SunPosition::new(200.0, 30.0).unwrap();
        let hull = Hull::shadow(&square(4.0, 0.0), &sun, 0).unwrap();
        assert!((hull.area() - 16.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_footprints_are_rejected() {
        let two_points =
            BuildingFootprint::new(None, vec![[0.0, 0.0], [1.0, 1.0], [0.0, 0.0]], 5.0);
        assert_eq!(
            Hull::building(&two_points, 0).unwrap_err(),
            ShadowError::DegenerateHull { distinct: 2 }
        );
        let sun = SunPosition::new(0.0, 30.0).unwrap();
        assert!(Hull::shadow(&two_points, &sun, 0).is_err());

        let collinear =
            BuildingFootprint::new(None, vec![[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]], 5.0);
        assert_eq!(
            Hull::building(&collinear, 0).unwrap_err(),
            ShadowError::CollinearHull
        );

        let empty = BuildingFootprint::new(None, vec![], 5.0);
        assert!(Hull::building(&empty, 0).is_err());
    }

    #[test]
    fn overflowing_shadow_is_an_error() {
        let sun = SunPosition::new(0.0, 1.0).unwrap();
        let tower = square(10.0, f64::MAX);
        assert_eq!(
            Hull::shadow(&tower, &sun, 0).unwrap_err(),
            ShadowError::NonFiniteVertex
        );

        let set = HullSet::shadows(&[tower, square(10.0, 5.0)], &sun);
        assert_eq!(set.index.len(), 1);
        assert_eq!(set.warnings[0].error, ShadowError::NonFiniteVertex);
    }

    #[test]
    fn hull_set_skips_bad_footprints_with_warning() {
        let footprints = vec![
            square(10.0, 20.0),
            BuildingFootprint::new(Some("bad".to_string()), vec![[0.0, 0.0]], 3.0),
        ];
        let set = HullSet::buildings(&footprints);
        assert_eq!(set.index.len(), 1);
        assert_eq!(set.warnings.len(), 1);
        assert_eq!(set.warnings[0].footprint, 1);
        assert_eq!(set.warnings[0].id.as_deref(), Some("bad"));

        let sun = SunPosition::new(90.0, 30.0).unwrap();
        let set = HullSet::shadows(&footprints, &sun);
        assert_eq!(set.index.len(), 1);
        assert_eq!(set.warnings.len(), 1);
    }
}
