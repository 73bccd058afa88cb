use std::{collections::BTreeMap, fmt};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use pcd_core::pointcloud::point::{Point, PointCloud};

use crate::{hull::HullSet, index::HullIndex, sun::SunPosition};

/// Listed in priority order: a point takes the first label whose test it passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ClassificationLabel {
    #[serde(rename = "inBuilding")]
    InBuilding,
    #[serde(rename = "inShade")]
    InShadow,
    #[serde(rename = "shadingFacade")]
    ShadingFacade,
    #[serde(rename = "shadingGround")]
    ShadingGround,
}

impl ClassificationLabel {
    pub const ALL: [ClassificationLabel; 4] = [
        ClassificationLabel::InBuilding,
        ClassificationLabel::InShadow,
        ClassificationLabel::ShadingFacade,
        ClassificationLabel::ShadingGround,
    ];

    /// Name used in output file names.
    pub fn category(&self) -> &'static str {
        match self {
            ClassificationLabel::InBuilding => "inBuilding",
            ClassificationLabel::InShadow => "inShade",
            ClassificationLabel::ShadingFacade => "shadingFacade",
            ClassificationLabel::ShadingGround => "shadingGround",
        }
    }
}

impl fmt::Display for ClassificationLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.category())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifiedPoint {
    pub point: Point,
    pub ground_x: f64,
    pub ground_y: f64,
    pub label: ClassificationLabel,
}

/// Result of one run, in the order of the input cloud.
#[derive(Debug, Clone, Default)]
pub struct ClassifiedPointCloud {
    pub points: Vec<ClassifiedPoint>,
}

impl ClassifiedPointCloud {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn count(&self, label: ClassificationLabel) -> usize {
        self.points.iter().filter(|p| p.label == label).count()
    }

    /// Point count for every label, zero counts included.
    pub fn counts(&self) -> BTreeMap<ClassificationLabel, usize> {
        let mut counts: BTreeMap<_, _> =
            ClassificationLabel::ALL.iter().map(|&l| (l, 0)).collect();
        for p in &self.points {
            *counts.entry(p.label).or_insert(0) += 1;
        }
        counts
    }

    /// Points grouped by label. Every label has an entry, possibly empty.
    pub fn partition(&self) -> BTreeMap<ClassificationLabel, Vec<&ClassifiedPoint>> {
        let mut subsets: BTreeMap<_, Vec<_>> = ClassificationLabel::ALL
            .iter()
            .map(|&l| (l, Vec::new()))
            .collect();
        for p in &self.points {
            subsets.entry(p.label).or_default().push(p);
        }
        subsets
    }
}

/// Labels points against building and shadow hulls for one sun position.
///
/// Building hulls do not depend on the sun, so the caller builds them once
/// per tile and shares them across runs.
pub struct Classifier<'a> {
    sun: SunPosition,
    buildings: &'a HullIndex,
    shadows: &'a HullIndex,
}

impl<'a> Classifier<'a> {
    pub fn new(sun: SunPosition, buildings: &'a HullIndex, shadows: &'a HullIndex) -> Self {
        Self {
            sun,
            buildings,
            shadows,
        }
    }

    pub fn from_sets(sun: SunPosition, buildings: &'a HullSet, shadows: &'a HullSet) -> Self {
        Self::new(sun, &buildings.index, &shadows.index)
    }

    pub fn classify_point(&self, point: &Point) -> ClassifiedPoint {
        let [ground_x, ground_y] = self.sun.project_to_ground(point.x, point.y, point.z);

        let label = if self.buildings.any_contains(point.x, point.y) {
            ClassificationLabel::InBuilding
        } else if self
            .shadows
            .any_contains_both([point.x, point.y], [ground_x, ground_y])
        {
            ClassificationLabel::InShadow
        } else if self.shadows.any_contains(ground_x, ground_y) {
            ClassificationLabel::ShadingFacade
        } else {
            ClassificationLabel::ShadingGround
        };

        ClassifiedPoint {
            point: *point,
            ground_x,
            ground_y,
            label,
        }
    }

    pub fn classify(&self, pc: &PointCloud) -> ClassifiedPointCloud {
        let points = pc
            .points
            .par_iter()
            .map(|p| self.classify_point(p))
            .collect();
        ClassifiedPointCloud { points }
    }
}

#[cfg(test)]
mod tests {
    use pcd_core::{footprint::BuildingFootprint, pointcloud::point::PointAttributes};

    use super::*;

    fn square(x0: f64, y0: f64, size: f64, height: f64) -> BuildingFootprint {
        BuildingFootprint::new(
            None,
            vec![
                [x0, y0],
                [x0 + size, y0],
                [x0 + size, y0 + size],
                [x0, y0 + size],
                [x0, y0],
            ],
            height,
        )
    }

    fn point(x: f64, y: f64, z: f64) -> Point {
        Point::new(x, y, z, PointAttributes::default())
    }

    fn classify(
        footprints: &[BuildingFootprint],
        sun: SunPosition,
        points: Vec<Point>,
    ) -> ClassifiedPointCloud {
        let buildings = HullSet::buildings(footprints);
        let shadows = HullSet::shadows(footprints, &sun);
        Classifier::from_sets(sun, &buildings, &shadows).classify(&PointCloud::new(points))
    }

    #[test]
    fn point_inside_footprint_is_in_building() {
        let sun = SunPosition::new(90.0, 30.0).unwrap();
        let result = classify(
            &[square(0.0, 0.0, 10.0, 20.0)],
            sun,
            vec![point(5.0, 5.0, 0.0)],
        );
        assert_eq!(result.points[0].label, ClassificationLabel::InBuilding);
    }

    #[test]
    fn labels_follow_priority() {
        // sun due north at 45°: shadows fall towards -y by the point's height
        let sun = SunPosition::new(0.0, 45.0).unwrap();
        let footprints = [square(0.0, 0.0, 10.0, 10.0)];
        let result = classify(
            &footprints,
            sun,
            vec![
                // in the shadow area, its own shadow stays inside it
                point(5.0, -3.0, 2.0),
                // north of the building, shadow lands on the footprint
                point(5.0, 14.0, 8.0),
                // far away, shadow lands on open ground
                point(50.0, 50.0, 5.0),
                // roof level point inside the footprint
                point(2.0, 2.0, 30.0),
            ],
        );

        let labels: Vec<_> = result.points.iter().map(|p| p.label).collect();
        assert_eq!(
            labels,
            vec![
                ClassificationLabel::InShadow,
                ClassificationLabel::ShadingFacade,
                ClassificationLabel::ShadingGround,
                ClassificationLabel::InBuilding,
            ]
        );

        let facade = &result.points[1];
        assert!((facade.ground_x - 5.0).abs() < 1e-9);
        assert!((facade.ground_y - 6.0).abs() < 1e-9);
    }

    #[test]
    fn every_point_gets_exactly_one_label() {
        let sun = SunPosition::new(135.0, 35.0).unwrap();
        let footprints = [square(0.0, 0.0, 10.0, 15.0), square(30.0, 5.0, 8.0, 40.0)];
        let points: Vec<Point> = (0..400)
            .map(|i| {
                let x = (i % 20) as f64 * 3.0 - 10.0;
                let y = (i / 20) as f64 * 3.0 - 20.0;
                point(x, y, (i % 7) as f64 * 4.0)
            })
            .collect();
        let result = classify(&footprints, sun, points.clone());

        assert_eq!(result.len(), points.len());
        assert_eq!(result.counts().values().sum::<usize>(), points.len());
        let partition = result.partition();
        assert_eq!(partition.len(), 4);
        assert_eq!(partition.values().map(Vec::len).sum::<usize>(), points.len());
        for (p, input) in result.points.iter().zip(&points) {
            assert_eq!(&p.point, input);
        }
    }

    #[test]
    fn classification_is_repeatable() {
        let sun = SunPosition::new(250.0, 20.0).unwrap();
        let footprints = [square(0.0, 0.0, 12.0, 25.0)];
        let points: Vec<Point> = (0..100)
            .map(|i| point((i % 10) as f64 * 4.0 - 10.0, (i / 10) as f64 * 4.0 - 10.0, 6.0))
            .collect();
        let first = classify(&footprints, sun, points.clone());
        let second = classify(&footprints, sun, points);
        assert_eq!(first.points, second.points);
    }

    #[test]
    fn degenerate_building_is_skipped() {
        let sun = SunPosition::new(0.0, 45.0).unwrap();
        let footprints = [
            BuildingFootprint::new(None, vec![[0.0, 0.0], [10.0, 10.0]], 50.0),
            square(100.0, 100.0, 10.0, 10.0),
        ];
        let buildings = HullSet::buildings(&footprints);
        let shadows = HullSet::shadows(&footprints, &sun);
        assert_eq!(buildings.warnings.len(), 1);
        assert_eq!(shadows.warnings.len(), 1);

        let classifier = Classifier::from_sets(sun, &buildings, &shadows);
        let p = classifier.classify_point(&point(5.0, 5.0, 1.0));
        assert_eq!(p.label, ClassificationLabel::ShadingGround);
        let p = classifier.classify_point(&point(105.0, 105.0, 1.0));
        assert_eq!(p.label, ClassificationLabel::InBuilding);
    }

    #[test]
    fn no_buildings_means_open_ground() {
        let sun = SunPosition::new(0.0, 60.0).unwrap();
        let result = classify(&[], sun, vec![point(1.0, 1.0, 3.0), point(2.0, 2.0, 0.0)]);
        assert_eq!(result.count(ClassificationLabel::ShadingGround), 2);
        assert_eq!(result.counts()[&ClassificationLabel::InBuilding], 0);
    }

    #[test]
    fn label_names() {
        assert_eq!(ClassificationLabel::InShadow.to_string(), "inShade");
        assert_eq!(
            serde_json::to_string(&ClassificationLabel::ShadingFacade).unwrap(),
            "\"shadingFacade\""
        );
    }
}
