use rstar::{RTree, RTreeObject, AABB};

use crate::hull::Hull;

struct IndexedHull {
    hull: Hull,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedHull {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// R-tree over hull bounding boxes. A query first narrows to hulls whose
/// box contains the point, then runs the exact polygon test.
pub struct HullIndex {
    tree: RTree<IndexedHull>,
}

impl HullIndex {
    pub fn new(hulls: Vec<Hull>) -> Self {
        let entries = hulls
            .into_iter()
            .map(|hull| {
                let (min, max) = hull.envelope();
                IndexedHull {
                    envelope: AABB::from_corners(min, max),
                    hull,
                }
            })
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    fn candidates(&self, x: f64, y: f64) -> impl Iterator<Item = &Hull> {
        self.tree
            .locate_in_envelope_intersecting(&AABB::from_point([x, y]))
            .map(|entry| &entry.hull)
    }

    /// True if any hull contains (x, y), boundary included.
    pub fn any_contains(&self, x: f64, y: f64) -> bool {
        self.candidates(x, y).any(|hull| hull.contains(x, y))
    }

    /// True if a single hull contains both points.
    pub fn any_contains_both(&self, a: [f64; 2], b: [f64; 2]) -> bool {
        self.candidates(a[0], a[1])
            .any(|hull| hull.contains(a[0], a[1]) && hull.contains(b[0], b[1]))
    }
}
