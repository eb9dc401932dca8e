//! Spatial index for fast region lookups.

use geo::{Contains, Intersects};
use geo_types::{MultiPolygon, Point};
use rstar::{RTree, RTreeObject, AABB};
use tracing::info;

use crate::error::IndexError;
use crate::models::Region;

/// Point/region relation tested by a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    /// Strict interior membership
    Contains,
    /// Interior or boundary; points on an edge or vertex still match
    Intersects,
}

impl Predicate {
    pub fn test(&self, geometry: &MultiPolygon<f64>, point: &Point<f64>) -> bool {
        match self {
            Predicate::Contains => geometry.contains(point),
            Predicate::Intersects => geometry.intersects(point),
        }
    }
}

/// R-tree entry pointing at a region by position.
#[derive(Debug, Clone)]
pub struct IndexedRegion {
    pub index: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedRegion {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

impl IndexedRegion {
    pub fn new(index: usize, region: &Region) -> Option<Self> {
        let (min_x, min_y, max_x, max_y) = region.bbox()?;
        Some(Self {
            index,
            envelope: AABB::from_corners([min_x, min_y], [max_x, max_y]),
        })
    }
}

/// Bounding-box index over a region collection.
///
/// The default value is an unbuilt index; every query on it errors, which
/// sends callers down the linear-scan path.
#[derive(Default)]
pub struct SpatialIndex {
    tree: Option<RTree<IndexedRegion>>,
}

impl SpatialIndex {
    /// Build spatial index from regions
    pub fn build(regions: &[Region]) -> Self {
        info!("Building spatial index for {} regions...", regions.len());

        let indexed: Vec<IndexedRegion> = regions
            .iter()
            .enumerate()
            .filter_map(|(i, region)| IndexedRegion::new(i, region))
            .collect();

        let tree = RTree::bulk_load(indexed);
        info!("Spatial index built with {} entries", tree.size());

        Self { tree: Some(tree) }
    }

    /// Indices of regions matching `point` under `predicate`.
    ///
    /// Candidates come back in the tree's iteration order, which carries no
    /// ranking meaning.
    pub fn query(
        &self,
        regions: &[Region],
        point: Point<f64>,
        predicate: Predicate,
    ) -> Result<Vec<usize>, IndexError> {
        let tree = self.tree.as_ref().ok_or(IndexError::NotBuilt)?;
        let query_envelope = AABB::from_point([point.x(), point.y()]);

        // Envelope intersection narrows candidates, then the exact predicate filters
        let mut matches = Vec::new();
        for entry in tree.locate_in_envelope_intersecting(&query_envelope) {
            let region = regions
                .get(entry.index)
                .ok_or(IndexError::StaleEntry { index: entry.index })?;
            if predicate.test(&region.geometry, &point) {
                matches.push(entry.index);
            }
        }

        Ok(matches)
    }

    /// Get total number of indexed regions
    pub fn len(&self) -> usize {
        self.tree.as_ref().map_or(0, |tree| tree.size())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_built(&self) -> bool {
        self.tree.is_some()
    }
}

/// Test every region against `point`, in collection order.
pub fn linear_scan(regions: &[Region], point: Point<f64>, predicate: Predicate) -> Vec<usize> {
    regions
        .iter()
        .enumerate()
        .filter(|(_, region)| predicate.test(&region.geometry, &point))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PropertyBag;
    use geo::{polygon, MultiPolygon};

    fn square(x: f64, y: f64, size: f64) -> Region {
        let poly = polygon![
            (x: x, y: y),
            (x: x + size, y: y),
            (x: x + size, y: y + size),
            (x: x, y: y + size),
            (x: x, y: y),
        ];
        Region::new(MultiPolygon::new(vec![poly]), PropertyBag::default())
    }

    fn grid() -> Vec<Region> {
        let mut regions = Vec::new();
        for i in 0..5 {
            for j in 0..5 {
                regions.push(square(i as f64, j as f64, 1.0));
            }
        }
        // Overlapping region spanning several cells
        regions.push(square(1.5, 1.5, 2.0));
        regions
    }

    fn sorted(mut v: Vec<usize>) -> Vec<usize> {
        v.sort_unstable();
        v
    }

    #[test]
    fn test_interior_point() {
        let regions = grid();
        let index = SpatialIndex::build(&regions);
        assert_eq!(index.len(), 26);

        let hits = index
            .query(&regions, Point::new(0.5, 0.5), Predicate::Contains)
            .unwrap();
        assert_eq!(hits, vec![0]);
    }

    #[test]
    fn test_boundary_point_intersects_only() {
        let regions = vec![square(0.0, 0.0, 1.0)];
        let index = SpatialIndex::build(&regions);

        let edge = Point::new(1.0, 0.5);
        assert!(index
            .query(&regions, edge, Predicate::Contains)
            .unwrap()
            .is_empty());
        assert_eq!(
            index.query(&regions, edge, Predicate::Intersects).unwrap(),
            vec![0]
        );

        let vertex = Point::new(0.0, 0.0);
        assert_eq!(
            index.query(&regions, vertex, Predicate::Intersects).unwrap(),
            vec![0]
        );
    }

    #[test]
    fn test_outside_point() {
        let regions = grid();
        let index = SpatialIndex::build(&regions);
        let hits = index
            .query(&regions, Point::new(-3.0, 42.0), Predicate::Intersects)
            .unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_matches_linear_scan() {
        let regions = grid();
        let index = SpatialIndex::build(&regions);

        for predicate in [Predicate::Contains, Predicate::Intersects] {
            for xi in -2..24 {
                for yi in -2..24 {
                    // Quarter steps hit interiors, edges and shared vertices
                    let point = Point::new(xi as f64 * 0.25, yi as f64 * 0.25);
                    let indexed = sorted(index.query(&regions, point, predicate).unwrap());
                    let scanned = linear_scan(&regions, point, predicate);
                    assert_eq!(indexed, scanned, "{:?} {:?}", point, predicate);
                }
            }
        }
    }

    #[test]
    fn test_unbuilt_index_errors() {
        let regions = grid();
        let index = SpatialIndex::default();
        assert!(!index.is_built());
        assert_eq!(
            index.query(&regions, Point::new(0.5, 0.5), Predicate::Intersects),
            Err(IndexError::NotBuilt)
        );
    }

    #[test]
    fn test_stale_entry_detected() {
        let regions = grid();
        let index = SpatialIndex::build(&regions);
        let shorter = &regions[..1];
        let result = index.query(shorter, Point::new(4.5, 4.5), Predicate::Intersects);
        assert!(matches!(result, Err(IndexError::StaleEntry { .. })));
    }

    #[test]
    fn test_build_is_idempotent() {
        let regions = grid();
        let first = SpatialIndex::build(&regions);
        let second = SpatialIndex::build(&regions);
        let point = Point::new(2.0, 2.0);
        assert_eq!(
            sorted(first.query(&regions, point, Predicate::Intersects).unwrap()),
            sorted(second.query(&regions, point, Predicate::Intersects).unwrap())
        );
    }
}
