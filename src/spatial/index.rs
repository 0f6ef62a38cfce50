use crate::core::geo::{LatLng, LatLngBounds};

use rstar::{RTree, RTreeObject, AABB};

/// A point item indexed by its coordinate
#[derive(Debug, Clone)]
pub struct SpatialItem<T> {
    pub position: LatLng,
    pub data: T,
}

impl<T> SpatialItem<T> {
    pub fn new(position: LatLng, data: T) -> Self {
        Self { position, data }
    }
}

// --- rstar integration -------------------------------------------------------------------------

impl<T> RTreeObject for SpatialItem<T> {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.position.lng, self.position.lat])
    }
}

/// R-tree over point items in `[lng, lat]` space
pub struct SpatialIndex<T> {
    rtree: RTree<SpatialItem<T>>,
}

impl<T> SpatialIndex<T> {
    /// Bulk-loads an index, which packs the tree better than repeated inserts
    pub fn from_items(items: Vec<SpatialItem<T>>) -> Self {
        Self {
            rtree: RTree::bulk_load(items),
        }
    }

    /// Items whose position lies within `bounds`
    pub fn query(&self, bounds: &LatLngBounds) -> Vec<&SpatialItem<T>> {
        let envelope = AABB::from_corners(
            [bounds.south_west.lng, bounds.south_west.lat],
            [bounds.north_east.lng, bounds.north_east.lat],
        );
        self.rtree.locate_in_envelope(&envelope).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rtree.size() == 0
    }

    pub fn len(&self) -> usize {
        self.rtree.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_bounds() {
        let index = SpatialIndex::from_items(vec![
            SpatialItem::new(LatLng::new(42.36, -71.06), "boston"),
            SpatialItem::new(LatLng::new(41.82, -71.41), "providence"),
            SpatialItem::new(LatLng::new(40.71, -74.00), "new york"),
        ]);

        let hits = index.query(&LatLngBounds::from_coords(41.5, -72.0, 42.5, -70.0));
        let mut names: Vec<_> = hits.iter().map(|item| item.data).collect();
        names.sort();

        assert_eq!(names, vec!["boston", "providence"]);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_empty_index() {
        let index: SpatialIndex<usize> = SpatialIndex::from_items(Vec::new());
        assert!(index.is_empty());
        assert!(index
            .query(&LatLngBounds::from_coords(-90.0, -180.0, 90.0, 180.0))
            .is_empty());
    }
}
