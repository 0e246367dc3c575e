//! Path table location tracking
//!
//! Every volume descriptor names up to four path table extents. The first real
//! path table determines how far the body of the image has to be shifted.

use std::collections::BTreeSet;

/// Set of unique path table sector numbers seen across the descriptor set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathTableLocations {
    locations: BTreeSet<u32>,
}

impl PathTableLocations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one location field. Duplicates collapse.
    pub fn insert(&mut self, location: u32) {
        self.locations.insert(location);
    }

    pub fn extend(&mut self, locations: impl IntoIterator<Item = u32>) {
        self.locations.extend(locations);
    }

    /// Remove the unused-field sentinel (0)
    pub fn remove_unused(&mut self) {
        self.locations.remove(&0);
    }

    /// Lowest recorded location
    ///
    /// Call [`remove_unused`](Self::remove_unused) first, otherwise an unused
    /// field wins.
    pub fn first(&self) -> Option<u32> {
        self.locations.first().copied()
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Locations in ascending order
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.locations.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_collapse() {
        let mut set = PathTableLocations::new();
        set.extend([20, 20, 0, 0]);

        assert_eq!(set.len(), 2);
        set.remove_unused();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![20]);
    }

    #[test]
    fn test_first_is_minimum() {
        let mut set = PathTableLocations::new();
        set.extend([0, 31, 19, 24]);
        set.insert(22);
        set.remove_unused();

        assert_eq!(set.first(), Some(19));
    }

    #[test]
    fn test_only_unused_fields() {
        let mut set = PathTableLocations::new();
        set.extend([0, 0, 0, 0]);
        set.remove_unused();

        assert!(set.is_empty());
        assert_eq!(set.first(), None);
    }

    #[test]
    fn test_remove_unused_without_sentinel() {
        let mut set = PathTableLocations::new();
        set.insert(18);
        set.remove_unused();

        assert_eq!(set.first(), Some(18));
    }
}
