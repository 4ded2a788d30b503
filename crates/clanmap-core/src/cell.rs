//! A single hex cell and its mutable tag state.
//!
//! Cells live in the grid's arena and refer to each other by `CellId`.
//! After construction only the neighbor links and the group/resource tags
//! change.

use crate::hex::{hex_corners, OffsetCoord, Point, Side, CORNER_EPSILON};
use serde::{Deserialize, Serialize};

/// Index of a cell inside its grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellId(pub usize);

impl CellId {
    /// The raw arena index
    pub const fn index(self) -> usize {
        self.0
    }
}

/// One hexagonal cell of the map
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HexCell {
    /// Logical address, unique within the grid
    pub coord: OffsetCoord,
    /// Pixel center
    pub center: Point,
    /// Distance from center to each corner
    pub radius: f64,
    /// Corner points, corner `i` at angle `i/6 * 2π`
    pub corners: [Point; 6],
    /// Neighbor slots indexed by `Side`
    neighbors: [Option<CellId>; 6],
    /// Group labels, in the order they were added
    groups: Vec<String>,
    /// Resource labels, independent of ownership
    resources: Vec<String>,
    /// Prey abundance read by the description layer
    pub prey_quality: i32,
    /// Herb keys read by the description layer
    pub herbs: Vec<String>,
}

impl HexCell {
    /// Create an unlinked cell
    pub fn new(coord: OffsetCoord, center: Point, radius: f64) -> Self {
        Self {
            coord,
            center,
            radius,
            corners: hex_corners(center, radius),
            neighbors: [None; 6],
            groups: Vec::new(),
            resources: Vec::new(),
            prey_quality: 0,
            herbs: Vec::new(),
        }
    }

    // ==================== Neighbors ====================

    /// The neighbor across a side, if any
    pub fn neighbor(&self, side: Side) -> Option<CellId> {
        self.neighbors[side.index()]
    }

    /// All neighbor slots, indexed by side
    pub fn neighbor_slots(&self) -> &[Option<CellId>; 6] {
        &self.neighbors
    }

    /// Live neighbors with the side they sit on
    pub fn neighbors(&self) -> impl Iterator<Item = (Side, CellId)> + '_ {
        Side::ALL
            .iter()
            .filter_map(|&side| self.neighbor(side).map(|id| (side, id)))
    }

    /// Ids of live neighbors
    pub fn neighbor_ids(&self) -> impl Iterator<Item = CellId> + '_ {
        self.neighbors.iter().flatten().copied()
    }

    pub(crate) fn set_neighbor(&mut self, side: Side, neighbor: Option<CellId>) {
        self.neighbors[side.index()] = neighbor;
    }

    /// Number of empty neighbor slots
    pub fn open_sides(&self) -> usize {
        self.neighbors.iter().filter(|slot| slot.is_none()).count()
    }

    /// Whether this cell touches the border of the grid
    pub fn is_edge(&self) -> bool {
        self.open_sides() > 0
    }

    /// The side of this cell whose two corners both coincide with corners of `other`.
    ///
    /// Corners are compared with a tolerance scaled to the radius, never exactly.
    pub fn shared_side_with(&self, other: &HexCell) -> Option<Side> {
        if self.coord == other.coord {
            return None;
        }

        let epsilon = CORNER_EPSILON * self.radius.max(1.0);
        let touches = |p: &Point| other.corners.iter().any(|q| p.approx_eq(q, epsilon));

        Side::ALL.into_iter().find(|side| {
            let [a, b] = side.corners();
            touches(&self.corners[a]) && touches(&self.corners[b])
        })
    }

    // ==================== Groups ====================

    /// Group labels in insertion order
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    /// Add a group label. Returns false if it was already present.
    pub fn add_group(&mut self, name: &str) -> bool {
        if self.is_in_group(name) {
            return false;
        }
        self.groups.push(name.to_string());
        true
    }

    /// Remove a group label. Returns false if it was not present.
    pub fn remove_group(&mut self, name: &str) -> bool {
        let before = self.groups.len();
        self.groups.retain(|g| g != name);
        self.groups.len() != before
    }

    pub fn is_in_group(&self, name: &str) -> bool {
        self.groups.iter().any(|g| g == name)
    }

    /// The owning group, which is the first label added
    pub fn owner(&self) -> Option<&str> {
        self.groups.first().map(String::as_str)
    }

    // ==================== Resources ====================

    pub fn resources(&self) -> &[String] {
        &self.resources
    }

    /// Tag a resource. Returns false if it was already present.
    pub fn add_resource(&mut self, resource: &str) -> bool {
        if self.has_resource(resource) {
            return false;
        }
        self.resources.push(resource.to_string());
        true
    }

    pub fn remove_resource(&mut self, resource: &str) -> bool {
        let before = self.resources.len();
        self.resources.retain(|r| r != resource);
        self.resources.len() != before
    }

    pub fn has_resource(&self, resource: &str) -> bool {
        self.resources.iter().any(|r| r == resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::HexMetrics;

    fn cell_at(metrics: &HexMetrics, row: usize, col: usize) -> HexCell {
        let coord = OffsetCoord::new(row, col);
        HexCell::new(coord, metrics.center_of(coord), metrics.radius)
    }

    #[test]
    fn test_new_cell_is_isolated_edge() {
        let cell = cell_at(&HexMetrics::from_radius(10.0), 0, 0);
        assert_eq!(cell.open_sides(), 6);
        assert!(cell.is_edge());
        assert_eq!(cell.neighbors().count(), 0);
    }

    #[test]
    fn test_interior_cell_is_not_edge() {
        let mut cell = cell_at(&HexMetrics::from_radius(10.0), 1, 1);
        for (i, side) in Side::ALL.into_iter().enumerate() {
            cell.set_neighbor(side, Some(CellId(i + 10)));
        }
        assert!(!cell.is_edge());

        cell.set_neighbor(Side::North, None);
        assert!(cell.is_edge());
        assert_eq!(cell.open_sides(), 1);
    }

    #[test]
    fn test_group_tags() {
        let mut cell = cell_at(&HexMetrics::from_radius(10.0), 0, 0);
        assert_eq!(cell.owner(), None);

        assert!(cell.add_group("clan0"));
        assert!(!cell.add_group("clan0"), "duplicate group should be ignored");
        assert!(cell.add_group("border"));
        assert_eq!(cell.owner(), Some("clan0"));
        assert_eq!(cell.groups().len(), 2);

        assert!(cell.remove_group("clan0"));
        assert!(!cell.is_in_group("clan0"));
        assert_eq!(cell.owner(), Some("border"));
    }

    #[test]
    fn test_resource_tags() {
        let mut cell = cell_at(&HexMetrics::from_radius(10.0), 0, 0);
        assert!(cell.add_resource("water"));
        assert!(!cell.add_resource("water"));
        assert!(cell.has_resource("water"));
        assert!(!cell.has_resource("dense_prey"));
        assert!(cell.remove_resource("water"));
        assert!(cell.resources().is_empty());
    }

    #[test]
    fn test_shared_side_matches_offset_lookup() {
        let metrics = HexMetrics::from_radius(50.0);
        for (row, col) in [(2, 2), (2, 3)] {
            let cell = cell_at(&metrics, row, col);
            for side in Side::ALL {
                let coord = cell.coord.neighbor(side).unwrap();
                let other = cell_at(&metrics, coord.row, coord.col);
                assert_eq!(cell.shared_side_with(&other), Some(side));
                assert_eq!(other.shared_side_with(&cell), Some(side.opposite()));
            }
        }
    }

    #[test]
    fn test_distant_cells_share_no_side() {
        let metrics = HexMetrics::from_radius(50.0);
        let a = cell_at(&metrics, 0, 0);
        let b = cell_at(&metrics, 2, 0);
        let c = cell_at(&metrics, 0, 2);
        assert_eq!(a.shared_side_with(&b), None);
        assert_eq!(a.shared_side_with(&c), None);
        assert_eq!(a.shared_side_with(&a.clone()), None);
    }
}
