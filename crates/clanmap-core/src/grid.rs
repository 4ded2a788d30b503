//! The hex grid: an arena of cells sized to fit a pixel area.
//!
//! Cells are stored row-major and linked to their neighbors once at build
//! time. Two linking strategies are available:
//! - `Adjacency::OffsetLookup` computes each neighbor's coordinate directly (O(n))
//! - `Adjacency::CornerMatch` compares the corners of every pair of cells (O(n²))
//!
//! Both produce the same links; the second is kept for maps whose cells
//! were placed by something other than `HexMetrics::center_of`.

use crate::cell::{CellId, HexCell};
use crate::hex::{HexMetrics, OffsetCoord, Side};
use crate::map::MapError;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::ops::{Index, IndexMut};
use tracing::{debug, warn};

/// How neighbor links are discovered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Adjacency {
    /// Closed-form lookup from the offset coordinate
    #[default]
    OffsetLookup,
    /// Pairwise comparison of corner points within a tolerance
    CornerMatch,
}

/// Largest number of cells a single grid may hold
pub const MAX_CELLS: usize = 1 << 22;

/// Number of rows and columns in a grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GridDimensions {
    pub rows: usize,
    pub cols: usize,
}

impl GridDimensions {
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Dimensions holding at most `MAX_CELLS` cells
    pub fn checked(rows: usize, cols: usize) -> Result<Self, MapError> {
        rows.checked_mul(cols)
            .filter(|&count| count <= MAX_CELLS)
            .map(|_| Self::new(rows, cols))
            .ok_or_else(|| {
                MapError::InvalidGeometry(format!(
                    "a {rows}×{cols} grid exceeds the limit of {MAX_CELLS} cells"
                ))
            })
    }

    /// The largest grid of cells that fits entirely inside `width × height` pixels.
    ///
    /// Columns are packed first; rows then leave room for the half-cell drop
    /// of odd columns. An area smaller than one cell yields zero rows and columns.
    /// An area that would need more than `MAX_CELLS` cells is rejected.
    pub fn fit(width: f64, height: f64, metrics: &HexMetrics) -> Result<Self, MapError> {
        if width < metrics.width || height < metrics.height {
            return Ok(Self::new(0, 0));
        }

        let cols = ((width - metrics.width) / metrics.column_step).floor() + 1.0;
        if cols > 1.0 {
            let rows = ((height - metrics.odd_column_offset()) / metrics.row_step).floor();
            if rows > 0.0 {
                return Self::bounded(rows, cols);
            }
        }

        // Not enough height for a staggered column: a single column still fits
        let rows = (height / metrics.row_step).floor();
        Self::bounded(rows, 1.0)
    }

    fn bounded(rows: f64, cols: f64) -> Result<Self, MapError> {
        if rows * cols > MAX_CELLS as f64 {
            return Err(MapError::InvalidGeometry(format!(
                "a {rows}×{cols} grid exceeds the limit of {MAX_CELLS} cells"
            )));
        }
        Ok(Self::new(rows as usize, cols as usize))
    }

    pub const fn cell_count(&self) -> usize {
        self.rows.saturating_mul(self.cols)
    }

    pub const fn is_empty(&self) -> bool {
        self.cell_count() == 0
    }

    pub const fn contains(&self, coord: OffsetCoord) -> bool {
        coord.row < self.rows && coord.col < self.cols
    }

    /// Row-major arena index of a coordinate
    pub const fn index_of(&self, coord: OffsetCoord) -> Option<usize> {
        if self.contains(coord) {
            Some(coord.row * self.cols + coord.col)
        } else {
            None
        }
    }
}

/// A rectangular hex grid that owns all of its cells
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HexGrid {
    dimensions: GridDimensions,
    metrics: HexMetrics,
    cells: Vec<HexCell>,
}

impl HexGrid {
    /// Build the largest grid fitting the pixel area, linked by offset lookup
    pub fn fit(width: f64, height: f64, radius: f64) -> Result<Self, MapError> {
        Self::fit_with(width, height, radius, Adjacency::default())
    }

    /// Build the largest grid fitting the pixel area with the given linking strategy.
    ///
    /// An area too small for a single cell is not an error: the grid is
    /// simply empty and callers must check `is_empty()` before partitioning.
    pub fn fit_with(
        width: f64,
        height: f64,
        radius: f64,
        adjacency: Adjacency,
    ) -> Result<Self, MapError> {
        validate_radius(radius)?;
        if !width.is_finite() || !height.is_finite() || width < 0.0 || height < 0.0 {
            return Err(MapError::InvalidGeometry(format!(
                "drawable area must be finite and non-negative, got {width}×{height}"
            )));
        }

        let metrics = HexMetrics::from_radius(radius);
        let dimensions = GridDimensions::fit(width, height, &metrics)?;
        if dimensions.is_empty() {
            warn!(width, height, radius, "drawable area is smaller than one cell, grid is empty");
        }

        Ok(Self::build(dimensions, metrics, adjacency))
    }

    /// Build a grid with an exact number of rows and columns
    pub fn with_dimensions(rows: usize, cols: usize, radius: f64) -> Result<Self, MapError> {
        validate_radius(radius)?;
        Ok(Self::build(
            GridDimensions::checked(rows, cols)?,
            HexMetrics::from_radius(radius),
            Adjacency::default(),
        ))
    }

    fn build(dimensions: GridDimensions, metrics: HexMetrics, adjacency: Adjacency) -> Self {
        let mut cells = Vec::with_capacity(dimensions.cell_count());
        for row in 0..dimensions.rows {
            for col in 0..dimensions.cols {
                let coord = OffsetCoord::new(row, col);
                cells.push(HexCell::new(coord, metrics.center_of(coord), metrics.radius));
            }
        }

        let mut grid = Self {
            dimensions,
            metrics,
            cells,
        };

        match adjacency {
            Adjacency::OffsetLookup => grid.link_by_offset(),
            Adjacency::CornerMatch => grid.link_by_corners(),
        }

        debug!(
            rows = dimensions.rows,
            cols = dimensions.cols,
            ?adjacency,
            "built hex grid"
        );
        grid
    }

    fn link_by_offset(&mut self) {
        let dimensions = self.dimensions;
        for cell in &mut self.cells {
            for side in Side::ALL {
                let neighbor = cell
                    .coord
                    .neighbor(side)
                    .and_then(|coord| dimensions.index_of(coord))
                    .map(CellId);
                cell.set_neighbor(side, neighbor);
            }
        }
    }

    fn link_by_corners(&mut self) {
        let links = self.shared_edges();
        for (a, b, side) in links {
            self.cells[a].set_neighbor(side, Some(CellId(b)));
            self.cells[b].set_neighbor(side.opposite(), Some(CellId(a)));
        }
    }

    /// Every unordered pair of cells sharing an edge, with the side as seen from the first
    #[cfg(not(feature = "parallel"))]
    fn shared_edges(&self) -> Vec<(usize, usize, Side)> {
        let cells = &self.cells;
        (0..cells.len())
            .flat_map(move |a| {
                (a + 1..cells.len())
                    .filter_map(move |b| cells[a].shared_side_with(&cells[b]).map(|side| (a, b, side)))
            })
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn shared_edges(&self) -> Vec<(usize, usize, Side)> {
        let cells = &self.cells;
        (0..cells.len())
            .into_par_iter()
            .flat_map_iter(move |a| {
                (a + 1..cells.len())
                    .filter_map(move |b| cells[a].shared_side_with(&cells[b]).map(|side| (a, b, side)))
            })
            .collect()
    }

    // ==================== Query Methods ====================

    pub fn dimensions(&self) -> GridDimensions {
        self.dimensions
    }

    pub fn rows(&self) -> usize {
        self.dimensions.rows
    }

    pub fn cols(&self) -> usize {
        self.dimensions.cols
    }

    pub fn metrics(&self) -> &HexMetrics {
        &self.metrics
    }

    pub fn radius(&self) -> f64 {
        self.metrics.radius
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// All cells in row-major order
    pub fn cells(&self) -> &[HexCell] {
        &self.cells
    }

    /// All cell ids in row-major order
    pub fn ids(&self) -> impl Iterator<Item = CellId> {
        (0..self.cells.len()).map(CellId)
    }

    pub fn cell(&self, id: CellId) -> Option<&HexCell> {
        self.cells.get(id.index())
    }

    pub fn cell_mut(&mut self, id: CellId) -> Option<&mut HexCell> {
        self.cells.get_mut(id.index())
    }

    /// Id of the cell at a logical coordinate
    pub fn id_at(&self, coord: OffsetCoord) -> Option<CellId> {
        self.dimensions.index_of(coord).map(CellId)
    }

    pub fn cell_at(&self, coord: OffsetCoord) -> Option<&HexCell> {
        self.id_at(coord).map(|id| &self.cells[id.index()])
    }

    /// One of the four grid corners: 0 top-left, 1 top-right, 2 bottom-left, 3 bottom-right
    pub fn corner_cell(&self, corner: usize) -> Option<CellId> {
        if self.is_empty() {
            return None;
        }

        let last_row = self.dimensions.rows - 1;
        let last_col = self.dimensions.cols - 1;
        let coord = match corner {
            0 => OffsetCoord::new(0, 0),
            1 => OffsetCoord::new(0, last_col),
            2 => OffsetCoord::new(last_row, 0),
            3 => OffsetCoord::new(last_row, last_col),
            _ => return None,
        };
        self.id_at(coord)
    }

    /// Cells with at least one empty neighbor slot
    pub fn edge_cells(&self) -> impl Iterator<Item = CellId> + '_ {
        self.ids().filter(|id| self.cells[id.index()].is_edge())
    }

    /// Ids of all cells carrying a group label
    pub fn group_members(&self, name: &str) -> Vec<CellId> {
        self.ids()
            .filter(|id| self.cells[id.index()].is_in_group(name))
            .collect()
    }

    // ==================== Tag Maintenance ====================

    /// Remove a group label from every cell
    pub fn remove_group(&mut self, name: &str) {
        for cell in &mut self.cells {
            cell.remove_group(name);
        }
    }

    /// Remove a resource tag from every cell
    pub fn clear_resource(&mut self, resource: &str) {
        for cell in &mut self.cells {
            cell.remove_resource(resource);
        }
    }

    // ==================== Connectivity ====================

    /// Connected components of the subgraph induced by `ids`
    pub fn components(&self, ids: &[CellId]) -> Vec<Vec<CellId>> {
        let members: HashSet<CellId> = ids.iter().copied().collect();
        let mut seen: HashSet<CellId> = HashSet::with_capacity(members.len());
        let mut components = Vec::new();

        for &start in ids {
            if !seen.insert(start) {
                continue;
            }

            let mut component = Vec::new();
            let mut queue = VecDeque::from([start]);
            while let Some(id) = queue.pop_front() {
                component.push(id);
                for neighbor in self.cells[id.index()].neighbor_ids() {
                    if members.contains(&neighbor) && seen.insert(neighbor) {
                        queue.push_back(neighbor);
                    }
                }
            }
            components.push(component);
        }

        components
    }

    /// Whether `ids` form a single connected region (an empty set counts as connected)
    pub fn is_connected(&self, ids: &[CellId]) -> bool {
        self.components(ids).len() <= 1
    }
}

impl Index<CellId> for HexGrid {
    type Output = HexCell;

    fn index(&self, id: CellId) -> &HexCell {
        &self.cells[id.index()]
    }
}

impl IndexMut<CellId> for HexGrid {
    fn index_mut(&mut self, id: CellId) -> &mut HexCell {
        &mut self.cells[id.index()]
    }
}

fn validate_radius(radius: f64) -> Result<(), MapError> {
    if radius.is_finite() && radius > 0.0 {
        Ok(())
    } else {
        Err(MapError::InvalidGeometry(format!(
            "hex radius must be a positive number, got {radius}"
        )))
    }
}
