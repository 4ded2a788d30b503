//! Territory partitioning by randomized region growing.
//!
//! The first `owner_count - 1` owners each grow one region of exactly
//! `cells / owner_count` cells from a seed cell. The last owner receives
//! every cell left over. Growth prefers cells that are nearly enclosed by
//! the region so territories come out compact instead of spiky.
//!
//! When a region gets boxed in before reaching its size it restarts from a
//! fresh edge cell. That keeps the sizes exact but can leave the region in
//! more than one piece; such groups are counted and logged, not rejected.

use crate::cell::CellId;
use crate::grid::HexGrid;
use crate::map::MapError;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Where each grown region starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SeedStrategy {
    /// Owner `i` starts in grid corner `i` (falls back to a random edge cell)
    #[default]
    Corners,
    /// Every owner starts on a random unclaimed edge cell
    RandomEdge,
}

/// Settings for a partition run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionConfig {
    /// Number of owners, including the one that takes the remainder
    #[serde(default = "default_owner_count")]
    pub owner_count: usize,

    /// Owner `i` is tagged `{name_prefix}{i}`
    #[serde(default = "default_name_prefix")]
    pub name_prefix: String,

    /// Sides that must be off-grid or already in the region before a
    /// bordering cell is preferred as a gap to fill
    #[serde(default = "default_min_surrounded_sides")]
    pub min_surrounded_sides: usize,

    #[serde(default)]
    pub seed_strategy: SeedStrategy,

    /// Full reruns allowed while some group comes out disconnected
    #[serde(default = "default_attempts")]
    pub attempts: usize,
}

fn default_owner_count() -> usize {
    4
}
fn default_name_prefix() -> String {
    "clan".to_string()
}
fn default_min_surrounded_sides() -> usize {
    5
}
fn default_attempts() -> usize {
    1
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            owner_count: default_owner_count(),
            name_prefix: default_name_prefix(),
            min_surrounded_sides: default_min_surrounded_sides(),
            seed_strategy: SeedStrategy::default(),
            attempts: default_attempts(),
        }
    }
}

impl PartitionConfig {
    /// Default settings for the given number of owners
    pub fn new(owner_count: usize) -> Self {
        Self {
            owner_count,
            ..Self::default()
        }
    }

    /// Group label of owner `index`
    pub fn owner_name(&self, index: usize) -> String {
        format!("{}{}", self.name_prefix, index)
    }
}

/// One owner's territory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerGroup {
    pub index: usize,
    pub name: String,
    /// Cells in the order they were claimed
    pub cells: Vec<CellId>,
    /// Number of connected pieces
    pub components: usize,
}

impl OwnerGroup {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, id: CellId) -> bool {
        self.cells.contains(&id)
    }

    /// Whether the territory is a single connected region
    pub fn is_contiguous(&self) -> bool {
        self.components <= 1
    }
}

/// The result of partitioning a grid among owners
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partition {
    /// Size of every grown group
    pub target_size: usize,
    /// Groups in owner order; the last one holds the remainder
    pub groups: Vec<OwnerGroup>,
    /// How often growth had to restart from a disconnected seed
    pub escape_seeds: usize,
}

impl Partition {
    pub fn group(&self, name: &str) -> Option<&OwnerGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// The group owning a cell
    pub fn owner_of(&self, id: CellId) -> Option<&OwnerGroup> {
        self.groups.iter().find(|g| g.contains(id))
    }

    /// Owner index for every cell of a grid with `cell_count` cells
    pub fn owner_indices(&self, cell_count: usize) -> Vec<Option<usize>> {
        let mut owners = vec![None; cell_count];
        for group in &self.groups {
            for id in &group.cells {
                if let Some(slot) = owners.get_mut(id.index()) {
                    *slot = Some(group.index);
                }
            }
        }
        owners
    }

    /// Groups grown to the target size, i.e. all but the remainder owner
    pub fn grown_groups(&self) -> &[OwnerGroup] {
        let grown = self.groups.len().saturating_sub(1);
        &self.groups[..grown]
    }

    /// Number of groups split into more than one piece
    pub fn disconnected_count(&self) -> usize {
        self.groups.iter().filter(|g| !g.is_contiguous()).count()
    }

    /// Fraction of groups split into more than one piece
    pub fn disconnected_fraction(&self) -> f64 {
        if self.groups.is_empty() {
            0.0
        } else {
            self.disconnected_count() as f64 / self.groups.len() as f64
        }
    }

    /// Whether every group is a single connected region
    pub fn is_contiguous(&self) -> bool {
        self.disconnected_count() == 0
    }
}

/// Cells not yet claimed by any owner
struct Pool {
    free: Vec<bool>,
    remaining: usize,
}

impl Pool {
    fn new(len: usize) -> Self {
        Self {
            free: vec![true; len],
            remaining: len,
        }
    }

    fn contains(&self, id: CellId) -> bool {
        self.free.get(id.index()).copied().unwrap_or(false)
    }

    fn take(&mut self, id: CellId) {
        if let Some(slot) = self.free.get_mut(id.index()) {
            if *slot {
                *slot = false;
                self.remaining -= 1;
            }
        }
    }

    fn ids(&self) -> impl Iterator<Item = CellId> + '_ {
        self.free
            .iter()
            .enumerate()
            .filter(|(_, free)| **free)
            .map(|(i, _)| CellId(i))
    }

    /// A random unclaimed cell on the grid border, or any unclaimed cell if none is
    fn random_edge<R: Rng>(&self, grid: &HexGrid, rng: &mut R) -> Option<CellId> {
        let edges: Vec<CellId> = self.ids().filter(|&id| grid[id].is_edge()).collect();
        if let Some(&id) = edges.choose(rng) {
            return Some(id);
        }
        let rest: Vec<CellId> = self.ids().collect();
        rest.choose(rng).copied()
    }
}

/// Splits a grid into owner territories
#[derive(Debug, Clone)]
pub struct TerritoryPartitioner {
    config: PartitionConfig,
}

impl TerritoryPartitioner {
    pub fn new(config: PartitionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PartitionConfig {
        &self.config
    }

    /// Partition every cell of `grid` among the configured owners and tag each
    /// cell with its owner's group label.
    ///
    /// With `attempts > 1` the whole partition is rerun until every group is
    /// connected; otherwise the run with the fewest split groups is kept.
    pub fn partition<R: Rng>(&self, grid: &mut HexGrid, rng: &mut R) -> Result<Partition, MapError> {
        self.validate(grid)?;

        let attempts = self.config.attempts.max(1);
        let mut best: Option<Partition> = None;

        for attempt in 1..=attempts {
            self.clear_owner_tags(grid);

            let partition = self.partition_once(grid, rng)?;
            if partition.is_contiguous() {
                if attempt > 1 {
                    info!(attempt, "found a fully contiguous partition");
                }
                return Ok(partition);
            }

            let improves = best
                .as_ref()
                .map_or(true, |b| partition.disconnected_count() < b.disconnected_count());
            if improves {
                best = Some(partition);
            }
        }

        let best = best.ok_or(MapError::EmptyGrid)?;
        if attempts > 1 {
            // The grid carries the last attempt's tags; restore the kept one
            self.clear_owner_tags(grid);
            for group in &best.groups {
                for &id in &group.cells {
                    grid[id].add_group(&group.name);
                }
            }
        }

        warn!(
            disconnected = best.disconnected_count(),
            fraction = best.disconnected_fraction(),
            attempts,
            "partition contains non-contiguous territories"
        );
        Ok(best)
    }

    fn validate(&self, grid: &HexGrid) -> Result<(), MapError> {
        if grid.is_empty() {
            return Err(MapError::EmptyGrid);
        }
        let owners = self.config.owner_count;
        if owners == 0 || owners > grid.len() {
            return Err(MapError::InvalidOwnerCount {
                owners,
                cells: grid.len(),
            });
        }
        if self.config.min_surrounded_sides > 6 {
            return Err(MapError::InvalidConfig(format!(
                "min_surrounded_sides must be at most 6, got {}",
                self.config.min_surrounded_sides
            )));
        }
        Ok(())
    }

    fn clear_owner_tags(&self, grid: &mut HexGrid) {
        for index in 0..self.config.owner_count {
            grid.remove_group(&self.config.owner_name(index));
        }
    }

    fn partition_once<R: Rng>(&self, grid: &mut HexGrid, rng: &mut R) -> Result<Partition, MapError> {
        let owners = self.config.owner_count;
        let target_size = grid.len() / owners;
        let mut pool = Pool::new(grid.len());
        let mut groups = Vec::with_capacity(owners);
        let mut escape_seeds = 0;

        for index in 0..owners - 1 {
            let name = self.config.owner_name(index);
            let start = self.pick_start(grid, &pool, index, rng).ok_or(MapError::EmptyGrid)?;
            let (cells, escapes) = self.grow(grid, &mut pool, start, target_size, &name, rng);
            escape_seeds += escapes;

            let group = finish_group(grid, index, name, cells);
            debug!(
                owner = %group.name,
                cells = group.len(),
                components = group.components,
                remaining = pool.remaining,
                "grew territory"
            );
            groups.push(group);
        }

        let index = owners - 1;
        let name = self.config.owner_name(index);
        let rest: Vec<CellId> = pool.ids().collect();
        for &id in &rest {
            grid[id].add_group(&name);
            pool.take(id);
        }
        groups.push(finish_group(grid, index, name, rest));

        Ok(Partition {
            target_size,
            groups,
            escape_seeds,
        })
    }

    fn pick_start<R: Rng>(
        &self,
        grid: &HexGrid,
        pool: &Pool,
        index: usize,
        rng: &mut R,
    ) -> Option<CellId> {
        let corner = match self.config.seed_strategy {
            SeedStrategy::Corners => grid.corner_cell(index % 4).filter(|&id| pool.contains(id)),
            SeedStrategy::RandomEdge => None,
        };
        corner.or_else(|| pool.random_edge(grid, rng))
    }

    /// Grow one contiguous group of `target` cells from `start`.
    ///
    /// Returns the claimed cells and the number of times growth restarted
    /// from a disconnected seed.
    fn grow<R: Rng>(
        &self,
        grid: &mut HexGrid,
        pool: &mut Pool,
        start: CellId,
        target: usize,
        name: &str,
        rng: &mut R,
    ) -> (Vec<CellId>, usize) {
        let mut cells = Vec::with_capacity(target);
        let mut frontier: Vec<CellId> = Vec::new();
        let mut escapes = 0;

        claim(grid, pool, start, name, &mut cells);
        let mut current = start;

        while cells.len() < target {
            let neighbors: Vec<CellId> = grid[current].neighbor_ids().collect();
            for neighbor in neighbors {
                if cells.len() >= target {
                    break;
                }
                if pool.contains(neighbor) {
                    claim(grid, pool, neighbor, name, &mut cells);
                    frontier.push(neighbor);
                }
            }
            if cells.len() >= target {
                break;
            }

            let surrounded = self.surrounded_cells(grid, pool, &frontier, name);
            if let Some(&gap) = surrounded.choose(rng) {
                claim(grid, pool, gap, name, &mut cells);
                current = gap;
            } else if !frontier.is_empty() {
                current = frontier.swap_remove(rng.gen_range(0..frontier.len()));
            } else {
                let Some(seed) = pool.random_edge(grid, rng) else {
                    break;
                };
                escapes += 1;
                debug!(
                    owner = name,
                    cells = cells.len(),
                    target,
                    "territory boxed in, restarting from a new edge cell"
                );
                claim(grid, pool, seed, name, &mut cells);
                current = seed;
            }
        }

        (cells, escapes)
    }

    /// Unclaimed cells bordering the frontier that are nearly enclosed by the group.
    ///
    /// A cell qualifies when it touches the group and at least
    /// `min_surrounded_sides` of its sides are off-grid or in the group.
    fn surrounded_cells(
        &self,
        grid: &HexGrid,
        pool: &Pool,
        frontier: &[CellId],
        name: &str,
    ) -> Vec<CellId> {
        let mut seen = HashSet::new();
        let mut result = Vec::new();

        for &member in frontier {
            for candidate in grid[member].neighbor_ids() {
                if !pool.contains(candidate) || !seen.insert(candidate) {
                    continue;
                }

                let cell = &grid[candidate];
                let mut closed = 0;
                let mut touching = false;
                for slot in cell.neighbor_slots() {
                    match slot {
                        None => closed += 1,
                        Some(id) if grid[*id].is_in_group(name) => {
                            closed += 1;
                            touching = true;
                        }
                        Some(_) => {}
                    }
                }

                if touching && closed >= self.config.min_surrounded_sides {
                    result.push(candidate);
                }
            }
        }

        result
    }
}

fn claim(grid: &mut HexGrid, pool: &mut Pool, id: CellId, name: &str, cells: &mut Vec<CellId>) {
    grid[id].add_group(name);
    pool.take(id);
    cells.push(id);
}

fn finish_group(grid: &HexGrid, index: usize, name: String, cells: Vec<CellId>) -> OwnerGroup {
    let components = grid.components(&cells).len();
    OwnerGroup {
        index,
        name,
        cells,
        components,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::OffsetCoord;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn partition(rows: usize, cols: usize, config: PartitionConfig, seed: u64) -> (HexGrid, Partition) {
        let mut grid = HexGrid::with_dimensions(rows, cols, 10.0).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        let partition = TerritoryPartitioner::new(config)
            .partition(&mut grid, &mut rng)
            .unwrap();
        (grid, partition)
    }

    #[test]
    fn test_owner_names() {
        let config = PartitionConfig::new(3);
        assert_eq!(config.owner_name(0), "clan0");
        assert_eq!(config.owner_name(2), "clan2");
    }

    #[test]
    fn test_six_by_six_into_four() {
        let (grid, partition) = partition(6, 6, PartitionConfig::new(4), 7);
        assert_eq!(partition.target_size, 9);
        let sizes: Vec<usize> = partition.groups.iter().map(OwnerGroup::len).collect();
        assert_eq!(sizes, vec![9, 9, 9, 9]);
        assert_eq!(grid.len(), 36);
    }

    #[test]
    fn test_every_cell_has_exactly_one_owner() {
        let (grid, partition) = partition(7, 9, PartitionConfig::new(5), 11);
        let mut seen = HashSet::new();
        for group in &partition.groups {
            for &id in &group.cells {
                assert!(seen.insert(id), "{:?} assigned twice", id);
                assert_eq!(grid[id].owner(), Some(group.name.as_str()));
                assert_eq!(grid[id].groups().len(), 1);
            }
        }
        assert_eq!(seen.len(), grid.len());
    }

    #[test]
    fn test_remainder_goes_to_last_owner() {
        // 40 cells / 3 owners = 13 each, last owner gets 14
        let (_, partition) = partition(5, 8, PartitionConfig::new(3), 3);
        assert_eq!(partition.target_size, 13);
        assert_eq!(partition.groups[0].len(), 13);
        assert_eq!(partition.groups[1].len(), 13);
        assert_eq!(partition.groups[2].len(), 14);
    }

    #[test]
    fn test_single_owner_takes_everything() {
        let (grid, partition) = partition(4, 4, PartitionConfig::new(1), 0);
        assert_eq!(partition.groups.len(), 1);
        assert_eq!(partition.groups[0].len(), grid.len());
        assert!(partition.grown_groups().is_empty());
    }

    #[test]
    fn test_one_cell_per_owner() {
        let (grid, partition) = partition(2, 2, PartitionConfig::new(4), 5);
        for group in &partition.groups {
            assert_eq!(group.len(), 1);
        }
        assert_eq!(grid.len(), 4);
    }

    #[test]
    fn test_corner_seeds() {
        let (grid, partition) = partition(6, 6, PartitionConfig::new(4), 21);
        assert_eq!(grid[partition.groups[0].cells[0]].coord, OffsetCoord::new(0, 0));
        assert_eq!(grid[partition.groups[1].cells[0]].coord, OffsetCoord::new(0, 5));
        assert_eq!(grid[partition.groups[2].cells[0]].coord, OffsetCoord::new(5, 0));
    }

    #[test]
    fn test_random_edge_seeds_start_on_border() {
        let config = PartitionConfig {
            seed_strategy: SeedStrategy::RandomEdge,
            ..PartitionConfig::new(4)
        };
        let (grid, partition) = partition(6, 6, config, 4);
        for group in partition.grown_groups() {
            assert!(grid[group.cells[0]].is_edge());
        }
    }

    #[test]
    fn test_same_seed_same_partition() {
        let (_, a) = partition(8, 8, PartitionConfig::new(4), 99);
        let (_, b) = partition(8, 8, PartitionConfig::new(4), 99);
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_owner_counts() {
        let mut grid = HexGrid::with_dimensions(2, 2, 10.0).unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        for owners in [0, 5] {
            let result = TerritoryPartitioner::new(PartitionConfig::new(owners)).partition(&mut grid, &mut rng);
            assert_eq!(result, Err(MapError::InvalidOwnerCount { owners, cells: 4 }));
        }
    }

    #[test]
    fn test_empty_grid_is_rejected() {
        let mut grid = HexGrid::with_dimensions(0, 0, 10.0).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let result = TerritoryPartitioner::new(PartitionConfig::new(2)).partition(&mut grid, &mut rng);
        assert_eq!(result, Err(MapError::EmptyGrid));
    }

    #[test]
    fn test_min_surrounded_sides_out_of_range() {
        let mut grid = HexGrid::with_dimensions(3, 3, 10.0).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let config = PartitionConfig {
            min_surrounded_sides: 7,
            ..PartitionConfig::new(2)
        };
        let result = TerritoryPartitioner::new(config).partition(&mut grid, &mut rng);
        assert!(matches!(result, Err(MapError::InvalidConfig(_))));
    }

    #[test]
    fn test_repartitioning_replaces_old_tags() {
        let mut grid = HexGrid::with_dimensions(6, 6, 10.0).unwrap();
        let mut rng = StdRng::seed_from_u64(12);
        let partitioner = TerritoryPartitioner::new(PartitionConfig::new(4));

        partitioner.partition(&mut grid, &mut rng).unwrap();
        let second = partitioner.partition(&mut grid, &mut rng).unwrap();

        for group in &second.groups {
            for &id in &group.cells {
                assert_eq!(grid[id].groups().len(), 1, "{:?}", grid[id].coord);
                assert_eq!(grid[id].owner(), Some(group.name.as_str()));
            }
        }
        assert_eq!(second.owner_indices(grid.len()).iter().flatten().count(), grid.len());
    }

    #[test]
    fn test_boxed_in_group_restarts_elsewhere() {
        let mut grid = HexGrid::with_dimensions(5, 5, 10.0).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let partitioner = TerritoryPartitioner::new(PartitionConfig::new(2));
        let mut pool = Pool::new(grid.len());

        let start = grid.id_at(OffsetCoord::new(2, 2)).unwrap();
        let ring: Vec<CellId> = grid[start].neighbor_ids().collect();
        assert_eq!(ring.len(), 6);
        for &id in &ring {
            pool.take(id);
        }

        let (cells, escapes) = partitioner.grow(&mut grid, &mut pool, start, 4, "clan0", &mut rng);
        assert!(escapes >= 1);
        assert_eq!(cells.len(), 4);
        assert_eq!(cells[0], start);
        assert!(ring.iter().all(|id| !cells.contains(id)));
        assert!(grid.components(&cells).len() > 1);

        let group = finish_group(&grid, 0, "clan0".to_string(), cells);
        assert!(!group.is_contiguous());
    }

    #[test]
    fn test_split_groups_come_from_escapes() {
        for seed in 0..20 {
            let (_, partition) = partition(7, 9, PartitionConfig::new(5), seed);
            let split = partition
                .grown_groups()
                .iter()
                .filter(|g| !g.is_contiguous())
                .count();
            assert!(split <= partition.escape_seeds, "seed {}", seed);
        }
    }

    /// Tag all but `open` of the cells around `center` as `clan0` and return
    /// the pool and frontier a growing group would have at that point
    fn nearly_enclosed(grid: &mut HexGrid, center: CellId, open: usize) -> (Pool, Vec<CellId>) {
        let mut pool = Pool::new(grid.len());
        let ring: Vec<CellId> = grid[center].neighbor_ids().collect();
        let closed: Vec<CellId> = ring[open..].to_vec();
        for &id in &closed {
            grid[id].add_group("clan0");
            pool.take(id);
        }
        (pool, closed)
    }

    #[test]
    fn test_surrounded_cells_respect_threshold() {
        let mut grid = HexGrid::with_dimensions(7, 7, 10.0).unwrap();
        let center = grid.id_at(OffsetCoord::new(3, 3)).unwrap();
        let (pool, frontier) = nearly_enclosed(&mut grid, center, 1);

        let five = TerritoryPartitioner::new(PartitionConfig::new(2));
        assert_eq!(five.surrounded_cells(&grid, &pool, &frontier, "clan0"), vec![center]);

        let six = TerritoryPartitioner::new(PartitionConfig {
            min_surrounded_sides: 6,
            ..PartitionConfig::new(2)
        });
        assert!(six.surrounded_cells(&grid, &pool, &frontier, "clan0").is_empty());
    }

    #[test]
    fn test_fully_enclosed_cell_meets_strictest_threshold() {
        let mut grid = HexGrid::with_dimensions(7, 7, 10.0).unwrap();
        let center = grid.id_at(OffsetCoord::new(3, 3)).unwrap();
        let (pool, frontier) = nearly_enclosed(&mut grid, center, 0);

        let six = TerritoryPartitioner::new(PartitionConfig {
            min_surrounded_sides: 6,
            ..PartitionConfig::new(2)
        });
        assert_eq!(six.surrounded_cells(&grid, &pool, &frontier, "clan0"), vec![center]);
    }

    #[test]
    fn test_border_counts_as_closed() {
        // Top-left corner cell: off-grid sides plus group members reach the threshold
        let mut grid = HexGrid::with_dimensions(5, 5, 10.0).unwrap();
        let corner = grid.id_at(OffsetCoord::new(0, 0)).unwrap();
        let mut pool = Pool::new(grid.len());
        let frontier: Vec<CellId> = grid[corner].neighbor_ids().collect();
        for &id in &frontier {
            grid[id].add_group("clan0");
            pool.take(id);
        }

        let open = grid[corner].open_sides();
        assert!(open > 0);
        let strict = TerritoryPartitioner::new(PartitionConfig {
            min_surrounded_sides: 6,
            ..PartitionConfig::new(2)
        });
        assert!(strict
            .surrounded_cells(&grid, &pool, &frontier, "clan0")
            .contains(&corner));
    }

    #[test]
    fn test_retries_leave_only_kept_tags() {
        let config = PartitionConfig {
            attempts: 5,
            ..PartitionConfig::new(6)
        };
        let (grid, partition) = partition(6, 7, config, 8);
        for group in &partition.groups {
            assert_eq!(grid.group_members(&group.name).len(), group.len());
        }
    }
}
