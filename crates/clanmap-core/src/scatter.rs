//! Scattering a resource tag across the grid in small clusters.

use crate::cell::CellId;
use crate::grid::HexGrid;
use crate::map::MapError;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// What to scatter and how much of it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScatterConfig {
    /// Resource tag, e.g. "water"
    pub resource: String,
    /// Total number of cells to tag
    pub count: usize,
    /// Largest cluster, seed cell included
    pub max_cluster_size: usize,
}

impl ScatterConfig {
    pub fn new(resource: impl Into<String>, count: usize, max_cluster_size: usize) -> Self {
        Self {
            resource: resource.into(),
            count,
            max_cluster_size,
        }
    }

    /// Draw the count uniformly from `min..max` (or use `min` if the range is empty)
    pub fn between<R: Rng>(
        resource: impl Into<String>,
        min: usize,
        max: usize,
        max_cluster_size: usize,
        rng: &mut R,
    ) -> Self {
        let count = if max > min { rng.gen_range(min..max) } else { min };
        Self::new(resource, count, max_cluster_size)
    }
}

/// Outcome of a scatter run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScatterReport {
    pub resource: String,
    /// Count asked for
    pub requested: usize,
    /// Cells actually tagged; less than `requested` only when the grid ran out
    pub placed: usize,
    /// Tagged cells, one list per cluster in placement order
    pub clusters: Vec<Vec<CellId>>,
}

impl ScatterReport {
    /// All cells tagged by this run
    pub fn cells(&self) -> impl Iterator<Item = CellId> + '_ {
        self.clusters.iter().flatten().copied()
    }
}

/// Places a resource tag on cells in clusters of bounded size
#[derive(Debug, Clone)]
pub struct ResourceScatter {
    config: ScatterConfig,
}

impl ResourceScatter {
    pub fn new(config: ScatterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScatterConfig {
        &self.config
    }

    /// Tag up to `count` cells that do not yet carry the resource.
    ///
    /// Each cluster starts on a random untagged cell, preferring cells with
    /// no tagged neighbor, and walks to the untagged neighbor with the fewest
    /// tagged neighbors of its own.
    ///
    /// `max_cluster_size` bounds each placement walk. Once no isolated cell
    /// is left, a walk may border an earlier one and the tagged region they
    /// form together can be larger.
    pub fn scatter<R: Rng>(&self, grid: &mut HexGrid, rng: &mut R) -> Result<ScatterReport, MapError> {
        let ScatterConfig {
            resource,
            count,
            max_cluster_size,
        } = &self.config;

        if *max_cluster_size == 0 {
            return Err(MapError::InvalidConfig(format!(
                "max_cluster_size for {resource} must be at least 1"
            )));
        }

        let available = grid.cells().iter().filter(|c| !c.has_resource(resource)).count();
        let goal = (*count).min(available);
        if goal < *count {
            debug!(%resource, requested = count, available, "capping resource count at free cells");
        }

        let mut placed = 0;
        let mut clusters = Vec::new();

        while placed < goal {
            let untagged: Vec<CellId> = grid
                .ids()
                .filter(|&id| !grid[id].has_resource(resource))
                .collect();
            let isolated: Vec<CellId> = untagged
                .iter()
                .copied()
                .filter(|&id| !grid[id].neighbor_ids().any(|n| grid[n].has_resource(resource)))
                .collect();
            let seed = match isolated.choose(rng) {
                Some(&id) => id,
                None => match untagged.choose(rng) {
                    Some(&id) => id,
                    None => break,
                },
            };

            grid[seed].add_resource(resource);
            placed += 1;
            let mut cluster = vec![seed];
            let mut tail = seed;

            while placed < goal && cluster.len() < *max_cluster_size {
                let Some(next) = least_exposed_neighbor(grid, tail, resource, rng) else {
                    break;
                };
                grid[next].add_resource(resource);
                placed += 1;
                cluster.push(next);
                tail = next;
            }

            clusters.push(cluster);
        }

        debug!(%resource, placed, clusters = clusters.len(), "scattered resource");
        Ok(ScatterReport {
            resource: resource.clone(),
            requested: *count,
            placed,
            clusters,
        })
    }
}

/// Untagged neighbor of `id` touching the fewest tagged cells, ties broken at random
fn least_exposed_neighbor<R: Rng>(
    grid: &HexGrid,
    id: CellId,
    resource: &str,
    rng: &mut R,
) -> Option<CellId> {
    let exposure = |candidate: CellId| {
        grid[candidate]
            .neighbor_ids()
            .filter(|&n| grid[n].has_resource(resource))
            .count()
    };

    let candidates: Vec<(CellId, usize)> = grid[id]
        .neighbor_ids()
        .filter(|&n| !grid[n].has_resource(resource))
        .map(|n| (n, exposure(n)))
        .collect();

    let least = candidates.iter().map(|&(_, e)| e).min()?;
    let best: Vec<CellId> = candidates
        .into_iter()
        .filter(|&(_, e)| e == least)
        .map(|(n, _)| n)
        .collect();
    best.choose(rng).copied()
}
