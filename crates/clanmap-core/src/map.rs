//! Map generation: grid construction, territory partitioning and resource
//! scattering wired together from a `MapConfig`.

use crate::config::MapConfig;
use crate::grid::HexGrid;
use crate::scatter::{ResourceScatter, ScatterReport};
use crate::snapshot::{MapSnapshot, OwnerPalette};
use crate::territory::{Partition, TerritoryPartitioner};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Errors that can occur while building or partitioning a map
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum MapError {
    #[error("Grid has no cells; the drawable area is smaller than one hex")]
    EmptyGrid,

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Cannot split {cells} cells among {owners} owners")]
    InvalidOwnerCount { owners: usize, cells: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to load configuration: {0}")]
    Config(String),
}

/// A generated map: the grid, its territories and scattered resources
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClanMap {
    grid: HexGrid,
    partition: Partition,
    scatter_reports: Vec<ScatterReport>,
    palette: OwnerPalette,
}

impl ClanMap {
    /// Generate a map, seeded from `config.seed` if present
    pub fn generate(config: &MapConfig) -> Result<Self, MapError> {
        match config.seed {
            Some(seed) => Self::generate_with_rng(config, &mut StdRng::seed_from_u64(seed)),
            None => Self::generate_with_rng(config, &mut rand::thread_rng()),
        }
    }

    /// Generate a map drawing all randomness from `rng`
    pub fn generate_with_rng<R: Rng>(config: &MapConfig, rng: &mut R) -> Result<Self, MapError> {
        let mut grid = HexGrid::fit_with(config.width, config.height, config.radius, config.adjacency)?;
        if grid.is_empty() {
            return Err(MapError::EmptyGrid);
        }

        let partition = TerritoryPartitioner::new(config.partition.clone()).partition(&mut grid, rng)?;

        let mut scatter_reports = Vec::with_capacity(config.resources.len());
        for resource in &config.resources {
            let scatter = ResourceScatter::new(resource.to_scatter(rng));
            scatter_reports.push(scatter.scatter(&mut grid, rng)?);
        }

        info!(
            rows = grid.rows(),
            cols = grid.cols(),
            owners = partition.groups.len(),
            target_size = partition.target_size,
            disconnected = partition.disconnected_count(),
            "generated map"
        );

        Ok(Self {
            grid,
            partition,
            scatter_reports,
            palette: OwnerPalette::default(),
        })
    }

    pub fn grid(&self) -> &HexGrid {
        &self.grid
    }

    /// Mutable access for consumers that fill in per-cell text data
    pub fn grid_mut(&mut self) -> &mut HexGrid {
        &mut self.grid
    }

    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    pub fn scatter_reports(&self) -> &[ScatterReport] {
        &self.scatter_reports
    }

    pub fn palette(&self) -> &OwnerPalette {
        &self.palette
    }

    /// Replace the colors used for owners
    pub fn set_palette(&mut self, palette: OwnerPalette) {
        self.palette = palette;
    }

    /// Geometry and tags of every cell, as read by renderers and text layers
    pub fn snapshot(&self) -> MapSnapshot {
        MapSnapshot::capture(&self.grid, &self.partition, &self.palette)
    }
}
