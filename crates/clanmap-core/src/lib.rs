//! Clanmap - hex map generation and clan territory partitioning
//!
//! This crate builds a hexagonal grid sized to a drawable area and splits
//! it into contiguous territories for competing clans:
//! - Hex geometry and offset coordinates
//! - A grid arena with neighbor links
//! - Randomized region growing that keeps territories compact
//! - Clustered resource scattering
//!
//! Rendering and location descriptions are left to consumers, which read
//! the finished map through [`snapshot::MapSnapshot`].
//!
//! # Modules
//!
//! - [`hex`]: Points, offset coordinates, sides and cell metrics
//! - [`cell`]: A single cell with its neighbor slots and tags
//! - [`grid`]: Grid construction and adjacency
//! - [`territory`]: Partitioning the grid among owners
//! - [`scatter`]: Placing resource clusters
//! - [`map`]: End-to-end generation from a [`config::MapConfig`]
//! - [`snapshot`]: Serializable views for renderers and text layers

pub mod cell;
pub mod config;
pub mod grid;
pub mod hex;
pub mod map;
pub mod scatter;
pub mod snapshot;
pub mod territory;
#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use cell::{CellId, HexCell};
pub use config::{MapConfig, ResourceConfig};
pub use grid::{Adjacency, GridDimensions, HexGrid, MAX_CELLS};
pub use hex::{HexMetrics, OffsetCoord, Point, Side};
pub use map::{ClanMap, MapError};
pub use scatter::{ResourceScatter, ScatterConfig, ScatterReport};
pub use snapshot::{CellView, Color, MapSnapshot, OwnerPalette, OwnerSummary};
pub use territory::{OwnerGroup, Partition, PartitionConfig, SeedStrategy, TerritoryPartitioner};
