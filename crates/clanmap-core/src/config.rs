//! Map generation settings.
//!
//! All fields have defaults, so a config file only needs the values it
//! changes:
//!
//! ```toml
//! seed = 42
//! radius = 40.0
//!
//! [partition]
//! owner_count = 3
//!
//! [[resources]]
//! name = "water"
//! min_count = 10
//! max_count = 15
//! ```

use crate::grid::Adjacency;
use crate::map::MapError;
use crate::scatter::ScatterConfig;
use crate::territory::PartitionConfig;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A resource to scatter after partitioning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceConfig {
    pub name: String,

    /// Lower bound of the tagged cell count (inclusive)
    pub min_count: usize,

    /// Upper bound of the tagged cell count (exclusive)
    pub max_count: usize,

    #[serde(default = "default_max_cluster_size")]
    pub max_cluster_size: usize,
}

fn default_max_cluster_size() -> usize {
    999
}

impl ResourceConfig {
    /// Resolve the count range into a concrete scatter request
    pub fn to_scatter<R: Rng>(&self, rng: &mut R) -> ScatterConfig {
        ScatterConfig::between(
            self.name.clone(),
            self.min_count,
            self.max_count,
            self.max_cluster_size,
            rng,
        )
    }
}

/// Everything needed to generate a map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    /// RNG seed; a fresh entropy seed is used when absent
    #[serde(default)]
    pub seed: Option<u64>,

    /// Drawable width in pixels
    #[serde(default = "default_width")]
    pub width: f64,

    /// Drawable height in pixels
    #[serde(default = "default_height")]
    pub height: f64,

    /// Hex radius in pixels
    #[serde(default = "default_radius")]
    pub radius: f64,

    #[serde(default)]
    pub adjacency: Adjacency,

    #[serde(default)]
    pub partition: PartitionConfig,

    #[serde(default)]
    pub resources: Vec<ResourceConfig>,
}

fn default_width() -> f64 {
    750.0
}
fn default_height() -> f64 {
    650.0
}
fn default_radius() -> f64 {
    50.0
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            seed: None,
            width: default_width(),
            height: default_height(),
            radius: default_radius(),
            adjacency: Adjacency::default(),
            partition: PartitionConfig::default(),
            resources: Vec::new(),
        }
    }
}

impl MapConfig {
    /// Parse a config from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, MapError> {
        toml::from_str(contents).map_err(|e| MapError::Config(e.to_string()))
    }

    /// Load a config from a TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, MapError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| MapError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::territory::SeedStrategy;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = MapConfig::from_toml_str("").unwrap();
        assert_eq!(config, MapConfig::default());
    }

    #[test]
    fn test_partial_toml() {
        let config = MapConfig::from_toml_str(
            r#"
            seed = 42
            radius = 30.0

            [partition]
            owner_count = 3
            seed_strategy = "RandomEdge"

            [[resources]]
            name = "water"
            min_count = 10
            max_count = 15
            "#,
        )
        .unwrap();

        assert_eq!(config.seed, Some(42));
        assert_eq!(config.radius, 30.0);
        assert_eq!(config.width, 750.0);
        assert_eq!(config.partition.owner_count, 3);
        assert_eq!(config.partition.name_prefix, "clan");
        assert_eq!(config.partition.min_surrounded_sides, 5);
        assert_eq!(config.partition.seed_strategy, SeedStrategy::RandomEdge);
        assert_eq!(config.resources.len(), 1);
        assert_eq!(config.resources[0].max_cluster_size, 999);
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        let result = MapConfig::from_toml_str("radius = \"wide\"");
        assert!(matches!(result, Err(MapError::Config(_))));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let result = MapConfig::from_toml_file("/nonexistent/clanmap.toml");
        assert!(matches!(result, Err(MapError::Config(_))));
    }
}
