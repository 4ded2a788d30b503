//! Read-only views of a generated map for renderers and description layers.
//!
//! The core never draws anything. A `MapSnapshot` flattens the grid into
//! plain records (geometry, owner, color, tags) that serialize cleanly to
//! JSON with arrays instead of maps.

use crate::grid::HexGrid;
use crate::hex::Point;
use crate::territory::Partition;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// An RGB color, serialized as `#rrggbb`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const ORANGE: Color = Color::rgb(255, 165, 0);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Convert from hue (degrees), saturation and value in `0.0..=1.0`
    pub fn from_hsv(hue: f64, saturation: f64, value: f64) -> Self {
        let hue = hue.rem_euclid(360.0);
        let chroma = value * saturation;
        let x = chroma * (1.0 - ((hue / 60.0) % 2.0 - 1.0).abs());
        let m = value - chroma;

        let (r, g, b) = match hue as u32 / 60 {
            0 => (chroma, x, 0.0),
            1 => (x, chroma, 0.0),
            2 => (0.0, chroma, x),
            3 => (0.0, x, chroma),
            4 => (x, 0.0, chroma),
            _ => (chroma, 0.0, x),
        };
        let channel = |c: f64| ((c + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        Self::rgb(channel(r), channel(g), channel(b))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .filter(|h| h.len() == 6 && h.is_ascii())
            .ok_or_else(|| format!("expected #rrggbb, got {s:?}"))?;
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| format!("bad color {s:?}: {e}"))
        };
        Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Display color for each owner index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerPalette {
    colors: Vec<Color>,
}

impl Default for OwnerPalette {
    fn default() -> Self {
        Self::new(vec![Color::ORANGE, Color::RED, Color::YELLOW, Color::GREEN])
    }
}

impl OwnerPalette {
    pub fn new(colors: Vec<Color>) -> Self {
        Self { colors }
    }

    /// Color for an owner. Indices past the palette get evenly spread generated hues.
    pub fn color(&self, index: usize) -> Color {
        match self.colors.get(index) {
            Some(color) => *color,
            None => Color::from_hsv(index as f64 * 137.5, 0.65, 0.9),
        }
    }
}

/// Per-owner summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerSummary {
    pub index: usize,
    pub name: String,
    pub color: Color,
    pub cells: usize,
    pub contiguous: bool,
}

/// Everything a consumer needs to know about one cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellView {
    pub row: usize,
    pub col: usize,
    pub center: Point,
    pub corners: [Point; 6],
    pub owner: Option<String>,
    pub owner_index: Option<usize>,
    pub color: Option<Color>,
    pub groups: Vec<String>,
    pub resources: Vec<String>,
    pub prey_quality: i32,
    pub herbs: Vec<String>,
    pub edge: bool,
}

/// Flattened, serializable view of a generated map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapSnapshot {
    pub rows: usize,
    pub cols: usize,
    pub radius: f64,
    pub owners: Vec<OwnerSummary>,
    /// Cells in row-major order
    pub cells: Vec<CellView>,
}

impl MapSnapshot {
    /// Capture the current state of a partitioned grid
    pub fn capture(grid: &HexGrid, partition: &Partition, palette: &OwnerPalette) -> Self {
        let owner_indices = partition.owner_indices(grid.len());

        let owners = partition
            .groups
            .iter()
            .map(|group| OwnerSummary {
                index: group.index,
                name: group.name.clone(),
                color: palette.color(group.index),
                cells: group.len(),
                contiguous: group.is_contiguous(),
            })
            .collect();

        let cells = grid
            .cells()
            .iter()
            .zip(owner_indices)
            .map(|(cell, owner_index)| CellView {
                row: cell.coord.row,
                col: cell.coord.col,
                center: cell.center,
                corners: cell.corners,
                owner: owner_index.map(|i| partition.groups[i].name.clone()),
                owner_index,
                color: owner_index.map(|i| palette.color(i)),
                groups: cell.groups().to_vec(),
                resources: cell.resources().to_vec(),
                prey_quality: cell.prey_quality,
                herbs: cell.herbs.clone(),
                edge: cell.is_edge(),
            })
            .collect();

        Self {
            rows: grid.rows(),
            cols: grid.cols(),
            radius: grid.radius(),
            owners,
            cells,
        }
    }

    /// Serialize to a JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::territory::{PartitionConfig, TerritoryPartitioner};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_color_hex_format() {
        assert_eq!(Color::ORANGE.to_string(), "#ffa500");
        assert_eq!("#ffa500".parse::<Color>(), Ok(Color::ORANGE));
        assert!("ffa500".parse::<Color>().is_err());
        assert!("#ffa5zz".parse::<Color>().is_err());
    }

    #[test]
    fn test_color_serializes_as_string() {
        let json = serde_json::to_string(&Color::RED).unwrap();
        assert_eq!(json, "\"#ff0000\"");
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Color::RED);
    }

    #[test]
    fn test_palette_extends_past_defaults() {
        let palette = OwnerPalette::default();
        assert_eq!(palette.color(0), Color::ORANGE);
        assert_eq!(palette.color(3), Color::GREEN);
        assert_ne!(palette.color(4), palette.color(5));
        assert_eq!(palette.color(6), palette.color(6));
    }

    #[test]
    fn test_hsv_primaries() {
        assert_eq!(Color::from_hsv(0.0, 1.0, 1.0), Color::RED);
        assert_eq!(Color::from_hsv(120.0, 1.0, 1.0), Color::GREEN);
        assert_eq!(Color::from_hsv(240.0, 1.0, 1.0), Color::rgb(0, 0, 255));
    }

    #[test]
    fn test_capture_resolves_owner_colors() {
        let mut grid = HexGrid::with_dimensions(4, 4, 10.0).unwrap();
        let mut rng = StdRng::seed_from_u64(6);
        let partition = TerritoryPartitioner::new(PartitionConfig::new(2))
            .partition(&mut grid, &mut rng)
            .unwrap();
        let palette = OwnerPalette::default();
        let snapshot = MapSnapshot::capture(&grid, &partition, &palette);

        assert_eq!(snapshot.cells.len(), 16);
        assert_eq!(snapshot.owners.len(), 2);
        for view in &snapshot.cells {
            let index = view.owner_index.unwrap();
            assert_eq!(view.color, Some(palette.color(index)));
            assert_eq!(view.owner.as_deref(), Some(partition.groups[index].name.as_str()));
        }
        assert!(snapshot.to_json().unwrap().contains("\"#ffa500\""));
    }
}
