//! Writing generated maps out for external renderers.

use anyhow::Context;
use clanmap_core::ClanMap;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tracing::{info, warn};

/// Log one line per clan plus the scatter results
pub fn log_summary(map: &ClanMap) {
    let partition = map.partition();
    for group in &partition.groups {
        info!(
            clan = %group.name,
            color = %map.palette().color(group.index),
            cells = group.len(),
            pieces = group.components,
            "territory"
        );
    }
    if !partition.is_contiguous() {
        warn!(
            fraction = partition.disconnected_fraction(),
            escape_seeds = partition.escape_seeds,
            "some territories are not contiguous"
        );
    }
    for report in map.scatter_reports() {
        info!(
            resource = %report.resource,
            requested = report.requested,
            placed = report.placed,
            clusters = report.clusters.len(),
            "resource"
        );
    }
}

/// Serialize the snapshot to a file, or to stdout when no path is given
pub fn write_snapshot(map: &ClanMap, path: Option<&Path>, pretty: bool) -> anyhow::Result<()> {
    let snapshot = map.snapshot();
    let json = if pretty {
        serde_json::to_string_pretty(&snapshot)?
    } else {
        serde_json::to_string(&snapshot)?
    };

    match path {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            info!("Saved snapshot to {}", path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(json.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}
