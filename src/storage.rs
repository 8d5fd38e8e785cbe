use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::data_dir;
use crate::timeline::Timeline;

/// Last fully successful refresh, kept for the offline view.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    /// When the data was fetched (RFC 3339).
    pub fetched_at: String,
    pub api_url: String,
    #[serde(flatten)]
    pub timeline: Timeline,
}

/// Returns the path to the snapshot file (`snapshot.json`).
///
/// The path is determined in the following order:
/// 1. `TIMELINE_DB` environment variable.
/// 2. `~/.local/share/fitout-timeline/snapshot.json` (on Linux).
/// 3. `./fitout-timeline/snapshot.json` (fallback).
pub fn snapshot_path() -> PathBuf {
    std::env::var("TIMELINE_DB").map(PathBuf::from).unwrap_or_else(|_| {
        let mut p = data_dir();
        p.push("snapshot.json");
        p
    })
}

/// Loads the stored snapshot.
///
/// Returns `None` if there is none or it cannot be read.
pub fn load_snapshot() -> Option<Snapshot> {
    let path = snapshot_path();
    if !path.exists() {
        return None;
    }
    let mut f = OpenOptions::new().read(true).open(&path).ok()?;
    let mut s = String::new();
    if f.read_to_string(&mut s).is_err() {
        return None;
    }
    match serde_json::from_str(&s) {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            log::warn!("Ignoring unreadable snapshot {}: {}", path.display(), e);
            None
        }
    }
}

/// Writes the snapshot, replacing any previous one.
pub fn save_snapshot(snapshot: &Snapshot) -> Result<()> {
    let path = snapshot_path();
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    let s = serde_json::to_string_pretty(snapshot).context("Failed to serialize snapshot")?;
    let mut f = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    f.write_all(s.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Deletes the snapshot file.
pub fn delete_snapshot() -> Result<()> {
    let path = snapshot_path();
    if path.exists() {
        fs::remove_file(&path).with_context(|| format!("Failed to delete {}", path.display()))?;
    }
    Ok(())
}
