//! Periodic JSON dumps of the city inspection snapshot

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::city::City;

pub struct SnapshotWriter {
    output_dir: PathBuf,
    interval_ticks: u64,
}

impl SnapshotWriter {
    pub fn new(output_dir: impl AsRef<Path>, interval_ticks: u64) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            interval_ticks,
        }
    }

    pub fn should_write(&self, tick: u64) -> bool {
        self.interval_ticks > 0 && tick > 0 && tick % self.interval_ticks == 0
    }

    pub fn maybe_write(&self, city: &City) -> Result<Option<PathBuf>> {
        if !self.should_write(city.tick()) {
            return Ok(None);
        }
        self.write(city).map(Some)
    }

    pub fn write(&self, city: &City) -> Result<PathBuf> {
        let dir = self.output_dir.join(city.name());
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create snapshot dir {}", dir.display()))?;
        let path = dir.join(format!("tick_{:06}.json", city.tick()));
        let json = serde_json::to_string_pretty(&city.inspect())?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write snapshot {}", path.display()))?;
        Ok(path)
    }
}
