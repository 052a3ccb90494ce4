use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

#[derive(Debug, Serialize, Deserialize)]
struct LastCityFile {
    last_city: Option<String>,
}

/// Single-slot, file-backed record of the most recently queried city.
///
/// The file holds `{"last_city": "<name>"}`. Writes replace the whole file in place;
/// concurrent writers are last-write-wins and a reader may observe a torn write.
#[derive(Debug, Clone)]
pub struct LastCityStore {
    path: PathBuf,
}

impl LastCityStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the stored city. A missing, unreadable or malformed file counts as "no city".
    pub fn load(&self) -> Option<String> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "No last city file");
                return None;
            }
        };

        match serde_json::from_str::<LastCityFile>(&contents) {
            Ok(file) => file.last_city,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "Ignoring malformed last city file");
                None
            }
        }
    }

    /// Overwrites the stored city unconditionally.
    pub fn save(&self, city: &str) -> Result<()> {
        let json = serde_json::to_string(&LastCityFile { last_city: Some(city.to_string()) })
            .context("Failed to serialize last city")?;

        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write last city file: {}", self.path.display()))?;

        debug!(path = %self.path.display(), city, "Saved last city");
        Ok(())
    }
}
