use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::time::UNIX_EPOCH;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::data::dataset::Dataset;

/// Binary snapshot of a JSON dataset, keyed to the source file's mtime.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CacheFile {
    pub version: f64,
    pub timestamp_ms: i64,
    /// Modification time of the JSON file this cache was built from
    pub source_modified_ms: i64,
    pub data: Dataset,
}

impl CacheFile {
    pub fn new(data: Dataset, source_modified_ms: i64, version: f64) -> Self {
        Self {
            version,
            timestamp_ms: Utc::now().timestamp_millis(),
            source_modified_ms,
            data,
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let file = File::open(path).context(format!("Failed to open cache file: {:?}", path))?;
        let mut reader = BufReader::new(file);
        let cache = bincode::deserialize_from(&mut reader)
            .context(format!("Failed to deserialize cache: {:?}", path))?;
        Ok(cache)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .context(format!("Failed to create directory: {}", parent.display()))?;
        }
        let file =
            File::create(path).context(format!("Failed to create file: {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        bincode::serialize_into(&mut writer, self)
            .context(format!("Failed to serialize cache to: {}", path.display()))
    }
}

/// Modification time in ms since the epoch.
pub fn modified_ms(path: &Path) -> Result<i64> {
    let modified = std::fs::metadata(path)
        .and_then(|m| m.modified())
        .context(format!("Failed to stat {}", path.display()))?;
    let since_epoch = modified
        .duration_since(UNIX_EPOCH)
        .context("File modified before the epoch")?;
    Ok(since_epoch.as_millis() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::three_ticker_dataset;

    #[test]
    fn cache_round_trips_through_bincode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("set_v1.bin");
        let dataset = three_ticker_dataset();

        CacheFile::new(dataset.clone(), 42, 1.0)
            .save_to_path(&path)
            .unwrap();
        let loaded = CacheFile::load_from_path(&path).unwrap();
        assert_eq!(loaded.version, 1.0);
        assert_eq!(loaded.source_modified_ms, 42);
        assert_eq!(loaded.data, dataset);
    }

    #[test]
    fn missing_cache_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(CacheFile::load_from_path(&dir.path().join("none.bin")).is_err());
    }
}
