//! File persistence and serialization configuration

use std::path::{Path, PathBuf};

/// Dataset file locations
pub struct DataPaths {
    /// Directory scanned for dataset files
    pub directory: &'static str,
    /// Extension of dataset files (without dot)
    pub extension: &'static str,
}

/// Binary cache written after a JSON load
pub struct CacheConfig {
    pub directory: &'static str,
    /// Current version of the cache serialization format
    pub version: f64,
}

/// Screenshot export locations
pub struct ExportPaths {
    pub screenshot_dir: &'static str,
    /// Suffix of the JSON index written into a project folder
    pub index_suffix: &'static str,
}

pub struct PersistenceConfig {
    /// Path for loading/saving the user configuration
    pub config_path: &'static str,
    pub data: DataPaths,
    pub cache: CacheConfig,
    pub export: ExportPaths,
}

pub const PERSISTENCE: PersistenceConfig = PersistenceConfig {
    config_path: "config.json",
    data: DataPaths {
        directory: "data",
        extension: "json",
    },
    cache: CacheConfig {
        directory: "data_cache",
        version: 1.0,
    },
    export: ExportPaths {
        screenshot_dir: "screenshots",
        index_suffix: "_screenshots.json",
    },
};

/// Generate dataset-specific cache filename
/// Example: "daily_gappers_v1.bin"
pub fn dataset_cache_filename(dataset_path: &Path) -> String {
    let stem = dataset_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("dataset");
    format!("{}_v{}.bin", stem, PERSISTENCE.cache.version)
}

pub fn default_cache_path(dataset_path: &Path) -> PathBuf {
    PathBuf::from(PERSISTENCE.cache.directory).join(dataset_cache_filename(dataset_path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_name_follows_dataset_stem() {
        let path = Path::new("data/daily_gappers.json");
        assert_eq!(dataset_cache_filename(path), "daily_gappers_v1.bin");
        assert!(default_cache_path(path).starts_with(PERSISTENCE.cache.directory));
    }
}
