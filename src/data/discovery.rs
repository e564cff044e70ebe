use anyhow::{Result, bail};
use std::path::{Path, PathBuf};

use crate::config::{AppConfig, PERSISTENCE};

/// Dataset files in `dir`, sorted by name. Companion `*_data` files are skipped.
pub fn list_data_files(dir: &Path) -> Vec<String> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("Cannot read data directory {}: {}", dir.display(), e);
            return Vec::new();
        }
    };
    let mut files: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .is_some_and(|ext| ext == PERSISTENCE.data.extension)
        })
        .filter(|path| {
            path.file_stem()
                .and_then(|s| s.to_str())
                .is_some_and(|stem| !stem.ends_with("_data"))
        })
        .filter_map(|path| path.file_name()?.to_str().map(str::to_string))
        .collect();
    files.sort();
    files
}

/// The dataset to open: an explicit path, else the remembered file if it is
/// still present, else the first file in the data directory.
pub fn select_data_file(config: &AppConfig, explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if !path.exists() {
            bail!("Dataset {} does not exist", path.display());
        }
        return Ok(path.to_path_buf());
    }

    let dir = config.data_dir();
    let files = list_data_files(&dir);
    let remembered = config
        .cli
        .last_file
        .as_ref()
        .filter(|name| files.contains(name));
    match remembered.or(config.general.data_filename.as_ref().filter(|n| files.contains(n))) {
        Some(name) => Ok(dir.join(name)),
        None => match files.first() {
            Some(first) => Ok(dir.join(first)),
            None => bail!("No dataset files found in {}", dir.display()),
        },
    }
}
