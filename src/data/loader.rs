//! Dataset providers, tried in order until one succeeds.

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use std::path::PathBuf;

use crate::config::PERSISTENCE;
#[cfg(debug_assertions)]
use crate::config::PRINT_SERDE;
use crate::data::cache_file::{CacheFile, modified_ms};
use crate::data::dataset::Dataset;

pub const JSON_SIGNATURE: &str = "JSON dataset";
pub const CACHE_SIGNATURE: &str = "Binary cache";

#[async_trait]
pub trait CreateDataset: Send + Sync {
    // Either create a dataset OR return an anyhow::error
    async fn create_dataset(&self) -> Result<Dataset>;

    /// A unique identifier for this implementation (so that afterwards we know which one we used).
    fn signature(&self) -> &'static str;
}

pub async fn get_dataset_async(
    providers: &[Box<dyn CreateDataset>],
) -> Result<(Dataset, &'static str)> {
    for provider in providers {
        match provider.create_dataset().await {
            Ok(data) => return Ok((data, provider.signature())),
            Err(e) => {
                log::info!("{} unavailable: {:#}", provider.signature(), e);
            }
        }
    }
    Err(anyhow!("All dataset providers failed"))
}

/// The JSON file written by the data preparation step.
pub struct JsonDataset {
    pub path: PathBuf,
}

#[async_trait]
impl CreateDataset for JsonDataset {
    async fn create_dataset(&self) -> Result<Dataset> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .context(format!("Failed to read dataset: {}", self.path.display()))?;
        let dataset: Dataset = serde_json::from_str(&text)
            .context(format!("Failed to parse dataset: {}", self.path.display()))?;

        #[cfg(debug_assertions)]
        if PRINT_SERDE {
            log::info!(
                "Parsed {} instruments from {}",
                dataset.instruments.len(),
                self.path.display()
            );
        }
        Ok(dataset)
    }

    fn signature(&self) -> &'static str {
        JSON_SIGNATURE
    }
}

/// A bincode snapshot of `source`, valid while the version matches and the
/// source has not been modified since the snapshot was taken.
pub struct CachedDataset {
    pub source: PathBuf,
    pub cache_path: PathBuf,
}

impl CachedDataset {
    pub fn for_source(source: PathBuf) -> Self {
        let cache_path = crate::config::default_cache_path(&source);
        Self { source, cache_path }
    }
}

#[async_trait]
impl CreateDataset for CachedDataset {
    async fn create_dataset(&self) -> Result<Dataset> {
        let cache_path = self.cache_path.clone();
        let cache = tokio::task::spawn_blocking(move || CacheFile::load_from_path(&cache_path))
            .await
            .context("Cache read task failed")??;

        if cache.version != PERSISTENCE.cache.version {
            bail!(
                "Cache version mismatch: file v{} vs required v{}",
                cache.version,
                PERSISTENCE.cache.version
            );
        }
        if self.source.exists() {
            let source_ms = modified_ms(&self.source)?;
            if source_ms > cache.source_modified_ms {
                bail!("Cache is older than {}", self.source.display());
            }
        }

        #[cfg(debug_assertions)]
        if PRINT_SERDE {
            log::info!("✅ Cache valid: v{} at {}", cache.version, self.cache_path.display());
        }
        Ok(cache.data)
    }

    fn signature(&self) -> &'static str {
        CACHE_SIGNATURE
    }
}

/// Provider order for a dataset file.
pub fn providers_for(source: PathBuf, prefer_cache: bool) -> Vec<Box<dyn CreateDataset>> {
    let json: Box<dyn CreateDataset> = Box::new(JsonDataset {
        path: source.clone(),
    });
    let cache: Box<dyn CreateDataset> = Box::new(CachedDataset::for_source(source));
    if prefer_cache {
        vec![cache, json]
    } else {
        vec![json, cache]
    }
}

/// Write a cache snapshot of a freshly parsed JSON dataset.
pub async fn write_cache_async(source: PathBuf, dataset: Dataset) -> Result<()> {
    tokio::task::spawn_blocking(move || {
        let source_ms = modified_ms(&source)?;
        let cached = CachedDataset::for_source(source);
        CacheFile::new(dataset, source_ms, PERSISTENCE.cache.version)
            .save_to_path(&cached.cache_path)?;
        log::info!("Dataset cache written to {}", cached.cache_path.display());
        Ok(())
    })
    .await
    .context("Cache write task failed")?
}
