// Data loading, caching and derived series
pub mod cache_file;
pub mod dataset;
pub mod discovery;
pub mod indicators;
pub mod loader;
pub mod resample;
pub mod sessions;
pub mod store;

#[cfg(test)]
pub mod fixtures;

// Re-export commonly used types
pub use dataset::Dataset;
pub use loader::{CreateDataset, get_dataset_async};
pub use store::{ChartEntry, ChartMetadata, TimeSeriesStore};
