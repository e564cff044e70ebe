use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use dual_charts::config::{PERSISTENCE, default_cache_path};
use dual_charts::data::cache_file::{CacheFile, modified_ms};
use dual_charts::data::discovery::list_data_files;
use dual_charts::data::{CreateDataset, Dataset};
use dual_charts::data::loader::JsonDataset;

/// Rebuild binary caches for JSON datasets.
#[derive(Parser, Debug)]
struct Args {
    /// Datasets to convert; every dataset in --dir when empty
    files: Vec<PathBuf>,

    #[arg(long, default_value = PERSISTENCE.data.directory)]
    dir: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();
    let files: Vec<PathBuf> = if args.files.is_empty() {
        list_data_files(&args.dir)
            .into_iter()
            .map(|name| args.dir.join(name))
            .collect()
    } else {
        args.files
    };
    if files.is_empty() {
        println!("No datasets found in {}", args.dir.display());
        return Ok(());
    }

    let rt = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
    for source in files {
        let dataset = rt.block_on(JsonDataset { path: source.clone() }.create_dataset())?;
        build_cache(&source, dataset)?;
    }
    Ok(())
}

fn build_cache(source: &std::path::Path, dataset: Dataset) -> Result<()> {
    dataset
        .validate()
        .context(format!("Refusing to cache {}", source.display()))?;
    let instruments = dataset.instruments.len();

    let output_path = default_cache_path(source);
    CacheFile::new(dataset, modified_ms(source)?, PERSISTENCE.cache.version)
        .save_to_path(&output_path)?;

    println!(
        "✅ Cache written to {} with {} instruments.",
        output_path.display(),
        instruments
    );
    Ok(())
}
