//! Persisting exported screenshots.
//!
//! The controller only produces bytes. Everything that touches the disk lives
//! behind `ExportSink` so a failed write never disturbs chart state.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::PERSISTENCE;
#[cfg(debug_assertions)]
use crate::config::PRINT_EXPORT;
use crate::domain::PaneId;
use crate::error::ChartError;

const SCREENSHOT_SUFFIX: &str = "_screenshot";

/// `text` made safe to use as one file name component.
fn file_component(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    cleaned.replace("..", "__")
}

/// One pane's capture plus what it shows.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportImage {
    pub pane: PaneId,
    pub ticker: String,
    pub date_str: String,
    pub extension: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportImage {
    /// `{ticker}_{date}_chart{n}_screenshot`
    pub fn file_stem(&self) -> String {
        format!(
            "{}_{}_chart{}{}",
            file_component(&self.ticker),
            file_component(&self.date_str),
            self.pane.number(),
            SCREENSHOT_SUFFIX
        )
    }

    pub fn file_name(&self) -> String {
        format!("{}.{}", self.file_stem(), self.extension)
    }
}

/// Where an exported image ended up.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRecord {
    pub pane: PaneId,
    pub path: PathBuf,
    /// Public link when the sink uploads; directory sinks leave it empty
    pub link: Option<String>,
}

pub trait ExportSink {
    /// Persist every image or report the first failure with its pane.
    fn persist(&mut self, images: &[ExportImage]) -> Result<Vec<ExportRecord>>;
}

/// Writes images into a directory, creating it when missing.
pub struct DirectorySink {
    pub dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ExportSink for DirectorySink {
    fn persist(&mut self, images: &[ExportImage]) -> Result<Vec<ExportRecord>> {
        std::fs::create_dir_all(&self.dir)
            .context(format!("Failed to create directory: {}", self.dir.display()))?;

        let mut records = Vec::with_capacity(images.len());
        for image in images {
            let path = self.dir.join(image.file_name());
            std::fs::write(&path, &image.bytes).map_err(|e| ChartError::Export {
                pane: Some(image.pane),
                cause: format!("{}: {}", path.display(), e),
            })?;

            #[cfg(debug_assertions)]
            if PRINT_EXPORT {
                log::info!("{} bytes -> {}", image.bytes.len(), path.display());
            }
            records.push(ExportRecord {
                pane: image.pane,
                path,
                link: None,
            });
        }
        log::info!("Saved {} screenshots to {}", records.len(), self.dir.display());
        Ok(records)
    }
}

/// One row of a project index.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ProjectRow {
    pub ticker: String,
    pub date: String,
    pub file: String,
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectIndex {
    pub folder: PathBuf,
    pub index_path: PathBuf,
    pub rows: Vec<ProjectRow>,
}

/// Collects loose screenshots into a named project folder with a JSON index.
pub struct ProjectArchive {
    pub screenshot_dir: PathBuf,
}

/// `root/name`, or `root/name_1`, `root/name_2`, ... when taken.
pub fn create_project_folder(root: &Path, name: &str) -> Result<PathBuf> {
    let mut folder = root.join(name);
    let mut suffix = 1;
    while folder.exists() {
        folder = root.join(format!("{}_{}", name, suffix));
        suffix += 1;
    }
    std::fs::create_dir_all(&folder)
        .context(format!("Failed to create project folder: {}", folder.display()))?;
    Ok(folder)
}

/// Ticker and date back out of a screenshot file stem.
fn parse_stem(stem: &str) -> Option<(String, String)> {
    let stem = stem.strip_suffix(SCREENSHOT_SUFFIX).unwrap_or(stem);
    let stem = stem.rsplit_once("_chart").map_or(stem, |(head, _)| head);
    let (ticker, date) = stem.rsplit_once('_')?;
    Some((ticker.to_string(), date.to_string()))
}

impl ProjectArchive {
    pub fn new(screenshot_dir: impl Into<PathBuf>) -> Self {
        Self {
            screenshot_dir: screenshot_dir.into(),
        }
    }

    /// Move every screenshot into a new project folder and index it.
    pub fn archive(&self, project: &str) -> Result<ProjectIndex> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(&self.screenshot_dir)
            .context(format!(
                "Failed to read screenshots: {}",
                self.screenshot_dir.display()
            ))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file())
            .filter(|path| {
                path.file_stem()
                    .and_then(|s| s.to_str())
                    .is_some_and(|s| s.ends_with(SCREENSHOT_SUFFIX))
            })
            .collect();
        files.sort();

        let folder = create_project_folder(&self.screenshot_dir, project)?;
        let mut rows = Vec::with_capacity(files.len());
        for file in files {
            let Some(name) = file.file_name().and_then(|n| n.to_str()).map(str::to_string)
            else {
                continue;
            };
            let target = folder.join(&name);
            std::fs::rename(&file, &target)
                .context(format!("Failed to move {} into project", file.display()))?;

            let stem = target.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
            let (ticker, date) = parse_stem(stem).unwrap_or_default();
            rows.push(ProjectRow {
                ticker,
                date,
                file: name,
                link: None,
            });
        }

        let index_path = folder.join(format!("{}{}", project, PERSISTENCE.export.index_suffix));
        let text = serde_json::to_string_pretty(&rows).context("Failed to serialize index")?;
        std::fs::write(&index_path, text)
            .context(format!("Failed to write index: {}", index_path.display()))?;

        log::info!("Project '{}': {} screenshots in {}", project, rows.len(), folder.display());
        Ok(ProjectIndex {
            folder,
            index_path,
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(pane: PaneId, ticker: &str) -> ExportImage {
        ExportImage {
            pane,
            ticker: ticker.to_string(),
            date_str: "2025-05-08".to_string(),
            extension: "svg",
            bytes: b"<svg/>".to_vec(),
        }
    }

    #[test]
    fn file_names_carry_ticker_date_and_pane() {
        assert_eq!(
            image(PaneId::Right, "ZKIN").file_name(),
            "ZKIN_2025-05-08_chart2_screenshot.svg"
        );
        assert_eq!(
            parse_stem("BRK_B_2025-05-08_chart1_screenshot"),
            Some(("BRK_B".to_string(), "2025-05-08".to_string()))
        );
    }

    #[test]
    fn tickers_cannot_escape_the_directory() {
        let dir = tempfile::tempdir().unwrap();
        let shots = dir.path().join("shots");
        let mut sink = DirectorySink::new(&shots);

        let records = sink
            .persist(&[image(PaneId::Left, "../x"), image(PaneId::Right, "a/b")])
            .unwrap();
        assert_eq!(
            records[0].path,
            shots.join("___x_2025-05-08_chart1_screenshot.svg")
        );
        assert_eq!(records[1].path, shots.join("a_b_2025-05-08_chart2_screenshot.svg"));
        assert!(records.iter().all(|r| r.path.parent() == Some(shots.as_path())));
    }

    #[test]
    fn directory_sink_creates_the_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("shots").join("today");
        let mut sink = DirectorySink::new(&target);

        let records = sink
            .persist(&[image(PaneId::Left, "AAA"), image(PaneId::Right, "AAA")])
            .unwrap();
        assert_eq!(records.len(), 2);
        for record in &records {
            assert_eq!(std::fs::read(&record.path).unwrap(), b"<svg/>");
            assert_eq!(record.link, None);
        }
    }

    #[test]
    fn directory_sink_reports_the_failing_pane() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::new(dir.path());
        let bad = image(PaneId::Right, "AAA");
        std::fs::create_dir(dir.path().join(bad.file_name())).unwrap();

        let err = sink.persist(&[image(PaneId::Left, "AAA"), bad]).unwrap_err();
        match err.downcast_ref::<ChartError>() {
            Some(ChartError::Export { pane, .. }) => assert_eq!(*pane, Some(PaneId::Right)),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn project_folders_get_numbered_suffixes() {
        let dir = tempfile::tempdir().unwrap();
        let first = create_project_folder(dir.path(), "gappers").unwrap();
        let second = create_project_folder(dir.path(), "gappers").unwrap();
        let third = create_project_folder(dir.path(), "gappers").unwrap();
        assert_eq!(first, dir.path().join("gappers"));
        assert_eq!(second, dir.path().join("gappers_1"));
        assert_eq!(third, dir.path().join("gappers_2"));
    }

    #[test]
    fn archive_moves_screenshots_and_writes_an_index() {
        let dir = tempfile::tempdir().unwrap();
        DirectorySink::new(dir.path())
            .persist(&[image(PaneId::Left, "AAA"), image(PaneId::Right, "AAA")])
            .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "keep").unwrap();

        let index = ProjectArchive::new(dir.path()).archive("may").unwrap();
        assert_eq!(index.rows.len(), 2);
        assert!(index.rows.iter().all(|r| r.ticker == "AAA" && r.date == "2025-05-08"));
        assert!(dir.path().join("notes.txt").exists());
        assert!(index.folder.join("AAA_2025-05-08_chart1_screenshot.svg").exists());

        let text = std::fs::read_to_string(&index.index_path).unwrap();
        let rows: Vec<ProjectRow> = serde_json::from_str(&text).unwrap();
        assert_eq!(rows, index.rows);
        assert!(index.index_path.ends_with("may_screenshots.json"));
    }
}
