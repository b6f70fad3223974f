//! JSON report writer for experiment results.
//!
//! Available with the `serde` feature.

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};

use crate::{
    error::{IoResultExt, Result},
    evolution::{NoiseStats, RunSummary},
    experiment::{ExperimentReport, RunsStats},
};

/// Run-level row keyed by `(landscape, config, selection, run)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub landscape: String,
    pub config: String,
    pub selection: String,
    pub run: usize,
    pub summary: RunSummary,
    pub noise: Option<NoiseStats>,
}

/// Flattened view of an [`ExperimentReport`] without per-generation data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub landscape: String,
    pub runs: Vec<RunRecord>,
    pub stats: Vec<RunsStats>,
}

impl RunRecord {
    pub fn from_report(report: &ExperimentReport) -> Vec<RunRecord> {
        report
            .results
            .iter()
            .map(|r| RunRecord {
                landscape: report.landscape.clone(),
                config: r.config.clone(),
                selection: r.selection.clone(),
                run: r.run,
                summary: r.summary.clone(),
                noise: r.noise.clone(),
            })
            .collect()
    }
}

impl From<&ExperimentReport> for ReportSummary {
    fn from(report: &ExperimentReport) -> Self {
        Self {
            landscape: report.landscape.clone(),
            runs: RunRecord::from_report(report),
            stats: report.stats.clone(),
        }
    }
}

/// Writes `value` as pretty JSON.
///
/// # Errors
///
/// Returns `GeneticError::Serialization` if `value` cannot be encoded or the
/// writer fails.
pub fn write_json<W, T>(writer: W, value: &T) -> Result<()>
where
    W: Write,
    T: Serialize + ?Sized,
{
    let mut writer = BufWriter::new(writer);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer
        .flush()
        .io_context("Failed to flush report")?;
    Ok(())
}

/// Writes `value` to `path`, creating missing parent directories.
///
/// # Errors
///
/// I/O failures are returned with the offending path attached.
pub fn save_json<T>(path: impl AsRef<Path>, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
{
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .io_context(format!("Failed to create report directory {}", parent.display()))?;
    }
    let file = File::create(path).io_context(format!("Failed to create report {}", path.display()))?;
    write_json(file, value)
}
