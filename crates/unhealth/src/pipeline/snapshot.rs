use crate::pipeline::econ::{build_summary, EconomicDataset};
use crate::pipeline::scoring::report::{
    CountyMeasureRow, CountyRankingRow, CountySummaryRow, ScoreReport,
};
use crate::pipeline::scoring::{DegeneratePolicy, PipelineDiagnostics, ScoringRun};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::info;

pub const RANKINGS_FILE: &str = "county_rankings.csv";
pub const MEASURES_FILE: &str = "county_measures.csv";
pub const SUMMARY_FILE: &str = "county_summary.csv";
pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot i/o failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("snapshot table {path} is malformed: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("snapshot manifest {path} is malformed: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowCounts {
    pub rankings: usize,
    pub measures: usize,
    pub summary: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotManifest {
    pub generated_at: DateTime<Utc>,
    pub degenerate_policy: DegeneratePolicy,
    pub economic_year: i32,
    /// Counties left without economic figures.
    pub economic_unmatched: usize,
    pub row_counts: RowCounts,
    pub diagnostics: PipelineDiagnostics,
}

/// The published output of one scoring run.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub manifest: SnapshotManifest,
    pub report: ScoreReport,
}

impl Snapshot {
    /// Joins a finished run with economic figures for `economic_year`.
    pub fn assemble(
        run: ScoringRun,
        economics: Option<&EconomicDataset>,
        economic_year: i32,
        degenerate_policy: DegeneratePolicy,
    ) -> Self {
        let current = economics.map(|dataset| dataset.for_year(economic_year));
        let summary = build_summary(&run.rankings, current.as_ref());

        let report = ScoreReport {
            rankings: run.rankings,
            measures: run.measures,
            summary: summary.rows,
        };
        let manifest = SnapshotManifest {
            generated_at: Utc::now(),
            degenerate_policy,
            economic_year,
            economic_unmatched: summary
                .joins
                .iter()
                .filter(|join| !join.has_economic_data())
                .count(),
            row_counts: RowCounts {
                rankings: report.rankings.len(),
                measures: report.measures.len(),
                summary: report.summary.len(),
            },
            diagnostics: run.diagnostics,
        };

        Self { manifest, report }
    }
}

/// Flat-file snapshot directory shared by the batch job and the service.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes every table through a sibling temp file and renames it into
    /// place, so readers never see a partial file. The manifest goes last.
    pub fn write(&self, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| SnapshotError::Io {
            path: self.dir.clone(),
            source,
        })?;

        self.write_table(RANKINGS_FILE, &snapshot.report.rankings)?;
        self.write_table(MEASURES_FILE, &snapshot.report.measures)?;
        self.write_table(SUMMARY_FILE, &snapshot.report.summary)?;

        let path = self.dir.join(MANIFEST_FILE);
        self.replace(&path, |writer| {
            serde_json::to_writer_pretty(&mut *writer, &snapshot.manifest).map_err(|source| {
                SnapshotError::Manifest {
                    path: path.clone(),
                    source,
                }
            })?;
            writer.write_all(b"\n").map_err(|source| SnapshotError::Io {
                path: path.clone(),
                source,
            })
        })?;

        info!(
            dir = %self.dir.display(),
            rankings = snapshot.manifest.row_counts.rankings,
            measures = snapshot.manifest.row_counts.measures,
            summary = snapshot.manifest.row_counts.summary,
            "wrote snapshot"
        );
        Ok(())
    }

    pub fn load(&self) -> Result<Snapshot, SnapshotError> {
        let path = self.dir.join(MANIFEST_FILE);
        let file = File::open(&path).map_err(|source| SnapshotError::Io {
            path: path.clone(),
            source,
        })?;
        let manifest: SnapshotManifest = serde_json::from_reader(file)
            .map_err(|source| SnapshotError::Manifest { path, source })?;

        let report = ScoreReport {
            rankings: self.read_table::<CountyRankingRow>(RANKINGS_FILE)?,
            measures: self.read_table::<CountyMeasureRow>(MEASURES_FILE)?,
            summary: self.read_table::<CountySummaryRow>(SUMMARY_FILE)?,
        };

        info!(
            dir = %self.dir.display(),
            counties = report.rankings.len(),
            generated_at = %manifest.generated_at,
            "loaded snapshot"
        );
        Ok(Snapshot { manifest, report })
    }

    fn write_table<T: Serialize>(&self, name: &str, rows: &[T]) -> Result<(), SnapshotError> {
        let path = self.dir.join(name);
        self.replace(&path, |writer| {
            let csv_error = |source| SnapshotError::Csv {
                path: path.clone(),
                source,
            };
            let mut csv_writer = csv::Writer::from_writer(writer);
            for row in rows {
                csv_writer.serialize(row).map_err(csv_error)?;
            }
            csv_writer.flush().map_err(|source| SnapshotError::Io {
                path: path.clone(),
                source,
            })
        })
    }

    fn read_table<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>, SnapshotError> {
        let path = self.dir.join(name);
        let mut reader = csv::Reader::from_path(&path).map_err(|source| SnapshotError::Csv {
            path: path.clone(),
            source,
        })?;
        reader
            .deserialize()
            .collect::<Result<Vec<T>, csv::Error>>()
            .map_err(|source| SnapshotError::Csv { path, source })
    }

    fn replace<F>(&self, path: &Path, fill: F) -> Result<(), SnapshotError>
    where
        F: FnOnce(&mut BufWriter<&mut NamedTempFile>) -> Result<(), SnapshotError>,
    {
        let io_error = |source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        };

        let mut temp = NamedTempFile::new_in(&self.dir).map_err(io_error)?;
        {
            let mut writer = BufWriter::new(&mut temp);
            fill(&mut writer)?;
            writer.flush().map_err(io_error)?;
        }
        temp.as_file().sync_all().map_err(io_error)?;
        temp.persist(path).map_err(|err| io_error(err.error))?;
        Ok(())
    }
}
