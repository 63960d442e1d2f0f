pub mod econ;
mod fields;
pub mod places;
pub mod scoring;
pub mod snapshot;

pub use econ::EconomicDataset;
pub use places::SurveyImporter;
pub use scoring::{DegeneratePolicy, MeasureCatalog, ScoringPipeline, ScoringRun};
pub use snapshot::{Snapshot, SnapshotStore};
