mod summary;
mod tables;
pub mod views;

pub use summary::{percentile, ScoreReport};
pub use tables::{CountyMeasureRow, CountyRankingRow, CountySummaryRow};

pub(crate) use tables::{measure_rows, ranking_rows};
