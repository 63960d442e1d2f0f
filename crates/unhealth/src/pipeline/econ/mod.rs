mod parser;
pub mod resolver;
pub mod states;
mod summary;

use crate::pipeline::scoring::CountyId;
use serde::Serialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

pub use resolver::{EconomicJoinRecord, EconomicJoinResolver, JoinOutcome};
pub use summary::{build_summary, percent_vs_national, EconomicSummary};

pub const POPULATION: &str = "Population";
pub const PER_CAPITA_INCOME: &str = "Per capita personal income";
pub const REAL_GDP_PER_CAPITA: &str = "Real GDP per capita";

#[derive(Debug, Error)]
pub enum EconImportError {
    #[error("failed to read economic extract: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid economic CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("economic extract line {line}: {reason}")]
    InvalidRow { line: u64, reason: String },
}

/// One statistic for one geography and period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EconomicRecord {
    pub geo_id: CountyId,
    pub geo_name: String,
    pub state_abbr: Option<String>,
    pub statistic_name: String,
    pub time_period: i32,
    pub value: f64,
}

/// Economic extract keyed by geographic code. The national aggregate uses
/// geo id `00000`.
///
/// Lookups go through indexes built once on construction; the first record
/// for a geography and statistic wins.
#[derive(Debug, Clone, Default)]
pub struct EconomicDataset {
    records: Vec<EconomicRecord>,
    values: HashMap<CountyId, HashMap<String, f64>>,
    national: HashMap<String, f64>,
    /// Record indexes of each state's distinct places, in extract order.
    places: HashMap<String, Vec<usize>>,
}

impl EconomicDataset {
    pub fn new(records: Vec<EconomicRecord>) -> Self {
        let mut values: HashMap<CountyId, HashMap<String, f64>> = HashMap::new();
        let mut national = HashMap::new();
        let mut places: HashMap<String, Vec<usize>> = HashMap::new();

        for (index, record) in records.iter().enumerate() {
            let by_statistic = values.entry(record.geo_id.clone()).or_default();
            let first_for_geo = by_statistic.is_empty();
            by_statistic
                .entry(record.statistic_name.clone())
                .or_insert(record.value);

            if record.geo_id.is_national() {
                national
                    .entry(record.statistic_name.clone())
                    .or_insert(record.value);
            } else if let Some(abbr) = record.state_abbr.as_deref().filter(|_| first_for_geo) {
                places
                    .entry(abbr.to_ascii_uppercase())
                    .or_default()
                    .push(index);
            }
        }

        Self {
            records,
            values,
            national,
            places,
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, EconImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, EconImportError> {
        Ok(Self::new(parser::parse_records(reader)?))
    }

    pub fn records(&self) -> &[EconomicRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Keeps only rows for `year`.
    pub fn for_year(&self, year: i32) -> Self {
        Self::new(
            self.records
                .iter()
                .filter(|record| record.time_period == year)
                .cloned()
                .collect(),
        )
    }

    pub fn contains_geo(&self, geo_id: &CountyId) -> bool {
        self.values.contains_key(geo_id)
    }

    /// First value recorded for this geography and statistic.
    pub fn value(&self, geo_id: &CountyId, statistic_name: &str) -> Option<f64> {
        self.values.get(geo_id)?.get(statistic_name).copied()
    }

    /// National aggregate value for a statistic.
    pub fn national(&self, statistic_name: &str) -> Option<f64> {
        self.national.get(statistic_name).copied()
    }

    /// Distinct `(geo_id, geo_name)` places in one state, in extract order.
    pub fn places_in_state(&self, state_abbr: &str) -> Vec<(&CountyId, &str)> {
        self.places
            .get(&state_abbr.trim().to_ascii_uppercase())
            .map(|indexes| {
                indexes
                    .iter()
                    .map(|&index| {
                        let record = &self.records[index];
                        (&record.geo_id, record.geo_name.as_str())
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}
