mod aggregate;
pub mod catalog;
mod contribution;
pub mod domain;
mod normalize;
mod rank;
pub mod report;

pub use aggregate::{weighted_scores, UnweightedMeasure, WeightedAggregation};
pub use catalog::{MeasureCatalog, MeasureCatalogBuilder};
pub use contribution::decompose;
pub use domain::{
    ContributionRecord, CountyId, CountyInfo, CountyScore, InvalidCountyId, MeasureObservation,
    NormalizedMeasure, SurveyExtract,
};
pub use normalize::{normalize_by_measure, MeasureNormalization, MIDPOINT};
pub use rank::{competition_rank, rank_counties, RankOrder};
pub use report::{CountyMeasureRow, CountyRankingRow, ScoreReport};

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error, PartialEq)]
pub enum ScoringError {
    #[error("measure '{measure}' has zero variance (every county reports {value})")]
    DegenerateMeasure { measure: String, value: f64 },
    #[error("all {counties} counties share weighted score {value}; cannot normalize")]
    DegenerateCountyScores { value: f64, counties: usize },
    #[error("extract contains no observations")]
    NoObservations,
}

/// What to do when a min-max group has zero variance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegeneratePolicy {
    /// Abort the run with a [`ScoringError`].
    #[default]
    Fail,
    /// Assign [`MIDPOINT`] to every member and record the group.
    Midpoint,
}

impl DegeneratePolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "fail" => Some(Self::Fail),
            "midpoint" => Some(Self::Midpoint),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fail => "fail",
            Self::Midpoint => "midpoint",
        }
    }
}

/// Data-quality notes gathered during one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineDiagnostics {
    pub observation_count: usize,
    pub county_count: usize,
    pub measure_count: usize,
    pub unweighted_measures: Vec<UnweightedMeasure>,
    pub degenerate_measures: Vec<String>,
    /// Counties whose measures all lacked an impact.
    pub zero_score_counties: Vec<CountyId>,
}

/// Everything one run derives from a survey extract.
#[derive(Debug, Clone)]
pub struct ScoringRun {
    pub normalized: Vec<NormalizedMeasure>,
    pub scores: Vec<CountyScore>,
    pub contributions: Vec<ContributionRecord>,
    pub rankings: Vec<CountyRankingRow>,
    pub measures: Vec<CountyMeasureRow>,
    pub diagnostics: PipelineDiagnostics,
}

/// Normalize, weight, rank and decompose, with the catalog injected.
#[derive(Debug, Clone)]
pub struct ScoringPipeline {
    catalog: MeasureCatalog,
    policy: DegeneratePolicy,
}

impl ScoringPipeline {
    pub fn new(catalog: MeasureCatalog, policy: DegeneratePolicy) -> Self {
        Self { catalog, policy }
    }

    pub fn standard(policy: DegeneratePolicy) -> Self {
        Self::new(MeasureCatalog::standard(), policy)
    }

    pub fn catalog(&self) -> &MeasureCatalog {
        &self.catalog
    }

    pub fn policy(&self) -> DegeneratePolicy {
        self.policy
    }

    pub fn run(&self, extract: &SurveyExtract) -> Result<ScoringRun, ScoringError> {
        if extract.observations.is_empty() {
            return Err(ScoringError::NoObservations);
        }

        let normalization = normalize_by_measure(&extract.observations, self.policy)?;
        let aggregation = weighted_scores(&normalization.rows, &self.catalog);
        let scores = rank_counties(&aggregation.weighted_scores, self.policy)?;
        let contributions = decompose(&normalization.rows, &self.catalog, &scores);

        let rankings = report::ranking_rows(&scores, &extract.counties);
        let measures = report::measure_rows(
            &normalization.rows,
            &contributions,
            &self.catalog,
            &extract.counties,
        );

        let measure_names: BTreeSet<&str> = normalization
            .rows
            .iter()
            .map(|row| row.measure_name.as_str())
            .collect();
        let mut zero_score_counties: Vec<CountyId> = scores
            .iter()
            .filter(|score| score.weighted_score == 0.0)
            .map(|score| score.county_id.clone())
            .collect();
        zero_score_counties.sort();

        let diagnostics = PipelineDiagnostics {
            observation_count: extract.observations.len(),
            county_count: scores.len(),
            measure_count: measure_names.len(),
            unweighted_measures: aggregation.unweighted_measures,
            degenerate_measures: normalization.degenerate_measures,
            zero_score_counties,
        };

        info!(
            observations = diagnostics.observation_count,
            counties = diagnostics.county_count,
            measures = diagnostics.measure_count,
            unweighted = diagnostics.unweighted_measures.len(),
            policy = self.policy.as_str(),
            "scoring run complete"
        );

        Ok(ScoringRun {
            normalized: normalization.rows,
            scores,
            contributions,
            rankings,
            measures,
            diagnostics,
        })
    }
}
