use super::catalog::MeasureCatalog;
use super::domain::{CountyId, NormalizedMeasure};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// A measure present in the extract that carries no catalog impact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnweightedMeasure {
    pub measure_name: String,
    pub rows: usize,
}

#[derive(Debug, Clone, Default)]
pub struct WeightedAggregation {
    pub weighted_scores: BTreeMap<CountyId, f64>,
    pub unweighted_measures: Vec<UnweightedMeasure>,
}

/// Sums `normalized_value * impact` per county.
///
/// Missing measures are not compensated for: a county with sparser data just
/// has fewer terms. Measures without an impact contribute nothing and are
/// reported once each.
pub fn weighted_scores(
    normalized: &[NormalizedMeasure],
    catalog: &MeasureCatalog,
) -> WeightedAggregation {
    let mut weighted_scores: BTreeMap<CountyId, f64> = BTreeMap::new();
    let mut unweighted: BTreeMap<&str, usize> = BTreeMap::new();

    for row in normalized {
        let impact = catalog.get_impact(&row.measure_name);
        if impact == 0 {
            *unweighted.entry(row.measure_name.as_str()).or_default() += 1;
        }
        *weighted_scores.entry(row.county_id.clone()).or_default() +=
            row.normalized_value * f64::from(impact);
    }

    let unweighted_measures = unweighted
        .into_iter()
        .map(|(measure_name, rows)| {
            warn!(
                measure = measure_name,
                rows, "measure has no catalog impact; excluded from weighted score"
            );
            UnweightedMeasure {
                measure_name: measure_name.to_string(),
                rows,
            }
        })
        .collect();

    WeightedAggregation {
        weighted_scores,
        unweighted_measures,
    }
}
