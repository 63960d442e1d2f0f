use super::catalog::MeasureCatalog;
use super::domain::{ContributionRecord, CountyId, CountyScore, NormalizedMeasure};
use std::collections::HashMap;

/// Attributes each county's final score to its measures.
///
/// `absolute_contribution` values for one county sum to its
/// `score_normalized`. A county whose weighted score is zero gets zero
/// contributions rather than NaN.
pub fn decompose(
    normalized: &[NormalizedMeasure],
    catalog: &MeasureCatalog,
    scores: &[CountyScore],
) -> Vec<ContributionRecord> {
    let by_county: HashMap<&CountyId, &CountyScore> =
        scores.iter().map(|score| (&score.county_id, score)).collect();

    normalized
        .iter()
        .filter_map(|row| {
            let county = by_county.get(&row.county_id)?;
            let weighted_measure_score =
                row.normalized_value * f64::from(catalog.get_impact(&row.measure_name));
            let percent_contribution = if county.weighted_score == 0.0 {
                0.0
            } else {
                weighted_measure_score / county.weighted_score
            };

            Some(ContributionRecord {
                county_id: row.county_id.clone(),
                measure_name: row.measure_name.clone(),
                weighted_measure_score,
                percent_contribution,
                absolute_contribution: county.score_normalized * percent_contribution,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn county(id: &str) -> CountyId {
        CountyId::parse(id).expect("valid county")
    }

    fn row(id: &str, measure: &str, normalized_value: f64) -> NormalizedMeasure {
        NormalizedMeasure {
            county_id: county(id),
            measure_name: measure.to_string(),
            year: 2023,
            raw_value: normalized_value,
            normalized_value,
            category: None,
        }
    }

    fn catalog() -> MeasureCatalog {
        MeasureCatalog::builder()
            .measure("Stroke", 5, None, None)
            .measure("Asthma", 2, None, None)
            .build()
    }

    #[test]
    fn contributions_reconstruct_the_final_score() {
        let rows = vec![row("01001", "Stroke", 60.0), row("01001", "Asthma", 50.0)];
        let scores = vec![CountyScore {
            county_id: county("01001"),
            weighted_score: 400.0,
            score_normalized: 80.0,
            rank: 1,
        }];

        let records = decompose(&rows, &catalog(), &scores);
        assert_eq!(records.len(), 2);
        assert!((records[0].percent_contribution - 0.75).abs() < 1e-12);
        assert!((records[0].absolute_contribution - 60.0).abs() < 1e-12);
        assert!((records[1].absolute_contribution - 20.0).abs() < 1e-12);
        let total: f64 = records.iter().map(|record| record.absolute_contribution).sum();
        assert!((total - 80.0).abs() < 1e-6);
    }

    #[test]
    fn zero_weighted_score_yields_zero_contributions() {
        let rows = vec![row("01001", "Stroke", 0.0), row("01001", "Unknown", 90.0)];
        let scores = vec![CountyScore {
            county_id: county("01001"),
            weighted_score: 0.0,
            score_normalized: 0.0,
            rank: 2,
        }];

        let records = decompose(&rows, &catalog(), &scores);
        assert!(records.iter().all(|record| record.percent_contribution == 0.0
            && record.absolute_contribution == 0.0
            && !record.absolute_contribution.is_nan()));
    }
}
