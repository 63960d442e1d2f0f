use super::domain::{MeasureObservation, NormalizedMeasure};
use super::{DegeneratePolicy, ScoringError};
use std::collections::BTreeMap;
use tracing::warn;

/// Value assigned to every member of a zero-variance group under
/// [`DegeneratePolicy::Midpoint`].
pub const MIDPOINT: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Range {
    pub(crate) min: f64,
    pub(crate) max: f64,
}

impl Range {
    pub(crate) fn of<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        values.into_iter().fold(None, |range, value| match range {
            None => Some(Range {
                min: value,
                max: value,
            }),
            Some(Range { min, max }) => Some(Range {
                min: min.min(value),
                max: max.max(value),
            }),
        })
    }

    pub(crate) fn is_degenerate(&self) -> bool {
        self.max == self.min
    }

    /// Min-max rescale onto [0, 100]. Callers must check `is_degenerate` first.
    pub(crate) fn scale(&self, value: f64) -> f64 {
        (value - self.min) / (self.max - self.min) * 100.0
    }
}

/// Outcome of normalizing every measure group in a run.
#[derive(Debug, Clone, Default)]
pub struct MeasureNormalization {
    pub rows: Vec<NormalizedMeasure>,
    /// Measures whose group had zero variance and were set to the midpoint.
    pub degenerate_measures: Vec<String>,
}

/// Rescales raw values to [0, 100] within each measure group.
///
/// Rows come back grouped by measure name (ascending), keeping input order
/// inside each group. A county absent from a measure is simply absent from
/// that group.
pub fn normalize_by_measure(
    observations: &[MeasureObservation],
    policy: DegeneratePolicy,
) -> Result<MeasureNormalization, ScoringError> {
    let mut groups: BTreeMap<&str, Vec<&MeasureObservation>> = BTreeMap::new();
    for observation in observations {
        groups
            .entry(observation.measure_name.as_str())
            .or_default()
            .push(observation);
    }

    let mut normalization = MeasureNormalization::default();
    for (measure, members) in groups {
        let Some(range) = Range::of(members.iter().map(|row| row.raw_value)) else {
            continue;
        };

        let degenerate = range.is_degenerate();
        if degenerate {
            match policy {
                DegeneratePolicy::Fail => {
                    return Err(ScoringError::DegenerateMeasure {
                        measure: measure.to_string(),
                        value: range.min,
                    });
                }
                DegeneratePolicy::Midpoint => {
                    warn!(
                        measure,
                        value = range.min,
                        counties = members.len(),
                        "measure has zero variance; assigning midpoint"
                    );
                    normalization.degenerate_measures.push(measure.to_string());
                }
            }
        }

        normalization
            .rows
            .extend(members.into_iter().map(|row| NormalizedMeasure {
                county_id: row.county_id.clone(),
                measure_name: row.measure_name.clone(),
                year: row.year,
                raw_value: row.raw_value,
                normalized_value: if degenerate {
                    MIDPOINT
                } else {
                    range.scale(row.raw_value)
                },
                category: row.category.clone(),
            }));
    }

    Ok(normalization)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::scoring::domain::CountyId;

    fn observation(county: &str, measure: &str, value: f64) -> MeasureObservation {
        MeasureObservation {
            county_id: CountyId::parse(county).expect("valid county"),
            measure_name: measure.to_string(),
            year: 2023,
            raw_value: value,
            category: None,
        }
    }

    fn normalized_for<'a>(
        rows: &'a [NormalizedMeasure],
        county: &str,
        measure: &str,
    ) -> Option<&'a NormalizedMeasure> {
        rows.iter()
            .find(|row| row.county_id.as_str() == county && row.measure_name == measure)
    }

    #[test]
    fn each_measure_spans_zero_to_hundred() {
        let observations = vec![
            observation("01001", "Obesity", 10.0),
            observation("01003", "Obesity", 50.0),
            observation("01005", "Obesity", 90.0),
            observation("01001", "Smoking", 22.0),
            observation("01003", "Smoking", 12.0),
        ];

        let result = normalize_by_measure(&observations, DegeneratePolicy::Fail)
            .expect("normalization succeeds");

        let values = |measure: &str| -> Vec<f64> {
            result
                .rows
                .iter()
                .filter(|row| row.measure_name == measure)
                .map(|row| row.normalized_value)
                .collect()
        };
        assert_eq!(values("Obesity"), vec![0.0, 50.0, 100.0]);
        assert_eq!(values("Smoking"), vec![100.0, 0.0]);
        assert!(result.degenerate_measures.is_empty());
    }

    #[test]
    fn absent_county_is_not_part_of_the_group() {
        let observations = vec![
            observation("01001", "Obesity", 20.0),
            observation("01003", "Obesity", 40.0),
            observation("01005", "Smoking", 5.0),
            observation("01001", "Smoking", 15.0),
        ];

        let result = normalize_by_measure(&observations, DegeneratePolicy::Fail)
            .expect("normalization succeeds");

        assert!(normalized_for(&result.rows, "01005", "Obesity").is_none());
        assert_eq!(result.rows.len(), 4);
        let high = normalized_for(&result.rows, "01003", "Obesity").expect("row present");
        assert_eq!(high.normalized_value, 100.0);
    }

    #[test]
    fn zero_variance_fails_under_default_policy() {
        let observations = vec![
            observation("01001", "Obesity", 20.0),
            observation("01003", "Obesity", 20.0),
        ];

        let error = normalize_by_measure(&observations, DegeneratePolicy::Fail)
            .expect_err("zero variance rejected");
        match error {
            ScoringError::DegenerateMeasure { measure, value } => {
                assert_eq!(measure, "Obesity");
                assert_eq!(value, 20.0);
            }
            other => panic!("expected degenerate measure error, got {other:?}"),
        }
    }

    #[test]
    fn zero_variance_uses_midpoint_when_configured() {
        let observations = vec![
            observation("01001", "Obesity", 20.0),
            observation("01003", "Obesity", 20.0),
        ];

        let result = normalize_by_measure(&observations, DegeneratePolicy::Midpoint)
            .expect("midpoint applied");
        assert!(result.rows.iter().all(|row| row.normalized_value == MIDPOINT));
        assert_eq!(result.degenerate_measures, vec!["Obesity".to_string()]);
    }

    #[test]
    fn range_of_empty_input_is_none() {
        assert!(Range::of(Vec::<f64>::new()).is_none());
        let range = Range::of([3.0, 1.0, 2.0]).expect("range");
        assert_eq!(range, Range { min: 1.0, max: 3.0 });
        assert_eq!(range.scale(2.0), 50.0);
    }
}
