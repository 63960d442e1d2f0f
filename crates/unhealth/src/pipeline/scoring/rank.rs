use super::domain::{CountyId, CountyScore};
use super::normalize::{Range, MIDPOINT};
use super::{DegeneratePolicy, ScoringError};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankOrder {
    /// Largest value gets rank 1.
    Descending,
    /// Smallest value gets rank 1.
    Ascending,
}

/// Competition ("min") ranking: rank = 1 + number of strictly better values.
///
/// Ties share a rank and the following rank is skipped, so four values with a
/// tie in second place rank 1, 2, 2, 4. Returned ranks line up with `values`.
pub fn competition_rank(values: &[f64], order: RankOrder) -> Vec<u32> {
    let mut indices: Vec<usize> = (0..values.len()).collect();
    indices.sort_by(|&a, &b| {
        let ordering = values[a].partial_cmp(&values[b]).unwrap_or(Ordering::Equal);
        match order {
            RankOrder::Descending => ordering.reverse(),
            RankOrder::Ascending => ordering,
        }
    });

    let mut ranks = vec![0u32; values.len()];
    let mut previous: Option<(f64, u32)> = None;
    for (position, &index) in indices.iter().enumerate() {
        let value = values[index];
        let rank = match previous {
            Some((prior, prior_rank)) if prior == value => prior_rank,
            _ => position as u32 + 1,
        };
        ranks[index] = rank;
        previous = Some((value, rank));
    }

    ranks
}

/// Min-max normalizes county weighted scores onto [0, 100] and ranks them,
/// least healthy first.
///
/// The result is ordered by rank, then county id.
pub fn rank_counties(
    weighted_scores: &BTreeMap<CountyId, f64>,
    policy: DegeneratePolicy,
) -> Result<Vec<CountyScore>, ScoringError> {
    let Some(range) = Range::of(weighted_scores.values().copied()) else {
        return Ok(Vec::new());
    };

    let degenerate = range.is_degenerate();
    if degenerate {
        match policy {
            DegeneratePolicy::Fail => {
                return Err(ScoringError::DegenerateCountyScores {
                    value: range.min,
                    counties: weighted_scores.len(),
                });
            }
            DegeneratePolicy::Midpoint => warn!(
                value = range.min,
                counties = weighted_scores.len(),
                "county weighted scores have zero variance; assigning midpoint"
            ),
        }
    }

    // All-zero scores have nothing to attribute, so they stay at zero.
    let flat_score = if range.min == 0.0 { 0.0 } else { MIDPOINT };
    let normalized: Vec<f64> = weighted_scores
        .values()
        .map(|&score| {
            if degenerate {
                flat_score
            } else {
                range.scale(score)
            }
        })
        .collect();
    let ranks = competition_rank(&normalized, RankOrder::Descending);

    let mut scores: Vec<CountyScore> = weighted_scores
        .iter()
        .zip(normalized)
        .zip(ranks)
        .map(
            |(((county_id, &weighted_score), score_normalized), rank)| CountyScore {
                county_id: county_id.clone(),
                weighted_score,
                score_normalized,
                rank,
            },
        )
        .collect();
    scores.sort_by(|a, b| {
        a.rank
            .cmp(&b.rank)
            .then_with(|| a.county_id.cmp(&b.county_id))
    });

    Ok(scores)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(pairs: &[(&str, f64)]) -> BTreeMap<CountyId, f64> {
        pairs
            .iter()
            .map(|(county, score)| (CountyId::parse(county).expect("valid county"), *score))
            .collect()
    }

    #[test]
    fn ties_share_rank_and_skip_the_next() {
        assert_eq!(
            competition_rank(&[10.0, 30.0, 30.0, 5.0], RankOrder::Descending),
            vec![3, 1, 1, 4]
        );
        assert_eq!(
            competition_rank(&[90.0, 50.0, 50.0, 10.0], RankOrder::Descending),
            vec![1, 2, 2, 4]
        );
    }

    #[test]
    fn ascending_rank_puts_smallest_first() {
        assert_eq!(
            competition_rank(&[3.5, 1.0, 3.5, 2.0], RankOrder::Ascending),
            vec![3, 1, 3, 2]
        );
        assert!(competition_rank(&[], RankOrder::Ascending).is_empty());
    }

    #[test]
    fn three_county_scenario_normalizes_and_ranks() {
        let ranked = rank_counties(
            &scores(&[("01001", 0.0), ("01003", 250.0), ("01005", 500.0)]),
            DegeneratePolicy::Fail,
        )
        .expect("ranking succeeds");

        let summary: Vec<(&str, f64, u32)> = ranked
            .iter()
            .map(|score| (score.county_id.as_str(), score.score_normalized, score.rank))
            .collect();
        assert_eq!(
            summary,
            vec![("01005", 100.0, 1), ("01003", 50.0, 2), ("01001", 0.0, 3)]
        );
    }

    #[test]
    fn tied_weighted_scores_rank_one_one_three() {
        let ranked = rank_counties(
            &scores(&[("01001", 400.0), ("01003", 400.0), ("01005", 100.0)]),
            DegeneratePolicy::Fail,
        )
        .expect("ranking succeeds");

        let ranks: Vec<u32> = ranked.iter().map(|score| score.rank).collect();
        assert_eq!(ranks, vec![1, 1, 3]);
        assert_eq!(ranked[0].county_id.as_str(), "01001");
        assert_eq!(ranked[1].county_id.as_str(), "01003");
    }

    #[test]
    fn single_county_is_degenerate() {
        let single = scores(&[("01001", 120.0)]);
        let error = rank_counties(&single, DegeneratePolicy::Fail).expect_err("degenerate");
        assert!(matches!(
            error,
            ScoringError::DegenerateCountyScores { counties: 1, .. }
        ));

        let ranked = rank_counties(&single, DegeneratePolicy::Midpoint).expect("midpoint");
        assert_eq!(ranked[0].score_normalized, MIDPOINT);
        assert_eq!(ranked[0].rank, 1);
    }

    #[test]
    fn all_zero_scores_stay_at_zero_under_midpoint() {
        let zeros = scores(&[("01001", 0.0), ("01003", 0.0)]);
        let ranked = rank_counties(&zeros, DegeneratePolicy::Midpoint).expect("midpoint");
        assert!(ranked.iter().all(|score| score.score_normalized == 0.0));
        assert!(ranked.iter().all(|score| score.rank == 1));
    }

    #[test]
    fn empty_input_ranks_nothing() {
        let ranked = rank_counties(&BTreeMap::new(), DegeneratePolicy::Fail).expect("empty");
        assert!(ranked.is_empty());
    }
}
