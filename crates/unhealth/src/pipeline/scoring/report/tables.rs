use super::super::catalog::{MeasureCatalog, UNCATEGORIZED};
use super::super::domain::{
    ContributionRecord, CountyId, CountyInfo, CountyScore, NormalizedMeasure,
};
use super::super::rank::{competition_rank, RankOrder};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One row per county; the ranking snapshot table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountyRankingRow {
    pub county_id: CountyId,
    pub display_name: String,
    pub state: String,
    pub state_abbr: Option<String>,
    pub weighted_score: f64,
    pub score_normalized: f64,
    pub rank: u32,
}

/// One row per (county, measure); the measures snapshot table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountyMeasureRow {
    pub county_id: CountyId,
    pub display_name: String,
    pub state: String,
    pub year: i32,
    pub measure_name: String,
    pub short_label: String,
    pub category: String,
    pub raw_value: f64,
    pub normalized_value: f64,
    pub weighted_measure_score: f64,
    pub percent_contribution: f64,
    pub absolute_contribution: f64,
    /// Rank within this measure across all counties, lowest prevalence first.
    pub measure_rank: u32,
}

/// Ranking joined with economic figures; the summary snapshot table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountySummaryRow {
    pub county_id: CountyId,
    pub display_name: String,
    pub state: String,
    pub state_abbr: Option<String>,
    pub score_normalized: f64,
    pub rank: u32,
    pub matched_geo_id: CountyId,
    pub population: Option<f64>,
    pub per_capita_income: Option<f64>,
    pub real_gdp_per_capita: Option<f64>,
    pub income_vs_national_pct: Option<f64>,
    pub gdp_vs_national_pct: Option<f64>,
    pub note: Option<String>,
}

fn describe<'a>(
    counties: &'a BTreeMap<CountyId, CountyInfo>,
    county_id: &'a CountyId,
) -> (&'a str, &'a str, Option<&'a str>) {
    match counties.get(county_id) {
        Some(info) => (
            info.display_name.as_str(),
            info.state_name.as_str(),
            info.state_abbr.as_deref(),
        ),
        None => (county_id.as_str(), "", None),
    }
}

/// Ranking rows in score order (rank, then county id).
pub(crate) fn ranking_rows(
    scores: &[CountyScore],
    counties: &BTreeMap<CountyId, CountyInfo>,
) -> Vec<CountyRankingRow> {
    let mut rows: Vec<CountyRankingRow> = scores
        .iter()
        .map(|score| {
            let (display_name, state, state_abbr) = describe(counties, &score.county_id);
            CountyRankingRow {
                county_id: score.county_id.clone(),
                display_name: display_name.to_string(),
                state: state.to_string(),
                state_abbr: state_abbr.map(str::to_string),
                weighted_score: score.weighted_score,
                score_normalized: score.score_normalized,
                rank: score.rank,
            }
        })
        .collect();
    rows.sort_by(|a, b| {
        a.rank
            .cmp(&b.rank)
            .then_with(|| a.county_id.cmp(&b.county_id))
    });
    rows
}

/// Measure rows ordered by county id, then measure name.
pub(crate) fn measure_rows(
    normalized: &[NormalizedMeasure],
    contributions: &[ContributionRecord],
    catalog: &MeasureCatalog,
    counties: &BTreeMap<CountyId, CountyInfo>,
) -> Vec<CountyMeasureRow> {
    let contribution_for: HashMap<(&CountyId, &str), &ContributionRecord> = contributions
        .iter()
        .map(|record| ((&record.county_id, record.measure_name.as_str()), record))
        .collect();
    let measure_ranks = measure_ranks(normalized);

    let mut rows: Vec<CountyMeasureRow> = normalized
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let (display_name, state, _) = describe(counties, &row.county_id);
            let contribution = contribution_for.get(&(&row.county_id, row.measure_name.as_str()));
            let category = row
                .category
                .as_deref()
                .or_else(|| catalog.category(&row.measure_name))
                .unwrap_or(UNCATEGORIZED);

            CountyMeasureRow {
                county_id: row.county_id.clone(),
                display_name: display_name.to_string(),
                state: state.to_string(),
                year: row.year,
                measure_name: row.measure_name.clone(),
                short_label: catalog.get_short_label(&row.measure_name).to_string(),
                category: category.to_string(),
                raw_value: row.raw_value,
                normalized_value: row.normalized_value,
                weighted_measure_score: contribution
                    .map(|record| record.weighted_measure_score)
                    .unwrap_or(0.0),
                percent_contribution: contribution
                    .map(|record| record.percent_contribution)
                    .unwrap_or(0.0),
                absolute_contribution: contribution
                    .map(|record| record.absolute_contribution)
                    .unwrap_or(0.0),
                measure_rank: measure_ranks[index],
            }
        })
        .collect();
    rows.sort_by(|a, b| {
        a.county_id
            .cmp(&b.county_id)
            .then_with(|| a.measure_name.cmp(&b.measure_name))
    });
    rows
}

/// Ascending competition rank of `raw_value` within each measure, aligned
/// with `normalized`.
fn measure_ranks(normalized: &[NormalizedMeasure]) -> Vec<u32> {
    let mut groups: HashMap<&str, Vec<usize>> = HashMap::new();
    for (index, row) in normalized.iter().enumerate() {
        groups
            .entry(row.measure_name.as_str())
            .or_default()
            .push(index);
    }

    let mut ranks = vec![0u32; normalized.len()];
    for members in groups.values() {
        let values: Vec<f64> = members
            .iter()
            .map(|&index| normalized[index].raw_value)
            .collect();
        for (&index, rank) in members
            .iter()
            .zip(competition_rank(&values, RankOrder::Ascending))
        {
            ranks[index] = rank;
        }
    }
    ranks
}
