use super::super::catalog::CATEGORY_ORDER;
use super::super::domain::CountyId;
use super::tables::{CountyMeasureRow, CountyRankingRow, CountySummaryRow};
use super::views::{
    CategoryContribution, CountyEconomicsView, CountyProfile, MeasureContributionView,
    MeasureCountyView, MeasureView, RankedCountyView, RankingOverview, ScoreBand,
};
use crate::pipeline::econ::states::state_abbreviation;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Read model over the three snapshot tables.
#[derive(Debug, Clone, Default)]
pub struct ScoreReport {
    pub rankings: Vec<CountyRankingRow>,
    pub measures: Vec<CountyMeasureRow>,
    pub summary: Vec<CountySummaryRow>,
}

impl ScoreReport {
    pub fn county_count(&self) -> usize {
        self.rankings.len()
    }

    pub fn score_band(&self) -> Option<ScoreBand> {
        let scores: Vec<f64> = self
            .rankings
            .iter()
            .map(|row| row.score_normalized)
            .collect();
        Some(ScoreBand {
            p05: percentile(&scores, 0.05)?,
            p95: percentile(&scores, 0.95)?,
        })
    }

    /// Top and bottom `limit` counties, optionally within one state. The
    /// score band always covers every county.
    pub fn overview(&self, state: Option<&str>, limit: usize) -> RankingOverview {
        let filtered: Vec<&CountyRankingRow> = self
            .rankings
            .iter()
            .filter(|row| {
                state.map_or(true, |wanted| {
                    in_state(&row.state, row.state_abbr.as_deref(), wanted)
                })
            })
            .collect();

        let least_healthy = filtered
            .iter()
            .take(limit)
            .map(|row| self.ranked_view(row))
            .collect();
        let healthiest = filtered
            .iter()
            .rev()
            .take(limit)
            .map(|row| self.ranked_view(row))
            .collect();

        RankingOverview {
            county_count: self.county_count(),
            state: state.map(display_state),
            score_band: self.score_band(),
            least_healthy,
            healthiest,
        }
    }

    pub fn county_profile(&self, county_id: &CountyId) -> Option<CountyProfile> {
        let ranking = self
            .rankings
            .iter()
            .find(|row| &row.county_id == county_id)?;

        let mut measures: Vec<&CountyMeasureRow> = self
            .measures
            .iter()
            .filter(|row| &row.county_id == county_id)
            .collect();
        measures.sort_by(|a, b| {
            b.absolute_contribution
                .partial_cmp(&a.absolute_contribution)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.measure_name.cmp(&b.measure_name))
        });

        let economics = match self.summary.iter().find(|row| &row.county_id == county_id) {
            Some(row) => CountyEconomicsView {
                available: row.population.is_some()
                    || row.per_capita_income.is_some()
                    || row.real_gdp_per_capita.is_some(),
                matched_geo_id: row.matched_geo_id.clone(),
                population: row.population,
                per_capita_income: row.per_capita_income,
                real_gdp_per_capita: row.real_gdp_per_capita,
                income_vs_national_pct: row.income_vs_national_pct,
                gdp_vs_national_pct: row.gdp_vs_national_pct,
                note: row.note.clone(),
            },
            None => CountyEconomicsView {
                available: false,
                matched_geo_id: county_id.clone(),
                population: None,
                per_capita_income: None,
                real_gdp_per_capita: None,
                income_vs_national_pct: None,
                gdp_vs_national_pct: None,
                note: None,
            },
        };

        Some(CountyProfile {
            county: self.ranked_view(ranking),
            economics,
            categories: category_totals(&measures),
            measures: measures
                .into_iter()
                .map(|row| MeasureContributionView {
                    measure_name: row.measure_name.clone(),
                    short_label: row.short_label.clone(),
                    category: row.category.clone(),
                    year: row.year,
                    raw_value: row.raw_value,
                    normalized_value: row.normalized_value,
                    absolute_contribution: row.absolute_contribution,
                    percent_contribution: row.percent_contribution,
                    measure_rank: row.measure_rank,
                })
                .collect(),
        })
    }

    /// Every county's reading for one measure, looked up by long name or
    /// short label, best (lowest) prevalence first.
    pub fn measure_view(&self, name_or_label: &str, state: Option<&str>) -> Option<MeasureView> {
        let wanted = name_or_label.trim();
        let matches = |row: &&CountyMeasureRow| {
            row.measure_name == wanted || row.short_label == wanted
        };
        let first = self.measures.iter().find(matches).or_else(|| {
            self.measures.iter().find(|row| {
                row.measure_name.eq_ignore_ascii_case(wanted)
                    || row.short_label.eq_ignore_ascii_case(wanted)
            })
        })?;

        let rows: Vec<&CountyMeasureRow> = self
            .measures
            .iter()
            .filter(|row| row.measure_name == first.measure_name)
            .collect();
        let county_count = rows.len();

        let mut counties: Vec<MeasureCountyView> = rows
            .into_iter()
            .filter(|row| state.map_or(true, |wanted| in_state(&row.state, None, wanted)))
            .map(|row| MeasureCountyView {
                county_id: row.county_id.clone(),
                display_name: row.display_name.clone(),
                state: row.state.clone(),
                year: row.year,
                raw_value: row.raw_value,
                normalized_value: row.normalized_value,
                measure_rank: row.measure_rank,
            })
            .collect();
        counties.sort_by(|a, b| {
            a.measure_rank
                .cmp(&b.measure_rank)
                .then_with(|| a.county_id.cmp(&b.county_id))
        });

        Some(MeasureView {
            measure_name: first.measure_name.clone(),
            short_label: first.short_label.clone(),
            category: first.category.clone(),
            county_count,
            counties,
        })
    }

    fn ranked_view(&self, row: &CountyRankingRow) -> RankedCountyView {
        RankedCountyView {
            county_id: row.county_id.clone(),
            display_name: row.display_name.clone(),
            state: row.state.clone(),
            state_abbr: row.state_abbr.clone(),
            score_normalized: row.score_normalized,
            rank: row.rank,
            rank_label: format!("{} of {}", row.rank, self.county_count()),
        }
    }
}

/// Matches a state filter against a full name or postal abbreviation.
/// Echoes a state filter as its postal code when it names a known state.
fn display_state(wanted: &str) -> String {
    let wanted = wanted.trim();
    match state_abbreviation(wanted) {
        Some(abbr) => abbr.to_string(),
        None if wanted.len() == 2 => wanted.to_ascii_uppercase(),
        None => wanted.to_string(),
    }
}

fn in_state(state_name: &str, state_abbr: Option<&str>, wanted: &str) -> bool {
    let wanted = wanted.trim();
    if state_name.eq_ignore_ascii_case(wanted) {
        return true;
    }
    state_abbr
        .or_else(|| state_abbreviation(state_name))
        .is_some_and(|abbr| abbr.eq_ignore_ascii_case(wanted))
}

fn category_totals(measures: &[&CountyMeasureRow]) -> Vec<CategoryContribution> {
    let mut totals: BTreeMap<&str, CategoryContribution> = BTreeMap::new();
    for row in measures {
        let entry = totals
            .entry(row.category.as_str())
            .or_insert_with(|| CategoryContribution {
                category: row.category.clone(),
                measures: 0,
                absolute_contribution: 0.0,
                percent_contribution: 0.0,
            });
        entry.measures += 1;
        entry.absolute_contribution += row.absolute_contribution;
        entry.percent_contribution += row.percent_contribution;
    }

    // BTreeMap iteration is alphabetical, so a stable sort on the fixed
    // position leaves unlisted categories in name order.
    let mut ordered: Vec<CategoryContribution> = totals.into_values().collect();
    ordered.sort_by_key(|entry| {
        CATEGORY_ORDER
            .iter()
            .position(|category| *category == entry.category)
            .unwrap_or(CATEGORY_ORDER.len())
    });
    ordered
}

/// Linear-interpolation percentile, `q` in [0, 1]. `None` for no values.
pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}
