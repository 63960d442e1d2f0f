use super::super::domain::CountyId;
use serde::Serialize;

/// Colour band for the choropleth: 5th and 95th percentile scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBand {
    pub p05: f64,
    pub p95: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedCountyView {
    pub county_id: CountyId,
    pub display_name: String,
    pub state: String,
    pub state_abbr: Option<String>,
    pub score_normalized: f64,
    pub rank: u32,
    /// "N of total", e.g. "12 of 3143".
    pub rank_label: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankingOverview {
    pub county_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_band: Option<ScoreBand>,
    /// Highest scores first.
    pub least_healthy: Vec<RankedCountyView>,
    /// Lowest scores first.
    pub healthiest: Vec<RankedCountyView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CountyEconomicsView {
    pub available: bool,
    pub matched_geo_id: CountyId,
    pub population: Option<f64>,
    pub per_capita_income: Option<f64>,
    pub real_gdp_per_capita: Option<f64>,
    pub income_vs_national_pct: Option<f64>,
    pub gdp_vs_national_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryContribution {
    pub category: String,
    pub measures: usize,
    pub absolute_contribution: f64,
    pub percent_contribution: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MeasureContributionView {
    pub measure_name: String,
    pub short_label: String,
    pub category: String,
    pub year: i32,
    pub raw_value: f64,
    pub normalized_value: f64,
    pub absolute_contribution: f64,
    pub percent_contribution: f64,
    pub measure_rank: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct CountyProfile {
    pub county: RankedCountyView,
    pub economics: CountyEconomicsView,
    pub categories: Vec<CategoryContribution>,
    pub measures: Vec<MeasureContributionView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MeasureCountyView {
    pub county_id: CountyId,
    pub display_name: String,
    pub state: String,
    pub year: i32,
    pub raw_value: f64,
    pub normalized_value: f64,
    pub measure_rank: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct MeasureView {
    pub measure_name: String,
    pub short_label: String,
    pub category: String,
    /// Counties reporting this measure, before any state filter.
    pub county_count: usize,
    pub counties: Vec<MeasureCountyView>,
}
