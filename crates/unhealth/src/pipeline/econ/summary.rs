use super::resolver::{EconomicJoinRecord, EconomicJoinResolver};
use super::{EconomicDataset, PER_CAPITA_INCOME, POPULATION, REAL_GDP_PER_CAPITA};
use crate::pipeline::scoring::report::{CountyRankingRow, CountySummaryRow};
use crate::pipeline::scoring::CountyInfo;
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct EconomicSummary {
    pub rows: Vec<CountySummaryRow>,
    pub joins: Vec<EconomicJoinRecord>,
}

impl EconomicSummary {
    pub fn unmatched(&self) -> usize {
        self.joins
            .iter()
            .filter(|join| !join.has_economic_data())
            .count()
    }
}

/// `round((local - national) / national * 100, 2)`; absent when either side
/// is missing or the national figure is zero.
pub fn percent_vs_national(local: Option<f64>, national: Option<f64>) -> Option<f64> {
    let (local, national) = (local?, national?);
    if national == 0.0 {
        return None;
    }
    Some(((local - national) / national * 100.0 * 100.0).round() / 100.0)
}

/// Joins each ranked county with its economic figures.
///
/// `dataset` should already be narrowed to one year. Without a dataset every
/// county is reported with no economic data. Rows keep the ranking order.
pub fn build_summary(
    rankings: &[CountyRankingRow],
    dataset: Option<&EconomicDataset>,
) -> EconomicSummary {
    let empty = EconomicDataset::default();
    let dataset = dataset.unwrap_or(&empty);
    let resolver = EconomicJoinResolver::new(dataset);
    let national_income = dataset.national(PER_CAPITA_INCOME);
    let national_gdp = dataset.national(REAL_GDP_PER_CAPITA);

    let mut summary = EconomicSummary::default();
    for ranking in rankings {
        let join = resolver.resolve(&CountyInfo {
            county_id: ranking.county_id.clone(),
            display_name: ranking.display_name.clone(),
            state_name: ranking.state.clone(),
            state_abbr: ranking.state_abbr.clone(),
        });

        let figure = |statistic: &str| {
            join.has_economic_data()
                .then(|| dataset.value(&join.matched_geo_id, statistic))
                .flatten()
        };
        let per_capita_income = figure(PER_CAPITA_INCOME);
        let real_gdp_per_capita = figure(REAL_GDP_PER_CAPITA);

        summary.rows.push(CountySummaryRow {
            county_id: ranking.county_id.clone(),
            display_name: ranking.display_name.clone(),
            state: ranking.state.clone(),
            state_abbr: ranking.state_abbr.clone(),
            score_normalized: ranking.score_normalized,
            rank: ranking.rank,
            matched_geo_id: join.matched_geo_id.clone(),
            population: figure(POPULATION),
            per_capita_income,
            real_gdp_per_capita,
            income_vs_national_pct: percent_vs_national(per_capita_income, national_income),
            gdp_vs_national_pct: percent_vs_national(real_gdp_per_capita, national_gdp),
            note: join.note.clone(),
        });
        summary.joins.push(join);
    }

    info!(
        counties = summary.rows.len(),
        unmatched = summary.unmatched(),
        "joined rankings with economic data"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::super::EconomicRecord;
    use super::*;
    use crate::pipeline::scoring::CountyId;

    fn id(raw: &str) -> CountyId {
        CountyId::parse(raw).expect("valid county")
    }

    fn stat(geo_id: &str, geo_name: &str, statistic: &str, value: f64) -> EconomicRecord {
        EconomicRecord {
            geo_id: id(geo_id),
            geo_name: geo_name.to_string(),
            state_abbr: (geo_id != CountyId::NATIONAL).then(|| "VA".to_string()),
            statistic_name: statistic.to_string(),
            time_period: 2022,
            value,
        }
    }

    fn ranking(county_id: &str, name: &str, rank: u32) -> CountyRankingRow {
        CountyRankingRow {
            county_id: id(county_id),
            display_name: name.to_string(),
            state: "Virginia".to_string(),
            state_abbr: Some("VA".to_string()),
            weighted_score: 100.0,
            score_normalized: 50.0,
            rank,
        }
    }

    #[test]
    fn percent_difference_is_rounded_to_two_places() {
        assert_eq!(percent_vs_national(Some(110.0), Some(100.0)), Some(10.0));
        assert_eq!(percent_vs_national(Some(1.0), Some(3.0)), Some(-66.67));
        assert_eq!(percent_vs_national(None, Some(3.0)), None);
        assert_eq!(percent_vs_national(Some(1.0), Some(0.0)), None);
    }

    #[test]
    fn summary_carries_figures_notes_and_missing_data() {
        let dataset = EconomicDataset::new(vec![
            stat("00000", "United States", PER_CAPITA_INCOME, 60000.0),
            stat("51003", "Albemarle, VA", PER_CAPITA_INCOME, 66000.0),
            stat("51003", "Albemarle, VA", POPULATION, 112000.0),
            stat("51901", "Albemarle + Charlottesville, VA", PER_CAPITA_INCOME, 54000.0),
        ]);
        let rankings = vec![
            ranking("51003", "Albemarle", 1),
            ranking("51540", "Charlottesville", 2),
            ranking("51999", "Nowhere", 3),
        ];

        let summary = build_summary(&rankings, Some(&dataset));
        assert_eq!(summary.rows.len(), 3);
        assert_eq!(summary.unmatched(), 1);

        let albemarle = &summary.rows[0];
        assert_eq!(albemarle.population, Some(112000.0));
        assert_eq!(albemarle.income_vs_national_pct, Some(10.0));
        assert_eq!(albemarle.real_gdp_per_capita, None);
        assert_eq!(albemarle.gdp_vs_national_pct, None);

        let charlottesville = &summary.rows[1];
        assert_eq!(charlottesville.matched_geo_id, id("51901"));
        assert_eq!(charlottesville.income_vs_national_pct, Some(-10.0));
        assert!(charlottesville.note.is_some());

        let nowhere = &summary.rows[2];
        assert_eq!(nowhere.per_capita_income, None);
        assert_eq!(nowhere.note, None);
    }

    #[test]
    fn summary_without_dataset_has_no_figures() {
        let summary = build_summary(&[ranking("51003", "Albemarle", 1)], None);
        assert_eq!(summary.unmatched(), 1);
        assert_eq!(summary.rows[0].population, None);
        assert_eq!(summary.rows[0].matched_geo_id, id("51003"));
    }
}
