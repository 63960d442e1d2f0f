use super::states::state_abbreviation;
use super::EconomicDataset;
use crate::pipeline::scoring::{CountyId, CountyInfo};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JoinOutcome {
    Exact,
    Substituted { geo_name: String },
    Unmatched,
}

/// Economic geography a county's figures come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomicJoinRecord {
    pub county_id: CountyId,
    /// Same as `county_id` unless a neighbouring or combined area stands in.
    pub matched_geo_id: CountyId,
    pub outcome: JoinOutcome,
    pub note: Option<String>,
}

impl EconomicJoinRecord {
    pub fn has_economic_data(&self) -> bool {
        !matches!(self.outcome, JoinOutcome::Unmatched)
    }
}

/// Reconciles county ids with an economic extract that may partition
/// counties differently (e.g. Virginia independent cities folded into a
/// combined area).
pub struct EconomicJoinResolver<'a> {
    dataset: &'a EconomicDataset,
}

impl<'a> EconomicJoinResolver<'a> {
    pub fn new(dataset: &'a EconomicDataset) -> Self {
        Self { dataset }
    }

    pub fn resolve(&self, county: &CountyInfo) -> EconomicJoinRecord {
        if self.dataset.contains_geo(&county.county_id) {
            return EconomicJoinRecord {
                county_id: county.county_id.clone(),
                matched_geo_id: county.county_id.clone(),
                outcome: JoinOutcome::Exact,
                note: None,
            };
        }

        match self.find_substitute(county) {
            Some((geo_id, geo_name)) => {
                info!(
                    county_id = %county.county_id,
                    matched_geo_id = %geo_id,
                    geo_name,
                    "substituted economic geography"
                );
                EconomicJoinRecord {
                    county_id: county.county_id.clone(),
                    matched_geo_id: geo_id.clone(),
                    note: Some(format!("Econ data from {geo_name}")),
                    outcome: JoinOutcome::Substituted {
                        geo_name: geo_name.to_string(),
                    },
                }
            }
            None => {
                debug!(county_id = %county.county_id, "no economic data for county");
                EconomicJoinRecord {
                    county_id: county.county_id.clone(),
                    matched_geo_id: county.county_id.clone(),
                    outcome: JoinOutcome::Unmatched,
                    note: None,
                }
            }
        }
    }

    /// Case-insensitive substring search over same-state place names, first
    /// with the full county name and then with its first word. The first
    /// place in extract order wins.
    fn find_substitute(&self, county: &CountyInfo) -> Option<(&'a CountyId, &'a str)> {
        let state_abbr = county
            .state_abbr
            .as_deref()
            .or_else(|| state_abbreviation(&county.state_name))?;
        let places = self.dataset.places_in_state(state_abbr);
        if places.is_empty() {
            return None;
        }

        let full_name = county.display_name.trim().to_lowercase();
        let first_token = full_name.split_whitespace().next().unwrap_or_default();

        let found = [full_name.as_str(), first_token]
            .into_iter()
            .filter(|needle| !needle.is_empty())
            .find_map(|needle| {
                places
                    .iter()
                    .find(|(_, geo_name)| geo_name.to_lowercase().contains(needle))
                    .copied()
            });
        found
    }
}

#[cfg(test)]
mod tests {
    use super::super::EconomicRecord;
    use super::*;

    fn id(raw: &str) -> CountyId {
        CountyId::parse(raw).expect("valid county")
    }

    fn record(geo_id: &str, geo_name: &str, state_abbr: &str) -> EconomicRecord {
        EconomicRecord {
            geo_id: id(geo_id),
            geo_name: geo_name.to_string(),
            state_abbr: Some(state_abbr.to_string()),
            statistic_name: "Population".to_string(),
            time_period: 2022,
            value: 1000.0,
        }
    }

    fn county(county_id: &str, name: &str, state_name: &str) -> CountyInfo {
        CountyInfo {
            county_id: id(county_id),
            display_name: name.to_string(),
            state_name: state_name.to_string(),
            state_abbr: None,
        }
    }

    fn dataset() -> EconomicDataset {
        EconomicDataset::new(vec![
            record("51003", "Albemarle, VA", "VA"),
            record("51901", "Albemarle + Charlottesville, VA", "VA"),
            record("29510", "St. Louis City, MO", "MO"),
            record("29189", "St. Louis County, MO", "MO"),
            record("24510", "Charlottesville Heights, MD", "MD"),
        ])
    }

    #[test]
    fn exact_match_keeps_the_county_id() {
        let dataset = dataset();
        let joined = EconomicJoinResolver::new(&dataset).resolve(&county(
            "51003",
            "Albemarle",
            "Virginia",
        ));
        assert_eq!(joined.outcome, JoinOutcome::Exact);
        assert_eq!(joined.matched_geo_id, id("51003"));
        assert!(joined.note.is_none());
    }

    #[test]
    fn missing_county_falls_back_to_same_state_name_match() {
        let dataset = dataset();
        let joined = EconomicJoinResolver::new(&dataset).resolve(&county(
            "51540",
            "Charlottesville",
            "Virginia",
        ));
        assert_eq!(joined.matched_geo_id, id("51901"));
        assert_eq!(
            joined.note.as_deref(),
            Some("Econ data from Albemarle + Charlottesville, VA")
        );
        assert!(joined.has_economic_data());
    }

    #[test]
    fn first_token_retry_and_first_match_wins() {
        let dataset = dataset();
        let joined = EconomicJoinResolver::new(&dataset).resolve(&county(
            "29999",
            "St. Ambiguous",
            "Missouri",
        ));
        assert_eq!(joined.matched_geo_id, id("29510"));
    }

    #[test]
    fn unmatched_county_keeps_its_id_without_note() {
        let dataset = dataset();
        let joined =
            EconomicJoinResolver::new(&dataset).resolve(&county("51999", "Nowhere", "Virginia"));
        assert_eq!(joined.outcome, JoinOutcome::Unmatched);
        assert_eq!(joined.matched_geo_id, id("51999"));
        assert!(joined.note.is_none());
        assert!(!joined.has_economic_data());

        let foreign =
            EconomicJoinResolver::new(&dataset).resolve(&county("72001", "Adjuntas", "Puerto Rico"));
        assert_eq!(foreign.outcome, JoinOutcome::Unmatched);
    }
}
