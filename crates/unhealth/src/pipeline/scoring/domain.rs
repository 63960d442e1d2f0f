use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Five-digit FIPS code. Leading zeros are significant, so it is never a number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct CountyId(String);

impl CountyId {
    /// Geo id the economic extract uses for the national aggregate.
    pub const NATIONAL: &'static str = "00000";

    pub fn parse(raw: &str) -> Result<Self, InvalidCountyId> {
        let trimmed = raw.trim();
        if trimmed.len() == 5 && trimmed.bytes().all(|byte| byte.is_ascii_digit()) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(InvalidCountyId(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_national(&self) -> bool {
        self.0 == Self::NATIONAL
    }
}

impl TryFrom<String> for CountyId {
    type Error = InvalidCountyId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl fmt::Display for CountyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("county id '{0}' must be exactly five ASCII digits")]
pub struct InvalidCountyId(pub String);

/// One (county, measure) survey reading after polarity inversion.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasureObservation {
    pub county_id: CountyId,
    pub measure_name: String,
    pub year: i32,
    /// Prevalence in [0, 100]; higher is always worse.
    pub raw_value: f64,
    pub category: Option<String>,
}

/// Display metadata carried alongside the observations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountyInfo {
    pub county_id: CountyId,
    pub display_name: String,
    pub state_name: String,
    pub state_abbr: Option<String>,
}

/// Deduplicated, oriented input for one scoring run.
#[derive(Debug, Clone, Default)]
pub struct SurveyExtract {
    pub observations: Vec<MeasureObservation>,
    pub counties: BTreeMap<CountyId, CountyInfo>,
}

impl SurveyExtract {
    pub fn county(&self, county_id: &CountyId) -> Option<&CountyInfo> {
        self.counties.get(county_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedMeasure {
    pub county_id: CountyId,
    pub measure_name: String,
    pub year: i32,
    pub raw_value: f64,
    /// Position of `raw_value` within the measure's min/max range, in [0, 100].
    pub normalized_value: f64,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountyScore {
    pub county_id: CountyId,
    pub weighted_score: f64,
    pub score_normalized: f64,
    /// 1 is the least healthy county. Ties share the rank of the first tied position.
    pub rank: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContributionRecord {
    pub county_id: CountyId,
    pub measure_name: String,
    pub weighted_measure_score: f64,
    pub percent_contribution: f64,
    pub absolute_contribution: f64,
}
