use super::{EconImportError, EconomicRecord};
use crate::pipeline::fields::{empty_string_as_none, normalize_name};
use crate::pipeline::scoring::CountyId;
use serde::Deserialize;
use std::io::Read;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct EconomicRow {
    geo_id: String,
    geo_name: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    state_abbr: Option<String>,
    statistic_name: String,
    time_period: i32,
    value: String,
}

pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<EconomicRecord>, EconImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut records = Vec::new();

    for result in csv_reader.records() {
        let raw = result?;
        let line = raw.position().map(|position| position.line()).unwrap_or(0);
        let row: EconomicRow = raw.deserialize(Some(&headers))?;

        let geo_id = CountyId::parse(&row.geo_id).map_err(|err| EconImportError::InvalidRow {
            line,
            reason: err.to_string(),
        })?;
        let Ok(value) = row.value.parse::<f64>() else {
            debug!(line, geo_id = %geo_id, value = %row.value, "skipping non-numeric economic value");
            continue;
        };
        if !value.is_finite() {
            debug!(line, geo_id = %geo_id, "skipping non-finite economic value");
            continue;
        }

        records.push(EconomicRecord {
            geo_id,
            geo_name: normalize_name(&row.geo_name.replace('*', "")),
            state_abbr: row.state_abbr.map(|abbr| abbr.to_ascii_uppercase()),
            statistic_name: normalize_name(&row.statistic_name),
            time_period: row.time_period,
            value,
        });
    }

    Ok(records)
}
