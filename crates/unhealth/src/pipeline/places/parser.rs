use crate::pipeline::fields::{empty_string_as_none, normalize_name};
use serde::Deserialize;
use std::io::Read;

/// A trimmed, unvalidated extract row with its 1-based file line.
#[derive(Debug)]
pub(crate) struct PlacesRecord {
    pub(crate) line: u64,
    pub(crate) county_id: String,
    pub(crate) measure_name: String,
    pub(crate) year: i32,
    pub(crate) raw_value: String,
    pub(crate) state_name: String,
    pub(crate) county_display_name: String,
    pub(crate) state_abbr: Option<String>,
    pub(crate) category: Option<String>,
}

impl PlacesRecord {
    /// National and state summary rows name the state as the "county".
    pub(crate) fn is_state_level(&self) -> bool {
        self.county_display_name
            .eq_ignore_ascii_case(&self.state_name)
    }
}

pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<PlacesRecord>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut records = Vec::new();

    for result in csv_reader.records() {
        let raw = result?;
        let line = raw.position().map(|position| position.line()).unwrap_or(0);
        let row: PlacesRow = raw.deserialize(Some(&headers))?;

        records.push(PlacesRecord {
            line,
            county_id: row.county_id,
            measure_name: normalize_name(&row.measure_name),
            year: row.year,
            raw_value: row.raw_value,
            state_name: normalize_name(&row.state_name),
            county_display_name: normalize_name(&row.county_display_name),
            state_abbr: row.state_abbr,
            category: row.category.map(|category| normalize_name(&category)),
        });
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
struct PlacesRow {
    county_id: String,
    measure_name: String,
    year: i32,
    raw_value: String,
    state_name: String,
    county_display_name: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    state_abbr: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    category: Option<String>,
}
