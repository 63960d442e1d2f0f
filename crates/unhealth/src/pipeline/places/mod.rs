mod parser;

use crate::pipeline::econ::states::state_abbreviation;
use crate::pipeline::scoring::{
    CountyId, CountyInfo, MeasureCatalog, MeasureObservation, SurveyExtract,
};
use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

use parser::PlacesRecord;

#[derive(Debug)]
pub enum PlacesImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidRow { line: u64, reason: String },
}

impl std::fmt::Display for PlacesImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlacesImportError::Io(err) => write!(f, "failed to read survey extract: {}", err),
            PlacesImportError::Csv(err) => write!(f, "invalid survey CSV data: {}", err),
            PlacesImportError::InvalidRow { line, reason } => {
                write!(f, "survey extract line {}: {}", line, reason)
            }
        }
    }
}

impl std::error::Error for PlacesImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlacesImportError::Io(err) => Some(err),
            PlacesImportError::Csv(err) => Some(err),
            PlacesImportError::InvalidRow { .. } => None,
        }
    }
}

impl From<std::io::Error> for PlacesImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for PlacesImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Loads a county-level survey extract into scoring input.
///
/// State summary rows are dropped, positive-outcome measures are flipped to
/// their negated form, and only the latest year per county and measure is
/// kept.
pub struct SurveyImporter<'a> {
    catalog: &'a MeasureCatalog,
}

impl<'a> SurveyImporter<'a> {
    pub fn new(catalog: &'a MeasureCatalog) -> Self {
        Self { catalog }
    }

    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<SurveyExtract, PlacesImportError> {
        let file = std::fs::File::open(path)?;
        self.from_reader(file)
    }

    pub fn from_reader<R: Read>(&self, reader: R) -> Result<SurveyExtract, PlacesImportError> {
        let records = parser::parse_records(reader)?;
        let total = records.len();

        let mut extract = SurveyExtract::default();
        let mut latest: HashMap<(CountyId, String), usize> = HashMap::new();
        let mut state_rows = 0usize;
        let mut superseded = 0usize;
        let mut unmapped_states: BTreeSet<String> = BTreeSet::new();

        for record in records {
            if record.is_state_level() {
                state_rows += 1;
                continue;
            }

            let observation = self.validate(&record)?;
            if !extract.counties.contains_key(&observation.county_id) {
                let state_abbr = record
                    .state_abbr
                    .clone()
                    .map(|abbr| abbr.to_ascii_uppercase())
                    .or_else(|| state_abbreviation(&record.state_name).map(str::to_string));
                if state_abbr.is_none() && unmapped_states.insert(record.state_name.clone()) {
                    warn!(
                        state = %record.state_name,
                        "no postal abbreviation for state; economic join will skip it"
                    );
                }
                extract.counties.insert(
                    observation.county_id.clone(),
                    CountyInfo {
                        county_id: observation.county_id.clone(),
                        display_name: record.county_display_name.clone(),
                        state_name: record.state_name.clone(),
                        state_abbr,
                    },
                );
            }

            let key = (
                observation.county_id.clone(),
                observation.measure_name.clone(),
            );
            match latest.entry(key) {
                Entry::Vacant(slot) => {
                    slot.insert(extract.observations.len());
                    extract.observations.push(observation);
                }
                Entry::Occupied(slot) => {
                    superseded += 1;
                    let kept = &mut extract.observations[*slot.get()];
                    if observation.year > kept.year {
                        *kept = observation;
                    }
                }
            }
        }

        info!(
            rows = total,
            state_rows,
            superseded,
            observations = extract.observations.len(),
            counties = extract.counties.len(),
            "imported survey extract"
        );

        Ok(extract)
    }

    fn validate(&self, record: &PlacesRecord) -> Result<MeasureObservation, PlacesImportError> {
        let invalid = |reason: String| PlacesImportError::InvalidRow {
            line: record.line,
            reason,
        };

        let county_id = CountyId::parse(&record.county_id).map_err(|err| invalid(err.to_string()))?;
        if record.measure_name.is_empty() {
            return Err(invalid("measure_name is blank".to_string()));
        }
        if record.county_display_name.is_empty() || record.state_name.is_empty() {
            return Err(invalid("county or state name is blank".to_string()));
        }
        let raw_value = record
            .raw_value
            .parse::<f64>()
            .map_err(|_| invalid(format!("raw_value '{}' is not a number", record.raw_value)))?;
        if !raw_value.is_finite() || !(0.0..=100.0).contains(&raw_value) {
            return Err(invalid(format!(
                "raw_value {} is outside [0, 100]",
                record.raw_value
            )));
        }

        let (measure_name, raw_value) = self.catalog.orient(&record.measure_name, raw_value);
        Ok(MeasureObservation {
            county_id,
            measure_name: measure_name.to_string(),
            year: record.year,
            raw_value,
            category: record.category.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const HEADER: &str =
        "county_id,measure_name,year,raw_value,state_name,county_display_name,category\n";

    fn catalog() -> MeasureCatalog {
        MeasureCatalog::builder()
            .measure("Obesity", 4, None, None)
            .measure("No dental visit", 2, None, None)
            .positive_outcome("Dental visit", "No dental visit")
            .build()
    }

    fn import(body: &str) -> Result<SurveyExtract, PlacesImportError> {
        let catalog = catalog();
        SurveyImporter::new(&catalog).from_reader(Cursor::new(format!("{HEADER}{body}")))
    }

    #[test]
    fn keeps_latest_year_and_first_row_on_ties() {
        let extract = import(
            "01001,Obesity,2021,30.0,Alabama,Autauga,\n\
01001,Obesity,2023,35.5,Alabama,Autauga,\n\
01001,Obesity,2022,40.0,Alabama,Autauga,\n\
01003,Obesity,2023,20.0,Alabama,Baldwin,Health Outcomes\n\
01003,Obesity,2023,99.0,Alabama,Baldwin,Health Outcomes\n",
        )
        .expect("import succeeds");

        assert_eq!(extract.observations.len(), 2);
        assert_eq!(extract.observations[0].year, 2023);
        assert_eq!(extract.observations[0].raw_value, 35.5);
        assert_eq!(extract.observations[1].raw_value, 20.0);
        assert_eq!(
            extract.observations[1].category.as_deref(),
            Some("Health Outcomes")
        );
    }

    #[test]
    fn inverts_positive_outcomes_and_drops_state_rows() {
        let extract = import(
            "01001,Dental visit,2022,70,Alabama,Autauga,\n\
01000,Dental visit,2022,65,Alabama,Alabama,\n",
        )
        .expect("import succeeds");

        assert_eq!(extract.observations.len(), 1);
        let observation = &extract.observations[0];
        assert_eq!(observation.measure_name, "No dental visit");
        assert!((observation.raw_value - 30.0).abs() < 1e-12);

        let county = extract
            .county(&CountyId::parse("01001").expect("valid"))
            .expect("county metadata");
        assert_eq!(county.display_name, "Autauga");
        assert_eq!(county.state_abbr.as_deref(), Some("AL"));
    }

    #[test]
    fn short_county_id_reports_its_line() {
        let error = import(
            "01001,Obesity,2023,30,Alabama,Autauga,\n\
1001,Obesity,2023,30,Alabama,Autauga,\n",
        )
        .expect_err("invalid id");
        match error {
            PlacesImportError::InvalidRow { line, reason } => {
                assert_eq!(line, 3);
                assert!(reason.contains("1001"));
            }
            other => panic!("expected invalid row, got {other:?}"),
        }
    }

    #[test]
    fn out_of_range_and_non_numeric_values_are_rejected() {
        assert!(matches!(
            import("01001,Obesity,2023,130,Alabama,Autauga,\n"),
            Err(PlacesImportError::InvalidRow { line: 2, .. })
        ));
        assert!(matches!(
            import("01001,Obesity,2023,NaN,Alabama,Autauga,\n"),
            Err(PlacesImportError::InvalidRow { .. })
        ));
        assert!(matches!(
            import("01001,Obesity,2023,n/a,Alabama,Autauga,\n"),
            Err(PlacesImportError::InvalidRow { .. })
        ));
    }

    #[test]
    fn missing_required_column_is_a_csv_error() {
        let catalog = catalog();
        let error = SurveyImporter::new(&catalog)
            .from_reader(Cursor::new("county_id,measure_name\n01001,Obesity\n"))
            .expect_err("missing columns");
        assert!(matches!(error, PlacesImportError::Csv(_)));
    }

    #[test]
    fn from_path_propagates_io_errors() {
        let catalog = catalog();
        let error = SurveyImporter::new(&catalog)
            .from_path("./does-not-exist.csv")
            .expect_err("expected io error");
        assert!(matches!(error, PlacesImportError::Io(_)));
    }
}
