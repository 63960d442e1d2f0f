use metrics_exporter_prometheus::PrometheusHandle;
use std::io::Read;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use unhealth::error::AppError;
use unhealth::pipeline::scoring::ScoreReport;
use unhealth::pipeline::{
    DegeneratePolicy, EconomicDataset, ScoringPipeline, Snapshot, SurveyImporter,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) report: Arc<ScoreReport>,
    pub(crate) pipeline: Arc<ScoringPipeline>,
    pub(crate) economic_year: i32,
}

/// Import, score and join in one pass, without touching the snapshot dir.
pub(crate) fn score_extract<R, E>(
    pipeline: &ScoringPipeline,
    observations: R,
    economics: Option<E>,
    economic_year: i32,
) -> Result<Snapshot, AppError>
where
    R: Read,
    E: Read,
{
    let extract = SurveyImporter::new(pipeline.catalog()).from_reader(observations)?;
    let economics = economics
        .map(EconomicDataset::from_reader)
        .transpose()?;
    let run = pipeline.run(&extract)?;
    Ok(Snapshot::assemble(
        run,
        economics.as_ref(),
        economic_year,
        pipeline.policy(),
    ))
}

pub(crate) fn parse_policy(raw: &str) -> Result<DegeneratePolicy, String> {
    DegeneratePolicy::parse(raw)
        .ok_or_else(|| format!("unknown degenerate policy '{raw}' (expected fail or midpoint)"))
}

pub(crate) fn parse_state(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("state filter must not be blank".to_string());
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Empty};

    #[test]
    fn policy_parser_reports_allowed_values() {
        assert_eq!(parse_policy("midpoint"), Ok(DegeneratePolicy::Midpoint));
        let error = parse_policy("average").expect_err("unknown policy");
        assert!(error.contains("fail or midpoint"));
        assert!(parse_state("  ").is_err());
        assert_eq!(parse_state(" va "), Ok("va".to_string()));
    }

    #[test]
    fn score_extract_surfaces_import_errors() {
        let pipeline = ScoringPipeline::standard(DegeneratePolicy::Fail);
        let error = score_extract(
            &pipeline,
            Cursor::new(
                "county_id,measure_name,year,raw_value,state_name,county_display_name\n\
1,Stroke,2023,3,Alabama,Autauga\n",
            ),
            None::<Empty>,
            2022,
        )
        .expect_err("invalid county id");
        assert!(matches!(error, AppError::Survey(_)));
    }
}
