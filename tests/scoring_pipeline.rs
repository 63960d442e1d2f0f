use std::collections::BTreeMap;
use std::io::Cursor;
use unhealth::pipeline::scoring::{CountyRankingRow, MeasureCatalog};
use unhealth::pipeline::snapshot::{MEASURES_FILE, RANKINGS_FILE};
use unhealth::pipeline::{
    DegeneratePolicy, ScoringPipeline, ScoringRun, Snapshot, SnapshotStore, SurveyImporter,
};

const HEADER: &str = "county_id,measure_name,year,raw_value,state_name,county_display_name\n";
const STROKE: &str = "Stroke among adults aged >=18 years";
const OBESITY: &str = "Obesity among adults aged >=18 years";

fn extract_csv(rows: &[(&str, &str, f64)]) -> String {
    let mut csv = HEADER.to_string();
    for (county, measure, value) in rows {
        let (state, name) = match &county[..2] {
            "01" => ("Alabama", format!("County {county}")),
            _ => ("Virginia", format!("County {county}")),
        };
        csv.push_str(&format!("{county},{measure},2023,{value},{state},{name}\n"));
    }
    csv
}

fn score(rows: &[(&str, &str, f64)]) -> ScoringRun {
    let pipeline = ScoringPipeline::standard(DegeneratePolicy::Fail);
    let extract = SurveyImporter::new(pipeline.catalog())
        .from_reader(Cursor::new(extract_csv(rows)))
        .expect("extract imports");
    pipeline.run(&extract).expect("pipeline runs")
}

fn by_county(rankings: &[CountyRankingRow]) -> BTreeMap<&str, &CountyRankingRow> {
    rankings
        .iter()
        .map(|row| (row.county_id.as_str(), row))
        .collect()
}

#[test]
fn single_measure_scores_span_the_full_range() {
    let run = score(&[
        ("01001", STROKE, 10.0),
        ("01003", STROKE, 50.0),
        ("51540", STROKE, 90.0),
    ]);

    let normalized: Vec<f64> = run.normalized.iter().map(|row| row.normalized_value).collect();
    assert_eq!(normalized, vec![0.0, 50.0, 100.0]);

    let rankings = by_county(&run.rankings);
    let expected = [
        ("01001", 0.0, 0.0, 3),
        ("01003", 250.0, 50.0, 2),
        ("51540", 500.0, 100.0, 1),
    ];
    for (county, weighted, normalized, rank) in expected {
        let row = rankings[county];
        assert!((row.weighted_score - weighted).abs() < 1e-9, "{county} weighted");
        assert!((row.score_normalized - normalized).abs() < 1e-9, "{county} normalized");
        assert_eq!(row.rank, rank, "{county} rank");
    }
    assert_eq!(run.rankings[0].county_id.as_str(), "51540");
}

#[test]
fn tied_counties_share_the_better_rank() {
    let run = score(&[
        ("01001", STROKE, 90.0),
        ("01003", STROKE, 90.0),
        ("51540", STROKE, 10.0),
    ]);

    let rankings = by_county(&run.rankings);
    assert_eq!(rankings["01001"].rank, 1);
    assert_eq!(rankings["01003"].rank, 1);
    assert_eq!(rankings["51540"].rank, 3);
}

#[test]
fn contributions_add_back_up_to_each_score() {
    let run = score(&[
        ("01001", STROKE, 10.0),
        ("01001", OBESITY, 30.0),
        ("01003", STROKE, 50.0),
        ("01003", OBESITY, 20.0),
        ("51540", STROKE, 90.0),
        ("51540", OBESITY, 40.0),
    ]);

    for ranking in &run.rankings {
        let rows: Vec<_> = run
            .measures
            .iter()
            .filter(|row| row.county_id == ranking.county_id)
            .collect();
        assert_eq!(rows.len(), 2);

        let absolute: f64 = rows.iter().map(|row| row.absolute_contribution).sum();
        assert!(
            (absolute - ranking.score_normalized).abs() < 1e-6,
            "{} contributions {absolute} vs score {}",
            ranking.county_id,
            ranking.score_normalized
        );

        if ranking.weighted_score > 0.0 {
            let percent: f64 = rows.iter().map(|row| row.percent_contribution).sum();
            assert!((percent - 1.0).abs() < 1e-6);
        } else {
            assert!(rows.iter().all(|row| row.percent_contribution == 0.0));
        }
    }
}

#[test]
fn missing_measure_is_absent_rather_than_zero() {
    let run = score(&[
        ("01001", STROKE, 10.0),
        ("01001", OBESITY, 30.0),
        ("01003", STROKE, 50.0),
        ("01003", OBESITY, 20.0),
        ("51540", STROKE, 90.0),
    ]);

    let obesity_rows: Vec<&str> = run
        .measures
        .iter()
        .filter(|row| row.measure_name == OBESITY)
        .map(|row| row.county_id.as_str())
        .collect();
    assert_eq!(obesity_rows, vec!["01001", "01003"]);

    // 51540 is scored on stroke alone: 100 * 5.
    let rankings = by_county(&run.rankings);
    assert!((rankings["51540"].weighted_score - 500.0).abs() < 1e-9);
    assert_eq!(rankings["51540"].rank, 1);
}

#[test]
fn positive_outcomes_are_stored_inverted() {
    let catalog = MeasureCatalog::standard();
    let screening = "Cholesterol screening among adults aged >=18 years";
    let csv = extract_csv(&[("01001", screening, 30.0), ("01003", screening, 80.0)]);
    let extract = SurveyImporter::new(&catalog)
        .from_reader(Cursor::new(csv))
        .expect("extract imports");

    let stored = &extract.observations[0];
    assert_eq!(
        stored.measure_name,
        "No cholesterol screening among adults aged >=18 years"
    );
    assert!((stored.raw_value - 70.0).abs() < 1e-9);
    assert!((catalog.invert_if_positive_outcome(screening, stored.raw_value) - 30.0).abs() < 1e-9);
}

#[test]
fn rerunning_the_same_extract_writes_identical_tables() {
    let rows = [
        ("01001", STROKE, 10.0),
        ("01001", OBESITY, 30.0),
        ("01003", STROKE, 50.0),
        ("01003", OBESITY, 20.0),
        ("51540", STROKE, 90.0),
        ("51540", OBESITY, 40.0),
    ];
    let first_dir = tempfile::tempdir().expect("temp dir");
    let second_dir = tempfile::tempdir().expect("temp dir");

    for dir in [&first_dir, &second_dir] {
        let snapshot = Snapshot::assemble(score(&rows), None, 2022, DegeneratePolicy::Fail);
        SnapshotStore::new(dir.path())
            .write(&snapshot)
            .expect("snapshot written");
    }

    for table in [RANKINGS_FILE, MEASURES_FILE] {
        let first = std::fs::read(first_dir.path().join(table)).expect("first table");
        let second = std::fs::read(second_dir.path().join(table)).expect("second table");
        assert_eq!(first, second, "{table} differs between runs");
    }

    let manifest: serde_json::Value = serde_json::from_slice(
        &std::fs::read(first_dir.path().join("manifest.json")).expect("manifest"),
    )
    .expect("manifest json");
    assert_eq!(manifest["degenerate_policy"], "fail");
    assert_eq!(manifest["row_counts"]["rankings"], 3);
}
