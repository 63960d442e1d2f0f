use crate::infra::{parse_policy, parse_state, score_extract};
use clap::Args;
use std::fs::File;
use std::path::PathBuf;
use unhealth::config::AppConfig;
use unhealth::error::AppError;
use unhealth::pipeline::scoring::report::views::{
    CountyProfile, RankedCountyView, RankingOverview,
};
use unhealth::pipeline::scoring::{CountyId, PipelineDiagnostics};
use unhealth::pipeline::{DegeneratePolicy, ScoringPipeline, SnapshotStore};
use unhealth::telemetry;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// County-level survey extract (CSV)
    #[arg(long)]
    pub(crate) observations: PathBuf,
    /// Optional economic extract (CSV) joined into the summary table
    #[arg(long)]
    pub(crate) economics: Option<PathBuf>,
    /// Snapshot output directory (defaults to APP_DATA_DIR)
    #[arg(long)]
    pub(crate) out: Option<PathBuf>,
    /// Economic time period to join (defaults to APP_ECON_YEAR)
    #[arg(long)]
    pub(crate) econ_year: Option<i32>,
    /// Zero-variance handling: fail or midpoint
    #[arg(long, value_parser = parse_policy)]
    pub(crate) degenerate_policy: Option<DegeneratePolicy>,
    /// Counties listed at each end of the printed overview
    #[arg(long, default_value_t = 10)]
    pub(crate) limit: usize,
}

#[derive(Args, Debug)]
pub(crate) struct CountyArgs {
    /// Five-digit county FIPS code
    pub(crate) county_id: String,
    /// Snapshot directory (defaults to APP_DATA_DIR)
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct RankingsArgs {
    /// Restrict the lists to one state (name or postal code)
    #[arg(long, value_parser = parse_state)]
    pub(crate) state: Option<String>,
    /// Counties listed at each end
    #[arg(long, default_value_t = 10)]
    pub(crate) limit: usize,
    /// Snapshot directory (defaults to APP_DATA_DIR)
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs {
        observations,
        economics,
        out,
        econ_year,
        degenerate_policy,
        limit,
    } = args;

    let config = AppConfig::load()?;
    telemetry::init(&config)?;

    let policy = degenerate_policy.unwrap_or(config.pipeline.degenerate_policy);
    let economic_year = econ_year.unwrap_or(config.pipeline.economic_year);
    let store = SnapshotStore::new(out.unwrap_or(config.pipeline.data_dir));

    let pipeline = ScoringPipeline::standard(policy);
    let economics = economics.map(File::open).transpose()?;
    let snapshot = score_extract(
        &pipeline,
        File::open(&observations)?,
        economics,
        economic_year,
    )?;
    store.write(&snapshot)?;

    println!("Scored {} ({})", observations.display(), policy.as_str());
    render_diagnostics(&snapshot.manifest.diagnostics);
    println!(
        "- economic year {} | {} counties without economic data",
        snapshot.manifest.economic_year, snapshot.manifest.economic_unmatched
    );
    println!("- snapshot written to {}", store.dir().display());
    render_overview(&snapshot.report.overview(None, limit));

    Ok(())
}

pub(crate) fn run_county(args: CountyArgs) -> Result<(), AppError> {
    let store = snapshot_store(args.data_dir)?;
    let snapshot = store.load()?;

    let county_id = CountyId::parse(&args.county_id)
        .map_err(|_| AppError::NotFound(format!("county {}", args.county_id)))?;
    let profile = snapshot
        .report
        .county_profile(&county_id)
        .ok_or_else(|| AppError::NotFound(format!("county {county_id}")))?;

    render_profile(&profile);
    Ok(())
}

pub(crate) fn run_rankings(args: RankingsArgs) -> Result<(), AppError> {
    let store = snapshot_store(args.data_dir)?;
    let snapshot = store.load()?;

    println!(
        "Snapshot generated {}",
        snapshot.manifest.generated_at.format("%Y-%m-%d %H:%M UTC")
    );
    render_overview(&snapshot.report.overview(args.state.as_deref(), args.limit));
    Ok(())
}

fn snapshot_store(data_dir: Option<PathBuf>) -> Result<SnapshotStore, AppError> {
    let dir = match data_dir {
        Some(dir) => dir,
        None => AppConfig::load()?.pipeline.data_dir,
    };
    Ok(SnapshotStore::new(dir))
}

pub(crate) fn render_diagnostics(diagnostics: &PipelineDiagnostics) {
    println!(
        "- {} observations | {} counties | {} measures",
        diagnostics.observation_count, diagnostics.county_count, diagnostics.measure_count
    );
    for measure in &diagnostics.unweighted_measures {
        println!(
            "  ! {} has no impact weight ({} rows excluded from scores)",
            measure.measure_name, measure.rows
        );
    }
    for measure in &diagnostics.degenerate_measures {
        println!("  ! {} had zero variance; set to midpoint", measure);
    }
    if !diagnostics.zero_score_counties.is_empty() {
        println!(
            "  ! {} counties scored zero before normalization",
            diagnostics.zero_score_counties.len()
        );
    }
}

pub(crate) fn render_overview(overview: &RankingOverview) {
    match &overview.state {
        Some(state) => println!("\nUnHealth Score rankings for {state}"),
        None => println!("\nUnHealth Score rankings"),
    }
    println!("- {} counties scored", overview.county_count);
    if let Some(band) = overview.score_band {
        println!("- map band p05 {:.1} | p95 {:.1}", band.p05, band.p95);
    }

    println!("Least healthy:");
    render_ranked(&overview.least_healthy);
    println!("Healthiest:");
    render_ranked(&overview.healthiest);
}

fn render_ranked(counties: &[RankedCountyView]) {
    if counties.is_empty() {
        println!("  (none)");
    }
    for county in counties {
        println!(
            "  {:>5}. {}, {} ({}) score {:.1}",
            county.rank,
            county.display_name,
            county.state,
            county.county_id,
            county.score_normalized
        );
    }
}

pub(crate) fn render_profile(profile: &CountyProfile) {
    let county = &profile.county;
    println!(
        "{}, {} ({})",
        county.display_name, county.state, county.county_id
    );
    println!(
        "- UnHealth Score {:.1} | rank {}",
        county.score_normalized, county.rank_label
    );

    let economics = &profile.economics;
    if economics.available {
        println!("Economics (geo {}):", economics.matched_geo_id);
        println!("  - Population: {}", format_figure(economics.population, 0));
        println!(
            "  - Per capita income: {} ({} vs national)",
            format_figure(economics.per_capita_income, 0),
            format_percent(economics.income_vs_national_pct)
        );
        println!(
            "  - Real GDP per capita: {} ({} vs national)",
            format_figure(economics.real_gdp_per_capita, 0),
            format_percent(economics.gdp_vs_national_pct)
        );
        if let Some(note) = &economics.note {
            println!("  - {note}");
        }
    } else {
        println!("Economics: not available");
    }

    println!("Category contributions:");
    for category in &profile.categories {
        println!(
            "  - {}: {:.1} points ({:.0}%) across {} measures",
            category.category,
            category.absolute_contribution,
            category.percent_contribution * 100.0,
            category.measures
        );
    }

    println!("Measures by contribution:");
    for measure in &profile.measures {
        println!(
            "  - {} [{}]: {:.1}% in {} | {:.1} points | measure rank {}",
            measure.short_label,
            measure.category,
            measure.raw_value,
            measure.year,
            measure.absolute_contribution,
            measure.measure_rank
        );
    }
}

pub(crate) fn format_figure(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(value) => format!("{value:.decimals$}"),
        None => "not available".to_string(),
    }
}

pub(crate) fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(value) => format!("{value:+.2}%"),
        None => "n/a".to_string(),
    }
}
