use crate::infra::{score_extract, AppState};
use axum::extract::{Path, Query};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Cursor;
use unhealth::error::AppError;
use unhealth::pipeline::scoring::report::views::{CountyProfile, MeasureView, RankingOverview};
use unhealth::pipeline::scoring::report::{CountyRankingRow, CountySummaryRow};
use unhealth::pipeline::scoring::{CountyId, PipelineDiagnostics};

const DEFAULT_LIMIT: usize = 10;
const MAX_LIMIT: usize = 500;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RankingsQuery {
    #[serde(default)]
    pub(crate) state: Option<String>,
    #[serde(default)]
    pub(crate) limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct StateQuery {
    #[serde(default)]
    pub(crate) state: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScoreRequest {
    pub(crate) observations_csv: String,
    #[serde(default)]
    pub(crate) economics_csv: Option<String>,
    #[serde(default)]
    pub(crate) econ_year: Option<i32>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ScoreResponse {
    pub(crate) economic_year: i32,
    pub(crate) rankings: Vec<CountyRankingRow>,
    pub(crate) summary: Vec<CountySummaryRow>,
    pub(crate) diagnostics: PipelineDiagnostics,
}

pub(crate) fn router(state: AppState) -> axum::Router {
    axum::Router::new()
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route("/api/v1/rankings", axum::routing::get(rankings_endpoint))
        .route(
            "/api/v1/counties/:county_id",
            axum::routing::get(county_endpoint),
        )
        .route(
            "/api/v1/measures/:measure",
            axum::routing::get(measure_endpoint),
        )
        .route("/api/v1/score", axum::routing::post(score_endpoint))
        .layer(Extension(state))
}

/// `?state=` with a blank value means no filter.
fn state_filter(state: Option<&str>) -> Option<&str> {
    state
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready", "counties": state.report.county_count() })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn rankings_endpoint(
    Extension(state): Extension<AppState>,
    Query(query): Query<RankingsQuery>,
) -> Json<RankingOverview> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
    Json(state.report.overview(state_filter(query.state.as_deref()), limit))
}

pub(crate) async fn county_endpoint(
    Extension(state): Extension<AppState>,
    Path(county_id): Path<String>,
) -> Result<Json<CountyProfile>, AppError> {
    let not_found = || AppError::NotFound(format!("county {county_id}"));
    let parsed = CountyId::parse(&county_id).map_err(|_| not_found())?;
    state
        .report
        .county_profile(&parsed)
        .map(Json)
        .ok_or_else(not_found)
}

pub(crate) async fn measure_endpoint(
    Extension(state): Extension<AppState>,
    Path(measure): Path<String>,
    Query(query): Query<StateQuery>,
) -> Result<Json<MeasureView>, AppError> {
    state
        .report
        .measure_view(&measure, state_filter(query.state.as_deref()))
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("measure '{measure}'")))
}

pub(crate) async fn score_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<ScoreRequest>,
) -> Result<Json<ScoreResponse>, AppError> {
    let ScoreRequest {
        observations_csv,
        economics_csv,
        econ_year,
    } = payload;

    let economic_year = econ_year.unwrap_or(state.economic_year);
    let snapshot = score_extract(
        &state.pipeline,
        Cursor::new(observations_csv.into_bytes()),
        economics_csv.map(|csv| Cursor::new(csv.into_bytes())),
        economic_year,
    )?;

    Ok(Json(ScoreResponse {
        economic_year,
        rankings: snapshot.report.rankings,
        summary: snapshot.report.summary,
        diagnostics: snapshot.manifest.diagnostics,
    }))
}
