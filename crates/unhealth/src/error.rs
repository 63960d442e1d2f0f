use crate::config::ConfigError;
use crate::pipeline::econ::EconImportError;
use crate::pipeline::places::PlacesImportError;
use crate::pipeline::scoring::ScoringError;
use crate::pipeline::snapshot::SnapshotError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Survey(PlacesImportError),
    Economics(EconImportError),
    Scoring(ScoringError),
    Snapshot(SnapshotError),
    NotFound(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "configuration error: {err}"),
            Self::Telemetry(err) => write!(f, "telemetry error: {err}"),
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::Survey(err) => write!(f, "survey import error: {err}"),
            Self::Economics(err) => write!(f, "economic import error: {err}"),
            Self::Scoring(err) => write!(f, "scoring error: {err}"),
            Self::Snapshot(err) => write!(f, "snapshot error: {err}"),
            Self::NotFound(what) => write!(f, "{what} not found"),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Telemetry(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Survey(err) => Some(err),
            Self::Economics(err) => Some(err),
            Self::Scoring(err) => Some(err),
            Self::Snapshot(err) => Some(err),
            Self::NotFound(_) => None,
        }
    }
}

impl AppError {
    /// Status code used for the `{"error"}` response body.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Survey(_) | Self::Economics(_) | Self::Scoring(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<TelemetryError> for AppError {
    fn from(err: TelemetryError) -> Self {
        Self::Telemetry(err)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<PlacesImportError> for AppError {
    fn from(err: PlacesImportError) -> Self {
        Self::Survey(err)
    }
}

impl From<EconImportError> for AppError {
    fn from(err: EconImportError) -> Self {
        Self::Economics(err)
    }
}

impl From<ScoringError> for AppError {
    fn from(err: ScoringError) -> Self {
        Self::Scoring(err)
    }
}

impl From<SnapshotError> for AppError {
    fn from(err: SnapshotError) -> Self {
        Self::Snapshot(err)
    }
}
