use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::router;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;
use unhealth::config::AppConfig;
use unhealth::error::AppError;
use unhealth::pipeline::{ScoringPipeline, SnapshotStore};
use unhealth::telemetry;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(data_dir) = args.data_dir.take() {
        config.pipeline.data_dir = data_dir;
    }

    telemetry::init(&config)?;

    let snapshot = SnapshotStore::new(&config.pipeline.data_dir).load()?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        report: Arc::new(snapshot.report),
        pipeline: Arc::new(ScoringPipeline::standard(
            config.pipeline.degenerate_policy,
        )),
        economic_year: config.pipeline.economic_year,
    };

    let app = router(app_state).layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        data_dir = %config.pipeline.data_dir.display(),
        generated_at = %snapshot.manifest.generated_at,
        "unhealth snapshot service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
