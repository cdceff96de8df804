use crate::cli::ServeArgs;
use crate::infra::{
    seeded_standards, seeded_users, AppState, InMemoryAuditNotifier, InMemoryAuditRepository,
};
use crate::routes::with_audit_routes;
use auditflow::audits::AuditService;
use auditflow::config::AppConfig;
use auditflow::error::AppError;
use auditflow::telemetry;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(InMemoryAuditRepository::default());
    let users = Arc::new(seeded_users());
    let standards = Arc::new(seeded_standards());
    let notifier = Arc::new(InMemoryAuditNotifier::default());
    let audit_service = Arc::new(AuditService::new(repository, users, standards, notifier));

    let app = with_audit_routes(audit_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "audit lifecycle service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
