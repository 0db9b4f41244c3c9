use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryMarketplace};
use crate::routes::with_console_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Utc;
use marketplace_admin::config::AppConfig;
use marketplace_admin::error::AppError;
use marketplace_admin::telemetry;
use marketplace_admin::workflows::console::AdminConsole;
use std::sync::atomic::{AtomicBool, Ordering};
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
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let marketplace = Arc::new(InMemoryMarketplace::seeded(Utc::now()));
    let console = Arc::new(AdminConsole::with_queue_defaults(
        marketplace.clone(),
        marketplace.clone(),
        marketplace,
        config.queue,
    ));

    let app = with_console_routes(console)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        environment = config.environment.label(),
        %addr,
        page_size = config.queue.page_size,
        sort_order = %config.queue.sort_order,
        "marketplace admin console ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
