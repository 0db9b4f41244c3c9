use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json};
use marketplace_admin::workflows::bulk::CatalogGateway;
use marketplace_admin::workflows::console::{console_router, AdminConsole};
use marketplace_admin::workflows::verification::{QueueSource, VerificationGateway};
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;

pub(crate) fn with_console_routes<S, G, C>(console: Arc<AdminConsole<S, G, C>>) -> axum::Router
where
    S: QueueSource + 'static,
    G: VerificationGateway + 'static,
    C: CatalogGateway + 'static,
{
    console_router(console)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    if state.readiness.load(Ordering::Acquire) {
        (StatusCode::OK, Json(json!({ "status": "ready" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "initializing" })),
        )
    }
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::InMemoryMarketplace;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use chrono::Utc;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use serde_json::Value;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    fn app(ready: bool) -> axum::Router {
        let marketplace = Arc::new(InMemoryMarketplace::seeded(Utc::now()));
        let console = Arc::new(AdminConsole::new(
            marketplace.clone(),
            marketplace.clone(),
            marketplace,
        ));
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        with_console_routes(console).layer(Extension(state))
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), 256 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json payload")
    }

    #[tokio::test]
    async fn readiness_reports_initializing_until_bound() {
        let response = app(false)
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request"))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json_body(response).await["status"], "initializing");
    }

    #[tokio::test]
    async fn health_and_queue_share_one_router() {
        let router = app(true);

        let health = router
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
            .await
            .expect("route executes");
        let queue = router
            .oneshot(
                Request::get("/api/v1/verification/queue?status=pending")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("route executes");

        assert_eq!(health.status(), StatusCode::OK);
        assert_eq!(queue.status(), StatusCode::OK);
        let payload = json_body(queue).await;
        assert_eq!(payload["items"].as_array().map(Vec::len), Some(3));
        assert_eq!(payload["stats"]["total"], 5);
    }

    #[tokio::test]
    async fn bulk_reject_persists_into_the_next_queue_load() {
        let router = app(true);

        let bulk = router
            .clone()
            .oneshot(
                Request::post("/api/v1/verification/bulk")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        json!({
                            "action": "reject_verification",
                            "targetIds": [{ "kind": "vendor", "id": "v-100" }],
                            "reason": "bank details unverifiable"
                        })
                        .to_string(),
                    ))
                    .expect("request"),
            )
            .await
            .expect("route executes");
        assert_eq!(bulk.status(), StatusCode::OK);

        let queue = router
            .oneshot(
                Request::get("/api/v1/verification/queue?type=vendor&status=rejected")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("route executes");
        let payload = json_body(queue).await;
        assert_eq!(payload["items"][0]["record"]["id"], "v-100");
        assert_eq!(payload["items"][0]["displayState"], "unverified");
    }

    #[tokio::test]
    async fn bulk_reject_leaves_an_approved_vendor_verified() {
        let router = app(true);

        let bulk = router
            .clone()
            .oneshot(
                Request::post("/api/v1/verification/bulk")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        json!({
                            "action": "reject_verification",
                            "targetIds": [{ "kind": "vendor", "id": "v-102" }],
                            "reason": "stale selection"
                        })
                        .to_string(),
                    ))
                    .expect("request"),
            )
            .await
            .expect("route executes");
        assert_eq!(bulk.status(), StatusCode::OK);
        let outcome = json_body(bulk).await;
        assert_eq!(outcome["summary"]["failed"], 1);
        assert_eq!(outcome["failed"][0]["error"]["kind"], "invalid_transition");

        let queue = router
            .oneshot(
                Request::get("/api/v1/verification/queue?type=vendor&status=approved")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("route executes");
        let payload = json_body(queue).await;
        assert_eq!(payload["items"][0]["record"]["id"], "v-102");
        assert_eq!(payload["items"][0]["displayState"], "verified");
    }
}
