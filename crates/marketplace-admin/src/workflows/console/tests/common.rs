use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use serde_json::Value;

use crate::config::QueueConfig;
use crate::workflows::console::{console_router, AdminConsole};
use crate::workflows::test_support::{RecordingCatalog, RecordingGateway, StaticQueueSource};
use crate::workflows::verification::domain::BusinessRecord;

pub(super) type TestConsole = AdminConsole<StaticQueueSource, RecordingGateway, RecordingCatalog>;

pub(super) struct Harness {
    pub(super) console: Arc<TestConsole>,
    pub(super) source: Arc<StaticQueueSource>,
    pub(super) gateway: Arc<RecordingGateway>,
    pub(super) catalog: Arc<RecordingCatalog>,
}

pub(super) fn harness(vendors: Vec<BusinessRecord>, restaurants: Vec<BusinessRecord>) -> Harness {
    harness_with(
        StaticQueueSource::new(vendors, restaurants),
        RecordingGateway::default(),
        QueueConfig::default(),
    )
}

pub(super) fn harness_with(
    source: StaticQueueSource,
    gateway: RecordingGateway,
    queue_defaults: QueueConfig,
) -> Harness {
    let source = Arc::new(source);
    let gateway = Arc::new(gateway);
    let catalog = Arc::new(RecordingCatalog::default());
    let console = Arc::new(AdminConsole::with_queue_defaults(
        Arc::clone(&source),
        Arc::clone(&gateway),
        Arc::clone(&catalog),
        queue_defaults,
    ));
    Harness {
        console,
        source,
        gateway,
        catalog,
    }
}

pub(super) fn router(harness: &Harness) -> axum::Router {
    console_router(Arc::clone(&harness.console))
}

pub(super) fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

pub(super) fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).expect("request builds")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
