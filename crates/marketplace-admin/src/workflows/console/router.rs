use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::service::AdminConsole;
use crate::error::AppError;
use crate::workflows::bulk::outcome::{BulkOutcome, BulkSummary};
use crate::workflows::bulk::request::{BulkActionRequest, CategoryBulkRequest, ListingBulkRequest};
use crate::workflows::bulk::resolvers::CatalogGateway;
use crate::workflows::validation::ValidationError;
use crate::workflows::verification::domain::{BusinessKind, EntityId, VerificationStatus};
use crate::workflows::verification::gateway::{QueueSource, VerificationGateway};
use crate::workflows::verification::queue::{QueueRequest, SortOrder};
use crate::workflows::verification::transition::VerificationAction;

/// Router exposing the verification queue, single transitions and the bulk endpoints.
pub fn console_router<S, G, C>(console: Arc<AdminConsole<S, G, C>>) -> Router
where
    S: QueueSource + 'static,
    G: VerificationGateway + 'static,
    C: CatalogGateway + 'static,
{
    Router::new()
        .route("/api/v1/verification/queue", get(queue_handler::<S, G, C>))
        .route(
            "/api/v1/verification/bulk",
            post(verification_bulk_handler::<S, G, C>),
        )
        .route(
            "/api/v1/verification/:kind/:id/:action",
            post(transition_handler::<S, G, C>),
        )
        .route("/api/v1/listings/bulk", post(listing_bulk_handler::<S, G, C>))
        .route(
            "/api/v1/categories/bulk",
            post(category_bulk_handler::<S, G, C>),
        )
        .with_state(console)
}

/// Raw query string of the queue endpoint. Values are parsed after extraction so
/// bad input surfaces as a validation error instead of an extractor rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl QueueQuery {
    /// Build a request on top of the console's configured defaults.
    pub fn into_request<S, G, C>(
        self,
        console: &AdminConsole<S, G, C>,
    ) -> Result<QueueRequest, ValidationError>
    where
        S: QueueSource + 'static,
        G: VerificationGateway + 'static,
        C: CatalogGateway + 'static,
    {
        let mut filters = console.default_filters();

        let kind = match non_empty(self.kind) {
            Some(raw) => Some(raw.parse::<BusinessKind>()?),
            None => None,
        };
        if let Some(raw) = non_empty(self.status) {
            filters.status = Some(raw.parse::<VerificationStatus>()?);
        }
        filters.search = non_empty(self.search);
        if let Some(raw) = non_empty(self.page) {
            filters.page = parse_number("page", &raw)?;
        }
        if let Some(raw) = non_empty(self.limit) {
            filters.limit = parse_number("limit", &raw)?;
        }
        if let Some(raw) = non_empty(self.sort_by) {
            filters.sort_by = raw;
        }
        if let Some(raw) = non_empty(self.sort_order) {
            filters.sort_order = raw.parse::<SortOrder>()?;
        }

        let request = QueueRequest::new(kind, filters);
        request.validate()?;
        Ok(request)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}

fn parse_number(field: &'static str, raw: &str) -> Result<u32, ValidationError> {
    raw.parse::<u32>()
        .map_err(|_| ValidationError::InvalidField {
            field,
            detail: format!("'{raw}' is not a whole number"),
        })
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransitionBody {
    #[serde(default)]
    pub reason: Option<String>,
}

/// Bulk outcome plus the counts the console shows in its toast.
#[derive(Debug, Clone, Serialize)]
pub struct BulkResponse {
    #[serde(flatten)]
    pub outcome: BulkOutcome,
    pub summary: BulkSummary,
}

impl From<BulkOutcome> for BulkResponse {
    fn from(outcome: BulkOutcome) -> Self {
        let summary = outcome.summary();
        Self { outcome, summary }
    }
}

pub(crate) async fn queue_handler<S, G, C>(
    State(console): State<Arc<AdminConsole<S, G, C>>>,
    Query(query): Query<QueueQuery>,
) -> Response
where
    S: QueueSource + 'static,
    G: VerificationGateway + 'static,
    C: CatalogGateway + 'static,
{
    let request = match query.into_request(console.as_ref()) {
        Ok(request) => request,
        Err(error) => return AppError::from(error).into_response(),
    };

    match console.queue(&request, Utc::now()).await {
        Ok(queue) => (StatusCode::OK, Json(queue)).into_response(),
        Err(error) => AppError::from(error).into_response(),
    }
}

pub(crate) async fn transition_handler<S, G, C>(
    State(console): State<Arc<AdminConsole<S, G, C>>>,
    Path((kind, id, action)): Path<(String, String, String)>,
    Json(body): Json<TransitionBody>,
) -> Response
where
    S: QueueSource + 'static,
    G: VerificationGateway + 'static,
    C: CatalogGateway + 'static,
{
    let (kind, action) = match parse_transition(&kind, &action) {
        Ok(parsed) => parsed,
        Err(error) => return AppError::from(error).into_response(),
    };

    match console
        .transition(
            kind,
            &EntityId(id),
            action,
            body.reason.as_deref(),
            Utc::now(),
        )
        .await
    {
        Ok(receipt) => (StatusCode::OK, Json(receipt)).into_response(),
        Err(error) => AppError::from(error).into_response(),
    }
}

fn parse_transition(
    kind: &str,
    action: &str,
) -> Result<(BusinessKind, VerificationAction), ValidationError> {
    Ok((kind.parse()?, action.parse()?))
}

pub(crate) async fn verification_bulk_handler<S, G, C>(
    State(console): State<Arc<AdminConsole<S, G, C>>>,
    Json(request): Json<BulkActionRequest>,
) -> Response
where
    S: QueueSource + 'static,
    G: VerificationGateway + 'static,
    C: CatalogGateway + 'static,
{
    bulk_response(console.bulk(&request).await)
}

pub(crate) async fn listing_bulk_handler<S, G, C>(
    State(console): State<Arc<AdminConsole<S, G, C>>>,
    Json(request): Json<ListingBulkRequest>,
) -> Response
where
    S: QueueSource + 'static,
    G: VerificationGateway + 'static,
    C: CatalogGateway + 'static,
{
    bulk_response(console.listing_bulk(request).await)
}

pub(crate) async fn category_bulk_handler<S, G, C>(
    State(console): State<Arc<AdminConsole<S, G, C>>>,
    Json(request): Json<CategoryBulkRequest>,
) -> Response
where
    S: QueueSource + 'static,
    G: VerificationGateway + 'static,
    C: CatalogGateway + 'static,
{
    bulk_response(console.category_bulk(request).await)
}

/// Partial failure still answers 200; the body carries the per-item results.
fn bulk_response(result: Result<BulkOutcome, ValidationError>) -> Response {
    match result {
        Ok(outcome) => (StatusCode::OK, Json(BulkResponse::from(outcome))).into_response(),
        Err(error) => AppError::from(error).into_response(),
    }
}
