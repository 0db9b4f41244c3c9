use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use tracing::{info, warn};

use super::outcome::{BulkItemError, BulkOutcome};
use super::request::{
    BulkAction, BulkActionRequest, CategoryBulkRequest, ListingBulkRequest, ValidatedBulkRequest,
};
use crate::workflows::validation::ValidationError;
use crate::workflows::verification::domain::EntityRef;
/// Performs the remote mutation for one item of a bulk action.
#[async_trait]
pub trait BulkResolver: Send + Sync {
    async fn resolve(&self, target: &EntityRef, action: &BulkAction)
        -> Result<(), BulkItemError>;
}

/// Fans one validated action out over every target.
///
/// Items are dispatched independently: one failure does not stop the others, and the
/// outcome lists results in `targetIds` order whatever order the calls complete in.
pub struct BulkActionDispatcher<R> {
    resolver: Arc<R>,
}

impl<R> Clone for BulkActionDispatcher<R> {
    fn clone(&self) -> Self {
        Self {
            resolver: Arc::clone(&self.resolver),
        }
    }
}

impl<R> BulkActionDispatcher<R>
where
    R: BulkResolver + 'static,
{
    pub fn new(resolver: Arc<R>) -> Self {
        Self { resolver }
    }

    /// Validate and dispatch. Errors only for a malformed request, before any call.
    pub async fn dispatch(&self, request: &BulkActionRequest) -> Result<BulkOutcome, ValidationError> {
        let validated = request.validate().map_err(|error| {
            warn!(action = %request.action, %error, "bulk request rejected");
            error
        })?;
        Ok(self.dispatch_validated(&validated).await)
    }

    pub async fn dispatch_listing_bulk_action(
        &self,
        request: ListingBulkRequest,
    ) -> Result<BulkOutcome, ValidationError> {
        self.dispatch(&request.into()).await
    }

    pub async fn dispatch_category_bulk_action(
        &self,
        request: CategoryBulkRequest,
    ) -> Result<BulkOutcome, ValidationError> {
        self.dispatch(&request.into()).await
    }

    pub async fn dispatch_validated(&self, request: &ValidatedBulkRequest) -> BulkOutcome {
        let resolver = &self.resolver;
        let action = &request.action;

        let calls = request.targets.iter().map(|target| async move {
            let result = resolver.resolve(target, action).await;
            (target, result)
        });

        let mut outcome = BulkOutcome::default();
        for (target, result) in join_all(calls).await {
            if let Err(error) = &result {
                warn!(entity = %target, action = action.name(), %error, "bulk item failed");
            }
            outcome.record(target, result);
        }

        let summary = outcome.summary();
        info!(
            action = action.name(),
            requested = summary.requested,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "bulk action dispatched"
        );
        outcome
    }
}
