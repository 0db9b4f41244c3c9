use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::QueueConfig;
use crate::workflows::bulk::dispatcher::BulkActionDispatcher;
use crate::workflows::bulk::outcome::BulkOutcome;
use crate::workflows::bulk::request::{BulkActionRequest, CategoryBulkRequest, ListingBulkRequest};
use crate::workflows::bulk::resolvers::{CatalogGateway, ConsoleResolver};
use crate::workflows::validation::{require_reason, ValidationError};
use crate::workflows::verification::classifier::BusinessApplication;
use crate::workflows::verification::domain::{BusinessKind, EntityId};
use crate::workflows::verification::gateway::{QueueSource, RemoteFailure, VerificationGateway};
use crate::workflows::verification::queue::{
    load_queue, AggregatedQueue, AggregationFailure, QueueFilters, QueueRequest,
};
use crate::workflows::verification::transition::{
    TransitionError, TransitionReceipt, VerificationAction, VerificationTransitions,
};

/// Facade wiring the queue source, verification gateway and catalog gateway together.
pub struct AdminConsole<S, G, C> {
    queue_source: Arc<S>,
    transitions: VerificationTransitions<G>,
    dispatcher: BulkActionDispatcher<ConsoleResolver<S, G, C>>,
    queue_defaults: QueueConfig,
}

impl<S, G, C> AdminConsole<S, G, C>
where
    S: QueueSource + 'static,
    G: VerificationGateway + 'static,
    C: CatalogGateway + 'static,
{
    pub fn new(queue_source: Arc<S>, gateway: Arc<G>, catalog: Arc<C>) -> Self {
        Self::with_queue_defaults(queue_source, gateway, catalog, QueueConfig::default())
    }

    pub fn with_queue_defaults(
        queue_source: Arc<S>,
        gateway: Arc<G>,
        catalog: Arc<C>,
        queue_defaults: QueueConfig,
    ) -> Self {
        let transitions = VerificationTransitions::new(Arc::clone(&gateway));
        let resolver = Arc::new(ConsoleResolver::new(
            Arc::clone(&queue_source),
            gateway,
            catalog,
        ));
        Self {
            queue_source,
            transitions,
            dispatcher: BulkActionDispatcher::new(resolver),
            queue_defaults,
        }
    }

    pub fn queue_defaults(&self) -> &QueueConfig {
        &self.queue_defaults
    }

    /// Filters pre-filled with the configured page size and sort order.
    pub fn default_filters(&self) -> QueueFilters {
        QueueFilters {
            limit: self.queue_defaults.page_size,
            sort_order: self.queue_defaults.sort_order,
            ..QueueFilters::default()
        }
    }

    pub async fn queue(
        &self,
        request: &QueueRequest,
        now: DateTime<Utc>,
    ) -> Result<AggregatedQueue, AggregationFailure> {
        load_queue(self.queue_source.as_ref(), request, now).await
    }

    /// Look up the current record, classify it and apply one transition.
    pub async fn transition(
        &self,
        kind: BusinessKind,
        id: &EntityId,
        action: VerificationAction,
        reason: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<TransitionReceipt, TransitionError> {
        require_reason(action.label(), reason)?;

        let record = self
            .queue_source
            .fetch_application(kind, id)
            .await?
            .ok_or(RemoteFailure::NotFound)?;
        let application = BusinessApplication::classify(kind, record, now);
        debug!(
            entity = %application.entity_ref(),
            state = %application.display_state(),
            %action,
            "transition requested"
        );

        self.transitions
            .apply(&application, action, reason, now)
            .await
    }

    /// Approve and reject skip any target that is no longer pending review; those land in
    /// `failed` with [`ItemRefusal::InvalidTransition`](crate::workflows::bulk::ItemRefusal).
    pub async fn bulk(&self, request: &BulkActionRequest) -> Result<BulkOutcome, ValidationError> {
        self.dispatcher.dispatch(request).await
    }

    pub async fn listing_bulk(
        &self,
        request: ListingBulkRequest,
    ) -> Result<BulkOutcome, ValidationError> {
        self.dispatcher.dispatch_listing_bulk_action(request).await
    }

    pub async fn category_bulk(
        &self,
        request: CategoryBulkRequest,
    ) -> Result<BulkOutcome, ValidationError> {
        self.dispatcher.dispatch_category_bulk_action(request).await
    }
}
