use std::slice;
use std::sync::Arc;

use async_trait::async_trait;

use super::dispatcher::BulkResolver;
use super::outcome::{BulkItemError, ItemRefusal};
use super::request::{BulkAction, CategoryAction, ListingAction};
use crate::workflows::verification::classifier::StatusSource;
use crate::workflows::verification::domain::{BusinessKind, EntityId, EntityKind, EntityRef};
use crate::workflows::verification::gateway::{
    QueueSource, RemoteFailure, VerificationGateway, VerificationUpdate,
};
use crate::workflows::verification::transition::VerificationAction;

/// Outbound port for listing and category mutations.
#[async_trait]
pub trait CatalogGateway: Send + Sync {
    async fn update_listing(&self, id: &EntityId, action: &ListingAction)
        -> Result<(), RemoteFailure>;

    async fn update_category(
        &self,
        id: &EntityId,
        action: &CategoryAction,
    ) -> Result<(), RemoteFailure>;
}

fn unsupported(target: &EntityRef, action: &BulkAction) -> BulkItemError {
    RemoteFailure::Rejected(format!("{} cannot be applied to {target}", action.name())).into()
}

/// Sends verification bulk actions through the verification gateway, one id per call.
///
/// Approve and reject re-fetch each record first; a record that is no longer pending
/// review is refused without reaching the gateway. Reset is sent as is.
pub struct VerificationResolver<G, S> {
    gateway: Arc<G>,
    source: Arc<S>,
}

impl<G, S> VerificationResolver<G, S>
where
    S: QueueSource,
{
    pub fn new(gateway: Arc<G>, source: Arc<S>) -> Self {
        Self { gateway, source }
    }

    async fn ensure_pending_review(
        &self,
        kind: BusinessKind,
        id: &EntityId,
        action: VerificationAction,
    ) -> Result<(), BulkItemError> {
        let record = self
            .source
            .fetch_application(kind, id)
            .await?
            .ok_or(RemoteFailure::NotFound)?;
        let state = StatusSource::resolve(&record).display_state();
        if action.allows(state) {
            Ok(())
        } else {
            Err(ItemRefusal::InvalidTransition { state, action }.into())
        }
    }
}

#[async_trait]
impl<G, S> BulkResolver for VerificationResolver<G, S>
where
    G: VerificationGateway + 'static,
    S: QueueSource + 'static,
{
    async fn resolve(&self, target: &EntityRef, action: &BulkAction) -> Result<(), BulkItemError> {
        let BulkAction::Verification {
            action: verification,
            reason,
        } = action
        else {
            return Err(unsupported(target, action));
        };
        let Some(kind) = target.kind.as_business() else {
            return Err(unsupported(target, action));
        };

        match verification.decision() {
            Some(status) => {
                self.ensure_pending_review(kind, &target.id, *verification)
                    .await?;
                let update = VerificationUpdate {
                    status,
                    reason: reason.clone(),
                };
                self.gateway
                    .bulk_update_verification(kind, slice::from_ref(&target.id), &update)
                    .await?;
            }
            None => {
                debug_assert_eq!(*verification, VerificationAction::Reset);
                self.gateway
                    .reset_verification(kind, &target.id, reason)
                    .await?;
            }
        }
        Ok(())
    }
}

/// Sends listing and category bulk actions through the catalog gateway.
pub struct CatalogResolver<C> {
    catalog: Arc<C>,
}

impl<C> CatalogResolver<C> {
    pub fn new(catalog: Arc<C>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl<C> BulkResolver for CatalogResolver<C>
where
    C: CatalogGateway + 'static,
{
    async fn resolve(&self, target: &EntityRef, action: &BulkAction) -> Result<(), BulkItemError> {
        match (action, target.kind) {
            (BulkAction::Listing(listing), EntityKind::Listing) => {
                Ok(self.catalog.update_listing(&target.id, listing).await?)
            }
            (BulkAction::Category(category), EntityKind::Category) => {
                Ok(self.catalog.update_category(&target.id, category).await?)
            }
            _ => Err(unsupported(target, action)),
        }
    }
}

/// Routes each action family to its resolver so one dispatcher serves the whole console.
pub struct ConsoleResolver<S, G, C> {
    verification: VerificationResolver<G, S>,
    catalog: CatalogResolver<C>,
}

impl<S, G, C> ConsoleResolver<S, G, C>
where
    S: QueueSource,
{
    pub fn new(source: Arc<S>, gateway: Arc<G>, catalog: Arc<C>) -> Self {
        Self {
            verification: VerificationResolver::new(gateway, source),
            catalog: CatalogResolver::new(catalog),
        }
    }
}

#[async_trait]
impl<S, G, C> BulkResolver for ConsoleResolver<S, G, C>
where
    S: QueueSource + 'static,
    G: VerificationGateway + 'static,
    C: CatalogGateway + 'static,
{
    async fn resolve(&self, target: &EntityRef, action: &BulkAction) -> Result<(), BulkItemError> {
        match action {
            BulkAction::Verification { .. } => self.verification.resolve(target, action).await,
            BulkAction::Listing(_) | BulkAction::Category(_) => {
                self.catalog.resolve(target, action).await
            }
        }
    }
}
