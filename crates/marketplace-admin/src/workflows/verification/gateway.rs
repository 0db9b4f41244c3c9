use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::domain::{BusinessKind, BusinessRecord, EntityId, VerificationStatus};
use super::queue::{QueueFilters, QueuePage};

/// Failure reported by a remote mutation or fetch. Never retried by the workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum RemoteFailure {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("not authorized: {0}")]
    Unauthorized(String),
    #[error("record not found")]
    NotFound,
    #[error("conflicting update: {0}")]
    Conflict(String),
    #[error("mutation rejected: {0}")]
    Rejected(String),
}

/// Payload sent to the backend when an admin approves or rejects a business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationUpdate {
    pub status: VerificationStatus,
    pub reason: String,
}

/// Outbound port for verification mutations.
#[async_trait]
pub trait VerificationGateway: Send + Sync {
    async fn update_verification(
        &self,
        kind: BusinessKind,
        id: &EntityId,
        update: &VerificationUpdate,
    ) -> Result<(), RemoteFailure>;

    async fn reset_verification(
        &self,
        kind: BusinessKind,
        id: &EntityId,
        reason: &str,
    ) -> Result<(), RemoteFailure>;

    /// Bulk variant of [`update_verification`](Self::update_verification). The bulk
    /// dispatcher calls it once per id so each item fails independently.
    async fn bulk_update_verification(
        &self,
        kind: BusinessKind,
        ids: &[EntityId],
        update: &VerificationUpdate,
    ) -> Result<(), RemoteFailure>;
}

/// Inbound port for the two paginated review queues.
#[async_trait]
pub trait QueueSource: Send + Sync {
    async fn fetch_vendor_queue(&self, filters: &QueueFilters) -> Result<QueuePage, RemoteFailure>;

    async fn fetch_restaurant_queue(
        &self,
        filters: &QueueFilters,
    ) -> Result<QueuePage, RemoteFailure>;

    async fn fetch_application(
        &self,
        kind: BusinessKind,
        id: &EntityId,
    ) -> Result<Option<BusinessRecord>, RemoteFailure>;
}
