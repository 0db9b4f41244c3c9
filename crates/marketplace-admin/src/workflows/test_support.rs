//! Shared fixtures and recording fakes for unit tests across the workflow modules.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::workflows::bulk::dispatcher::BulkResolver;
use crate::workflows::bulk::outcome::BulkItemError;
use crate::workflows::bulk::request::{BulkAction, CategoryAction, ListingAction};
use crate::workflows::bulk::resolvers::CatalogGateway;
use crate::workflows::verification::classifier::BusinessApplication;
use crate::workflows::verification::domain::{
    BusinessKind, BusinessRecord, EntityId, EntityRef, VerificationRecord, VerificationStatus,
};
use crate::workflows::verification::gateway::{
    QueueSource, RemoteFailure, VerificationGateway, VerificationUpdate,
};
use crate::workflows::verification::queue::{Pagination, QueueFilters, QueuePage, QueueStats};

pub(crate) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

/// Pending record submitted `days_ago` days before [`now`].
pub(crate) fn business(id: &str, days_ago: i64) -> BusinessRecord {
    BusinessRecord {
        id: EntityId::from(id),
        name: format!("Business {id}"),
        created_at: Some((now() - Duration::days(days_ago)).to_rfc3339()),
        legacy_status: Some(VerificationStatus::Pending),
        verification: Some(VerificationRecord::default()),
    }
}

pub(crate) fn resolved_business(id: &str, verified: bool) -> BusinessRecord {
    let status = if verified {
        VerificationStatus::Approved
    } else {
        VerificationStatus::Rejected
    };
    BusinessRecord {
        verification: Some(VerificationRecord {
            status,
            is_verified: verified,
            verified_at: verified.then(|| "2025-06-01T09:00:00Z".to_string()),
            status_updated_at: Some("2025-06-01T09:00:00Z".to_string()),
            admin_notes: Some("initial review".to_string()),
            prior_decision: None,
        }),
        ..business(id, 20)
    }
}

pub(crate) fn application(kind: BusinessKind, id: &str, days_ago: i64) -> BusinessApplication {
    BusinessApplication::classify(kind, business(id, days_ago), now())
}

pub(crate) fn resolved_application(
    kind: BusinessKind,
    id: &str,
    verified: bool,
) -> BusinessApplication {
    BusinessApplication::classify(kind, resolved_business(id, verified), now())
}

pub(crate) fn page(items: Vec<BusinessRecord>, stats: QueueStats, total: u64) -> QueuePage {
    QueuePage {
        items,
        stats,
        pagination: Pagination {
            page: 1,
            limit: 20,
            total,
            pages: total.div_ceil(20),
        },
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum GatewayCall {
    Update {
        kind: BusinessKind,
        id: String,
        update: VerificationUpdate,
    },
    Reset {
        kind: BusinessKind,
        id: String,
        reason: String,
    },
    Bulk {
        kind: BusinessKind,
        ids: Vec<String>,
        update: VerificationUpdate,
    },
}

/// Verification gateway that records every call and can fail chosen ids.
#[derive(Default)]
pub(crate) struct RecordingGateway {
    calls: Mutex<Vec<GatewayCall>>,
    failures: HashMap<String, RemoteFailure>,
}

impl RecordingGateway {
    pub(crate) fn failing_on(id: &str, failure: RemoteFailure) -> Self {
        let mut failures = HashMap::new();
        failures.insert(id.to_string(), failure);
        Self {
            calls: Mutex::new(Vec::new()),
            failures,
        }
    }

    pub(crate) fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().expect("gateway mutex poisoned").clone()
    }

    fn record(&self, call: GatewayCall, id: &str) -> Result<(), RemoteFailure> {
        self.calls.lock().expect("gateway mutex poisoned").push(call);
        match self.failures.get(id) {
            Some(failure) => Err(failure.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl VerificationGateway for RecordingGateway {
    async fn update_verification(
        &self,
        kind: BusinessKind,
        id: &EntityId,
        update: &VerificationUpdate,
    ) -> Result<(), RemoteFailure> {
        self.record(
            GatewayCall::Update {
                kind,
                id: id.0.clone(),
                update: update.clone(),
            },
            &id.0,
        )
    }

    async fn reset_verification(
        &self,
        kind: BusinessKind,
        id: &EntityId,
        reason: &str,
    ) -> Result<(), RemoteFailure> {
        self.record(
            GatewayCall::Reset {
                kind,
                id: id.0.clone(),
                reason: reason.to_string(),
            },
            &id.0,
        )
    }

    async fn bulk_update_verification(
        &self,
        kind: BusinessKind,
        ids: &[EntityId],
        update: &VerificationUpdate,
    ) -> Result<(), RemoteFailure> {
        let first = ids.first().map(|id| id.0.clone()).unwrap_or_default();
        self.record(
            GatewayCall::Bulk {
                kind,
                ids: ids.iter().map(|id| id.0.clone()).collect(),
                update: update.clone(),
            },
            &first,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CatalogCall {
    Listing { id: String, action: &'static str },
    Category { id: String, action: &'static str },
}

#[derive(Default)]
pub(crate) struct RecordingCatalog {
    calls: Mutex<Vec<CatalogCall>>,
}

impl RecordingCatalog {
    pub(crate) fn calls(&self) -> Vec<CatalogCall> {
        self.calls.lock().expect("catalog mutex poisoned").clone()
    }
}

#[async_trait]
impl CatalogGateway for RecordingCatalog {
    async fn update_listing(
        &self,
        id: &EntityId,
        action: &ListingAction,
    ) -> Result<(), RemoteFailure> {
        self.calls
            .lock()
            .expect("catalog mutex poisoned")
            .push(CatalogCall::Listing {
                id: id.0.clone(),
                action: action.name(),
            });
        Ok(())
    }

    async fn update_category(
        &self,
        id: &EntityId,
        action: &CategoryAction,
    ) -> Result<(), RemoteFailure> {
        self.calls
            .lock()
            .expect("catalog mutex poisoned")
            .push(CatalogCall::Category {
                id: id.0.clone(),
                action: action.name(),
            });
        Ok(())
    }
}

/// Bulk resolver that records `(target, action name)` pairs.
#[derive(Default)]
pub(crate) struct RecordingResolver {
    calls: Mutex<Vec<(EntityRef, &'static str)>>,
    failures: HashMap<String, RemoteFailure>,
}

impl RecordingResolver {
    pub(crate) fn failing_on(id: &str, failure: RemoteFailure) -> Self {
        let mut failures = HashMap::new();
        failures.insert(id.to_string(), failure);
        Self {
            calls: Mutex::new(Vec::new()),
            failures,
        }
    }

    pub(crate) fn calls(&self) -> Vec<(EntityRef, &'static str)> {
        self.calls.lock().expect("resolver mutex poisoned").clone()
    }
}

#[async_trait]
impl BulkResolver for RecordingResolver {
    async fn resolve(&self, target: &EntityRef, action: &BulkAction) -> Result<(), BulkItemError> {
        self.calls
            .lock()
            .expect("resolver mutex poisoned")
            .push((target.clone(), action.name()));
        match self.failures.get(&target.id.0) {
            Some(failure) => Err(failure.clone().into()),
            None => Ok(()),
        }
    }
}

/// Queue source returning canned pages; either side can be made to fail.
#[derive(Default)]
pub(crate) struct StaticQueueSource {
    pub(crate) vendors: Vec<BusinessRecord>,
    pub(crate) restaurants: Vec<BusinessRecord>,
    pub(crate) vendor_failure: Option<RemoteFailure>,
    pub(crate) restaurant_failure: Option<RemoteFailure>,
    pub(crate) fetches: Mutex<Vec<BusinessKind>>,
}

impl StaticQueueSource {
    pub(crate) fn new(vendors: Vec<BusinessRecord>, restaurants: Vec<BusinessRecord>) -> Self {
        Self {
            vendors,
            restaurants,
            ..Self::default()
        }
    }

    pub(crate) fn fetches(&self) -> Vec<BusinessKind> {
        self.fetches.lock().expect("source mutex poisoned").clone()
    }

    fn serve(
        &self,
        kind: BusinessKind,
        records: &[BusinessRecord],
        failure: &Option<RemoteFailure>,
        filters: &QueueFilters,
    ) -> Result<QueuePage, RemoteFailure> {
        self.fetches.lock().expect("source mutex poisoned").push(kind);
        if let Some(failure) = failure {
            return Err(failure.clone());
        }
        let total = records.len() as u64;
        let mut page = page(records.to_vec(), QueueStats::default(), total);
        page.stats = QueueStats {
            total,
            pending: total,
            ..QueueStats::default()
        };
        page.pagination.limit = filters.limit;
        page.pagination.pages = total.div_ceil(u64::from(filters.limit.max(1)));
        Ok(page)
    }
}

#[async_trait]
impl QueueSource for StaticQueueSource {
    async fn fetch_vendor_queue(&self, filters: &QueueFilters) -> Result<QueuePage, RemoteFailure> {
        self.serve(
            BusinessKind::Vendor,
            &self.vendors,
            &self.vendor_failure,
            filters,
        )
    }

    async fn fetch_restaurant_queue(
        &self,
        filters: &QueueFilters,
    ) -> Result<QueuePage, RemoteFailure> {
        self.serve(
            BusinessKind::Restaurant,
            &self.restaurants,
            &self.restaurant_failure,
            filters,
        )
    }

    async fn fetch_application(
        &self,
        kind: BusinessKind,
        id: &EntityId,
    ) -> Result<Option<BusinessRecord>, RemoteFailure> {
        let records = match kind {
            BusinessKind::Vendor => &self.vendors,
            BusinessKind::Restaurant => &self.restaurants,
        };
        Ok(records.iter().find(|record| &record.id == id).cloned())
    }
}
