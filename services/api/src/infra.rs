use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use marketplace_admin::workflows::bulk::{CatalogGateway, CategoryAction, ListingAction};
use marketplace_admin::workflows::verification::{
    BusinessKind, BusinessRecord, EntityId, Pagination, QueueFilters, QueuePage, QueueSource,
    QueueStats, RemoteFailure, SortOrder, StatusSource, VerificationGateway, VerificationRecord,
    VerificationStatus, VerificationUpdate,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::debug;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ListingEntry {
    pub(crate) title: String,
    pub(crate) status: String,
    pub(crate) featured: bool,
    pub(crate) flag_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CategoryEntry {
    pub(crate) name: String,
    pub(crate) active: bool,
}

type BusinessKey = (BusinessKind, String);

/// Marketplace backend held in memory, standing in for the remote admin API.
#[derive(Default, Clone)]
pub(crate) struct InMemoryMarketplace {
    businesses: Arc<Mutex<BTreeMap<BusinessKey, BusinessRecord>>>,
    listings: Arc<Mutex<BTreeMap<String, ListingEntry>>>,
    categories: Arc<Mutex<BTreeMap<String, CategoryEntry>>>,
}

impl InMemoryMarketplace {
    /// Small mixed data set: fresh and overdue applications, one of each decision.
    pub(crate) fn seeded(now: DateTime<Utc>) -> Self {
        let marketplace = Self::default();
        let submitted = |days: i64| Some((now - Duration::days(days)).to_rfc3339());

        marketplace.insert_business(
            BusinessKind::Vendor,
            BusinessRecord {
                id: EntityId::from("v-100"),
                name: "Harbor Fish Co".to_string(),
                created_at: submitted(1),
                legacy_status: Some(VerificationStatus::Pending),
                verification: Some(VerificationRecord::default()),
            },
        );
        marketplace.insert_business(
            BusinessKind::Vendor,
            BusinessRecord {
                id: EntityId::from("v-101"),
                name: "Green Valley Produce".to_string(),
                created_at: submitted(5),
                legacy_status: Some(VerificationStatus::Pending),
                verification: None,
            },
        );
        marketplace.insert_business(
            BusinessKind::Vendor,
            BusinessRecord {
                id: EntityId::from("v-102"),
                name: "Northside Bakery Supply".to_string(),
                created_at: submitted(30),
                legacy_status: Some(VerificationStatus::Approved),
                verification: None,
            },
        );
        marketplace.insert_business(
            BusinessKind::Restaurant,
            BusinessRecord {
                id: EntityId::from("r-200"),
                name: "Lantern Noodle House".to_string(),
                created_at: submitted(9),
                legacy_status: None,
                verification: Some(VerificationRecord::default()),
            },
        );
        marketplace.insert_business(
            BusinessKind::Restaurant,
            BusinessRecord {
                id: EntityId::from("r-201"),
                name: "Olive & Ember".to_string(),
                created_at: submitted(14),
                legacy_status: Some(VerificationStatus::Pending),
                verification: None,
            }
            .with_decision(VerificationStatus::Rejected, "menu license missing", now),
        );

        {
            let mut listings = marketplace.listings.lock().expect("listing mutex poisoned");
            for (id, title) in [("l-300", "Smoked salmon, 1kg"), ("l-301", "Sourdough starter")] {
                listings.insert(
                    id.to_string(),
                    ListingEntry {
                        title: title.to_string(),
                        status: "active".to_string(),
                        featured: false,
                        flag_reason: None,
                    },
                );
            }
        }
        {
            let mut categories = marketplace
                .categories
                .lock()
                .expect("category mutex poisoned");
            for (id, name) in [("c-400", "Seafood"), ("c-401", "Bakery")] {
                categories.insert(
                    id.to_string(),
                    CategoryEntry {
                        name: name.to_string(),
                        active: true,
                    },
                );
            }
        }

        marketplace
    }

    pub(crate) fn insert_business(&self, kind: BusinessKind, record: BusinessRecord) {
        self.businesses
            .lock()
            .expect("business mutex poisoned")
            .insert((kind, record.id.0.clone()), record);
    }

    pub(crate) fn business(&self, kind: BusinessKind, id: &str) -> Option<BusinessRecord> {
        self.businesses
            .lock()
            .expect("business mutex poisoned")
            .get(&(kind, id.to_string()))
            .cloned()
    }

    pub(crate) fn listing(&self, id: &str) -> Option<ListingEntry> {
        self.listings
            .lock()
            .expect("listing mutex poisoned")
            .get(id)
            .cloned()
    }

    pub(crate) fn category(&self, id: &str) -> Option<CategoryEntry> {
        self.categories
            .lock()
            .expect("category mutex poisoned")
            .get(id)
            .cloned()
    }

    fn update_business<F>(
        &self,
        kind: BusinessKind,
        id: &EntityId,
        change: F,
    ) -> Result<(), RemoteFailure>
    where
        F: FnOnce(&BusinessRecord) -> BusinessRecord,
    {
        let mut guard = self.businesses.lock().expect("business mutex poisoned");
        let record = guard
            .get_mut(&(kind, id.0.clone()))
            .ok_or(RemoteFailure::NotFound)?;
        *record = change(record);
        Ok(())
    }

    fn page(&self, kind: BusinessKind, filters: &QueueFilters) -> QueuePage {
        let guard = self.businesses.lock().expect("business mutex poisoned");
        let search = filters
            .search
            .as_deref()
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let searched: Vec<&BusinessRecord> = guard
            .iter()
            .filter(|((owner, _), _)| *owner == kind)
            .map(|(_, record)| record)
            .filter(|record| {
                search.is_empty()
                    || record.name.to_ascii_lowercase().contains(&search)
                    || record.id.0.to_ascii_lowercase().contains(&search)
            })
            .collect();

        let mut stats = QueueStats {
            total: searched.len() as u64,
            ..QueueStats::default()
        };
        for record in &searched {
            match StatusSource::resolve(record).lifecycle() {
                VerificationStatus::Pending => stats.pending += 1,
                VerificationStatus::Approved => stats.approved += 1,
                VerificationStatus::Rejected => stats.rejected += 1,
            }
        }

        let mut matching: Vec<BusinessRecord> = searched
            .into_iter()
            .filter(|record| {
                filters
                    .status
                    .map_or(true, |status| StatusSource::resolve(record).lifecycle() == status)
            })
            .cloned()
            .collect();
        sort_records(&mut matching, &filters.sort_by, filters.sort_order);

        let total = matching.len() as u64;
        let limit = filters.limit.max(1);
        let skip = (filters.page.saturating_sub(1) as usize).saturating_mul(limit as usize);
        let items = matching.into_iter().skip(skip).take(limit as usize).collect();

        debug!(%kind, total, page = filters.page, "served queue page");
        QueuePage {
            items,
            stats,
            pagination: Pagination {
                page: filters.page,
                limit,
                total,
                pages: total.div_ceil(u64::from(limit)),
            },
        }
    }
}

fn sort_records(records: &mut [BusinessRecord], sort_by: &str, order: SortOrder) {
    records.sort_by(|left, right| {
        let ordering = match sort_by {
            "name" => left.name.cmp(&right.name),
            _ => left.created_at.cmp(&right.created_at),
        };
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

#[async_trait]
impl QueueSource for InMemoryMarketplace {
    async fn fetch_vendor_queue(&self, filters: &QueueFilters) -> Result<QueuePage, RemoteFailure> {
        Ok(self.page(BusinessKind::Vendor, filters))
    }

    async fn fetch_restaurant_queue(
        &self,
        filters: &QueueFilters,
    ) -> Result<QueuePage, RemoteFailure> {
        Ok(self.page(BusinessKind::Restaurant, filters))
    }

    async fn fetch_application(
        &self,
        kind: BusinessKind,
        id: &EntityId,
    ) -> Result<Option<BusinessRecord>, RemoteFailure> {
        Ok(self.business(kind, &id.0))
    }
}

#[async_trait]
impl VerificationGateway for InMemoryMarketplace {
    async fn update_verification(
        &self,
        kind: BusinessKind,
        id: &EntityId,
        update: &VerificationUpdate,
    ) -> Result<(), RemoteFailure> {
        let now = Utc::now();
        self.update_business(kind, id, |record| {
            record.with_decision(update.status, &update.reason, now)
        })
    }

    async fn reset_verification(
        &self,
        kind: BusinessKind,
        id: &EntityId,
        reason: &str,
    ) -> Result<(), RemoteFailure> {
        let now = Utc::now();
        self.update_business(kind, id, |record| record.with_reset(reason, now))
    }

    async fn bulk_update_verification(
        &self,
        kind: BusinessKind,
        ids: &[EntityId],
        update: &VerificationUpdate,
    ) -> Result<(), RemoteFailure> {
        let now = Utc::now();
        for id in ids {
            self.update_business(kind, id, |record| {
                record.with_decision(update.status, &update.reason, now)
            })?;
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogGateway for InMemoryMarketplace {
    async fn update_listing(
        &self,
        id: &EntityId,
        action: &ListingAction,
    ) -> Result<(), RemoteFailure> {
        let mut guard = self.listings.lock().expect("listing mutex poisoned");
        if let ListingAction::Delete { .. } = action {
            return guard
                .remove(&id.0)
                .map(|_| ())
                .ok_or(RemoteFailure::NotFound);
        }

        let listing = guard.get_mut(&id.0).ok_or(RemoteFailure::NotFound)?;
        match action {
            ListingAction::ToggleFeatured { featured, .. } => {
                listing.featured = featured.unwrap_or(!listing.featured);
            }
            ListingAction::Flag { flag_reason, .. } => {
                listing.flag_reason = Some(flag_reason.clone());
            }
            ListingAction::Unflag { .. } => listing.flag_reason = None,
            ListingAction::UpdateStatus { status, .. } => listing.status = status.clone(),
            ListingAction::Delete { .. } => {}
        }
        Ok(())
    }

    async fn update_category(
        &self,
        id: &EntityId,
        action: &CategoryAction,
    ) -> Result<(), RemoteFailure> {
        let mut guard = self.categories.lock().expect("category mutex poisoned");
        if let CategoryAction::Delete { .. } = action {
            return guard
                .remove(&id.0)
                .map(|_| ())
                .ok_or(RemoteFailure::NotFound);
        }

        let category = guard.get_mut(&id.0).ok_or(RemoteFailure::NotFound)?;
        category.active = matches!(action, CategoryAction::Activate { .. });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    #[tokio::test]
    async fn vendor_page_filters_by_status_and_keeps_full_stats() {
        let marketplace = InMemoryMarketplace::seeded(now());
        let filters = QueueFilters {
            status: Some(VerificationStatus::Pending),
            ..QueueFilters::default()
        };

        let page = marketplace
            .fetch_vendor_queue(&filters)
            .await
            .expect("page served");

        let ids: Vec<&str> = page.items.iter().map(|record| record.id.0.as_str()).collect();
        assert_eq!(ids, vec!["v-100", "v-101"]);
        assert_eq!(page.stats.total, 3);
        assert_eq!(page.stats.approved, 1);
        assert_eq!(page.pagination.total, 2);
    }

    #[tokio::test]
    async fn search_matches_names_case_insensitively() {
        let marketplace = InMemoryMarketplace::seeded(now());
        let filters = QueueFilters {
            search: Some("NOODLE".to_string()),
            ..QueueFilters::default()
        };

        let page = marketplace
            .fetch_restaurant_queue(&filters)
            .await
            .expect("page served");

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id.0, "r-200");
    }

    #[tokio::test]
    async fn reset_restores_pending_and_records_prior_decision() {
        let marketplace = InMemoryMarketplace::seeded(now());
        let id = EntityId::from("r-201");

        marketplace
            .reset_verification(BusinessKind::Restaurant, &id, "license uploaded")
            .await
            .expect("reset applies");

        let record = marketplace
            .business(BusinessKind::Restaurant, "r-201")
            .expect("record kept");
        let verification = record.verification.expect("verification present");
        assert_eq!(verification.status, VerificationStatus::Pending);
        let prior = verification.prior_decision.expect("prior decision kept");
        assert_eq!(prior.status, VerificationStatus::Rejected);
        assert_eq!(prior.reset_reason, "license uploaded");
    }

    #[tokio::test]
    async fn catalog_mutations_apply_and_report_missing_ids() {
        let marketplace = InMemoryMarketplace::seeded(now());

        marketplace
            .update_listing(
                &EntityId::from("l-300"),
                &ListingAction::ToggleFeatured {
                    featured: None,
                    reason: None,
                },
            )
            .await
            .expect("toggle applies");
        marketplace
            .update_category(
                &EntityId::from("c-401"),
                &CategoryAction::Deactivate { reason: None },
            )
            .await
            .expect("deactivate applies");
        let missing = marketplace
            .update_listing(
                &EntityId::from("l-999"),
                &ListingAction::Delete {
                    reason: "duplicate".to_string(),
                },
            )
            .await;

        assert!(marketplace.listing("l-300").expect("listing").featured);
        assert!(!marketplace.category("c-401").expect("category").active);
        assert_eq!(missing, Err(RemoteFailure::NotFound));
    }
}
