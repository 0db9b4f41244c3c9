use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

use super::classifier::BusinessApplication;
use super::domain::{BusinessKind, BusinessRecord, VerificationStatus};
use super::gateway::{QueueSource, RemoteFailure};
use crate::workflows::validation::ValidationError;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub const fn label(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SortOrder {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Asc),
            "desc" | "descending" => Ok(SortOrder::Desc),
            _ => Err(ValidationError::InvalidField {
                field: "sortOrder",
                detail: format!("'{value}' is not asc or desc"),
            }),
        }
    }
}

/// Filter shape shared by the vendor and restaurant queue fetches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueueFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<VerificationStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    pub page: u32,
    pub limit: u32,
    pub sort_by: String,
    pub sort_order: SortOrder,
}

impl Default for QueueFilters {
    fn default() -> Self {
        Self {
            status: None,
            search: None,
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            sort_by: "createdAt".to_string(),
            sort_order: SortOrder::Desc,
        }
    }
}

/// Explicit request for one merged queue view: which sources plus the shared filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueRequest {
    /// `None` includes both vendors and restaurants.
    #[serde(
        rename = "type",
        default,
        deserialize_with = "deserialize_kind_filter",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<BusinessKind>,
    #[serde(flatten)]
    pub filters: QueueFilters,
}

impl QueueRequest {
    pub fn new(kind: Option<BusinessKind>, filters: QueueFilters) -> Self {
        Self { kind, filters }
    }

    pub fn includes(&self, kind: BusinessKind) -> bool {
        self.kind.map_or(true, |only| only == kind)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.filters.limit == 0 || self.filters.limit > MAX_PAGE_SIZE {
            return Err(ValidationError::InvalidPageSize {
                max: MAX_PAGE_SIZE,
                found: self.filters.limit,
            });
        }
        if self.filters.page == 0 {
            return Err(ValidationError::InvalidPage);
        }
        Ok(())
    }
}

/// Accepts `""` as "both kinds", matching the console's type dropdown.
pub fn deserialize_kind_filter<'de, D>(deserializer: D) -> Result<Option<BusinessKind>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => BusinessKind::from_str(value)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Per-status counts. Counts missing from a source payload default to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueStats {
    pub total: u64,
    pub pending: u64,
    pub approved: u64,
    pub rejected: u64,
}

impl QueueStats {
    pub fn combine(self, other: QueueStats) -> QueueStats {
        QueueStats {
            total: self.total + other.total,
            pending: self.pending + other.pending,
            approved: self.approved + other.approved,
            rejected: self.rejected + other.rejected,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u64,
}

/// One page from one source queue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueuePage {
    pub items: Vec<BusinessRecord>,
    pub stats: QueueStats,
    pub pagination: Pagination,
}

/// Results of the per-source fetches handed to the aggregator. A source that the
/// request excludes may be left as `None`.
#[derive(Debug, Clone, Default)]
pub struct QueueSources {
    pub vendor: Option<Result<QueuePage, RemoteFailure>>,
    pub restaurant: Option<Result<QueuePage, RemoteFailure>>,
}

impl QueueSources {
    pub fn both(
        vendor: Result<QueuePage, RemoteFailure>,
        restaurant: Result<QueuePage, RemoteFailure>,
    ) -> Self {
        Self {
            vendor: Some(vendor),
            restaurant: Some(restaurant),
        }
    }

    fn take(&mut self, kind: BusinessKind) -> Option<Result<QueuePage, RemoteFailure>> {
        match kind {
            BusinessKind::Vendor => self.vendor.take(),
            BusinessKind::Restaurant => self.restaurant.take(),
        }
    }
}

/// Merged, classified queue ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregatedQueue {
    pub items: Vec<BusinessApplication>,
    pub stats: QueueStats,
    pub pagination: Pagination,
}

#[derive(Debug, thiserror::Error)]
pub enum AggregationFailure {
    #[error("{kind} queue could not be loaded: {source}")]
    Source {
        kind: BusinessKind,
        source: RemoteFailure,
    },
    #[error("{kind} queue result was not provided")]
    MissingSource { kind: BusinessKind },
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Merge the per-source pages into one queue.
///
/// Fails as a whole if any included source failed; there is no partial render.
pub fn aggregate_queue(
    request: &QueueRequest,
    mut sources: QueueSources,
    now: DateTime<Utc>,
) -> Result<AggregatedQueue, AggregationFailure> {
    request.validate()?;

    let mut pages = Vec::with_capacity(2);
    for kind in BusinessKind::ALL {
        if !request.includes(kind) {
            continue;
        }
        match sources.take(kind) {
            Some(Ok(page)) => pages.push((kind, page)),
            Some(Err(source)) => return Err(AggregationFailure::Source { kind, source }),
            None => return Err(AggregationFailure::MissingSource { kind }),
        }
    }

    if let [(kind, page)] = pages.as_slice() {
        let items = page
            .items
            .iter()
            .cloned()
            .map(|record| BusinessApplication::classify(*kind, record, now))
            .collect();
        return Ok(AggregatedQueue {
            items,
            stats: page.stats,
            pagination: page.pagination,
        });
    }

    let limit = request.filters.limit;
    let mut stats = QueueStats::default();
    let mut total = 0u64;
    let mut entries = Vec::new();

    for (kind, page) in pages {
        stats = stats.combine(page.stats);
        total += page.pagination.total;
        entries.extend(
            page.items
                .into_iter()
                .enumerate()
                .map(|(position, record)| {
                    (position, BusinessApplication::classify(kind, record, now))
                }),
        );
    }

    let order = request.filters.sort_order;
    entries.sort_by(|(left_pos, left), (right_pos, right)| {
        compare_entries(order, (*left_pos, left), (*right_pos, right))
    });

    Ok(AggregatedQueue {
        items: entries.into_iter().map(|(_, item)| item).collect(),
        stats,
        pagination: Pagination {
            page: request.filters.page,
            limit,
            total,
            pages: total.div_ceil(u64::from(limit)),
        },
    })
}

// createdAt per sort order, then position within its source page, then kind name.
// Records without a usable createdAt sort as the oldest.
fn compare_entries(
    order: SortOrder,
    (left_pos, left): (usize, &BusinessApplication),
    (right_pos, right): (usize, &BusinessApplication),
) -> Ordering {
    let by_created = match order {
        SortOrder::Asc => left.created_at.cmp(&right.created_at),
        SortOrder::Desc => right.created_at.cmp(&left.created_at),
    };
    by_created
        .then(left_pos.cmp(&right_pos))
        .then_with(|| left.kind.label().cmp(right.kind.label()))
}

/// Fetch the sources a request needs, concurrently, and aggregate them.
pub async fn load_queue<S>(
    source: &S,
    request: &QueueRequest,
    now: DateTime<Utc>,
) -> Result<AggregatedQueue, AggregationFailure>
where
    S: QueueSource + ?Sized,
{
    request.validate()?;

    let vendor = async {
        if request.includes(BusinessKind::Vendor) {
            Some(source.fetch_vendor_queue(&request.filters).await)
        } else {
            None
        }
    };
    let restaurant = async {
        if request.includes(BusinessKind::Restaurant) {
            Some(source.fetch_restaurant_queue(&request.filters).await)
        } else {
            None
        }
    };
    let (vendor, restaurant) = futures::join!(vendor, restaurant);

    let result = aggregate_queue(request, QueueSources { vendor, restaurant }, now);
    match &result {
        Ok(queue) => debug!(
            items = queue.items.len(),
            total = queue.pagination.total,
            kind = ?request.kind,
            "verification queue aggregated"
        ),
        Err(error) => warn!(%error, kind = ?request.kind, "verification queue unavailable"),
    }
    result
}
