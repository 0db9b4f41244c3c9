use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{BusinessKind, BusinessRecord, EntityId, EntityRef, VerificationStatus};

const URGENT_AFTER_DAYS: u32 = 7;
const HIGH_AFTER_DAYS: u32 = 3;

/// Severity bucket derived from how long an application has been waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Normal,
    High,
    Urgent,
}

impl Urgency {
    pub const fn from_days_waiting(days: u32) -> Self {
        if days > URGENT_AFTER_DAYS {
            Urgency::Urgent
        } else if days > HIGH_AFTER_DAYS {
            Urgency::High
        } else {
            Urgency::Normal
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Urgency::Normal => "normal",
            Urgency::High => "high",
            Urgency::Urgent => "urgent",
        }
    }
}

/// What an admin sees for a record. Only `PendingReview` may be approved or rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayState {
    Verified,
    Unverified,
    PendingReview,
}

impl DisplayState {
    pub const fn label(self) -> &'static str {
        match self {
            DisplayState::Verified => "verified",
            DisplayState::Unverified => "unverified",
            DisplayState::PendingReview => "pending-review",
        }
    }

    pub const fn is_resolved(self) -> bool {
        !matches!(self, DisplayState::PendingReview)
    }
}

impl fmt::Display for DisplayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The single status representation a record resolves to. The verification sub-object
/// wins whenever it is present; the legacy field is only consulted without it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusSource {
    Verification {
        status: VerificationStatus,
        is_verified: bool,
        status_updated_at: Option<DateTime<Utc>>,
    },
    Legacy(VerificationStatus),
    Absent,
}

impl StatusSource {
    pub fn resolve(record: &BusinessRecord) -> Self {
        match (&record.verification, record.legacy_status) {
            (Some(verification), _) => StatusSource::Verification {
                status: verification.status,
                is_verified: verification.is_verified,
                status_updated_at: verification
                    .status_updated_at
                    .as_deref()
                    .and_then(parse_timestamp),
            },
            (None, Some(legacy)) => StatusSource::Legacy(legacy),
            (None, None) => StatusSource::Absent,
        }
    }

    pub fn lifecycle(&self) -> VerificationStatus {
        match self {
            StatusSource::Verification { status, .. } => *status,
            StatusSource::Legacy(status) => *status,
            StatusSource::Absent => VerificationStatus::Pending,
        }
    }

    pub fn display_state(&self) -> DisplayState {
        match self {
            StatusSource::Verification {
                is_verified: true, ..
            } => DisplayState::Verified,
            StatusSource::Verification {
                status_updated_at: Some(_),
                ..
            } => DisplayState::Unverified,
            StatusSource::Verification { .. } => DisplayState::PendingReview,
            StatusSource::Legacy(VerificationStatus::Approved) => DisplayState::Verified,
            StatusSource::Legacy(VerificationStatus::Rejected) => DisplayState::Unverified,
            StatusSource::Legacy(VerificationStatus::Pending) | StatusSource::Absent => {
                DisplayState::PendingReview
            }
        }
    }

    pub const fn origin(&self) -> StatusOrigin {
        match self {
            StatusSource::Verification { .. } => StatusOrigin::Verification,
            StatusSource::Legacy(_) => StatusOrigin::Legacy,
            StatusSource::Absent => StatusOrigin::Absent,
        }
    }
}

/// Which field a classification was derived from, for historical display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusOrigin {
    Verification,
    Legacy,
    Absent,
}

/// Normalized view of a record's review state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub lifecycle: VerificationStatus,
    pub display_state: DisplayState,
    pub urgency: Urgency,
    pub days_waiting: u32,
    pub is_resolved: bool,
    pub status_origin: StatusOrigin,
}

/// Classify a raw record relative to `now`. Pure and deterministic.
pub fn classify(record: &BusinessRecord, now: DateTime<Utc>) -> Classification {
    let source = StatusSource::resolve(record);
    let display_state = source.display_state();
    let created_at = record.created_at.as_deref().and_then(parse_timestamp);
    let days_waiting = days_waiting(created_at, now);

    Classification {
        lifecycle: source.lifecycle(),
        display_state,
        urgency: Urgency::from_days_waiting(days_waiting),
        days_waiting,
        is_resolved: display_state.is_resolved(),
        status_origin: source.origin(),
    }
}

/// Whole days between submission and `now`; missing or future timestamps count as zero.
pub fn days_waiting(created_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> u32 {
    created_at
        .map(|created| now.signed_duration_since(created).num_days())
        .filter(|days| *days > 0)
        .map(|days| u32::try_from(days).unwrap_or(u32::MAX))
        .unwrap_or(0)
}

/// Parse the timestamp shapes the backend emits. Anything else is treated as missing.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Classified record tagged with the queue it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessApplication {
    pub kind: BusinessKind,
    pub record: BusinessRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub classification: Classification,
}

impl BusinessApplication {
    pub fn classify(kind: BusinessKind, record: BusinessRecord, now: DateTime<Utc>) -> Self {
        let classification = classify(&record, now);
        let created_at = record.created_at.as_deref().and_then(parse_timestamp);
        Self {
            kind,
            record,
            created_at,
            classification,
        }
    }

    pub fn id(&self) -> &EntityId {
        &self.record.id
    }

    pub fn entity_ref(&self) -> EntityRef {
        EntityRef::new(self.kind, self.record.id.clone())
    }

    pub fn display_state(&self) -> DisplayState {
        self.classification.display_state
    }

    pub fn is_resolved(&self) -> bool {
        self.classification.is_resolved
    }
}
