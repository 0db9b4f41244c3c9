use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::validation::ValidationError;

/// Opaque identifier assigned by the marketplace backend.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Every kind of record the admin console can select or act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Vendor,
    Restaurant,
    Listing,
    Category,
}

impl EntityKind {
    pub const fn label(self) -> &'static str {
        match self {
            EntityKind::Vendor => "vendor",
            EntityKind::Restaurant => "restaurant",
            EntityKind::Listing => "listing",
            EntityKind::Category => "category",
        }
    }

    /// The verification lifecycle only applies to businesses.
    pub const fn as_business(self) -> Option<BusinessKind> {
        match self {
            EntityKind::Vendor => Some(BusinessKind::Vendor),
            EntityKind::Restaurant => Some(BusinessKind::Restaurant),
            EntityKind::Listing | EntityKind::Category => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EntityKind {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "vendor" => Ok(EntityKind::Vendor),
            "restaurant" => Ok(EntityKind::Restaurant),
            "listing" => Ok(EntityKind::Listing),
            "category" => Ok(EntityKind::Category),
            _ => Err(ValidationError::UnknownKind(value.to_string())),
        }
    }
}

/// Business kinds that carry verification state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessKind {
    Vendor,
    Restaurant,
}

impl BusinessKind {
    pub const ALL: [BusinessKind; 2] = [BusinessKind::Vendor, BusinessKind::Restaurant];

    pub const fn label(self) -> &'static str {
        match self {
            BusinessKind::Vendor => "vendor",
            BusinessKind::Restaurant => "restaurant",
        }
    }
}

impl fmt::Display for BusinessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<BusinessKind> for EntityKind {
    fn from(kind: BusinessKind) -> Self {
        match kind {
            BusinessKind::Vendor => EntityKind::Vendor,
            BusinessKind::Restaurant => EntityKind::Restaurant,
        }
    }
}

impl FromStr for BusinessKind {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        EntityKind::from_str(value)?
            .as_business()
            .ok_or_else(|| ValidationError::UnknownKind(value.to_string()))
    }
}

/// `(kind, id)` pair used by selections and bulk requests.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: EntityId,
}

impl EntityRef {
    pub fn new(kind: impl Into<EntityKind>, id: impl Into<EntityId>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Tri-state business approval status shared by the legacy and verification fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl VerificationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            VerificationStatus::Pending => "pending",
            VerificationStatus::Approved => "approved",
            VerificationStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for VerificationStatus {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(VerificationStatus::Pending),
            "approved" => Ok(VerificationStatus::Approved),
            "rejected" => Ok(VerificationStatus::Rejected),
            _ => Err(ValidationError::InvalidField {
                field: "status",
                detail: format!("'{value}' is not pending, approved or rejected"),
            }),
        }
    }
}

/// Verification sub-object as returned by the backend. Timestamps stay raw so that
/// malformed values can be treated as missing during classification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRecord {
    #[serde(default)]
    pub status: VerificationStatus,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prior_decision: Option<PriorDecision>,
}

/// Decision that was in force before the last reset, kept for audit display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorDecision {
    pub status: VerificationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_notes: Option<String>,
    pub reset_reason: String,
    pub reset_at: String,
}

/// Raw vendor or restaurant record as delivered by a queue page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessRecord {
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Historical tri-state field. Never written once `verification` exists.
    #[serde(rename = "status", default, skip_serializing_if = "Option::is_none")]
    pub legacy_status: Option<VerificationStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification: Option<VerificationRecord>,
}

impl BusinessRecord {
    /// Record as it looks once the backend accepted an approve or reject decision.
    pub fn with_decision(&self, status: VerificationStatus, notes: &str, at: DateTime<Utc>) -> Self {
        let stamp = format_timestamp(at);
        let prior_decision = self
            .verification
            .as_ref()
            .and_then(|verification| verification.prior_decision.clone());

        let verification = VerificationRecord {
            status,
            is_verified: status == VerificationStatus::Approved,
            verified_at: (status == VerificationStatus::Approved).then(|| stamp.clone()),
            status_updated_at: Some(stamp),
            admin_notes: Some(notes.to_string()),
            prior_decision,
        };

        Self {
            verification: Some(verification),
            ..self.clone()
        }
    }

    /// Record as it looks once the backend accepted a reset back to review.
    ///
    /// The decision being undone moves into `prior_decision`; the live fields return to
    /// pending so the record is eligible for review again.
    pub fn with_reset(&self, reason: &str, at: DateTime<Utc>) -> Self {
        let reset_at = format_timestamp(at);
        let prior_decision = match &self.verification {
            Some(current) => PriorDecision {
                status: current.status,
                verified_at: current.verified_at.clone(),
                status_updated_at: current.status_updated_at.clone(),
                admin_notes: current.admin_notes.clone(),
                reset_reason: reason.to_string(),
                reset_at,
            },
            None => PriorDecision {
                status: self.legacy_status.unwrap_or_default(),
                verified_at: None,
                status_updated_at: None,
                admin_notes: None,
                reset_reason: reason.to_string(),
                reset_at,
            },
        };

        Self {
            verification: Some(VerificationRecord {
                prior_decision: Some(prior_decision),
                ..VerificationRecord::default()
            }),
            ..self.clone()
        }
    }
}

pub(crate) fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}
