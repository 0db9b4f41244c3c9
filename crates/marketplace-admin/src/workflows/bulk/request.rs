use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::workflows::validation::{optional_reason, require_reason, ValidationError};
use crate::workflows::verification::domain::{EntityId, EntityKind, EntityRef};
use crate::workflows::verification::transition::VerificationAction;

/// Bulk request as submitted by the console. Validated as a whole before anything is sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkActionRequest {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub target_ids: Vec<EntityRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_type_filter: Option<EntityKind>,
    #[serde(default)]
    pub data: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl BulkActionRequest {
    pub fn verification(
        action: VerificationAction,
        targets: Vec<EntityRef>,
        reason: impl Into<String>,
    ) -> Self {
        let kind = match action {
            VerificationAction::Approve => BulkActionKind::ApproveVerification,
            VerificationAction::Reject => BulkActionKind::RejectVerification,
            VerificationAction::Reset => BulkActionKind::ResetVerification,
        };
        Self {
            action: kind.name().to_string(),
            target_ids: targets,
            reason: Some(reason.into()),
            ..Self::default()
        }
    }

    pub fn with_entity_type_filter(mut self, kind: EntityKind) -> Self {
        self.entity_type_filter = Some(kind);
        self
    }

    /// Check the action, the targets and the action-specific fields, in that order.
    pub fn validate(&self) -> Result<ValidatedBulkRequest, ValidationError> {
        let name = self.action.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingAction);
        }
        let kind = BulkActionKind::from_name(name)?;

        if self.target_ids.is_empty() {
            return Err(ValidationError::EmptyTargets);
        }

        let action = kind.build(&self.data, self.reason.as_deref())?;
        let family = kind.family();

        if let Some(filter) = self.entity_type_filter {
            if !family.accepts(filter) {
                return Err(ValidationError::InvalidField {
                    field: "entityTypeFilter",
                    detail: format!("{} cannot be applied to {filter} records", kind.name()),
                });
            }
            let excluded: Vec<EntityRef> = self
                .target_ids
                .iter()
                .filter(|target| target.kind != filter)
                .cloned()
                .collect();
            if !excluded.is_empty() {
                return Err(ValidationError::ExcludedKind {
                    filter,
                    targets: excluded,
                });
            }
        }

        if let Some(target) = self
            .target_ids
            .iter()
            .find(|target| !family.accepts(target.kind))
        {
            return Err(ValidationError::KindMismatch {
                action: kind.name().to_string(),
                target: target.clone(),
            });
        }

        Ok(ValidatedBulkRequest {
            action,
            targets: self.target_ids.clone(),
        })
    }
}

/// Listing bulk request in the shape the listings screen sends.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingBulkRequest {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub listing_ids: Vec<EntityId>,
    #[serde(default)]
    pub data: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<ListingBulkRequest> for BulkActionRequest {
    fn from(request: ListingBulkRequest) -> Self {
        Self {
            action: request.action,
            target_ids: request
                .listing_ids
                .into_iter()
                .map(|id| EntityRef::new(EntityKind::Listing, id))
                .collect(),
            entity_type_filter: None,
            data: request.data,
            reason: request.reason,
        }
    }
}

/// Category bulk request in the shape the categories screen sends.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBulkRequest {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub category_ids: Vec<EntityId>,
    #[serde(default)]
    pub data: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<CategoryBulkRequest> for BulkActionRequest {
    fn from(request: CategoryBulkRequest) -> Self {
        Self {
            action: request.action,
            target_ids: request
                .category_ids
                .into_iter()
                .map(|id| EntityRef::new(EntityKind::Category, id))
                .collect(),
            entity_type_filter: None,
            data: request.data,
            reason: request.reason,
        }
    }
}

/// Request that passed validation; safe to dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedBulkRequest {
    pub action: BulkAction,
    pub targets: Vec<EntityRef>,
}

/// Which records an action family may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionFamily {
    Verification,
    Listing,
    Category,
}

impl ActionFamily {
    pub fn accepts(self, kind: EntityKind) -> bool {
        match self {
            ActionFamily::Verification => kind.as_business().is_some(),
            ActionFamily::Listing => kind == EntityKind::Listing,
            ActionFamily::Category => kind == EntityKind::Category,
        }
    }
}

/// Recognized action names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkActionKind {
    ApproveVerification,
    RejectVerification,
    ResetVerification,
    ToggleFeatured,
    FlagListings,
    UnflagListings,
    UpdateStatus,
    DeleteListings,
    ActivateCategories,
    DeactivateCategories,
    DeleteCategories,
}

impl BulkActionKind {
    pub fn from_name(name: &str) -> Result<Self, ValidationError> {
        let kind = match name {
            "approve_verification" => BulkActionKind::ApproveVerification,
            "reject_verification" => BulkActionKind::RejectVerification,
            "reset_verification" => BulkActionKind::ResetVerification,
            "toggle_featured" => BulkActionKind::ToggleFeatured,
            "flag_listings" => BulkActionKind::FlagListings,
            "unflag_listings" | "unflag" => BulkActionKind::UnflagListings,
            "update_status" => BulkActionKind::UpdateStatus,
            "delete_listings" => BulkActionKind::DeleteListings,
            "activate_categories" => BulkActionKind::ActivateCategories,
            "deactivate_categories" => BulkActionKind::DeactivateCategories,
            "delete_categories" => BulkActionKind::DeleteCategories,
            other => return Err(ValidationError::UnknownAction(other.to_string())),
        };
        Ok(kind)
    }

    pub const fn name(self) -> &'static str {
        match self {
            BulkActionKind::ApproveVerification => "approve_verification",
            BulkActionKind::RejectVerification => "reject_verification",
            BulkActionKind::ResetVerification => "reset_verification",
            BulkActionKind::ToggleFeatured => "toggle_featured",
            BulkActionKind::FlagListings => "flag_listings",
            BulkActionKind::UnflagListings => "unflag_listings",
            BulkActionKind::UpdateStatus => "update_status",
            BulkActionKind::DeleteListings => "delete_listings",
            BulkActionKind::ActivateCategories => "activate_categories",
            BulkActionKind::DeactivateCategories => "deactivate_categories",
            BulkActionKind::DeleteCategories => "delete_categories",
        }
    }

    pub const fn family(self) -> ActionFamily {
        match self {
            BulkActionKind::ApproveVerification
            | BulkActionKind::RejectVerification
            | BulkActionKind::ResetVerification => ActionFamily::Verification,
            BulkActionKind::ToggleFeatured
            | BulkActionKind::FlagListings
            | BulkActionKind::UnflagListings
            | BulkActionKind::UpdateStatus
            | BulkActionKind::DeleteListings => ActionFamily::Listing,
            BulkActionKind::ActivateCategories
            | BulkActionKind::DeactivateCategories
            | BulkActionKind::DeleteCategories => ActionFamily::Category,
        }
    }

    fn build(self, data: &Map<String, Value>, reason: Option<&str>) -> Result<BulkAction, ValidationError> {
        let name = self.name();
        let action = match self {
            BulkActionKind::ApproveVerification => BulkAction::Verification {
                action: VerificationAction::Approve,
                reason: require_reason(name, reason)?,
            },
            BulkActionKind::RejectVerification => BulkAction::Verification {
                action: VerificationAction::Reject,
                reason: require_reason(name, reason)?,
            },
            BulkActionKind::ResetVerification => BulkAction::Verification {
                action: VerificationAction::Reset,
                reason: require_reason(name, reason)?,
            },
            BulkActionKind::ToggleFeatured => BulkAction::Listing(ListingAction::ToggleFeatured {
                featured: optional_bool(data, "featured")?,
                reason: optional_reason(reason),
            }),
            BulkActionKind::FlagListings => {
                let flag_reason = required_text(data, name, "flagReason")?;
                BulkAction::Listing(ListingAction::Flag {
                    flag_reason,
                    reason: require_reason(name, reason)?,
                })
            }
            BulkActionKind::UnflagListings => BulkAction::Listing(ListingAction::Unflag {
                reason: optional_reason(reason),
            }),
            BulkActionKind::UpdateStatus => BulkAction::Listing(ListingAction::UpdateStatus {
                status: required_text(data, name, "status")?,
                reason: optional_reason(reason),
            }),
            BulkActionKind::DeleteListings => BulkAction::Listing(ListingAction::Delete {
                reason: require_reason(name, reason)?,
            }),
            BulkActionKind::ActivateCategories => BulkAction::Category(CategoryAction::Activate {
                reason: optional_reason(reason),
            }),
            BulkActionKind::DeactivateCategories => {
                BulkAction::Category(CategoryAction::Deactivate {
                    reason: optional_reason(reason),
                })
            }
            BulkActionKind::DeleteCategories => BulkAction::Category(CategoryAction::Delete {
                reason: require_reason(name, reason)?,
            }),
        };
        Ok(action)
    }
}

fn required_text(
    data: &Map<String, Value>,
    action: &str,
    field: &'static str,
) -> Result<String, ValidationError> {
    data.get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ValidationError::MissingField {
            action: action.to_string(),
            field,
        })
}

fn optional_bool(data: &Map<String, Value>, field: &'static str) -> Result<Option<bool>, ValidationError> {
    match data.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(value)) => Ok(Some(*value)),
        Some(other) => Err(ValidationError::InvalidField {
            field,
            detail: format!("expected a boolean, found {other}"),
        }),
    }
}

/// Typed action with its validated payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum BulkAction {
    Verification {
        action: VerificationAction,
        reason: String,
    },
    Listing(ListingAction),
    Category(CategoryAction),
}

impl BulkAction {
    pub fn name(&self) -> &'static str {
        match self {
            BulkAction::Verification { action, .. } => match action {
                VerificationAction::Approve => BulkActionKind::ApproveVerification.name(),
                VerificationAction::Reject => BulkActionKind::RejectVerification.name(),
                VerificationAction::Reset => BulkActionKind::ResetVerification.name(),
            },
            BulkAction::Listing(action) => action.name(),
            BulkAction::Category(action) => action.name(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ListingAction {
    ToggleFeatured {
        /// `None` flips each listing's current flag.
        featured: Option<bool>,
        reason: Option<String>,
    },
    Flag {
        flag_reason: String,
        reason: String,
    },
    Unflag {
        reason: Option<String>,
    },
    UpdateStatus {
        status: String,
        reason: Option<String>,
    },
    Delete {
        reason: String,
    },
}

impl ListingAction {
    pub const fn name(&self) -> &'static str {
        match self {
            ListingAction::ToggleFeatured { .. } => "toggle_featured",
            ListingAction::Flag { .. } => "flag_listings",
            ListingAction::Unflag { .. } => "unflag_listings",
            ListingAction::UpdateStatus { .. } => "update_status",
            ListingAction::Delete { .. } => "delete_listings",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CategoryAction {
    Activate { reason: Option<String> },
    Deactivate { reason: Option<String> },
    Delete { reason: String },
}

impl CategoryAction {
    pub const fn name(&self) -> &'static str {
        match self {
            CategoryAction::Activate { .. } => "activate_categories",
            CategoryAction::Deactivate { .. } => "deactivate_categories",
            CategoryAction::Delete { .. } => "delete_categories",
        }
    }
}
