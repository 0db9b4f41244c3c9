use super::verification::domain::{EntityKind, EntityRef};

/// Local input errors. These are raised before any remote call is attempted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("a non-empty reason is required to {action}")]
    MissingReason { action: String },
    #[error("bulk request is missing an action")]
    MissingAction,
    #[error("unrecognized bulk action '{0}'")]
    UnknownAction(String),
    #[error("bulk request has no targets")]
    EmptyTargets,
    #[error("action {action} requires data field '{field}'")]
    MissingField { action: String, field: &'static str },
    #[error("invalid value for '{field}': {detail}")]
    InvalidField { field: &'static str, detail: String },
    #[error("action {action} cannot target {target}")]
    KindMismatch { action: String, target: EntityRef },
    #[error("targets outside the {filter} filter: {}", join_refs(.targets))]
    ExcludedKind {
        filter: EntityKind,
        targets: Vec<EntityRef>,
    },
    #[error("unknown entity kind '{0}'")]
    UnknownKind(String),
    #[error("page size must be between 1 and {max}, found {found}")]
    InvalidPageSize { max: u32, found: u32 },
    #[error("page numbers start at 1")]
    InvalidPage,
}

fn join_refs(targets: &[EntityRef]) -> String {
    targets
        .iter()
        .map(EntityRef::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Trim a free-text reason and reject it when nothing is left.
pub(crate) fn require_reason(action: &str, reason: Option<&str>) -> Result<String, ValidationError> {
    match reason.map(str::trim) {
        Some(trimmed) if !trimmed.is_empty() => Ok(trimmed.to_string()),
        _ => Err(ValidationError::MissingReason {
            action: action.to_string(),
        }),
    }
}

/// Keep an optional reason only when it carries text.
pub(crate) fn optional_reason(reason: Option<&str>) -> Option<String> {
    reason
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
        .map(str::to_string)
}
