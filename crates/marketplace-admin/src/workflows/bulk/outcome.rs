use serde::Serialize;

use crate::workflows::verification::classifier::DisplayState;
use crate::workflows::verification::domain::EntityRef;
use crate::workflows::verification::gateway::RemoteFailure;
use crate::workflows::verification::transition::VerificationAction;

/// Per-item results of one bulk dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkOutcome {
    pub succeeded: Vec<EntityRef>,
    pub failed: Vec<BulkFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkFailure {
    pub id: EntityRef,
    pub error: BulkItemError,
}

/// Why one item of a bulk action did not go through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(untagged)]
pub enum BulkItemError {
    /// Refused before any remote call was made.
    #[error(transparent)]
    Refused(#[from] ItemRefusal),
    #[error(transparent)]
    Remote(#[from] RemoteFailure),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ItemRefusal {
    #[error("cannot {action} a record that is already {state}; reset it first")]
    InvalidTransition {
        state: DisplayState,
        action: VerificationAction,
    },
}

/// Counts for toast/summary rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BulkSummary {
    pub requested: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl BulkOutcome {
    pub(crate) fn record(&mut self, target: &EntityRef, result: Result<(), BulkItemError>) {
        match result {
            Ok(()) => self.succeeded.push(target.clone()),
            Err(error) => self.failed.push(BulkFailure {
                id: target.clone(),
                error,
            }),
        }
    }

    /// True only when nothing failed.
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn is_partial(&self) -> bool {
        !self.succeeded.is_empty() && !self.failed.is_empty()
    }

    pub fn summary(&self) -> BulkSummary {
        BulkSummary {
            requested: self.succeeded.len() + self.failed.len(),
            succeeded: self.succeeded.len(),
            failed: self.failed.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::verification::domain::EntityKind;

    #[test]
    fn a_single_failure_is_never_reported_as_all_succeeded() {
        let mut outcome = BulkOutcome::default();
        outcome.record(&EntityRef::new(EntityKind::Listing, "l-1"), Ok(()));
        outcome.record(
            &EntityRef::new(EntityKind::Listing, "l-2"),
            Err(RemoteFailure::NotFound.into()),
        );

        assert!(!outcome.all_succeeded());
        assert!(outcome.is_partial());
        assert_eq!(
            outcome.summary(),
            BulkSummary {
                requested: 2,
                succeeded: 1,
                failed: 1,
            }
        );
    }

    #[test]
    fn failures_serialize_with_id_and_error() {
        let mut outcome = BulkOutcome::default();
        outcome.record(
            &EntityRef::new(EntityKind::Vendor, "v-2"),
            Err(RemoteFailure::Unauthorized("session expired".to_string()).into()),
        );

        let value = serde_json::to_value(&outcome).expect("serializes");
        assert_eq!(value["failed"][0]["id"]["id"], "v-2");
        assert_eq!(value["failed"][0]["error"]["kind"], "unauthorized");
        assert_eq!(value["failed"][0]["error"]["detail"], "session expired");
    }

    #[test]
    fn refused_items_serialize_with_the_blocking_state() {
        let mut outcome = BulkOutcome::default();
        outcome.record(
            &EntityRef::new(EntityKind::Restaurant, "r-7"),
            Err(ItemRefusal::InvalidTransition {
                state: DisplayState::Verified,
                action: VerificationAction::Reject,
            }
            .into()),
        );

        let value = serde_json::to_value(&outcome).expect("serializes");
        let error = &value["failed"][0]["error"];
        assert_eq!(error["kind"], "invalid_transition");
        assert_eq!(error["detail"]["state"], "verified");
        assert_eq!(error["detail"]["action"], "reject");
        assert_eq!(
            outcome.failed[0].error.to_string(),
            "cannot reject a record that is already verified; reset it first"
        );
    }
}
