use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::classifier::{classify, BusinessApplication, DisplayState};
use super::domain::{BusinessRecord, EntityRef, VerificationStatus};
use super::gateway::{RemoteFailure, VerificationGateway, VerificationUpdate};
use crate::workflows::validation::{require_reason, ValidationError};

/// The three moves of the verification lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationAction {
    Approve,
    Reject,
    Reset,
}

impl VerificationAction {
    pub const fn label(self) -> &'static str {
        match self {
            VerificationAction::Approve => "approve",
            VerificationAction::Reject => "reject",
            VerificationAction::Reset => "reset",
        }
    }

    /// Approve and reject only apply to records still awaiting review.
    pub const fn requires_pending_review(self) -> bool {
        !matches!(self, VerificationAction::Reset)
    }

    pub fn allows(self, state: DisplayState) -> bool {
        !self.requires_pending_review() || !state.is_resolved()
    }

    pub(crate) const fn decision(self) -> Option<VerificationStatus> {
        match self {
            VerificationAction::Approve => Some(VerificationStatus::Approved),
            VerificationAction::Reject => Some(VerificationStatus::Rejected),
            VerificationAction::Reset => None,
        }
    }
}

impl fmt::Display for VerificationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for VerificationAction {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "approve" => Ok(VerificationAction::Approve),
            "reject" => Ok(VerificationAction::Reject),
            "reset" => Ok(VerificationAction::Reset),
            other => Err(ValidationError::UnknownAction(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransitionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("cannot {action} {target}: it is already {state}; reset it first")]
    InvalidTransition {
        target: EntityRef,
        state: DisplayState,
        action: VerificationAction,
    },
    #[error(transparent)]
    Remote(#[from] RemoteFailure),
}

/// Result of a transition the backend accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionReceipt {
    pub target: EntityRef,
    pub action: VerificationAction,
    pub reason: String,
    pub previous_state: DisplayState,
    pub resulting_state: DisplayState,
    /// Record as it stands after the mutation, for display until the next re-fetch.
    pub record: BusinessRecord,
}

/// Single-entity approve/reject/reset against the verification gateway.
///
/// Nothing local changes until the gateway confirms; remote failures are returned as-is.
pub struct VerificationTransitions<G> {
    gateway: Arc<G>,
}

impl<G> Clone for VerificationTransitions<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
        }
    }
}

impl<G> VerificationTransitions<G>
where
    G: VerificationGateway + 'static,
{
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    pub async fn approve(
        &self,
        application: &BusinessApplication,
        notes: &str,
        now: DateTime<Utc>,
    ) -> Result<TransitionReceipt, TransitionError> {
        self.apply(application, VerificationAction::Approve, Some(notes), now)
            .await
    }

    pub async fn reject(
        &self,
        application: &BusinessApplication,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<TransitionReceipt, TransitionError> {
        self.apply(application, VerificationAction::Reject, Some(reason), now)
            .await
    }

    pub async fn reset(
        &self,
        application: &BusinessApplication,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<TransitionReceipt, TransitionError> {
        self.apply(application, VerificationAction::Reset, Some(reason), now)
            .await
    }

    pub async fn apply(
        &self,
        application: &BusinessApplication,
        action: VerificationAction,
        reason: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<TransitionReceipt, TransitionError> {
        let reason = prepare(application, action, reason)?;
        let target = application.entity_ref();
        let kind = application.kind;
        let id = application.id();

        let sent = match action.decision() {
            Some(status) => {
                let update = VerificationUpdate {
                    status,
                    reason: reason.clone(),
                };
                self.gateway.update_verification(kind, id, &update).await
            }
            None => self.gateway.reset_verification(kind, id, &reason).await,
        };

        if let Err(error) = sent {
            warn!(entity = %target, %action, %error, "verification mutation failed");
            return Err(error.into());
        }

        let record = match action.decision() {
            Some(status) => application.record.with_decision(status, &reason, now),
            None => application.record.with_reset(&reason, now),
        };
        let resulting_state = classify(&record, now).display_state;

        info!(
            entity = %target,
            %action,
            from = %application.display_state(),
            to = %resulting_state,
            "verification transition applied"
        );

        Ok(TransitionReceipt {
            target,
            action,
            reason,
            previous_state: application.display_state(),
            resulting_state,
            record,
        })
    }
}

/// Local pre-dispatch checks: a reason is present and the action fits the current state.
pub fn prepare(
    application: &BusinessApplication,
    action: VerificationAction,
    reason: Option<&str>,
) -> Result<String, TransitionError> {
    let reason = require_reason(action.label(), reason)?;
    let state = application.display_state();
    if !action.allows(state) {
        return Err(TransitionError::InvalidTransition {
            target: application.entity_ref(),
            state,
            action,
        });
    }
    Ok(reason)
}

/// Visible rows an action may be applied to.
pub fn eligible_targets(
    items: &[BusinessApplication],
    action: VerificationAction,
) -> Vec<EntityRef> {
    items
        .iter()
        .filter(|item| action.allows(item.display_state()))
        .map(BusinessApplication::entity_ref)
        .collect()
}
