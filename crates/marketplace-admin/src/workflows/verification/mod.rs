//! Vendor and restaurant verification: classification, the merged review queue,
//! row selection and the approve/reject/reset lifecycle.

pub mod classifier;
pub mod domain;
pub mod gateway;
pub mod queue;
pub mod selection;
pub mod transition;

pub use classifier::{
    classify, BusinessApplication, Classification, DisplayState, StatusOrigin, StatusSource,
    Urgency,
};
pub use domain::{
    BusinessKind, BusinessRecord, EntityId, EntityKind, EntityRef, PriorDecision,
    VerificationRecord, VerificationStatus,
};
pub use gateway::{QueueSource, RemoteFailure, VerificationGateway, VerificationUpdate};
pub use queue::{
    aggregate_queue, load_queue, AggregatedQueue, AggregationFailure, Pagination, QueueFilters,
    QueuePage, QueueRequest, QueueSources, QueueStats, SortOrder,
};
pub use selection::{Selectable, SelectionSet, SelectionState};
pub use transition::{
    eligible_targets, TransitionError, TransitionReceipt, VerificationAction,
    VerificationTransitions,
};
