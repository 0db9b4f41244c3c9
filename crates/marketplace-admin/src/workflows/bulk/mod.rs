//! Bulk actions over selected records: verification decisions for businesses and the
//! simpler mutations for listings and categories.

pub mod dispatcher;
pub mod outcome;
pub mod request;
pub mod resolvers;

pub use dispatcher::{BulkActionDispatcher, BulkResolver};
pub use outcome::{BulkFailure, BulkItemError, BulkOutcome, BulkSummary, ItemRefusal};
pub use request::{
    ActionFamily, BulkAction, BulkActionKind, BulkActionRequest, CategoryAction,
    CategoryBulkRequest, ListingAction, ListingBulkRequest, ValidatedBulkRequest,
};
pub use resolvers::{CatalogGateway, CatalogResolver, ConsoleResolver, VerificationResolver};
