//! HTTP-facing console: the facade over queue, transitions and bulk dispatch, and its routes.

pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use router::{console_router, BulkResponse, QueueQuery, TransitionBody};
pub use service::AdminConsole;
