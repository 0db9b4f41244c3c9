//! Business verification and bulk approval workflow for the marketplace admin console.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
