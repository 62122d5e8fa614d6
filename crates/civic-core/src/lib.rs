//! Civic Core: Issue data model, storage collaborator and Issue Service
//!
//! Every operation is a direct translation into one store call (two for
//! create: sequence, then insert). The service keeps no state of its own.

pub mod data_model;
pub mod error;
pub mod service;
pub mod store;

pub use data_model::{
    Coordinates, Issue, IssueFields, IssueFilter, IssueId, IssueStats, ServiceBanner,
    STATUS_IN_PROGRESS, STATUS_PENDING, STATUS_RESOLVED,
};
pub use error::{CivicError, CivicResult};
pub use service::IssueService;
pub use store::{DocumentStore, IssueStore, StoreError, StoreResult};

/// Service version reported by the banner and health endpoints
pub const CIVIC_VERSION: &str = env!("CARGO_PKG_VERSION");
