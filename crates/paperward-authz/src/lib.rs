//! Relation-based access control for paperward.
//!
//! Grants are stored as permission tuples (subject holds relation on
//! resource). The [`engine::Engine`] resolves a check by combining direct
//! grants, role membership, the tenant-wide wildcard subject, and
//! inheritance up the category hierarchy, always failing closed. The
//! [`checker::Checker`] wraps the engine in permission-specific calls for
//! service-layer callers.
//!
//! Storage and hierarchy access go through the two port traits in
//! [`engine`]; adapters live in their own crate.

pub mod checker;
pub mod engine;
pub mod model;
pub mod tuple;

pub use checker::{AccessDenied, Checker};
pub use engine::{
    CheckRequest, CheckResult, Engine, PermissionStore, PortError, ResourceLookup, reason,
};
pub use model::{ALL_PERMISSIONS, Permission, Relation, ResourceType, SubjectType, TENANT_WILDCARD};
pub use tuple::{GrantRequest, PermissionTuple, TenantId};

#[cfg(test)]
mod testutil;
