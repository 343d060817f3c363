use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{Relation, ResourceType, SubjectType};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantId(Uuid);

impl TenantId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for TenantId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A persisted grant: subject holds relation on resource within a tenant.
///
/// Tuples are created and deleted, never mutated. Duplicates per
/// `(resource, relation, subject)` are legal and each is independently
/// revocable. An expired tuple stays readable but never grants access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionTuple {
    pub id: Uuid,
    pub tenant_id: TenantId,
    pub resource_type: ResourceType,
    pub resource_id: String,
    pub relation: Relation,
    pub subject_type: SubjectType,
    pub subject_id: String,
    pub granted_by: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl PermissionTuple {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(expiry) if expiry < now)
    }
}

impl fmt::Display for PermissionTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}#{}@{}:{}",
            self.resource_type, self.resource_id, self.relation, self.subject_type, self.subject_id
        )
    }
}

/// The write shape of a grant. The store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantRequest {
    pub tenant_id: TenantId,
    pub resource_type: ResourceType,
    pub resource_id: String,
    pub relation: Relation,
    pub subject_type: SubjectType,
    pub subject_id: String,
    pub granted_by: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl GrantRequest {
    pub fn new(
        tenant_id: TenantId,
        resource_type: ResourceType,
        resource_id: impl Into<String>,
        relation: Relation,
        subject_type: SubjectType,
        subject_id: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id,
            resource_type,
            resource_id: resource_id.into(),
            relation,
            subject_type,
            subject_id: subject_id.into(),
            granted_by: None,
            expires_at: None,
        }
    }

    pub fn granted_by(mut self, user_id: impl Into<String>) -> Self {
        self.granted_by = Some(user_id.into());
        self
    }

    pub fn expires_at(mut self, expiry: DateTime<Utc>) -> Self {
        self.expires_at = Some(expiry);
        self
    }
}
