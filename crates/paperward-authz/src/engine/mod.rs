mod check;

pub use check::{CheckRequest, CheckResult, reason};

use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::model::{Permission, Relation, ResourceType, SubjectType, TENANT_WILDCARD};
use crate::tuple::{GrantRequest, PermissionTuple, TenantId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("operation cancelled")]
    Cancelled,

    #[error("backend error: {0}")]
    Backend(String),
}

/// Storage contract for permission tuples. Implemented by a backing store;
/// the engine only calls it.
pub trait PermissionStore: Send + Sync {
    fn get_direct_permissions(
        &self,
        tenant_id: &TenantId,
        resource_type: ResourceType,
        resource_id: &str,
    ) -> impl Future<Output = Result<Vec<PermissionTuple>, PortError>> + Send;

    fn get_subject_permissions(
        &self,
        tenant_id: &TenantId,
        subject_type: SubjectType,
        subject_id: &str,
    ) -> impl Future<Output = Result<Vec<PermissionTuple>, PortError>> + Send;

    /// Fetches at most one tuple matching the resource/subject pair,
    /// regardless of relation.
    fn has_permission(
        &self,
        tenant_id: &TenantId,
        resource_type: ResourceType,
        resource_id: &str,
        subject_type: SubjectType,
        subject_id: &str,
    ) -> impl Future<Output = Result<Option<PermissionTuple>, PortError>> + Send;

    fn create_permission(
        &self,
        grant: GrantRequest,
    ) -> impl Future<Output = Result<PermissionTuple, PortError>> + Send;

    /// Deletes matching tuples. `relation = None` removes every relation
    /// the subject holds on the resource.
    fn delete_permission(
        &self,
        tenant_id: &TenantId,
        resource_type: ResourceType,
        resource_id: &str,
        relation: Option<Relation>,
        subject_type: SubjectType,
        subject_id: &str,
    ) -> impl Future<Output = Result<(), PortError>> + Send;

    fn list_resources_by_subject(
        &self,
        tenant_id: &TenantId,
        subject_type: SubjectType,
        subject_id: &str,
        resource_type: ResourceType,
    ) -> impl Future<Output = Result<Vec<String>, PortError>> + Send;
}

/// Hierarchy contract: category parents, document ownership, and role
/// membership resolution.
pub trait ResourceLookup: Send + Sync {
    fn category_parent_id(
        &self,
        tenant_id: &TenantId,
        category_id: &str,
    ) -> impl Future<Output = Result<Option<String>, PortError>> + Send;

    fn document_category_id(
        &self,
        tenant_id: &TenantId,
        document_id: &str,
    ) -> impl Future<Output = Result<Option<String>, PortError>> + Send;

    fn user_role_ids(
        &self,
        tenant_id: &TenantId,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<String>, PortError>> + Send;
}

/// The authorization engine. Holds no state beyond its two ports; all
/// operations are pure functions of their inputs and the current store
/// state, safe to call concurrently.
pub struct Engine<S: PermissionStore, L: ResourceLookup> {
    store: Arc<S>,
    lookup: Arc<L>,
}

impl<S: PermissionStore, L: ResourceLookup> Clone for Engine<S, L> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            lookup: Arc::clone(&self.lookup),
        }
    }
}

impl<S: PermissionStore, L: ResourceLookup> Engine<S, L> {
    pub fn new(store: Arc<S>, lookup: Arc<L>) -> Self {
        Self { store, lookup }
    }

    /// Persists a grant. Duplicate tuples are permitted; each copy is
    /// independently revocable.
    pub async fn grant(
        &self,
        grant: GrantRequest,
        cancel: &CancellationToken,
    ) -> Result<PermissionTuple, PortError> {
        if cancel.is_cancelled() {
            return Err(PortError::Cancelled);
        }
        self.store.create_permission(grant).await
    }

    /// Removes matching grants. `relation = None` clears everything the
    /// subject holds on the resource, which is the cascade path used when
    /// the resource itself is deleted.
    #[allow(clippy::too_many_arguments)]
    pub async fn revoke(
        &self,
        tenant_id: &TenantId,
        resource_type: ResourceType,
        resource_id: &str,
        relation: Option<Relation>,
        subject_type: SubjectType,
        subject_id: &str,
        cancel: &CancellationToken,
    ) -> Result<(), PortError> {
        if cancel.is_cancelled() {
            return Err(PortError::Cancelled);
        }
        self.store
            .delete_permission(
                tenant_id,
                resource_type,
                resource_id,
                relation,
                subject_type,
                subject_id,
            )
            .await
    }

    /// Direct tuples on a resource, inherited grants excluded. Used for
    /// administrative "who has access" views.
    pub async fn list_permissions(
        &self,
        tenant_id: &TenantId,
        resource_type: ResourceType,
        resource_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<PermissionTuple>, PortError> {
        if cancel.is_cancelled() {
            return Err(PortError::Cancelled);
        }
        self.store
            .get_direct_permissions(tenant_id, resource_type, resource_id)
            .await
    }

    /// Union of resource ids the user can reach directly, through any of
    /// their roles, or through the tenant wildcard, deduplicated and
    /// sorted. The requested permission is not used as a filter: a
    /// resource is listed whenever the subject holds any tuple of the
    /// requested type.
    pub async fn list_accessible_resources(
        &self,
        tenant_id: &TenantId,
        user_id: &str,
        resource_type: ResourceType,
        _permission: Permission,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, PortError> {
        if cancel.is_cancelled() {
            return Err(PortError::Cancelled);
        }

        let mut accessible = BTreeSet::new();

        let user_resources = self
            .store
            .list_resources_by_subject(tenant_id, SubjectType::User, user_id, resource_type)
            .await?;
        accessible.extend(user_resources);

        match self.lookup.user_role_ids(tenant_id, user_id).await {
            Ok(role_ids) => {
                for role_id in role_ids {
                    if cancel.is_cancelled() {
                        return Err(PortError::Cancelled);
                    }
                    match self
                        .store
                        .list_resources_by_subject(
                            tenant_id,
                            SubjectType::Role,
                            &role_id,
                            resource_type,
                        )
                        .await
                    {
                        Ok(role_resources) => accessible.extend(role_resources),
                        Err(error) => {
                            warn!(%role_id, %error, "skipping role resource listing");
                        }
                    }
                }
            }
            Err(error) => {
                warn!(%user_id, %error, "failed to resolve user roles, listing without them");
            }
        }

        if let Ok(tenant_resources) = self
            .store
            .list_resources_by_subject(
                tenant_id,
                SubjectType::Tenant,
                TENANT_WILDCARD,
                resource_type,
            )
            .await
        {
            accessible.extend(tenant_resources);
        }

        Ok(accessible.into_iter().collect())
    }
}
