use tokio_util::sync::CancellationToken;

use crate::engine::{CheckRequest, Engine, PermissionStore, PortError, ResourceLookup};
use crate::model::{Permission, Relation, ResourceType};
use crate::tuple::TenantId;

/// Denial carrying the engine's reason for refusing access.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("access denied: {reason}")]
pub struct AccessDenied {
    pub reason: &'static str,
}

/// Stateless façade over [`Engine`] exposing one call per permission.
/// Performs no caching or batching; every method is one independent
/// engine check.
pub struct Checker<S: PermissionStore, L: ResourceLookup> {
    engine: Engine<S, L>,
}

impl<S: PermissionStore, L: ResourceLookup> Checker<S, L> {
    pub fn new(engine: Engine<S, L>) -> Self {
        Self { engine }
    }

    /// Runs a check and reports the outcome without raising.
    pub async fn check_permission(
        &self,
        tenant_id: &TenantId,
        user_id: &str,
        resource_type: ResourceType,
        resource_id: &str,
        permission: Permission,
        cancel: &CancellationToken,
    ) -> (bool, &'static str) {
        let result = self
            .engine
            .check(
                &CheckRequest {
                    tenant_id: tenant_id.clone(),
                    user_id: user_id.to_string(),
                    resource_type,
                    resource_id: resource_id.to_string(),
                    permission,
                },
                cancel,
            )
            .await;
        (result.allowed, result.reason)
    }

    /// Like [`Checker::check_permission`] but raises on denial.
    pub async fn require_permission(
        &self,
        tenant_id: &TenantId,
        user_id: &str,
        resource_type: ResourceType,
        resource_id: &str,
        permission: Permission,
        cancel: &CancellationToken,
    ) -> Result<(), AccessDenied> {
        let (allowed, reason) = self
            .check_permission(tenant_id, user_id, resource_type, resource_id, permission, cancel)
            .await;
        if !allowed {
            return Err(AccessDenied { reason });
        }
        Ok(())
    }

    pub async fn can_read(
        &self,
        tenant_id: &TenantId,
        user_id: &str,
        resource_type: ResourceType,
        resource_id: &str,
        cancel: &CancellationToken,
    ) -> Result<(), AccessDenied> {
        self.require_permission(
            tenant_id,
            user_id,
            resource_type,
            resource_id,
            Permission::Read,
            cancel,
        )
        .await
    }

    pub async fn can_write(
        &self,
        tenant_id: &TenantId,
        user_id: &str,
        resource_type: ResourceType,
        resource_id: &str,
        cancel: &CancellationToken,
    ) -> Result<(), AccessDenied> {
        self.require_permission(
            tenant_id,
            user_id,
            resource_type,
            resource_id,
            Permission::Write,
            cancel,
        )
        .await
    }

    pub async fn can_delete(
        &self,
        tenant_id: &TenantId,
        user_id: &str,
        resource_type: ResourceType,
        resource_id: &str,
        cancel: &CancellationToken,
    ) -> Result<(), AccessDenied> {
        self.require_permission(
            tenant_id,
            user_id,
            resource_type,
            resource_id,
            Permission::Delete,
            cancel,
        )
        .await
    }

    pub async fn can_share(
        &self,
        tenant_id: &TenantId,
        user_id: &str,
        resource_type: ResourceType,
        resource_id: &str,
        cancel: &CancellationToken,
    ) -> Result<(), AccessDenied> {
        self.require_permission(
            tenant_id,
            user_id,
            resource_type,
            resource_id,
            Permission::Share,
            cancel,
        )
        .await
    }

    pub async fn can_download(
        &self,
        tenant_id: &TenantId,
        user_id: &str,
        resource_type: ResourceType,
        resource_id: &str,
        cancel: &CancellationToken,
    ) -> Result<(), AccessDenied> {
        self.require_permission(
            tenant_id,
            user_id,
            resource_type,
            resource_id,
            Permission::Download,
            cancel,
        )
        .await
    }

    pub async fn can_read_category(
        &self,
        tenant_id: &TenantId,
        user_id: &str,
        category_id: &str,
        cancel: &CancellationToken,
    ) -> Result<(), AccessDenied> {
        self.can_read(tenant_id, user_id, ResourceType::Category, category_id, cancel)
            .await
    }

    pub async fn can_write_category(
        &self,
        tenant_id: &TenantId,
        user_id: &str,
        category_id: &str,
        cancel: &CancellationToken,
    ) -> Result<(), AccessDenied> {
        self.can_write(tenant_id, user_id, ResourceType::Category, category_id, cancel)
            .await
    }

    pub async fn can_delete_category(
        &self,
        tenant_id: &TenantId,
        user_id: &str,
        category_id: &str,
        cancel: &CancellationToken,
    ) -> Result<(), AccessDenied> {
        self.can_delete(tenant_id, user_id, ResourceType::Category, category_id, cancel)
            .await
    }

    pub async fn can_share_category(
        &self,
        tenant_id: &TenantId,
        user_id: &str,
        category_id: &str,
        cancel: &CancellationToken,
    ) -> Result<(), AccessDenied> {
        self.can_share(tenant_id, user_id, ResourceType::Category, category_id, cancel)
            .await
    }

    pub async fn can_read_document(
        &self,
        tenant_id: &TenantId,
        user_id: &str,
        document_id: &str,
        cancel: &CancellationToken,
    ) -> Result<(), AccessDenied> {
        self.can_read(tenant_id, user_id, ResourceType::Document, document_id, cancel)
            .await
    }

    pub async fn can_write_document(
        &self,
        tenant_id: &TenantId,
        user_id: &str,
        document_id: &str,
        cancel: &CancellationToken,
    ) -> Result<(), AccessDenied> {
        self.can_write(tenant_id, user_id, ResourceType::Document, document_id, cancel)
            .await
    }

    pub async fn can_delete_document(
        &self,
        tenant_id: &TenantId,
        user_id: &str,
        document_id: &str,
        cancel: &CancellationToken,
    ) -> Result<(), AccessDenied> {
        self.can_delete(tenant_id, user_id, ResourceType::Document, document_id, cancel)
            .await
    }

    pub async fn can_share_document(
        &self,
        tenant_id: &TenantId,
        user_id: &str,
        document_id: &str,
        cancel: &CancellationToken,
    ) -> Result<(), AccessDenied> {
        self.can_share(tenant_id, user_id, ResourceType::Document, document_id, cancel)
            .await
    }

    pub async fn can_download_document(
        &self,
        tenant_id: &TenantId,
        user_id: &str,
        document_id: &str,
        cancel: &CancellationToken,
    ) -> Result<(), AccessDenied> {
        self.can_download(tenant_id, user_id, ResourceType::Document, document_id, cancel)
            .await
    }

    pub async fn effective_permissions(
        &self,
        tenant_id: &TenantId,
        user_id: &str,
        resource_type: ResourceType,
        resource_id: &str,
        cancel: &CancellationToken,
    ) -> (Vec<Permission>, Relation) {
        self.engine
            .effective_permissions(tenant_id, user_id, resource_type, resource_id, cancel)
            .await
    }

    pub async fn list_accessible_categories(
        &self,
        tenant_id: &TenantId,
        user_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, PortError> {
        self.engine
            .list_accessible_resources(
                tenant_id,
                user_id,
                ResourceType::Category,
                Permission::Read,
                cancel,
            )
            .await
    }

    pub async fn list_accessible_documents(
        &self,
        tenant_id: &TenantId,
        user_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, PortError> {
        self.engine
            .list_accessible_resources(
                tenant_id,
                user_id,
                ResourceType::Document,
                Permission::Read,
                cancel,
            )
            .await
    }
}
