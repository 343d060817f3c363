use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::model::{ALL_PERMISSIONS, Permission, Relation, ResourceType, SubjectType, TENANT_WILDCARD};
use crate::tuple::TenantId;

use super::{Engine, PermissionStore, ResourceLookup};

/// Denial and allow reasons surfaced in [`CheckResult::reason`]. The set is
/// closed; callers can compare against these constants.
pub mod reason {
    pub const NO_PERMISSION: &str = "no permission found";
    pub const NO_DIRECT_PERMISSION: &str = "no direct permission";
    pub const DIRECT_PERMISSION: &str = "direct permission";
    pub const PERMISSION_EXPIRED: &str = "permission expired";
    pub const RELATION_DOES_NOT_GRANT: &str = "relation does not grant permission";
    pub const CHECK_ERROR: &str = "error checking permission";
    pub const INHERITED: &str = "inherited from parent category";
    pub const INHERITED_VIA_ROLE: &str = "inherited from parent category via role";
    pub const INHERITED_VIA_TENANT: &str = "inherited from parent category via tenant";
    pub const NO_INHERITED_PERMISSION: &str = "no inherited permission";
    pub const DOCUMENT_CATEGORY_ERROR: &str = "error getting document category";
    pub const CATEGORY_PARENT_ERROR: &str = "error getting category parent";
    pub const CANCELLED: &str = "check cancelled";
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckRequest {
    pub tenant_id: TenantId,
    pub user_id: String,
    pub resource_type: ResourceType,
    pub resource_id: String,
    pub permission: Permission,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub allowed: bool,
    pub relation: Option<Relation>,
    pub reason: &'static str,
}

impl CheckResult {
    fn allow(relation: Relation, reason: &'static str) -> Self {
        Self {
            allowed: true,
            relation: Some(relation),
            reason,
        }
    }

    fn deny(reason: &'static str) -> Self {
        Self {
            allowed: false,
            relation: None,
            reason,
        }
    }

    fn with_reason(mut self, reason: &'static str) -> Self {
        self.reason = reason;
        self
    }
}

/// The resource/permission pair a direct sub-check runs against. During
/// the hierarchy walk this points at an ancestor category rather than the
/// originally requested resource.
#[derive(Clone, Copy)]
struct Target<'a> {
    tenant_id: &'a TenantId,
    resource_type: ResourceType,
    resource_id: &'a str,
    permission: Permission,
}

impl<S: PermissionStore, L: ResourceLookup> Engine<S, L> {
    /// Decides whether the user holds the requested permission on the
    /// resource. Evaluates user-direct, role, tenant-wildcard, and
    /// hierarchy-inherited grants in that order, returning on the first
    /// allow. Never errors: every unresolvable branch denies.
    pub async fn check(&self, request: &CheckRequest, cancel: &CancellationToken) -> CheckResult {
        debug!(
            tenant = %request.tenant_id,
            user = %request.user_id,
            resource = format_args!("{}:{}", request.resource_type, request.resource_id),
            permission = %request.permission,
            "checking permission"
        );

        let now = Utc::now();
        let target = Target {
            tenant_id: &request.tenant_id,
            resource_type: request.resource_type,
            resource_id: &request.resource_id,
            permission: request.permission,
        };

        if cancel.is_cancelled() {
            return CheckResult::deny(reason::CANCELLED);
        }
        let result = self
            .check_direct(target, SubjectType::User, &request.user_id, now)
            .await;
        if result.allowed {
            return result;
        }

        // Role ids are resolved once and reused by the hierarchy walk. A
        // lookup failure means the check proceeds without roles, never a
        // hard failure.
        let role_ids = match self
            .lookup
            .user_role_ids(&request.tenant_id, &request.user_id)
            .await
        {
            Ok(role_ids) => role_ids,
            Err(error) => {
                warn!(user = %request.user_id, %error, "failed to resolve user roles");
                Vec::new()
            }
        };

        for role_id in &role_ids {
            if cancel.is_cancelled() {
                return CheckResult::deny(reason::CANCELLED);
            }
            let result = self
                .check_direct(target, SubjectType::Role, role_id, now)
                .await;
            if result.allowed {
                return result;
            }
        }

        if cancel.is_cancelled() {
            return CheckResult::deny(reason::CANCELLED);
        }
        let result = self
            .check_direct(target, SubjectType::Tenant, TENANT_WILDCARD, now)
            .await;
        if result.allowed {
            return result;
        }

        let result = self.check_hierarchy(request, &role_ids, now, cancel).await;
        if result.allowed || result.reason == reason::CANCELLED {
            return result;
        }

        CheckResult::deny(reason::NO_PERMISSION)
    }

    /// One `has_permission` round trip for a single subject. Store errors
    /// deny this sub-check only; sibling branches still run.
    async fn check_direct(
        &self,
        target: Target<'_>,
        subject_type: SubjectType,
        subject_id: &str,
        now: DateTime<Utc>,
    ) -> CheckResult {
        let tuple = match self
            .store
            .has_permission(
                target.tenant_id,
                target.resource_type,
                target.resource_id,
                subject_type,
                subject_id,
            )
            .await
        {
            Ok(tuple) => tuple,
            Err(error) => {
                debug!(%subject_type, %subject_id, %error, "permission lookup failed");
                return CheckResult::deny(reason::CHECK_ERROR);
            }
        };

        let Some(tuple) = tuple else {
            return CheckResult::deny(reason::NO_DIRECT_PERMISSION);
        };

        if tuple.is_expired_at(now) {
            return CheckResult::deny(reason::PERMISSION_EXPIRED);
        }

        if tuple.relation.grants(target.permission) {
            return CheckResult::allow(tuple.relation, reason::DIRECT_PERMISSION);
        }

        CheckResult::deny(reason::RELATION_DOES_NOT_GRANT)
    }

    /// Walks upward through ancestor categories, repeating the
    /// user/role/tenant direct checks at each level. Iterative with an
    /// explicit visited set: a revisited category id means the stored
    /// hierarchy is cyclic, and the walk stops as a denial. A
    /// parent-resolution failure stops the walk as well; ancestors above
    /// the failure point are never evaluated.
    async fn check_hierarchy(
        &self,
        request: &CheckRequest,
        role_ids: &[String],
        now: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> CheckResult {
        let mut next_parent = match request.resource_type {
            ResourceType::Document => {
                match self
                    .lookup
                    .document_category_id(&request.tenant_id, &request.resource_id)
                    .await
                {
                    Ok(parent) => parent,
                    Err(error) => {
                        warn!(document = %request.resource_id, %error, "failed to resolve document category");
                        return CheckResult::deny(reason::DOCUMENT_CATEGORY_ERROR);
                    }
                }
            }
            ResourceType::Category => {
                match self
                    .lookup
                    .category_parent_id(&request.tenant_id, &request.resource_id)
                    .await
                {
                    Ok(parent) => parent,
                    Err(error) => {
                        warn!(category = %request.resource_id, %error, "failed to resolve category parent");
                        return CheckResult::deny(reason::CATEGORY_PARENT_ERROR);
                    }
                }
            }
        };

        let mut visited: HashSet<String> = HashSet::new();

        while let Some(category_id) = next_parent {
            if !visited.insert(category_id.clone()) {
                warn!(category = %category_id, "cycle detected in category hierarchy");
                break;
            }
            if cancel.is_cancelled() {
                return CheckResult::deny(reason::CANCELLED);
            }

            let target = Target {
                tenant_id: &request.tenant_id,
                resource_type: ResourceType::Category,
                resource_id: &category_id,
                permission: request.permission,
            };

            let result = self
                .check_direct(target, SubjectType::User, &request.user_id, now)
                .await;
            if result.allowed {
                return result.with_reason(reason::INHERITED);
            }

            for role_id in role_ids {
                let result = self
                    .check_direct(target, SubjectType::Role, role_id, now)
                    .await;
                if result.allowed {
                    return result.with_reason(reason::INHERITED_VIA_ROLE);
                }
            }

            let result = self
                .check_direct(target, SubjectType::Tenant, TENANT_WILDCARD, now)
                .await;
            if result.allowed {
                return result.with_reason(reason::INHERITED_VIA_TENANT);
            }

            next_parent = match self
                .lookup
                .category_parent_id(&request.tenant_id, &category_id)
                .await
            {
                Ok(parent) => parent,
                Err(error) => {
                    warn!(category = %category_id, %error, "failed to resolve category parent, stopping walk");
                    break;
                }
            };
        }

        CheckResult::deny(reason::NO_INHERITED_PERMISSION)
    }

    /// Runs `check` once per permission in the fixed order and aggregates
    /// the allowed set together with the highest granting relation.
    pub async fn effective_permissions(
        &self,
        tenant_id: &TenantId,
        user_id: &str,
        resource_type: ResourceType,
        resource_id: &str,
        cancel: &CancellationToken,
    ) -> (Vec<Permission>, Relation) {
        let mut granted = Vec::new();
        let mut highest = Relation::Unspecified;

        for permission in ALL_PERMISSIONS {
            let request = CheckRequest {
                tenant_id: tenant_id.clone(),
                user_id: user_id.to_string(),
                resource_type,
                resource_id: resource_id.to_string(),
                permission,
            };
            let result = self.check(&request, cancel).await;
            if result.allowed {
                granted.push(permission);
                if let Some(relation) = result.relation {
                    highest = highest.max(relation);
                }
            }
        }

        (granted, highest)
    }
}
