use std::sync::{Arc, Mutex};

use chrono::Utc;
use uuid::Uuid;

use paperward_authz::engine::{PermissionStore, PortError};
use paperward_authz::model::{Relation, ResourceType, SubjectType};
use paperward_authz::tuple::{GrantRequest, PermissionTuple, TenantId};

/// Tuple store backed by a mutex-guarded vector. Ids and creation times
/// are assigned on write; duplicate grants per `(resource, relation,
/// subject)` are permitted and each copy is independently revocable.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPermissionStore {
    tuples: Arc<Mutex<Vec<PermissionTuple>>>,
}

impl InMemoryPermissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn matches_resource(
        tuple: &PermissionTuple,
        tenant_id: &TenantId,
        resource_type: ResourceType,
        resource_id: &str,
    ) -> bool {
        tuple.tenant_id == *tenant_id
            && tuple.resource_type == resource_type
            && tuple.resource_id == resource_id
    }

    fn matches_subject(
        tuple: &PermissionTuple,
        subject_type: SubjectType,
        subject_id: &str,
    ) -> bool {
        tuple.subject_type == subject_type && tuple.subject_id == subject_id
    }
}

impl PermissionStore for InMemoryPermissionStore {
    async fn get_direct_permissions(
        &self,
        tenant_id: &TenantId,
        resource_type: ResourceType,
        resource_id: &str,
    ) -> Result<Vec<PermissionTuple>, PortError> {
        let tuples = self.tuples.lock().unwrap();
        Ok(tuples
            .iter()
            .filter(|t| Self::matches_resource(t, tenant_id, resource_type, resource_id))
            .cloned()
            .collect())
    }

    async fn get_subject_permissions(
        &self,
        tenant_id: &TenantId,
        subject_type: SubjectType,
        subject_id: &str,
    ) -> Result<Vec<PermissionTuple>, PortError> {
        let tuples = self.tuples.lock().unwrap();
        Ok(tuples
            .iter()
            .filter(|t| {
                t.tenant_id == *tenant_id && Self::matches_subject(t, subject_type, subject_id)
            })
            .cloned()
            .collect())
    }

    async fn has_permission(
        &self,
        tenant_id: &TenantId,
        resource_type: ResourceType,
        resource_id: &str,
        subject_type: SubjectType,
        subject_id: &str,
    ) -> Result<Option<PermissionTuple>, PortError> {
        let tuples = self.tuples.lock().unwrap();
        // The contract is "at most one matching tuple". When the subject
        // holds several grants on the resource, prefer the highest-ranked
        // relation so the strongest grant decides.
        Ok(tuples
            .iter()
            .filter(|t| {
                Self::matches_resource(t, tenant_id, resource_type, resource_id)
                    && Self::matches_subject(t, subject_type, subject_id)
            })
            .max_by_key(|t| t.relation)
            .cloned())
    }

    async fn create_permission(&self, grant: GrantRequest) -> Result<PermissionTuple, PortError> {
        let tuple = PermissionTuple {
            id: Uuid::new_v4(),
            tenant_id: grant.tenant_id,
            resource_type: grant.resource_type,
            resource_id: grant.resource_id,
            relation: grant.relation,
            subject_type: grant.subject_type,
            subject_id: grant.subject_id,
            granted_by: grant.granted_by,
            expires_at: grant.expires_at,
            created_at: Utc::now(),
        };
        self.tuples.lock().unwrap().push(tuple.clone());
        Ok(tuple)
    }

    async fn delete_permission(
        &self,
        tenant_id: &TenantId,
        resource_type: ResourceType,
        resource_id: &str,
        relation: Option<Relation>,
        subject_type: SubjectType,
        subject_id: &str,
    ) -> Result<(), PortError> {
        self.tuples.lock().unwrap().retain(|t| {
            !(Self::matches_resource(t, tenant_id, resource_type, resource_id)
                && Self::matches_subject(t, subject_type, subject_id)
                && relation.is_none_or(|r| t.relation == r))
        });
        Ok(())
    }

    async fn list_resources_by_subject(
        &self,
        tenant_id: &TenantId,
        subject_type: SubjectType,
        subject_id: &str,
        resource_type: ResourceType,
    ) -> Result<Vec<String>, PortError> {
        let tuples = self.tuples.lock().unwrap();
        Ok(tuples
            .iter()
            .filter(|t| {
                t.tenant_id == *tenant_id
                    && t.resource_type == resource_type
                    && Self::matches_subject(t, subject_type, subject_id)
            })
            .map(|t| t.resource_id.clone())
            .collect())
    }
}
