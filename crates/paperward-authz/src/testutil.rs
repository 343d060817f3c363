//! In-memory port fakes shared by the unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use uuid::Uuid;

use crate::engine::{CheckRequest, Engine, PermissionStore, PortError, ResourceLookup};
use crate::model::{Permission, Relation, ResourceType, SubjectType};
use crate::tuple::{GrantRequest, PermissionTuple, TenantId};

#[derive(Default)]
pub(crate) struct TestStore {
    pub(crate) tuples: Mutex<Vec<PermissionTuple>>,
    // Subject types whose lookups fail with a backend error.
    pub(crate) fail_for: Vec<SubjectType>,
}

impl TestStore {
    pub(crate) fn with_tuples(tuples: Vec<PermissionTuple>) -> Self {
        Self {
            tuples: Mutex::new(tuples),
            fail_for: Vec::new(),
        }
    }

    pub(crate) fn failing_for(mut self, subject_type: SubjectType) -> Self {
        self.fail_for.push(subject_type);
        self
    }
}

impl PermissionStore for TestStore {
    async fn get_direct_permissions(
        &self,
        tenant_id: &TenantId,
        resource_type: ResourceType,
        resource_id: &str,
    ) -> Result<Vec<PermissionTuple>, PortError> {
        Ok(self
            .tuples
            .lock()
            .unwrap()
            .iter()
            .filter(|t| {
                t.tenant_id == *tenant_id
                    && t.resource_type == resource_type
                    && t.resource_id == resource_id
            })
            .cloned()
            .collect())
    }

    async fn get_subject_permissions(
        &self,
        tenant_id: &TenantId,
        subject_type: SubjectType,
        subject_id: &str,
    ) -> Result<Vec<PermissionTuple>, PortError> {
        Ok(self
            .tuples
            .lock()
            .unwrap()
            .iter()
            .filter(|t| {
                t.tenant_id == *tenant_id
                    && t.subject_type == subject_type
                    && t.subject_id == subject_id
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
        if self.fail_for.contains(&subject_type) {
            return Err(PortError::Backend("injected failure".to_string()));
        }
        Ok(self
            .tuples
            .lock()
            .unwrap()
            .iter()
            .filter(|t| {
                t.tenant_id == *tenant_id
                    && t.resource_type == resource_type
                    && t.resource_id == resource_id
                    && t.subject_type == subject_type
                    && t.subject_id == subject_id
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
            !(t.tenant_id == *tenant_id
                && t.resource_type == resource_type
                && t.resource_id == resource_id
                && t.subject_type == subject_type
                && t.subject_id == subject_id
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
        if self.fail_for.contains(&subject_type) {
            return Err(PortError::Backend("injected failure".to_string()));
        }
        Ok(self
            .tuples
            .lock()
            .unwrap()
            .iter()
            .filter(|t| {
                t.tenant_id == *tenant_id
                    && t.subject_type == subject_type
                    && t.subject_id == subject_id
                    && t.resource_type == resource_type
            })
            .map(|t| t.resource_id.clone())
            .collect())
    }
}

#[derive(Default)]
pub(crate) struct TestLookup {
    pub(crate) parents: HashMap<String, String>,
    pub(crate) document_categories: HashMap<String, String>,
    pub(crate) roles: Vec<String>,
    pub(crate) fail_roles: bool,
    pub(crate) fail_parent_of: Option<String>,
}

impl TestLookup {
    pub(crate) fn with_parent(mut self, category: &str, parent: &str) -> Self {
        self.parents.insert(category.to_string(), parent.to_string());
        self
    }

    pub(crate) fn with_document(mut self, document: &str, category: &str) -> Self {
        self.document_categories
            .insert(document.to_string(), category.to_string());
        self
    }

    pub(crate) fn with_roles(mut self, roles: &[&str]) -> Self {
        self.roles = roles.iter().map(|r| r.to_string()).collect();
        self
    }
}

impl ResourceLookup for TestLookup {
    async fn category_parent_id(
        &self,
        _tenant_id: &TenantId,
        category_id: &str,
    ) -> Result<Option<String>, PortError> {
        if self.fail_parent_of.as_deref() == Some(category_id) {
            return Err(PortError::Backend("injected failure".to_string()));
        }
        Ok(self.parents.get(category_id).cloned())
    }

    async fn document_category_id(
        &self,
        _tenant_id: &TenantId,
        document_id: &str,
    ) -> Result<Option<String>, PortError> {
        Ok(self.document_categories.get(document_id).cloned())
    }

    async fn user_role_ids(
        &self,
        _tenant_id: &TenantId,
        _user_id: &str,
    ) -> Result<Vec<String>, PortError> {
        if self.fail_roles {
            return Err(PortError::Backend("injected failure".to_string()));
        }
        Ok(self.roles.clone())
    }
}

pub(crate) fn tenant() -> TenantId {
    TenantId::new(Uuid::nil())
}

pub(crate) fn tuple(
    resource_type: ResourceType,
    resource_id: &str,
    relation: Relation,
    subject_type: SubjectType,
    subject_id: &str,
) -> PermissionTuple {
    PermissionTuple {
        id: Uuid::new_v4(),
        tenant_id: tenant(),
        resource_type,
        resource_id: resource_id.to_string(),
        relation,
        subject_type,
        subject_id: subject_id.to_string(),
        granted_by: None,
        expires_at: None,
        created_at: Utc::now(),
    }
}

pub(crate) fn engine(store: TestStore, lookup: TestLookup) -> Engine<TestStore, TestLookup> {
    Engine::new(Arc::new(store), Arc::new(lookup))
}

pub(crate) fn request(
    resource_type: ResourceType,
    resource_id: &str,
    permission: Permission,
) -> CheckRequest {
    CheckRequest {
        tenant_id: tenant(),
        user_id: "alice".to_string(),
        resource_type,
        resource_id: resource_id.to_string(),
        permission,
    }
}
