use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use paperward_authz::engine::{PortError, ResourceLookup};
use paperward_authz::tuple::TenantId;

#[derive(Debug, Default)]
struct Forest {
    // category id -> parent category id (None for roots)
    category_parents: HashMap<(TenantId, String), Option<String>>,
    // document id -> owning category id
    document_categories: HashMap<(TenantId, String), Option<String>>,
    // user id -> role ids, in membership order
    user_roles: HashMap<(TenantId, String), Vec<String>>,
}

/// Map-backed hierarchy and role-membership lookup. Unknown ids resolve
/// to "no parent" / "no roles" rather than an error; the stored shape is
/// a forest unless a test deliberately wires a cycle.
#[derive(Debug, Clone, Default)]
pub struct InMemoryResourceLookup {
    forest: Arc<Mutex<Forest>>,
}

impl InMemoryResourceLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_category_parent(
        &self,
        tenant_id: &TenantId,
        category_id: impl Into<String>,
        parent_id: Option<&str>,
    ) {
        self.forest.lock().unwrap().category_parents.insert(
            (tenant_id.clone(), category_id.into()),
            parent_id.map(str::to_string),
        );
    }

    pub fn set_document_category(
        &self,
        tenant_id: &TenantId,
        document_id: impl Into<String>,
        category_id: Option<&str>,
    ) {
        self.forest.lock().unwrap().document_categories.insert(
            (tenant_id.clone(), document_id.into()),
            category_id.map(str::to_string),
        );
    }

    pub fn set_user_roles(&self, tenant_id: &TenantId, user_id: impl Into<String>, roles: &[&str]) {
        self.forest.lock().unwrap().user_roles.insert(
            (tenant_id.clone(), user_id.into()),
            roles.iter().map(|r| r.to_string()).collect(),
        );
    }
}

impl ResourceLookup for InMemoryResourceLookup {
    async fn category_parent_id(
        &self,
        tenant_id: &TenantId,
        category_id: &str,
    ) -> Result<Option<String>, PortError> {
        let forest = self.forest.lock().unwrap();
        Ok(forest
            .category_parents
            .get(&(tenant_id.clone(), category_id.to_string()))
            .cloned()
            .flatten())
    }

    async fn document_category_id(
        &self,
        tenant_id: &TenantId,
        document_id: &str,
    ) -> Result<Option<String>, PortError> {
        let forest = self.forest.lock().unwrap();
        Ok(forest
            .document_categories
            .get(&(tenant_id.clone(), document_id.to_string()))
            .cloned()
            .flatten())
    }

    async fn user_role_ids(
        &self,
        tenant_id: &TenantId,
        user_id: &str,
    ) -> Result<Vec<String>, PortError> {
        let forest = self.forest.lock().unwrap();
        Ok(forest
            .user_roles
            .get(&(tenant_id.clone(), user_id.to_string()))
            .cloned()
            .unwrap_or_default())
    }
}
