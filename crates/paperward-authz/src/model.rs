use std::fmt;

use serde::{Deserialize, Serialize};

/// Reserved subject id meaning "every subject in this tenant" when paired
/// with [`SubjectType::Tenant`].
pub const TENANT_WILDCARD: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Document,
    Category,
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceType::Document => write!(f, "document"),
            ResourceType::Category => write!(f, "category"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectType {
    User,
    Role,
    Tenant,
}

impl fmt::Display for SubjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubjectType::User => write!(f, "user"),
            SubjectType::Role => write!(f, "role"),
            SubjectType::Tenant => write!(f, "tenant"),
        }
    }
}

/// Named relations a subject can hold on a resource.
///
/// Declaration order is the relation ranking: the derived `Ord` places
/// `Owner` above `Editor` above `Sharer` above `Viewer` above
/// `Unspecified`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    #[default]
    Unspecified,
    Viewer,
    Sharer,
    Editor,
    Owner,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relation::Unspecified => write!(f, "unspecified"),
            Relation::Viewer => write!(f, "viewer"),
            Relation::Sharer => write!(f, "sharer"),
            Relation::Editor => write!(f, "editor"),
            Relation::Owner => write!(f, "owner"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Read,
    Write,
    Delete,
    Share,
    Download,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Permission::Read => write!(f, "read"),
            Permission::Write => write!(f, "write"),
            Permission::Delete => write!(f, "delete"),
            Permission::Share => write!(f, "share"),
            Permission::Download => write!(f, "download"),
        }
    }
}

/// Fixed evaluation order used when aggregating effective permissions.
pub const ALL_PERMISSIONS: [Permission; 5] = [
    Permission::Read,
    Permission::Write,
    Permission::Delete,
    Permission::Share,
    Permission::Download,
];

const OWNER_GRANTS: &[Permission] = &[
    Permission::Read,
    Permission::Write,
    Permission::Delete,
    Permission::Share,
    Permission::Download,
];

const EDITOR_GRANTS: &[Permission] =
    &[Permission::Read, Permission::Write, Permission::Download];

const VIEWER_GRANTS: &[Permission] = &[Permission::Read, Permission::Download];

const SHARER_GRANTS: &[Permission] =
    &[Permission::Read, Permission::Share, Permission::Download];

impl Relation {
    /// The static grants table: every permission this relation confers.
    pub fn permissions(self) -> &'static [Permission] {
        match self {
            Relation::Owner => OWNER_GRANTS,
            Relation::Editor => EDITOR_GRANTS,
            Relation::Viewer => VIEWER_GRANTS,
            Relation::Sharer => SHARER_GRANTS,
            Relation::Unspecified => &[],
        }
    }

    pub fn grants(self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }
}
